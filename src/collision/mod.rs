//! Collision detection: spatial-hash broad phase, SAT narrow phase,
//! contact manifolds, and edge clipping.

pub mod broadphase;
pub mod clipping;
pub mod contact;
pub mod narrowphase;

pub use broadphase::{BroadPhase, CollisionPair, PairPool, SpatialHashGrid};
pub use contact::{fill_contact_points, ContactManifold};
pub use narrowphase::check_collides;
