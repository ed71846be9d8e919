//! Impulse2d – a fixed-step 2D rigid-body physics engine.
//!
//! The crate is organized around a [`PhysicsWorld`] that owns every
//! rigid body and drives integration, a spatial-hash broad phase, SAT
//! narrow phase with contact manifolds, and pluggable impulse-based
//! contact resolvers.

pub mod collision;
pub mod config;
pub mod core;
pub mod dynamics;
pub mod utils;
pub mod world;

pub use glam::Vec2;

pub use collision::{
    broadphase::{BroadPhase, CollisionPair, PairPool, SpatialHashGrid},
    contact::ContactManifold,
    narrowphase::check_collides,
};
pub use config::PhysicsSettings;
pub use crate::core::{
    body::{BodyType, CollisionFilter, RigidBody},
    shape::{Shape, ShapeKind},
    types::{Aabb, MassProperties, Material, MaterialPairProperties, Transform, Velocity},
};
pub use dynamics::{
    integrator::Integrator,
    resolver::{ContactResolver, RotationFrictionResolver, RotationResolver, SimpleResolver},
};
pub use utils::allocator::{Arena, BodyId};
pub use world::{CallbackId, CollisionCallback, PhysicsWorld};
