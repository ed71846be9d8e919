//! Core types describing physics entities and shared data.

pub mod body;
pub mod shape;
pub mod types;

pub use body::{BodyType, CollisionFilter, RigidBody};
pub use shape::{Shape, ShapeKind};
pub use types::{Aabb, MassProperties, Material, MaterialPairProperties, Transform, Velocity};
