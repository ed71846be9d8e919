//! Simulation dynamics: integration and impulse-based contact resolution.

pub mod integrator;
pub mod resolver;

pub use integrator::Integrator;
pub use resolver::{ContactResolver, RotationFrictionResolver, RotationResolver, SimpleResolver};
