use glam::Vec2;

use crate::core::{BodyType, RigidBody};

/// Semi-implicit Euler integrator: velocity first, then position, so the
/// updated velocity drives the position step.
#[derive(Debug, Clone, Copy)]
pub struct Integrator {
    pub gravity: Vec2,
}

impl Integrator {
    pub fn new(gravity: Vec2) -> Self {
        Self { gravity }
    }

    /// Gravity only affects fully simulated bodies; kinematic bodies keep
    /// whatever velocity gameplay code gave them.
    pub fn integrate_velocity(&self, body: &mut RigidBody, dt: f32) {
        if body.body_type != BodyType::Dynamic {
            return;
        }
        body.velocity.linear += self.gravity * dt;
    }

    pub fn integrate_position(&self, body: &mut RigidBody, dt: f32) {
        if body.body_type == BodyType::Static {
            return;
        }
        body.transform.position += body.velocity.linear * dt;
        let rotation = body.transform.rotation() + body.velocity.angular * dt;
        body.transform.set_rotation(rotation);
    }

    pub fn step(&self, body: &mut RigidBody, dt: f32) {
        self.integrate_velocity(body, dt);
        self.integrate_position(body, dt);
    }
}
