use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::shape::Shape;
use super::types::{Aabb, Transform, Velocity};
use crate::utils::allocator::BodyId;
use crate::utils::math::cross;

/// Simulation class of a body.
///
/// Static bodies never move. Kinematic bodies move under their own
/// velocity but ignore gravity and impulses. Dynamic bodies are fully
/// simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyType {
    Static,
    Kinematic,
    #[default]
    Dynamic,
}

/// Category/mask collision filtering bits.
///
/// A pair collides only when `(a.mask & b.category) != 0` and
/// `(a.category & b.mask) != 0`; a zero category or mask on either side
/// disables all collision for that body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CollisionFilter {
    pub category: u32,
    pub mask: u32,
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            category: 1,
            mask: u32::MAX,
        }
    }
}

impl CollisionFilter {
    pub fn accepts(&self, other: &CollisionFilter) -> bool {
        if self.category == 0 || self.mask == 0 || other.category == 0 || other.mask == 0 {
            return false;
        }
        (self.mask & other.category) != 0 && (self.category & other.mask) != 0
    }
}

/// A simulated physical object: one shape driven by one transform.
#[derive(Debug, Clone)]
pub struct RigidBody {
    pub id: BodyId,
    pub transform: Transform,
    pub velocity: Velocity,
    pub body_type: BodyType,
    pub filter: CollisionFilter,
    /// Opaque back-reference for gameplay code.
    pub user_data: u64,
    /// Debug flag set by the world on confirmed contacts each iteration.
    pub is_colliding: bool,
    shape: Shape,
    /// Stamp of the last world iteration that integrated this body; a body
    /// straddling several grid cells must still be stepped exactly once.
    update_stamp: u64,
}

impl RigidBody {
    pub fn new(shape: Shape) -> Self {
        Self {
            id: BodyId::default(),
            transform: Transform::default(),
            velocity: Velocity::default(),
            body_type: BodyType::default(),
            filter: CollisionFilter::default(),
            user_data: 0,
            is_colliding: false,
            shape,
            update_stamp: 0,
        }
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.transform.position = position;
        self
    }

    pub fn with_body_type(mut self, body_type: BodyType) -> Self {
        self.body_type = body_type;
        self
    }

    pub fn with_filter(mut self, category: u32, mask: u32) -> Self {
        self.filter = CollisionFilter { category, mask };
        self
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn shape_mut(&mut self) -> &mut Shape {
        &mut self.shape
    }

    /// Inverse mass; zero for Static/Kinematic bodies (infinite mass).
    pub fn inv_mass(&self) -> f32 {
        if self.body_type != BodyType::Dynamic {
            return 0.0;
        }
        let mass = self.shape.mass_properties().mass;
        if mass <= f32::EPSILON {
            0.0
        } else {
            1.0 / mass
        }
    }

    /// Inverse rotational inertia; zero for Static/Kinematic bodies.
    pub fn inv_inertia(&self) -> f32 {
        if self.body_type != BodyType::Dynamic {
            return 0.0;
        }
        let inertia = self.shape.mass_properties().inertia;
        if inertia <= f32::EPSILON {
            0.0
        } else {
            1.0 / inertia
        }
    }

    /// World-space bounds as of the last shape cache refresh.
    pub fn aabb(&self) -> Aabb {
        self.shape.aabb()
    }

    /// Refreshes the shape's world-space cache for the current transform.
    pub fn sync_shape(&mut self) {
        let transform = self.transform;
        self.shape.update_world_cache(&transform);
    }

    /// Instantaneous velocity change at a world-space contact point.
    /// Non-dynamic bodies are treated as infinite mass and ignore it.
    pub fn apply_impulse(&mut self, impulse: Vec2, contact_point: Vec2) {
        if self.body_type != BodyType::Dynamic {
            return;
        }
        self.velocity.linear += impulse * self.inv_mass();
        let r = contact_point - self.transform.position;
        self.velocity.angular += self.inv_inertia() * cross(r, impulse);
    }

    /// Marks this body as integrated for the given world iteration.
    /// Returns false when the body was already stepped this iteration.
    pub(crate) fn begin_step(&mut self, stamp: u64) -> bool {
        if self.update_stamp == stamp {
            return false;
        }
        self.update_stamp = stamp;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Material;

    fn unit_circle_body() -> RigidBody {
        RigidBody::new(Shape::circle(1.0, Material::default()).unwrap())
    }

    #[test]
    fn zero_filter_bits_disable_collision() {
        let live = CollisionFilter::default();
        let dead = CollisionFilter {
            category: 0,
            mask: u32::MAX,
        };
        assert!(live.accepts(&live));
        assert!(!live.accepts(&dead));
        assert!(!dead.accepts(&live));
    }

    #[test]
    fn disjoint_masks_reject_each_other() {
        let a = CollisionFilter {
            category: 0b01,
            mask: 0b01,
        };
        let b = CollisionFilter {
            category: 0b10,
            mask: 0b10,
        };
        assert!(!a.accepts(&b));
        assert!(!b.accepts(&a));
    }

    #[test]
    fn static_bodies_report_infinite_mass() {
        let body = unit_circle_body().with_body_type(BodyType::Static);
        assert_eq!(body.inv_mass(), 0.0);
        assert_eq!(body.inv_inertia(), 0.0);
    }

    #[test]
    fn impulses_do_not_move_kinematic_bodies() {
        let mut body = unit_circle_body().with_body_type(BodyType::Kinematic);
        body.apply_impulse(Vec2::new(10.0, 0.0), Vec2::ZERO);
        assert_eq!(body.velocity.linear, Vec2::ZERO);
        assert_eq!(body.velocity.angular, 0.0);
    }

    #[test]
    fn off_center_impulse_spins_dynamic_body() {
        let mut body = unit_circle_body();
        body.apply_impulse(Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0));
        assert!(body.velocity.linear.y > 0.0);
        assert!(body.velocity.angular > 0.0);
    }

    #[test]
    fn update_stamp_guards_against_double_stepping() {
        let mut body = unit_circle_body();
        assert!(body.begin_step(1));
        assert!(!body.begin_step(1));
        assert!(body.begin_step(2));
    }
}
