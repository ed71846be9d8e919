use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Position and rotation of a body in world space.
///
/// The sine and cosine of the rotation are cached so vertex transforms
/// never call trigonometry in hot loops, and so two transforms compare
/// cheaply when deciding whether a shape's world cache is still valid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec2,
    rotation: f32,
    sin: f32,
    cos: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec2::ZERO, 0.0)
    }
}

impl Transform {
    pub fn new(position: Vec2, rotation: f32) -> Self {
        let (sin, cos) = rotation.sin_cos();
        Self {
            position,
            rotation,
            sin,
            cos,
        }
    }

    pub fn from_position(position: Vec2) -> Self {
        Self::new(position, 0.0)
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
        let (sin, cos) = rotation.sin_cos();
        self.sin = sin;
        self.cos = cos;
    }

    /// Rotates a local-space point into world orientation (no translation).
    pub fn rotate(&self, local: Vec2) -> Vec2 {
        Vec2::new(
            local.x * self.cos - local.y * self.sin,
            local.x * self.sin + local.y * self.cos,
        )
    }

    /// Transforms a local-space point fully into world space.
    pub fn apply(&self, local: Vec2) -> Vec2 {
        self.position + self.rotate(local)
    }

    /// Cheap equality used for cache invalidation; bitwise comparison is
    /// intentional since an unchanged body reproduces identical floats.
    pub fn same_as(&self, other: &Transform) -> bool {
        self.position == other.position && self.rotation == other.rotation
    }
}

/// Linear and angular velocity of a rigid body.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub linear: Vec2,
    pub angular: f32,
}

/// Mass and rotational inertia computed from a shape's geometry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MassProperties {
    pub mass: f32,
    pub inertia: f32,
}

impl Default for MassProperties {
    fn default() -> Self {
        Self {
            mass: 1.0,
            inertia: 1.0,
        }
    }
}

/// Material coefficients that affect contact response.
///
/// All coefficients are clamped into their valid ranges on construction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub density: f32,
    pub restitution: f32,
    pub static_friction: f32,
    pub dynamic_friction: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            density: 1.0,
            restitution: 0.1,
            static_friction: 0.5,
            dynamic_friction: 0.3,
        }
    }
}

impl Material {
    pub fn new(density: f32, restitution: f32, static_friction: f32, dynamic_friction: f32) -> Self {
        Self {
            density: density.max(0.0),
            restitution: restitution.clamp(0.0, 1.0),
            static_friction: static_friction.clamp(0.0, 1.0),
            dynamic_friction: dynamic_friction.clamp(0.0, 1.0),
        }
    }

    pub fn rubber() -> Self {
        Self::new(1.4, 0.8, 1.0, 0.9)
    }

    pub fn steel() -> Self {
        Self::new(7.8, 0.4, 0.58, 0.44)
    }

    pub fn ice() -> Self {
        Self::new(0.9, 0.05, 0.05, 0.03)
    }

    /// Combines two materials for a contact pair.
    ///
    /// Fixed rules: restitution averages, friction uses the geometric
    /// mean `sqrt(fa * fb)`. Both are symmetric in A and B.
    pub fn combine_pair(a: &Self, b: &Self) -> MaterialPairProperties {
        MaterialPairProperties {
            restitution: 0.5 * (a.restitution + b.restitution),
            static_friction: (a.static_friction * b.static_friction).sqrt(),
            dynamic_friction: (a.dynamic_friction * b.dynamic_friction).sqrt(),
        }
    }
}

/// Per-pair coefficients fed to the resolvers.
#[derive(Debug, Clone, Copy)]
pub struct MaterialPairProperties {
    pub restitution: f32,
    pub static_friction: f32,
    pub dynamic_friction: f32,
}

/// Axis-aligned bounding box in world units.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Default for Aabb {
    fn default() -> Self {
        Self {
            min: Vec2::ZERO,
            max: Vec2::ZERO,
        }
    }
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Tight bounds of a point set. Empty input yields a degenerate box at
    /// the origin.
    pub fn from_points(points: &[Vec2]) -> Self {
        let mut min = Vec2::splat(f32::MAX);
        let mut max = Vec2::splat(f32::MIN);
        for p in points {
            min = min.min(*p);
            max = max.max(*p);
        }
        if points.is_empty() {
            return Self::default();
        }
        Self { min, max }
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    pub fn expanded(&self, margin: Vec2) -> Self {
        Self {
            min: self.min - margin,
            max: self.max + margin,
        }
    }

    pub fn center(&self) -> Vec2 {
        0.5 * (self.min + self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_clamps_coefficients_on_construction() {
        let m = Material::new(-2.0, 1.5, -0.1, 2.0);
        assert_eq!(m.density, 0.0);
        assert_eq!(m.restitution, 1.0);
        assert_eq!(m.static_friction, 0.0);
        assert_eq!(m.dynamic_friction, 1.0);
    }

    #[test]
    fn pair_combination_rules_are_fixed() {
        let a = Material::new(1.0, 0.2, 0.9, 0.4);
        let b = Material::new(1.0, 0.6, 0.4, 0.1);
        let pair = Material::combine_pair(&a, &b);

        assert!((pair.restitution - 0.4).abs() < 1e-6);
        assert!((pair.static_friction - (0.9f32 * 0.4).sqrt()).abs() < 1e-6);
        assert!((pair.dynamic_friction - (0.4f32 * 0.1).sqrt()).abs() < 1e-6);

        let flipped = Material::combine_pair(&b, &a);
        assert_eq!(pair.restitution, flipped.restitution);
        assert_eq!(pair.static_friction, flipped.static_friction);
    }

    #[test]
    fn transform_cache_comparison_detects_motion() {
        let a = Transform::new(Vec2::new(1.0, 2.0), 0.5);
        let b = a;
        assert!(a.same_as(&b));

        let mut c = a;
        c.position.x += 1e-4;
        assert!(!a.same_as(&c));

        let mut d = a;
        d.set_rotation(0.6);
        assert!(!a.same_as(&d));
    }

    #[test]
    fn rotate_matches_expected_quarter_turn() {
        let t = Transform::new(Vec2::ZERO, std::f32::consts::FRAC_PI_2);
        let p = t.rotate(Vec2::X);
        assert!(p.abs_diff_eq(Vec2::Y, 1e-6));
    }

    #[test]
    fn aabb_overlap_is_inclusive_of_touching_edges() {
        let a = Aabb::new(Vec2::ZERO, Vec2::ONE);
        let b = Aabb::new(Vec2::new(1.0, 0.0), Vec2::new(2.0, 1.0));
        assert!(a.overlaps(&b));

        let c = Aabb::new(Vec2::new(1.1, 0.0), Vec2::new(2.0, 1.0));
        assert!(!a.overlaps(&c));
    }
}
