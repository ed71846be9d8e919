use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::types::{Aabb, MassProperties, Material, Transform};
use crate::utils::math::cross;

/// Smallest polygon area (in square units) accepted by the factories.
const MIN_POLYGON_AREA: f32 = 1e-6;

/// Enumeration of supported collision geometries.
///
/// Lines are thin rectangles: they carry a thickness so their footprint is
/// a capsule-like sliver rather than a zero-area segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShapeKind {
    Circle { radius: f32 },
    Box { width: f32, height: f32 },
    Line { length: f32, thickness: f32 },
    Polygon,
}

/// Immutable local collision geometry plus its world-space cache.
///
/// Local vertices never change after construction. The world-space
/// vertices and AABB are refreshed lazily: a recompute happens only when
/// the owning body's transform differs from the cached one or the cache
/// was explicitly marked dirty.
#[derive(Debug, Clone)]
pub struct Shape {
    kind: ShapeKind,
    local_vertices: Vec<Vec2>,
    material: Material,
    mass: MassProperties,
    sensor: bool,

    world_vertices: Vec<Vec2>,
    aabb: Aabb,
    cached_transform: Transform,
    cache_valid: bool,
}

impl Shape {
    /// Circle of the given radius. Rejects non-positive radii.
    pub fn circle(radius: f32, material: Material) -> Option<Self> {
        if radius <= 0.0 {
            return None;
        }
        Some(Self::build(ShapeKind::Circle { radius }, Vec::new(), material))
    }

    /// Axis-aligned box in local space, centered on the body origin.
    pub fn box_shape(width: f32, height: f32, material: Material) -> Option<Self> {
        if width <= 0.0 || height <= 0.0 {
            return None;
        }
        let vertices = rect_vertices(width, height);
        Some(Self::build(ShapeKind::Box { width, height }, vertices, material))
    }

    /// Line segment along the local X axis with a lateral thickness,
    /// represented internally as a thin rectangle.
    pub fn line(length: f32, thickness: f32, material: Material) -> Option<Self> {
        if length <= 0.0 || thickness <= 0.0 {
            return None;
        }
        let vertices = rect_vertices(length, thickness);
        Some(Self::build(ShapeKind::Line { length, thickness }, vertices, material))
    }

    /// Convex polygon from local-space vertices. Winding is normalized to
    /// counter-clockwise; degenerate polygons (fewer than three vertices
    /// or near-zero area) are rejected rather than silently defaulted.
    pub fn polygon(vertices: Vec<Vec2>, material: Material) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }

        let mut vertices = vertices;
        let twice_area = twice_signed_area(&vertices);
        if twice_area.abs() * 0.5 < MIN_POLYGON_AREA {
            return None;
        }
        if twice_area < 0.0 {
            vertices.reverse();
        }

        Some(Self::build(ShapeKind::Polygon, vertices, material))
    }

    fn build(kind: ShapeKind, local_vertices: Vec<Vec2>, material: Material) -> Self {
        let mass = compute_mass(&kind, &local_vertices, material.density);
        let world_vertices = local_vertices.clone();
        Self {
            kind,
            local_vertices,
            material,
            mass,
            sensor: false,
            world_vertices,
            aabb: Aabb::default(),
            cached_transform: Transform::default(),
            cache_valid: false,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn mass_properties(&self) -> MassProperties {
        self.mass
    }

    /// Sensor shapes report contacts but are excluded from positional
    /// separation and impulse resolution.
    pub fn is_sensor(&self) -> bool {
        self.sensor
    }

    pub fn set_sensor(&mut self, sensor: bool) {
        self.sensor = sensor;
    }

    pub fn radius(&self) -> Option<f32> {
        match self.kind {
            ShapeKind::Circle { radius } => Some(radius),
            _ => None,
        }
    }

    pub fn local_vertices(&self) -> &[Vec2] {
        &self.local_vertices
    }

    /// World-space vertices as of the last cache refresh. Empty for circles.
    pub fn world_vertices(&self) -> &[Vec2] {
        &self.world_vertices
    }

    /// World-space bounds as of the last cache refresh.
    pub fn aabb(&self) -> Aabb {
        self.aabb
    }

    /// Forces the next `update_world_cache` call to recompute even if the
    /// transform is unchanged.
    pub fn mark_dirty(&mut self) {
        self.cache_valid = false;
    }

    /// Refreshes the world-space vertex set and AABB for the given body
    /// transform. Skipped entirely when the cached transform still matches.
    pub fn update_world_cache(&mut self, transform: &Transform) {
        if self.cache_valid && self.cached_transform.same_as(transform) {
            return;
        }

        self.world_vertices.clear();
        self.world_vertices
            .extend(self.local_vertices.iter().map(|v| transform.apply(*v)));

        self.aabb = match self.kind {
            ShapeKind::Circle { radius } => {
                Aabb::from_center(transform.position, Vec2::splat(radius))
            }
            _ => Aabb::from_points(&self.world_vertices),
        };

        self.cached_transform = *transform;
        self.cache_valid = true;
    }

    /// Geometric center in world space, used to orient SAT normals.
    pub fn world_center(&self) -> Vec2 {
        if self.world_vertices.is_empty() {
            return self.cached_transform.position;
        }
        let sum: Vec2 = self.world_vertices.iter().copied().sum();
        sum / self.world_vertices.len() as f32
    }
}

fn rect_vertices(width: f32, height: f32) -> Vec<Vec2> {
    let hw = width * 0.5;
    let hh = height * 0.5;
    vec![
        Vec2::new(-hw, -hh),
        Vec2::new(hw, -hh),
        Vec2::new(hw, hh),
        Vec2::new(-hw, hh),
    ]
}

fn twice_signed_area(vertices: &[Vec2]) -> f32 {
    let mut sum = 0.0;
    for i in 0..vertices.len() {
        let p = vertices[i];
        let q = vertices[(i + 1) % vertices.len()];
        sum += cross(p, q);
    }
    sum
}

/// Mass and rotational inertia about the body origin.
///
/// Circle: area = πr², inertia = ½mr². Box and Line use the thin-plate
/// formula m(w² + h²)/12. Polygons use the shoelace area and the standard
/// polygon inertia sum about the local origin.
fn compute_mass(kind: &ShapeKind, local_vertices: &[Vec2], density: f32) -> MassProperties {
    match *kind {
        ShapeKind::Circle { radius } => {
            let mass = std::f32::consts::PI * radius * radius * density;
            MassProperties {
                mass,
                inertia: 0.5 * mass * radius * radius,
            }
        }
        ShapeKind::Box { width, height } | ShapeKind::Line {
            length: width,
            thickness: height,
        } => {
            let mass = width * height * density;
            MassProperties {
                mass,
                inertia: mass * (width * width + height * height) / 12.0,
            }
        }
        ShapeKind::Polygon => polygon_mass(local_vertices, density),
    }
}

fn polygon_mass(vertices: &[Vec2], density: f32) -> MassProperties {
    let mut twice_area_sum = 0.0;
    let mut inertia_sum = 0.0;

    for i in 0..vertices.len() {
        let p = vertices[i];
        let q = vertices[(i + 1) % vertices.len()];
        let c = cross(p, q);
        twice_area_sum += c;
        inertia_sum += c * (p.dot(p) + p.dot(q) + q.dot(q));
    }

    let area = 0.5 * twice_area_sum.abs();
    let mass = area * density;
    let inertia = if twice_area_sum.abs() > f32::EPSILON {
        (mass / (6.0 * twice_area_sum)) * inertia_sum
    } else {
        0.0
    };

    MassProperties {
        mass,
        inertia: inertia.abs(),
    }
}
