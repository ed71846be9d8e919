use glam::Vec2;

use crate::{
    collision::clipping::{clip_to_reference, HalfPlane},
    core::{RigidBody, ShapeKind},
    utils::allocator::BodyId,
};

const FACE_TOLERANCE: f32 = 1e-3;

/// Result of a narrow-phase test between two bodies.
///
/// One manifold is owned by the world and reused for every pair each
/// step; it carries no cross-step identity and must be fully reset before
/// each test. By convention the normal points from body A toward body B.
#[derive(Debug, Clone)]
pub struct ContactManifold {
    pub body_a: BodyId,
    pub body_b: BodyId,
    pub normal: Vec2,
    pub depth: f32,
    points: [Vec2; 2],
    point_count: usize,
    /// Callbacks may clear this in `pre_contact` to veto separation and
    /// resolution while still being notified of the contact.
    pub enable_resolve_contact: bool,
}

impl Default for ContactManifold {
    fn default() -> Self {
        Self {
            body_a: BodyId::default(),
            body_b: BodyId::default(),
            normal: Vec2::ZERO,
            depth: 0.0,
            points: [Vec2::ZERO; 2],
            point_count: 0,
            enable_resolve_contact: true,
        }
    }
}

impl ContactManifold {
    /// Reinitializes the manifold for a new candidate pair.
    pub fn reset(&mut self, body_a: BodyId, body_b: BodyId) {
        self.body_a = body_a;
        self.body_b = body_b;
        self.normal = Vec2::ZERO;
        self.depth = 0.0;
        self.points = [Vec2::ZERO; 2];
        self.point_count = 0;
        self.enable_resolve_contact = true;
    }

    pub fn add_point(&mut self, point: Vec2) {
        if self.point_count < self.points.len() {
            self.points[self.point_count] = point;
            self.point_count += 1;
        }
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points[..self.point_count]
    }

    pub fn point_count(&self) -> usize {
        self.point_count
    }
}

/// Derives world-space contact points for a confirmed manifold.
///
/// Circle contacts are analytic; polygonal pairs clip the incident edge
/// against the reference edge, yielding up to two points.
pub fn fill_contact_points(manifold: &mut ContactManifold, body_a: &RigidBody, body_b: &RigidBody) {
    let normal = manifold.normal;
    let depth = manifold.depth;

    match (body_a.shape().kind(), body_b.shape().kind()) {
        (ShapeKind::Circle { radius }, _) => {
            let center = body_a.transform.position;
            manifold.add_point(center + normal * (radius - 0.5 * depth));
        }
        (_, ShapeKind::Circle { radius }) => {
            let center = body_b.transform.position;
            manifold.add_point(center - normal * (radius - 0.5 * depth));
        }
        _ => {
            fill_edge_contacts(manifold, body_a, body_b);
        }
    }
}

fn fill_edge_contacts(manifold: &mut ContactManifold, body_a: &RigidBody, body_b: &RigidBody) {
    let normal = manifold.normal;
    let edge_a = significant_edge(body_a.shape().world_vertices(), normal);
    let edge_b = significant_edge(body_b.shape().world_vertices(), -normal);

    let (edge_a, edge_b) = match (edge_a, edge_b) {
        (Some(a), Some(b)) => (a, b),
        _ => return,
    };

    // The edge more perpendicular to the separation normal is the
    // reference face; the other contributes the clipped points.
    let alignment_a = (edge_a[1] - edge_a[0]).normalize_or_zero().dot(normal).abs();
    let alignment_b = (edge_b[1] - edge_b[0]).normalize_or_zero().dot(normal).abs();

    let (reference, incident, face_normal) = if alignment_a <= alignment_b {
        (edge_a, edge_b, normal)
    } else {
        (edge_b, edge_a, -normal)
    };

    let (clipped, count) = clip_to_reference(incident, reference[0], reference[1]);
    let face = HalfPlane::from_point_normal(reference[0], face_normal);

    for point in &clipped[..count] {
        if face.signed_distance(*point) <= FACE_TOLERANCE {
            manifold.add_point(*point);
        }
    }

    // Grazing contact where clipping discarded everything: fall back to
    // the deepest incident vertex.
    if manifold.point_count() == 0 {
        let deepest = if face.signed_distance(incident[0]) < face.signed_distance(incident[1]) {
            incident[0]
        } else {
            incident[1]
        };
        manifold.add_point(deepest);
    }
}

/// Edge of the hull most involved in a contact along `direction`: the
/// edge adjacent to the farthest vertex whose outward normal aligns best
/// with that direction.
fn significant_edge(vertices: &[Vec2], direction: Vec2) -> Option<[Vec2; 2]> {
    if vertices.len() < 2 {
        return None;
    }

    let mut best_index = 0;
    let mut best_dot = f32::MIN;
    for (index, v) in vertices.iter().enumerate() {
        let d = v.dot(direction);
        if d > best_dot {
            best_dot = d;
            best_index = index;
        }
    }

    let count = vertices.len();
    let v = vertices[best_index];
    let prev = vertices[(best_index + count - 1) % count];
    let next = vertices[(best_index + 1) % count];

    // Of the two adjacent edges, the one more perpendicular to the
    // direction is the contact edge.
    let toward_prev = (v - prev).normalize_or_zero();
    let toward_next = (v - next).normalize_or_zero();

    if toward_prev.dot(direction).abs() <= toward_next.dot(direction).abs() {
        Some([prev, v])
    } else {
        Some([v, next])
    }
}
