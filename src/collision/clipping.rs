use glam::Vec2;

const EPSILON: f32 = 1e-4;

/// Oriented half-plane `dot(normal, p) <= distance`.
#[derive(Debug, Clone, Copy)]
pub struct HalfPlane {
    normal: Vec2,
    distance: f32,
}

impl HalfPlane {
    pub fn from_point_normal(point: Vec2, normal: Vec2) -> Self {
        Self {
            normal,
            distance: normal.dot(point),
        }
    }

    pub fn signed_distance(&self, point: Vec2) -> f32 {
        self.normal.dot(point) - self.distance
    }
}

/// Clips a segment (an incident edge) against one half-plane, returning
/// the surviving points. Both, one interpolated, or none survive.
pub fn clip_edge(edge: [Vec2; 2], plane: &HalfPlane) -> ([Vec2; 2], usize) {
    let mut out = [Vec2::ZERO; 2];
    let mut count = 0;

    let dist_a = plane.signed_distance(edge[0]);
    let dist_b = plane.signed_distance(edge[1]);

    if dist_a <= EPSILON {
        out[count] = edge[0];
        count += 1;
    }
    if dist_b <= EPSILON {
        out[count] = edge[1];
        count += 1;
    }

    // Endpoints on opposite sides: keep the crossing point.
    if dist_a * dist_b < 0.0 && count < 2 {
        let t = dist_a / (dist_a - dist_b);
        out[count] = edge[0] + (edge[1] - edge[0]) * t;
        count += 1;
    }

    (out, count)
}

/// Clips an edge against both side planes of a reference edge.
/// Returns fewer than two points when the edges barely graze.
pub fn clip_to_reference(
    incident: [Vec2; 2],
    reference_start: Vec2,
    reference_end: Vec2,
) -> ([Vec2; 2], usize) {
    let tangent = match crate::utils::math::safe_normalize(reference_end - reference_start) {
        Some(t) => t,
        None => return (incident, 0),
    };

    let side_a = HalfPlane::from_point_normal(reference_start, -tangent);
    let side_b = HalfPlane::from_point_normal(reference_end, tangent);

    let (clipped, count) = clip_edge(incident, &side_a);
    if count < 2 {
        return (clipped, count);
    }
    clip_edge(clipped, &side_b)
}
