use glam::Vec2;

use crate::{
    collision::contact::ContactManifold,
    core::{RigidBody, ShapeKind},
    utils::math::safe_normalize,
};

/// Separating-axis tests confirming real overlap between two shapes.
///
/// `check_collides` expects a manifold already reset for the pair and the
/// bodies' world-space caches refreshed for their current transforms. On
/// success the manifold's normal (pointing from A toward B) and depth are
/// filled in; contact points are derived separately.
///
/// Exactly-touching shapes (zero overlap) are reported as non-colliding,
/// and degenerate axes are skipped rather than normalized into NaN.
pub fn check_collides(
    manifold: &mut ContactManifold,
    body_a: &RigidBody,
    body_b: &RigidBody,
) -> bool {
    match (body_a.shape().kind(), body_b.shape().kind()) {
        (ShapeKind::Circle { radius: ra }, ShapeKind::Circle { radius: rb }) => circle_circle(
            manifold,
            body_a.transform.position,
            ra,
            body_b.transform.position,
            rb,
        ),
        (ShapeKind::Circle { radius }, _) => circle_hull(
            manifold,
            body_a.transform.position,
            radius,
            body_b.shape().world_vertices(),
            body_b.shape().world_center(),
            false,
        ),
        (_, ShapeKind::Circle { radius }) => circle_hull(
            manifold,
            body_b.transform.position,
            radius,
            body_a.shape().world_vertices(),
            body_a.shape().world_center(),
            true,
        ),
        _ => hull_hull(
            manifold,
            body_a.shape().world_vertices(),
            body_a.shape().world_center(),
            body_b.shape().world_vertices(),
            body_b.shape().world_center(),
        ),
    }
}

fn circle_circle(
    manifold: &mut ContactManifold,
    center_a: Vec2,
    radius_a: f32,
    center_b: Vec2,
    radius_b: f32,
) -> bool {
    let delta = center_b - center_a;
    let radius_sum = radius_a + radius_b;
    let dist_sq = delta.length_squared();
    if dist_sq >= radius_sum * radius_sum {
        return false;
    }

    // Concentric circles have no meaningful separation axis.
    let normal = match safe_normalize(delta) {
        Some(n) => n,
        None => return false,
    };

    manifold.normal = normal;
    manifold.depth = radius_sum - dist_sq.sqrt();
    manifold.depth > 0.0
}

/// Projection extent of a vertex set onto a unit axis.
fn project(vertices: &[Vec2], axis: Vec2) -> (f32, f32) {
    let mut min = f32::MAX;
    let mut max = f32::MIN;
    for v in vertices {
        let d = v.dot(axis);
        min = min.min(d);
        max = max.max(d);
    }
    (min, max)
}

/// Candidate axes of a convex hull: one outward normal per edge.
fn edge_normals(vertices: &[Vec2], out: &mut Vec<Vec2>) {
    for i in 0..vertices.len() {
        let edge = vertices[(i + 1) % vertices.len()] - vertices[i];
        if let Some(tangent) = safe_normalize(edge) {
            out.push(Vec2::new(tangent.y, -tangent.x));
        }
    }
}

/// Minimum-overlap SAT loop shared by the hull tests. Returns false on
/// the first separating axis; otherwise records the MTV axis and depth.
fn min_overlap_axis(
    axes: &[Vec2],
    verts_a: &[Vec2],
    verts_b: &[Vec2],
) -> Option<(Vec2, f32)> {
    let mut best_axis = Vec2::ZERO;
    let mut best_overlap = f32::MAX;

    for axis in axes {
        let (min_a, max_a) = project(verts_a, *axis);
        let (min_b, max_b) = project(verts_b, *axis);
        let overlap = max_a.min(max_b) - min_a.max(min_b);
        if overlap <= 0.0 {
            return None;
        }
        if overlap < best_overlap {
            best_overlap = overlap;
            best_axis = *axis;
        }
    }

    if best_overlap == f32::MAX {
        return None;
    }
    Some((best_axis, best_overlap))
}

fn hull_hull(
    manifold: &mut ContactManifold,
    verts_a: &[Vec2],
    center_a: Vec2,
    verts_b: &[Vec2],
    center_b: Vec2,
) -> bool {
    if verts_a.len() < 3 || verts_b.len() < 3 {
        return false;
    }

    let mut axes = Vec::with_capacity(verts_a.len() + verts_b.len());
    edge_normals(verts_a, &mut axes);
    edge_normals(verts_b, &mut axes);

    let (mut axis, depth) = match min_overlap_axis(&axes, verts_a, verts_b) {
        Some(result) => result,
        None => return false,
    };

    // A-to-B convention.
    if (center_b - center_a).dot(axis) < 0.0 {
        axis = -axis;
    }

    manifold.normal = axis;
    manifold.depth = depth;
    true
}

fn circle_hull(
    manifold: &mut ContactManifold,
    center: Vec2,
    radius: f32,
    hull_verts: &[Vec2],
    hull_center: Vec2,
    circle_is_b: bool,
) -> bool {
    if hull_verts.len() < 3 {
        return false;
    }

    let mut axes = Vec::with_capacity(hull_verts.len() + 1);
    edge_normals(hull_verts, &mut axes);

    // The axis through the closest hull vertex covers the corner case the
    // edge normals miss.
    if let Some(closest) = hull_verts
        .iter()
        .min_by(|a, b| {
            let da = (**a - center).length_squared();
            let db = (**b - center).length_squared();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
        .and_then(|v| safe_normalize(*v - center))
    {
        axes.push(closest);
    }

    let circle_proj = |axis: Vec2| {
        let d = center.dot(axis);
        (d - radius, d + radius)
    };

    let mut best_axis = Vec2::ZERO;
    let mut best_overlap = f32::MAX;
    for axis in &axes {
        let (min_h, max_h) = project(hull_verts, *axis);
        let (min_c, max_c) = circle_proj(*axis);
        let overlap = max_h.min(max_c) - min_h.max(min_c);
        if overlap <= 0.0 {
            return false;
        }
        if overlap < best_overlap {
            best_overlap = overlap;
            best_axis = *axis;
        }
    }

    if best_overlap == f32::MAX {
        return false;
    }

    // Orient from the circle toward the hull, then flip when the circle
    // is body B so the manifold keeps its A-to-B convention.
    let mut normal = best_axis;
    if (hull_center - center).dot(normal) < 0.0 {
        normal = -normal;
    }
    if circle_is_b {
        normal = -normal;
    }

    manifold.normal = normal;
    manifold.depth = best_overlap;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Material, Shape};
    use crate::utils::allocator::BodyId;

    fn circle_body(radius: f32, position: Vec2) -> RigidBody {
        let mut body = RigidBody::new(Shape::circle(radius, Material::default()).unwrap())
            .with_position(position);
        body.sync_shape();
        body
    }

    fn box_body(width: f32, height: f32, position: Vec2) -> RigidBody {
        let mut body = RigidBody::new(Shape::box_shape(width, height, Material::default()).unwrap())
            .with_position(position);
        body.sync_shape();
        body
    }

    fn fresh_manifold() -> ContactManifold {
        let mut manifold = ContactManifold::default();
        manifold.reset(BodyId::from_index(0), BodyId::from_index(1));
        manifold
    }

    #[test]
    fn circles_radius_ten_at_distance_fifteen_overlap_by_five() {
        let a = circle_body(10.0, Vec2::ZERO);
        let b = circle_body(10.0, Vec2::new(15.0, 0.0));
        let mut manifold = fresh_manifold();

        assert!(check_collides(&mut manifold, &a, &b));
        assert!((manifold.depth - 5.0).abs() < 1e-4, "depth was {}", manifold.depth);
        assert!(manifold.normal.abs_diff_eq(Vec2::X, 1e-5));
    }

    #[test]
    fn exactly_touching_circles_do_not_collide() {
        let a = circle_body(1.0, Vec2::ZERO);
        let b = circle_body(1.0, Vec2::new(2.0, 0.0));
        let mut manifold = fresh_manifold();
        assert!(!check_collides(&mut manifold, &a, &b));
    }

    #[test]
    fn concentric_circles_are_treated_as_degenerate() {
        let a = circle_body(1.0, Vec2::ZERO);
        let b = circle_body(2.0, Vec2::ZERO);
        let mut manifold = fresh_manifold();
        assert!(!check_collides(&mut manifold, &a, &b));
    }

    #[test]
    fn overlapping_boxes_use_minimum_overlap_axis() {
        let a = box_body(2.0, 2.0, Vec2::ZERO);
        // Deep overlap on Y, shallow on X: the MTV must pick X.
        let b = box_body(2.0, 2.0, Vec2::new(1.8, 0.2));
        let mut manifold = fresh_manifold();

        assert!(check_collides(&mut manifold, &a, &b));
        assert!((manifold.depth - 0.2).abs() < 1e-4);
        assert!(manifold.normal.abs_diff_eq(Vec2::X, 1e-5));
    }

    #[test]
    fn separated_boxes_report_no_collision() {
        let a = box_body(2.0, 2.0, Vec2::ZERO);
        let b = box_body(2.0, 2.0, Vec2::new(2.5, 0.0));
        let mut manifold = fresh_manifold();
        assert!(!check_collides(&mut manifold, &a, &b));
    }

    #[test]
    fn rotated_box_collides_where_aabbs_alone_would_not_separate() {
        let mut a = RigidBody::new(Shape::box_shape(2.0, 2.0, Material::default()).unwrap());
        a.transform.set_rotation(std::f32::consts::FRAC_PI_4);
        a.sync_shape();
        // Along X a rotated unit box reaches sqrt(2) ~ 1.414.
        let b = box_body(2.0, 2.0, Vec2::new(2.3, 0.0));
        let mut manifold = fresh_manifold();

        assert!(check_collides(&mut manifold, &a, &b));
        assert!(manifold.depth > 0.0);
        assert!(manifold.normal.x > 0.9);
    }

    #[test]
    fn normal_points_from_a_to_b_for_circle_against_box() {
        let circle = circle_body(1.0, Vec2::new(0.0, 1.8));
        let floor = box_body(10.0, 2.0, Vec2::ZERO);
        let mut manifold = fresh_manifold();

        // Circle is A, resting on top of the box: normal must point down.
        assert!(check_collides(&mut manifold, &circle, &floor));
        assert!(manifold.normal.y < -0.9, "normal was {:?}", manifold.normal);

        // Flipped order: box is A, normal points up toward the circle.
        let mut manifold = fresh_manifold();
        assert!(check_collides(&mut manifold, &floor, &circle));
        assert!(manifold.normal.y > 0.9, "normal was {:?}", manifold.normal);
    }

    #[test]
    fn depth_is_never_negative_for_confirmed_contacts() {
        for x in [-1.9f32, -0.5, 0.0, 0.7, 1.9] {
            let a = box_body(2.0, 2.0, Vec2::ZERO);
            let b = box_body(2.0, 2.0, Vec2::new(x, 0.0));
            let mut manifold = fresh_manifold();
            if check_collides(&mut manifold, &a, &b) {
                assert!(manifold.depth >= 0.0);
            }
        }
    }

    #[test]
    fn line_behaves_as_a_thin_hull() {
        let mut floor = RigidBody::new(Shape::line(20.0, 0.5, Material::default()).unwrap());
        floor.sync_shape();
        let ball = circle_body(1.0, Vec2::new(3.0, 1.0));
        let mut manifold = fresh_manifold();

        assert!(check_collides(&mut manifold, &ball, &floor));
        assert!(manifold.depth > 0.0);
        assert!(manifold.normal.y < -0.9);
    }
}
