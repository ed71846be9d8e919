//! Small 2D math helpers layered on top of `glam`.

use glam::Vec2;

/// Scalar 2D cross product `a.x * b.y - a.y * b.x`.
pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Cross product of a scalar angular velocity with a lever arm,
/// giving the tangential velocity contribution at that point.
pub fn cross_scalar(omega: f32, r: Vec2) -> Vec2 {
    Vec2::new(-omega * r.y, omega * r.x)
}

/// Velocity of a point at offset `r` from a body's origin.
pub fn point_velocity(linear: Vec2, angular: f32, r: Vec2) -> Vec2 {
    linear + cross_scalar(angular, r)
}

/// Normalizes only when the vector has usable length; degenerate axes
/// must never produce NaN directions downstream.
pub fn safe_normalize(v: Vec2) -> Option<Vec2> {
    let len_sq = v.length_squared();
    if len_sq <= 1e-12 {
        None
    } else {
        Some(v / len_sq.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_scalar_is_perpendicular() {
        let r = Vec2::new(2.0, 1.0);
        let v = cross_scalar(3.0, r);
        assert!((v.dot(r)).abs() < 1e-6);
    }

    #[test]
    fn safe_normalize_rejects_zero_vector() {
        assert!(safe_normalize(Vec2::ZERO).is_none());
        let n = safe_normalize(Vec2::new(3.0, 4.0)).unwrap();
        assert!((n.length() - 1.0).abs() < 1e-6);
    }
}
