use glam::Vec2;

use crate::{
    collision::contact::ContactManifold,
    core::{Material, RigidBody},
    utils::math::{cross, point_velocity, safe_normalize},
};

/// Converts a confirmed manifold into instantaneous velocity changes.
///
/// Exactly one resolver is active in a world at a time; the variants
/// trade accuracy for cost. Static and kinematic bodies have zero inverse
/// mass and therefore receive no impulse from any of them.
pub trait ContactResolver {
    fn name(&self) -> &str;

    fn resolve(&self, manifold: &ContactManifold, body_a: &mut RigidBody, body_b: &mut RigidBody);
}

/// Purely linear impulse along the contact normal scaled by combined
/// restitution. Ignores all angular effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleResolver;

impl ContactResolver for SimpleResolver {
    fn name(&self) -> &str {
        "simple"
    }

    fn resolve(&self, manifold: &ContactManifold, body_a: &mut RigidBody, body_b: &mut RigidBody) {
        let normal = manifold.normal;
        let inv_mass_sum = body_a.inv_mass() + body_b.inv_mass();
        if inv_mass_sum <= f32::EPSILON {
            return;
        }

        let relative = body_b.velocity.linear - body_a.velocity.linear;
        let vn = relative.dot(normal);
        if vn > 0.0 {
            return; // already separating
        }

        let pair = Material::combine_pair(body_a.shape().material(), body_b.shape().material());
        let j = -(1.0 + pair.restitution) * vn / inv_mass_sum;
        let impulse = normal * j;

        body_a.velocity.linear -= impulse * body_a.inv_mass();
        body_b.velocity.linear += impulse * body_b.inv_mass();
    }
}

/// Normal impulses with angular response: effective mass includes each
/// body's inertia and the contact-point lever arm.
#[derive(Debug, Clone, Copy, Default)]
pub struct RotationResolver;

impl ContactResolver for RotationResolver {
    fn name(&self) -> &str {
        "rotations"
    }

    fn resolve(&self, manifold: &ContactManifold, body_a: &mut RigidBody, body_b: &mut RigidBody) {
        let pair = Material::combine_pair(body_a.shape().material(), body_b.shape().material());
        for point in manifold.points() {
            apply_normal_impulse(manifold, body_a, body_b, *point, pair.restitution);
        }
    }
}

/// Full response: angular normal impulses plus a tangential impulse
/// bounded by Coulomb friction (|jt| <= mu * jn).
#[derive(Debug, Clone, Copy, Default)]
pub struct RotationFrictionResolver;

impl ContactResolver for RotationFrictionResolver {
    fn name(&self) -> &str {
        "rotation_and_friction"
    }

    fn resolve(&self, manifold: &ContactManifold, body_a: &mut RigidBody, body_b: &mut RigidBody) {
        let pair = Material::combine_pair(body_a.shape().material(), body_b.shape().material());
        for point in manifold.points() {
            let jn = apply_normal_impulse(manifold, body_a, body_b, *point, pair.restitution);
            if jn > 0.0 {
                apply_friction_impulse(
                    manifold,
                    body_a,
                    body_b,
                    *point,
                    jn,
                    pair.static_friction,
                    pair.dynamic_friction,
                );
            }
        }
    }
}

/// Shared normal-impulse kernel. Returns the applied impulse magnitude so
/// friction can be clamped against it.
fn apply_normal_impulse(
    manifold: &ContactManifold,
    body_a: &mut RigidBody,
    body_b: &mut RigidBody,
    point: Vec2,
    restitution: f32,
) -> f32 {
    let normal = manifold.normal;
    let r_a = point - body_a.transform.position;
    let r_b = point - body_b.transform.position;

    let velocity = point_velocity(body_b.velocity.linear, body_b.velocity.angular, r_b)
        - point_velocity(body_a.velocity.linear, body_a.velocity.angular, r_a);
    let vn = velocity.dot(normal);
    if vn > 0.0 {
        return 0.0;
    }

    let ran = cross(r_a, normal);
    let rbn = cross(r_b, normal);
    let k = body_a.inv_mass()
        + body_b.inv_mass()
        + ran * ran * body_a.inv_inertia()
        + rbn * rbn * body_b.inv_inertia();
    if k <= f32::EPSILON {
        return 0.0;
    }

    let j = -(1.0 + restitution) * vn / k / manifold.point_count().max(1) as f32;
    let impulse = normal * j;
    body_a.apply_impulse(-impulse, point);
    body_b.apply_impulse(impulse, point);
    j
}

fn apply_friction_impulse(
    manifold: &ContactManifold,
    body_a: &mut RigidBody,
    body_b: &mut RigidBody,
    point: Vec2,
    normal_impulse: f32,
    static_friction: f32,
    dynamic_friction: f32,
) {
    let normal = manifold.normal;
    let r_a = point - body_a.transform.position;
    let r_b = point - body_b.transform.position;

    // Relative velocity after the normal impulse.
    let velocity = point_velocity(body_b.velocity.linear, body_b.velocity.angular, r_b)
        - point_velocity(body_a.velocity.linear, body_a.velocity.angular, r_a);
    let tangent_velocity = velocity - normal * velocity.dot(normal);
    let tangent = match safe_normalize(tangent_velocity) {
        Some(t) => t,
        None => return, // no sliding at the contact
    };

    let rat = cross(r_a, tangent);
    let rbt = cross(r_b, tangent);
    let k = body_a.inv_mass()
        + body_b.inv_mass()
        + rat * rat * body_a.inv_inertia()
        + rbt * rbt * body_b.inv_inertia();
    if k <= f32::EPSILON {
        return;
    }

    let jt = -velocity.dot(tangent) / k / manifold.point_count().max(1) as f32;

    // Coulomb cone: static friction holds until the required tangent
    // impulse exceeds it, then the dynamic coefficient takes over.
    let impulse = if jt.abs() <= normal_impulse * static_friction {
        tangent * jt
    } else {
        tangent * (-normal_impulse * dynamic_friction)
    };

    body_a.apply_impulse(-impulse, point);
    body_b.apply_impulse(impulse, point);
}
