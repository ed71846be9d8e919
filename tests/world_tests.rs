use std::cell::RefCell;
use std::rc::Rc;

use impulse2d::*;

const DT: f32 = 1.0 / 60.0;

fn zero_gravity() -> PhysicsSettings {
    PhysicsSettings {
        gravity: [0.0, 0.0],
        ..PhysicsSettings::default()
    }
}

fn circle_body(radius: f32, position: Vec2) -> RigidBody {
    RigidBody::new(Shape::circle(radius, Material::default()).unwrap()).with_position(position)
}

fn static_floor() -> RigidBody {
    RigidBody::new(Shape::box_shape(20.0, 1.0, Material::default()).unwrap())
        .with_body_type(BodyType::Static)
}

/// Counts contact phases and records the widest manifold seen.
#[derive(Default)]
struct ProbeState {
    pre_contacts: usize,
    post_contacts: usize,
    post_solves: usize,
    max_points: usize,
}

struct Probe(Rc<RefCell<ProbeState>>);

impl CollisionCallback for Probe {
    fn pre_contact(&mut self, _manifold: &mut ContactManifold) {
        self.0.borrow_mut().pre_contacts += 1;
    }

    fn post_contact(&mut self, manifold: &ContactManifold) {
        let mut state = self.0.borrow_mut();
        state.post_contacts += 1;
        state.max_points = state.max_points.max(manifold.point_count());
    }

    fn post_solve(&mut self, _manifold: &ContactManifold) {
        self.0.borrow_mut().post_solves += 1;
    }
}

fn attach_probe(world: &mut PhysicsWorld) -> Rc<RefCell<ProbeState>> {
    let state = Rc::new(RefCell::new(ProbeState::default()));
    world.add_collision_callback(Probe(Rc::clone(&state)));
    state
}

#[test]
fn bodies_fall_under_gravity() {
    let mut world = PhysicsWorld::default();
    let id = world.add_body(circle_body(0.5, Vec2::new(0.0, 10.0)));

    world.step_world(DT, 1);

    let body = world.body(id).unwrap();
    assert!(
        body.transform.position.y < 10.0,
        "body should start falling, y = {}",
        body.transform.position.y
    );
    assert!(body.velocity.linear.y < 0.0);
}

#[test]
fn static_bodies_never_move() {
    let mut world = PhysicsWorld::default();
    let floor = world.add_body(static_floor());
    world.add_body(circle_body(0.5, Vec2::new(0.0, 1.2)));

    for _ in 0..120 {
        world.step_world(DT, 4);
    }

    let body = world.body(floor).unwrap();
    assert_eq!(body.transform.position, Vec2::ZERO);
    assert_eq!(body.transform.rotation(), 0.0);
    assert_eq!(body.velocity.linear, Vec2::ZERO);
    assert_eq!(body.velocity.angular, 0.0);
}

#[test]
fn kinematic_bodies_follow_velocity_and_ignore_gravity() {
    let mut world = PhysicsWorld::default();
    let mut body = RigidBody::new(Shape::circle(0.5, Material::default()).unwrap())
        .with_body_type(BodyType::Kinematic);
    body.velocity.linear = Vec2::new(1.0, 0.0);
    let id = world.add_body(body);

    world.step_world(1.0, 60);

    let body = world.body(id).unwrap();
    assert!((body.transform.position.x - 1.0).abs() < 1e-3);
    assert_eq!(body.transform.position.y, 0.0, "gravity must not apply");
    assert_eq!(body.velocity.linear, Vec2::new(1.0, 0.0));
}

#[test]
fn box_settles_on_static_floor() {
    let mut world = PhysicsWorld::default();
    world.add_body(static_floor());
    let id = world.add_body(
        RigidBody::new(Shape::box_shape(1.0, 1.0, Material::default()).unwrap())
            .with_position(Vec2::new(0.0, 1.0)),
    );

    for _ in 0..240 {
        world.step_world(DT, 8);
    }

    let body = world.body(id).unwrap();
    assert!(
        body.transform.position.y > 0.5,
        "box sank into the floor, y = {}",
        body.transform.position.y
    );
    assert!(
        (body.transform.position.y - 1.0).abs() < 0.1,
        "box should rest near its drop height, y = {}",
        body.transform.position.y
    );
    assert!(
        body.velocity.linear.y.abs() < 0.5,
        "box should be at rest, vy = {}",
        body.velocity.linear.y
    );
}

#[test]
fn rebound_speed_never_exceeds_impact_speed() {
    let mut world = PhysicsWorld::default();
    world.add_body(static_floor());
    let id = world.add_body(
        RigidBody::new(Shape::circle(0.5, Material::rubber()).unwrap())
            .with_position(Vec2::new(0.0, 3.0)),
    );

    let mut bounced = false;
    let mut contact_seen = false;
    for _ in 0..300 {
        world.step_world(DT, 4);
        let body = world.body(id).unwrap();
        // Free fall from y = 3.0 to the resting height at 1.0 peaks near 6.3 m/s.
        assert!(
            body.velocity.linear.y.abs() < 9.0,
            "restitution must not add energy, vy = {}",
            body.velocity.linear.y
        );
        if body.is_colliding {
            contact_seen = true;
        }
        if contact_seen && body.velocity.linear.y > 0.5 {
            bounced = true;
        }
    }
    assert!(bounced, "rubber circle should rebound off the floor");
}

#[test]
fn filtered_pair_is_never_reported() {
    let mut world = PhysicsWorld::new(zero_gravity());
    let probe = attach_probe(&mut world);

    let a = world.add_body(circle_body(1.0, Vec2::ZERO).with_filter(0b01, 0b01));
    let b = world.add_body(circle_body(1.0, Vec2::new(0.5, 0.0)).with_filter(0b10, 0b10));

    world.step_world(DT, 2);

    assert_eq!(probe.borrow().pre_contacts, 0);
    assert!(!world.body(a).unwrap().is_colliding);
    assert!(!world.body(b).unwrap().is_colliding);
    assert_eq!(world.body(b).unwrap().transform.position, Vec2::new(0.5, 0.0));
}

#[test]
fn sensor_overlap_reports_without_resolving() {
    let mut world = PhysicsWorld::new(zero_gravity());
    let probe = attach_probe(&mut world);

    let mut sensor = circle_body(1.0, Vec2::ZERO);
    sensor.shape_mut().set_sensor(true);
    let sensor_id = world.add_body(sensor);
    let other = world.add_body(circle_body(1.0, Vec2::new(0.5, 0.0)));

    world.step_world(DT, 1);

    let state = probe.borrow();
    assert!(state.post_contacts > 0, "overlap should still be reported");
    assert_eq!(state.post_solves, 0, "sensor contact must not be solved");
    assert!(world.body(sensor_id).unwrap().is_colliding);
    let other = world.body(other).unwrap();
    assert_eq!(other.transform.position, Vec2::new(0.5, 0.0));
    assert_eq!(other.velocity.linear, Vec2::ZERO);
}

#[test]
fn pre_contact_veto_skips_separation_and_resolution() {
    struct Veto;
    impl CollisionCallback for Veto {
        fn pre_contact(&mut self, manifold: &mut ContactManifold) {
            manifold.enable_resolve_contact = false;
        }
    }

    let mut world = PhysicsWorld::new(zero_gravity());
    world.add_collision_callback(Veto);
    let probe = attach_probe(&mut world);

    world.add_body(circle_body(1.0, Vec2::ZERO));
    let id = world.add_body(circle_body(1.0, Vec2::new(0.5, 0.0)));

    world.step_world(DT, 1);

    assert_eq!(probe.borrow().post_solves, 0);
    let body = world.body(id).unwrap();
    assert!(body.is_colliding, "vetoed contact is still observed");
    assert_eq!(
        body.transform.position,
        Vec2::new(0.5, 0.0),
        "veto must suppress positional correction"
    );
}

#[test]
fn mtv_separation_resolves_overlap_without_solver() {
    let settings = PhysicsSettings {
        gravity: [0.0, 0.0],
        enable_collision_resolver: false,
        ..PhysicsSettings::default()
    };
    let mut world = PhysicsWorld::new(settings);
    world.add_body(static_floor());
    let id = world.add_body(circle_body(0.5, Vec2::new(0.0, 0.8)));

    world.step_world(DT, 1);

    let body = world.body(id).unwrap();
    assert!(
        (body.transform.position.y - 1.0).abs() < 1e-4,
        "circle should be pushed to rest on the floor top, y = {}",
        body.transform.position.y
    );
}

#[test]
fn pair_pool_reuses_allocations_across_steps() {
    let mut world = PhysicsWorld::new(zero_gravity());
    world.add_body(circle_body(1.0, Vec2::ZERO));
    world.add_body(circle_body(1.0, Vec2::new(0.5, 0.0)));

    for _ in 0..60 {
        world.step_world(DT, 4);
    }

    let pool = world.broadphase().pool();
    assert!(
        pool.allocated() <= 2,
        "steady-state stepping must not grow the pool, allocated = {}",
        pool.allocated()
    );
    assert_eq!(
        pool.pooled(),
        pool.allocated(),
        "every pair must be released back after the step"
    );
}

#[test]
fn identical_worlds_stay_bitwise_identical() {
    let build = || {
        let mut world = PhysicsWorld::default();
        world.add_body(static_floor());
        for i in 0..8 {
            world.add_body(circle_body(
                0.4,
                Vec2::new(-3.0 + i as f32 * 0.9, 2.0 + (i % 3) as f32),
            ));
        }
        world
    };

    let mut first = build();
    let mut second = build();
    for _ in 0..120 {
        first.step_world(DT, 4);
        second.step_world(DT, 4);
    }

    for (a, b) in first.bodies().zip(second.bodies()) {
        assert_eq!(a.transform.position, b.transform.position);
        assert_eq!(a.transform.rotation(), b.transform.rotation());
        assert_eq!(a.velocity.linear, b.velocity.linear);
        assert_eq!(a.velocity.angular, b.velocity.angular);
    }
}

#[test]
fn swapping_the_resolver_takes_effect() {
    let mut world = PhysicsWorld::default();
    world.set_contact_resolver(SimpleResolver);
    assert_eq!(world.resolver_name(), Some("simple"));
    world.set_contact_resolver(RotationResolver);
    assert_eq!(world.resolver_name(), Some("rotations"));
}
