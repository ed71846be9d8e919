use std::time::Instant;

use glam::Vec2;

use crate::{
    collision::{
        broadphase::BroadPhase,
        contact::{fill_contact_points, ContactManifold},
        narrowphase::check_collides,
    },
    config::{PhysicsSettings, MAX_ITERATIONS, MIN_ITERATIONS},
    core::{body::BodyType, RigidBody},
    dynamics::{integrator::Integrator, resolver::ContactResolver, RotationFrictionResolver},
    utils::{
        allocator::{Arena, BodyId},
        logging::ScopedTimer,
    },
};

/// Handle returned by [`PhysicsWorld::add_collision_callback`] and used to
/// unregister it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

/// Contact lifecycle hooks consumed by gameplay code.
///
/// All hooks receive the world's shared manifold; references to it must
/// not be retained beyond the invocation. `pre_contact` may clear
/// `enable_resolve_contact` to veto separation and resolution while still
/// observing the contact.
pub trait CollisionCallback {
    fn pre_contact(&mut self, _manifold: &mut ContactManifold) {}
    fn post_contact(&mut self, _manifold: &ContactManifold) {}
    fn pre_solve(&mut self, _manifold: &ContactManifold) {}
    fn post_solve(&mut self, _manifold: &ContactManifold) {}
}

/// Central simulation container orchestrating all subsystems.
///
/// Each iteration runs integrate -> broad phase -> narrow phase in a
/// fixed, deterministic order: bodies by sorted grid cell then list
/// index, pairs in that same stable order. Resolution of one pair can
/// therefore affect the geometry a later pair sees within the same step,
/// which is an intentional simplification.
pub struct PhysicsWorld {
    settings: PhysicsSettings,
    bodies: Arena<RigidBody>,
    broadphase: BroadPhase,
    integrator: Integrator,
    resolver: Option<Box<dyn ContactResolver>>,
    callbacks: Vec<(CallbackId, Box<dyn CollisionCallback>)>,
    next_callback_id: u64,
    manifold: ContactManifold,
    iterations: u32,
    step_stamp: u64,
    bodies_locked: bool,
    step_time_ms: f64,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(PhysicsSettings::default())
    }
}

impl PhysicsWorld {
    /// Builds a fully usable world; no separate initialization step exists.
    pub fn new(settings: PhysicsSettings) -> Self {
        Self {
            broadphase: BroadPhase::new(&settings),
            integrator: Integrator::new(Vec2::from_array(settings.gravity)),
            settings,
            bodies: Arena::new(),
            resolver: Some(Box::new(RotationFrictionResolver)),
            callbacks: Vec::new(),
            next_callback_id: 0,
            manifold: ContactManifold::default(),
            iterations: 1,
            step_stamp: 0,
            bodies_locked: false,
            step_time_ms: 0.0,
        }
    }

    pub fn settings(&self) -> &PhysicsSettings {
        &self.settings
    }

    pub fn broadphase(&self) -> &BroadPhase {
        &self.broadphase
    }

    /// True while the world is integrating or generating pairs; body
    /// removal is rejected during that window.
    pub fn bodies_locked(&self) -> bool {
        self.bodies_locked
    }

    /// Wall-clock cost of the last `step_world` call, for profiling.
    pub fn step_time_ms(&self) -> f64 {
        self.step_time_ms
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Clamps the per-step iteration count into its supported range.
    pub fn set_iterations(&mut self, iterations: u32) {
        self.iterations = iterations.clamp(MIN_ITERATIONS, MAX_ITERATIONS);
    }

    pub fn add_body(&mut self, body: RigidBody) -> BodyId {
        let id = self.bodies.insert(body);
        if let Some(stored) = self.bodies.get_mut(id) {
            stored.id = id;
            stored.sync_shape();
            let aabb = stored.aabb();
            self.broadphase.sync(id, &aabb);
        }
        id
    }

    /// Removes a body. Fails (with a warning) while bodies are locked
    /// mid-step, or when the id is stale.
    pub fn remove_body(&mut self, id: BodyId) -> bool {
        if self.bodies_locked {
            log::warn!("remove_body rejected: bodies are locked during stepping");
            return false;
        }
        if self.bodies.remove(id).is_some() {
            self.broadphase.remove(id);
            true
        } else {
            false
        }
    }

    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.get(id)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.bodies.get_mut(id)
    }

    /// N-th live body in storage order, for renderers iterating the world.
    pub fn body_by_index(&self, index: usize) -> Option<&RigidBody> {
        let id = self.bodies.ids().nth(index)?;
        self.bodies.get(id)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn bodies(&self) -> impl Iterator<Item = &RigidBody> {
        self.bodies.iter()
    }

    pub fn add_collision_callback<C>(&mut self, callback: C) -> CallbackId
    where
        C: CollisionCallback + 'static,
    {
        let id = CallbackId(self.next_callback_id);
        self.next_callback_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    pub fn remove_collision_callback(&mut self, id: CallbackId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(callback_id, _)| *callback_id != id);
        self.callbacks.len() != before
    }

    /// Swaps the active resolver; exactly one is in effect at a time.
    pub fn set_contact_resolver<R>(&mut self, resolver: R)
    where
        R: ContactResolver + 'static,
    {
        self.resolver = Some(Box::new(resolver));
    }

    pub fn resolver_name(&self) -> Option<&str> {
        self.resolver.as_deref().map(|r| r.name())
    }

    /// Advances the simulation by `time`, split evenly across
    /// `total_iterations` sub-steps for stability.
    pub fn step_world(&mut self, time: f32, total_iterations: u32) {
        self.set_iterations(total_iterations);
        if time <= 0.0 {
            log::warn!("step_world ignored non-positive time {time}");
            return;
        }

        let start = Instant::now();
        let dt = time / self.iterations as f32;
        for _ in 0..self.iterations {
            self.step_once(dt);
        }
        self.step_time_ms = start.elapsed().as_secs_f64() * 1000.0;
    }

    fn step_once(&mut self, dt: f32) {
        self.step_stamp += 1;
        self.bodies_locked = true;

        for body in self.bodies.iter_mut() {
            body.is_colliding = false;
        }

        {
            let _timer = ScopedTimer::new("world::integrate");
            self.integrate_bodies(dt);
        }

        {
            let _timer = ScopedTimer::new("world::refresh");
            self.refresh_bodies();
        }

        let pairs = {
            let _timer = ScopedTimer::new("world::broadphase");
            self.broadphase.get_potential_pairs(&self.bodies)
        };
        self.bodies_locked = false;

        {
            let _timer = ScopedTimer::new("world::narrowphase");
            for pair in &pairs {
                self.process_pair(pair.body_a, pair.body_b);
            }
        }
        self.broadphase.release_pairs(pairs);
    }

    /// Integrates in grid-cell order. A body straddling several cells is
    /// visited more than once but stepped exactly once per iteration
    /// thanks to its update stamp.
    fn integrate_bodies(&mut self, dt: f32) {
        for key in self.broadphase.grid().active_cells() {
            let members: Vec<BodyId> = match self.broadphase.grid().cell(key) {
                Some(members) => members.to_vec(),
                None => continue,
            };
            for id in members {
                if let Some(body) = self.bodies.get_mut(id) {
                    if body.begin_step(self.step_stamp) {
                        self.integrator.step(body, dt);
                    }
                }
            }
        }
    }

    /// Refreshes world-space caches and grid membership after motion.
    fn refresh_bodies(&mut self) {
        let ids: Vec<BodyId> = self.bodies.ids().collect();
        for id in ids {
            if let Some(body) = self.bodies.get_mut(id) {
                body.sync_shape();
                let aabb = body.aabb();
                self.broadphase.sync(id, &aabb);
            }
        }
    }

    fn process_pair(&mut self, id_a: BodyId, id_b: BodyId) {
        self.manifold.reset(id_a, id_b);

        let (body_a, body_b) = match self.bodies.get2_mut(id_a, id_b) {
            Some(pair) => pair,
            None => return,
        };

        if !check_collides(&mut self.manifold, body_a, body_b) {
            return;
        }
        body_a.is_colliding = true;
        body_b.is_colliding = true;

        for (_, callback) in self.callbacks.iter_mut() {
            callback.pre_contact(&mut self.manifold);
        }

        let sensor_pair = body_a.shape().is_sensor() || body_b.shape().is_sensor();
        if self.settings.enable_mtv_separation
            && self.manifold.enable_resolve_contact
            && !sensor_pair
        {
            separate_bodies(&self.manifold, body_a, body_b);
            body_a.sync_shape();
            body_b.sync_shape();
        }

        fill_contact_points(&mut self.manifold, body_a, body_b);
        for (_, callback) in self.callbacks.iter_mut() {
            callback.post_contact(&self.manifold);
        }

        if !self.settings.enable_collision_resolver
            || !self.manifold.enable_resolve_contact
            || sensor_pair
        {
            return;
        }

        match self.resolver.as_ref() {
            Some(resolver) => {
                for (_, callback) in self.callbacks.iter_mut() {
                    callback.pre_solve(&self.manifold);
                }
                resolver.resolve(&self.manifold, body_a, body_b);
                for (_, callback) in self.callbacks.iter_mut() {
                    callback.post_solve(&self.manifold);
                }
            }
            None => log::warn!("no contact resolver set; contact left unresolved"),
        }
    }
}

/// Pushes overlapping bodies apart along the MTV: the dynamic body moves
/// out of a static or kinematic one fully, dynamic pairs split the
/// correction evenly.
fn separate_bodies(manifold: &ContactManifold, body_a: &mut RigidBody, body_b: &mut RigidBody) {
    let correction = manifold.normal * manifold.depth;
    let a_dynamic = body_a.body_type == BodyType::Dynamic;
    let b_dynamic = body_b.body_type == BodyType::Dynamic;

    match (a_dynamic, b_dynamic) {
        (true, true) => {
            body_a.transform.position -= correction * 0.5;
            body_b.transform.position += correction * 0.5;
        }
        (true, false) => body_a.transform.position -= correction,
        (false, true) => body_b.transform.position += correction,
        (false, false) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Material, Shape};

    fn unit_circle(position: Vec2) -> RigidBody {
        RigidBody::new(Shape::circle(1.0, Material::default()).unwrap()).with_position(position)
    }

    #[test]
    fn iterations_are_clamped_to_supported_range() {
        let mut world = PhysicsWorld::default();
        world.set_iterations(0);
        assert_eq!(world.iterations(), 1);
        world.set_iterations(10_000);
        assert_eq!(world.iterations(), 128);
    }

    #[test]
    fn removing_a_stale_id_fails_cleanly() {
        let mut world = PhysicsWorld::default();
        let id = world.add_body(unit_circle(Vec2::ZERO));
        assert!(world.remove_body(id));
        assert!(!world.remove_body(id));
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn body_by_index_walks_live_bodies_in_order() {
        let mut world = PhysicsWorld::default();
        let first = world.add_body(unit_circle(Vec2::ZERO));
        let _second = world.add_body(unit_circle(Vec2::new(5.0, 0.0)));

        assert_eq!(world.body_by_index(0).unwrap().id, first);
        assert!(world.body_by_index(2).is_none());

        world.remove_body(first);
        assert_eq!(
            world.body_by_index(0).unwrap().transform.position,
            Vec2::new(5.0, 0.0)
        );
    }

    #[test]
    fn callback_registration_round_trips() {
        struct Probe;
        impl CollisionCallback for Probe {}

        let mut world = PhysicsWorld::default();
        let id = world.add_collision_callback(Probe);
        assert!(world.remove_collision_callback(id));
        assert!(!world.remove_collision_callback(id));
    }

    #[test]
    fn default_resolver_handles_rotation_and_friction() {
        let world = PhysicsWorld::default();
        assert_eq!(world.resolver_name(), Some("rotation_and_friction"));
    }

    #[test]
    fn world_is_unlocked_between_steps() {
        let mut world = PhysicsWorld::default();
        world.add_body(unit_circle(Vec2::ZERO));
        world.step_world(1.0 / 60.0, 4);
        assert!(!world.bodies_locked());
    }
}
