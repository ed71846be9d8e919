use std::collections::{HashMap, HashSet};

use crate::{
    config::PhysicsSettings,
    core::{body::BodyType, types::Aabb, RigidBody},
    utils::allocator::{Arena, BodyId},
};

/// Integer cell coordinates used as hash keys.
pub type CellKey = (i32, i32);

/// Inclusive cell-coordinate rectangle covered by an AABB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellFootprint {
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
}

/// Uniform spatial hash over world space.
///
/// Membership is derived purely from each body's current AABB footprint;
/// a body can occupy several cells at once. Only non-empty cells are
/// enumerable, so iteration cost tracks occupied-cell density rather than
/// world size.
pub struct SpatialHashGrid {
    cell_width: f32,
    cell_height: f32,
    cells: HashMap<CellKey, Vec<BodyId>>,
    footprints: HashMap<BodyId, CellFootprint>,
}

impl SpatialHashGrid {
    pub fn new(settings: &PhysicsSettings) -> Self {
        Self {
            cell_width: settings.cell_width().max(f32::EPSILON),
            cell_height: settings.cell_height().max(f32::EPSILON),
            cells: HashMap::new(),
            footprints: HashMap::new(),
        }
    }

    fn footprint_of(&self, aabb: &Aabb) -> CellFootprint {
        CellFootprint {
            min_x: (aabb.min.x / self.cell_width).floor() as i32,
            min_y: (aabb.min.y / self.cell_height).floor() as i32,
            max_x: (aabb.max.x / self.cell_width).floor() as i32,
            max_y: (aabb.max.y / self.cell_height).floor() as i32,
        }
    }

    pub fn insert(&mut self, id: BodyId, aabb: &Aabb) {
        let footprint = self.footprint_of(aabb);
        self.occupy(id, footprint);
        self.footprints.insert(id, footprint);
    }

    pub fn remove(&mut self, id: BodyId) {
        if let Some(footprint) = self.footprints.remove(&id) {
            self.vacate(id, footprint);
        }
    }

    /// Re-derives a body's cell membership from its current AABB,
    /// doing nothing when the footprint is unchanged.
    pub fn update(&mut self, id: BodyId, aabb: &Aabb) {
        let next = self.footprint_of(aabb);
        match self.footprints.get(&id).copied() {
            Some(current) if current == next => {}
            Some(current) => {
                self.vacate(id, current);
                self.occupy(id, next);
                self.footprints.insert(id, next);
            }
            None => {
                self.occupy(id, next);
                self.footprints.insert(id, next);
            }
        }
    }

    fn occupy(&mut self, id: BodyId, footprint: CellFootprint) {
        for x in footprint.min_x..=footprint.max_x {
            for y in footprint.min_y..=footprint.max_y {
                self.cells.entry((x, y)).or_default().push(id);
            }
        }
    }

    fn vacate(&mut self, id: BodyId, footprint: CellFootprint) {
        for x in footprint.min_x..=footprint.max_x {
            for y in footprint.min_y..=footprint.max_y {
                if let Some(members) = self.cells.get_mut(&(x, y)) {
                    members.retain(|member| *member != id);
                    if members.is_empty() {
                        self.cells.remove(&(x, y));
                    }
                }
            }
        }
    }

    /// Keys of all cells currently holding at least one member, sorted so
    /// iteration order is deterministic.
    pub fn active_cells(&self) -> Vec<CellKey> {
        let mut keys: Vec<CellKey> = self.cells.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    pub fn cell(&self, key: CellKey) -> Option<&[BodyId]> {
        self.cells.get(&key).map(|members| members.as_slice())
    }

    pub fn active_cell_count(&self) -> usize {
        self.cells.len()
    }
}

/// Pooled broad-phase candidate pair.
#[derive(Debug, Clone, Copy)]
pub struct CollisionPair {
    pub body_a: BodyId,
    pub body_b: BodyId,
}

/// Free-list pool recycling `CollisionPair` objects every step so the
/// broad phase allocates nothing in steady state.
#[derive(Default)]
pub struct PairPool {
    free: Vec<CollisionPair>,
    allocated: usize,
}

impl PairPool {
    pub fn acquire(&mut self, body_a: BodyId, body_b: BodyId) -> CollisionPair {
        match self.free.pop() {
            Some(mut pair) => {
                pair.body_a = body_a;
                pair.body_b = body_b;
                pair
            }
            None => {
                self.allocated += 1;
                CollisionPair { body_a, body_b }
            }
        }
    }

    pub fn release(&mut self, pair: CollisionPair) {
        self.free.push(pair);
    }

    /// Total pairs ever allocated by this pool.
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    /// Pairs currently parked in the free list.
    pub fn pooled(&self) -> usize {
        self.free.len()
    }
}

/// Broad phase driver: spatial hash plus candidate-pair generation.
pub struct BroadPhase {
    grid: SpatialHashGrid,
    pool: PairPool,
    checked: HashSet<(usize, usize)>,
}

impl BroadPhase {
    pub fn new(settings: &PhysicsSettings) -> Self {
        Self {
            grid: SpatialHashGrid::new(settings),
            pool: PairPool::default(),
            checked: HashSet::new(),
        }
    }

    pub fn grid(&self) -> &SpatialHashGrid {
        &self.grid
    }

    pub fn sync(&mut self, id: BodyId, aabb: &Aabb) {
        self.grid.update(id, aabb);
    }

    pub fn remove(&mut self, id: BodyId) {
        self.grid.remove(id);
    }

    pub fn pool(&self) -> &PairPool {
        &self.pool
    }

    /// Candidate pairs from shared cells, filtered in order: skip
    /// static-vs-static, skip disabled or mismatched filter bits, skip
    /// non-overlapping AABBs. Pairs must be handed back via
    /// [`BroadPhase::release_pairs`] at the end of the step.
    pub fn get_potential_pairs(&mut self, bodies: &Arena<RigidBody>) -> Vec<CollisionPair> {
        let mut pairs = Vec::new();
        self.checked.clear();

        for key in self.grid.active_cells() {
            let members = match self.grid.cell(key) {
                Some(members) => members,
                None => continue,
            };

            for i in 0..members.len() {
                for j in (i + 1)..members.len() {
                    let (id_a, id_b) = if members[i].index() < members[j].index() {
                        (members[i], members[j])
                    } else {
                        (members[j], members[i])
                    };

                    if !self.checked.insert((id_a.index(), id_b.index())) {
                        continue;
                    }

                    let body_a = match bodies.get(id_a) {
                        Some(body) => body,
                        None => continue,
                    };
                    let body_b = match bodies.get(id_b) {
                        Some(body) => body,
                        None => continue,
                    };

                    if body_a.body_type == BodyType::Static && body_b.body_type == BodyType::Static
                    {
                        continue;
                    }
                    if !body_a.filter.accepts(&body_b.filter) {
                        continue;
                    }
                    if !body_a.aabb().overlaps(&body_b.aabb()) {
                        continue;
                    }

                    pairs.push(self.pool.acquire(id_a, id_b));
                }
            }
        }

        pairs
    }

    pub fn release_pairs(&mut self, pairs: Vec<CollisionPair>) {
        for pair in pairs {
            self.pool.release(pair);
        }
    }
}
