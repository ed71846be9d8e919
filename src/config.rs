//! World configuration: immutable settings plus default constants.

use serde::{Deserialize, Serialize};

/// Default gravity vector (Y-up world units).
pub const DEFAULT_GRAVITY: [f32; 2] = [0.0, -9.81];

/// Default extent of the spatial hash grid, in world units.
pub const DEFAULT_GRID_EXTENT_UNITS: f32 = 100.0;

/// Default number of hash-grid cells along each axis.
pub const DEFAULT_GRID_CELLS: u32 = 20;

/// Iteration clamp applied by `PhysicsWorld::set_iterations`.
pub const MIN_ITERATIONS: u32 = 1;
pub const MAX_ITERATIONS: u32 = 128;

/// Immutable world configuration, supplied once at construction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    pub gravity: [f32; 2],
    pub grid_width_units: f32,
    pub grid_height_units: f32,
    pub grid_cells_wide: u32,
    pub grid_cells_high: u32,
    /// Push overlapping bodies apart along the minimum translation vector
    /// before impulses are applied.
    pub enable_mtv_separation: bool,
    /// Run the contact resolver at all; disabling leaves contacts
    /// report-only.
    pub enable_collision_resolver: bool,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            grid_width_units: DEFAULT_GRID_EXTENT_UNITS,
            grid_height_units: DEFAULT_GRID_EXTENT_UNITS,
            grid_cells_wide: DEFAULT_GRID_CELLS,
            grid_cells_high: DEFAULT_GRID_CELLS,
            enable_mtv_separation: true,
            enable_collision_resolver: true,
        }
    }
}

impl PhysicsSettings {
    /// Width of one grid cell in world units.
    pub fn cell_width(&self) -> f32 {
        self.grid_width_units / self.grid_cells_wide.max(1) as f32
    }

    /// Height of one grid cell in world units.
    pub fn cell_height(&self) -> f32 {
        self.grid_height_units / self.grid_cells_high.max(1) as f32
    }
}
