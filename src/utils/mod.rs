//! Utility helpers: generational allocator, logging, and 2D math extensions.

pub mod allocator;
pub mod logging;
pub mod math;

pub use allocator::{Arena, BodyId};
pub use math::*;
