pub use cell::*;
pub use engine::*;
pub use frame::*;
pub use geometry::*;
pub use scheduler::*;
pub use surface::*;

mod cell;
pub mod easing;
mod engine;
mod frame;
mod geometry;
mod scheduler;
mod surface;

/// Grow and merge duration.
pub const DURATION_NORMAL_MS: f32 = 400.0;
/// A merge completes halfway through its nominal duration.
pub const ADAPT_SETTLE_MS: f32 = DURATION_NORMAL_MS * 0.5;
/// Extra delay per unit of distance before a batch cell merges.
pub const DELAY_MANY_MS: f32 = 100.0;
/// Delay per unit of distance between wavefront starts.
pub const TIME_BETWEEN_CELLS_MS: f32 = 150.0;
pub const DURATION_MINE_MS: f32 = 400.0;

pub const SHRUNKEN_FACTOR: f32 = 0.8;
pub const BORDER_RADIUS_FACTOR: f32 = 0.1;
pub const ICON_FACTOR: f32 = 0.5;
pub const DIGIT_FACTOR: f32 = 0.35;
