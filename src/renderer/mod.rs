//! Backend-agnostic rendering surface
//!
//! The simulation never touches pixels. It describes each frame as sprite
//! blits and laser lines on a [`Canvas`]; a frontend maps those to whatever
//! graphics API it uses.

pub mod canvas;
pub mod sprite;

pub use canvas::{Canvas, DrawCommand, DrawList};
pub use sprite::{Animation, Sprite};

/// Colors for game elements
pub mod colors {
    pub const LASER_CYAN: [f32; 4] = [0.0, 1.0, 1.0, 1.0];
    pub const LASER_YELLOW: [f32; 4] = [1.0, 1.0, 0.0, 1.0];
    pub const LASER_RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    pub const LASER_GREEN: [f32; 4] = [0.0, 1.0, 0.0, 1.0];

    /// Palette a new laser picks from
    pub const LASER_PALETTE: [[f32; 4]; 4] = [LASER_CYAN, LASER_YELLOW, LASER_RED, LASER_GREEN];
}
