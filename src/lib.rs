//! Jetpac - simulation core of a 2D pickup-and-deliver arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, world state machine)
//! - `renderer`: Backend-agnostic draw surface and sprite animation
//! - `level`: Level descriptions and world construction
//! - `game`: Lives, level progression and running score
//! - `settings`: Runner configuration

pub mod error;
pub mod game;
pub mod level;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::LevelError;
pub use game::{Game, GameStatus};
pub use level::LevelConfig;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Default scheduler interval (ms per tick, ~33 Hz)
    pub const TICK_MS: u64 = 30;

    /// Astronaut speeds (units per tick)
    pub const FLY_SPEED: i32 = 6;
    pub const WALK_SPEED: i32 = 4;
    /// Ticks between two laser shots while fire is held
    pub const SHOT_COOLDOWN: i32 = 4;
    /// Laser ranges cycled through while firing
    pub const SHOT_RANGES: [i32; 6] = [150, 300, 450, 600, 650, 700];

    /// Laser lifetime in ticks
    pub const LASER_LIFETIME: i32 = 10;
    /// Trailing edge stays put while remaining life is above this
    pub const LASER_TAIL_HOLD: i32 = 8;

    /// Fall speed of draggables and of the landing ship
    pub const FALL_SPEED: i32 = 2;
    /// Ticks before a released draggable can be picked up again
    pub const PICKUP_COOLDOWN: u32 = 30;
    /// Ship ascent per tick once the level is completing
    pub const SHIP_ASCENT: i32 = 3;

    /// Maximum intersection height still classified as a top/bottom contact
    pub const CONTACT_DEPTH: i32 = 6;

    /// Enemy creation cadence (ms)
    pub const ENEMY_CADENCE_MS: u64 = 800;
    /// Chaser re-aim interval: base + random extra (ms)
    pub const CHASER_AIM_MIN_MS: u64 = 3000;
    pub const CHASER_AIM_JITTER_MS: u64 = 5000;
    /// Jumper phase (degrees) forced on a top/bottom platform contact
    pub const JUMPER_TOP_PHASE: f32 = 125.0;
    pub const JUMPER_BOTTOM_PHASE: f32 = 225.0;
    /// Enemies spawn this far inside the world edge
    pub const ENEMY_EDGE_INSET: i32 = 5;

    /// Where the astronaut is parked once aboard the ship
    pub const HIDDEN_POS: (i32, i32) = (-100, -100);
    /// Height of the implicit ceiling platform
    pub const CEILING_THICKNESS: i32 = 10;
}

/// Wrap an x coordinate that left the world back onto the other side.
///
/// Returns the correction to add to a displacement, mirroring how entities
/// re-enter from the opposite edge.
#[inline]
pub fn wrap_correction(x: i32, width: i32) -> i32 {
    if x < 0 {
        width
    } else if x > width {
        -width
    } else {
        0
    }
}
