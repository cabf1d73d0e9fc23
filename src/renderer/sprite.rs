//! Sprite handles and frame animation
//!
//! A sprite is only a name plus the dimensions the simulation needs for
//! collision. Animation state advances once per simulation tick so that
//! "has the death animation finished" is deterministic.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Visual handle with the size used for collision bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprite {
    /// Asset name, resolved by the frontend
    pub name: String,
    pub width: i32,
    pub height: i32,
    /// Frames per clip (0 or 1 = static image)
    #[serde(default)]
    pub frames: u32,
    /// Ticks each frame is shown
    #[serde(default = "default_delay")]
    pub delay: u32,
}

fn default_delay() -> u32 {
    1
}

impl Sprite {
    pub fn new(name: impl Into<String>, width: i32, height: i32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            frames: 0,
            delay: 1,
        }
    }

    /// Builder-style frame configuration
    pub fn animated(mut self, frames: u32, delay: u32) -> Self {
        self.frames = frames;
        self.delay = delay;
        self
    }

    #[inline]
    pub fn size(&self) -> IVec2 {
        IVec2::new(self.width, self.height)
    }
}

/// Playback state for a multi-clip sprite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Animation {
    pub clip: u32,
    pub frame: u32,
    frames: u32,
    delay: u32,
    elapsed: u32,
    cycles: u32,
    looping: bool,
}

impl Animation {
    pub fn new(sprite: &Sprite) -> Self {
        Self {
            clip: 0,
            frame: 0,
            frames: sprite.frames.max(1),
            delay: sprite.delay.max(1),
            elapsed: 0,
            cycles: 0,
            looping: true,
        }
    }

    /// Advance one tick.
    ///
    /// A non-looping clip holds its last frame but keeps counting cycles, so
    /// callers can wait for "played through more than once".
    pub fn tick(&mut self) {
        self.elapsed += 1;
        if self.elapsed < self.delay {
            return;
        }
        self.elapsed = 0;
        if self.frame + 1 >= self.frames {
            self.cycles += 1;
            if self.looping {
                self.frame = 0;
            }
        } else {
            self.frame += 1;
        }
    }

    /// Switch clip, keeping the current frame position
    pub fn set_clip(&mut self, clip: u32) {
        self.clip = clip;
    }

    /// Start a clip from its first frame with fresh cycle accounting
    pub fn play(&mut self, clip: u32, looping: bool) {
        self.clip = clip;
        self.frame = 0;
        self.elapsed = 0;
        self.cycles = 0;
        self.looping = looping;
    }

    /// Completed passes through the current clip since it was started
    pub fn cycles(&self) -> u32 {
        self.cycles
    }
}
