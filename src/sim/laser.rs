//! Short-lived horizontal laser beams

use glam::{IVec2, Vec2};
use rand::Rng;

use super::enemy::Enemy;
use super::platform::Arena;
use crate::consts::{LASER_LIFETIME, LASER_TAIL_HOLD};
use crate::renderer::{Canvas, colors};

/// A beam segment that grows, travels and expires over a fixed number of ticks
#[derive(Debug, Clone)]
pub struct Laser {
    /// Trailing edge
    pub from: Vec2,
    /// Leading edge
    pub to: Vec2,
    lifetime: i32,
    /// Signed travel per tick (0 once the beam hit a platform)
    step: f32,
    color: [f32; 4],
    alive: bool,
}

impl Laser {
    /// Fire from `origin`; a negative `range` shoots left
    pub fn new(origin: IVec2, range: i32, rng: &mut impl Rng) -> Self {
        let step = (range / LASER_LIFETIME) as f32;
        let from = origin.as_vec2();
        let palette = &colors::LASER_PALETTE;
        Self {
            from,
            to: Vec2::new(from.x + step, from.y),
            lifetime: LASER_LIFETIME,
            step,
            color: palette[rng.random_range(0..palette.len())],
            alive: true,
        }
    }

    pub fn lifetime(&self) -> i32 {
        self.lifetime
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn color(&self) -> [f32; 4] {
        self.color
    }

    /// Advance one tick. Returns score earned from enemies hit this tick.
    ///
    /// The leading edge always advances; the trailing edge only starts moving
    /// once the remaining life drops to `LASER_TAIL_HOLD`, so the beam first
    /// stretches and then travels at a fixed length.
    pub fn update(&mut self, arena: &Arena, enemies: &mut [Enemy]) -> i32 {
        if !self.alive {
            return 0;
        }
        let width = arena.width as f32;
        self.to.x += self.step;
        if self.lifetime <= LASER_TAIL_HOLD {
            self.from.x += self.step;
        }
        self.to.x = self.to.x.min(width);
        self.from.x = self.from.x.min(width);

        self.lifetime -= 1;
        if self.lifetime <= 0 {
            self.alive = false;
            return 0;
        }

        for platform in arena.platforms {
            let r = platform.bounds();
            if r.intersects_segment(self.from, self.to) {
                self.to.x = self.truncation_edge(r.x, r.right());
                self.step = 0.0;
            }
        }

        let mut score = 0;
        for enemy in enemies.iter_mut() {
            let r = enemy.bounds();
            if !enemy.is_dying() && r.intersects_segment(self.from, self.to) {
                self.to.x = self.truncation_edge(r.x, r.right());
                enemy.die();
                score += enemy.score();
                log::debug!("laser killed enemy worth {}", enemy.score());
            }
        }
        score
    }

    /// Edge of an obstacle facing the trailing edge
    fn truncation_edge(&self, left: i32, right: i32) -> f32 {
        if self.from.x <= left as f32 {
            left as f32
        } else {
            right as f32
        }
    }

    pub fn draw(&self, canvas: &mut impl Canvas) {
        canvas.line(self.from, self.to, self.color);
    }
}
