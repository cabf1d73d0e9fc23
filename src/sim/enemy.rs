//! Enemies: one entity type, four movement behaviours
//!
//! All kinds share displacement, platform reaction and astronaut collision;
//! only the per-kind physics in [`Behavior`] differs.

use glam::IVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::astronaut::{Astronaut, Direction};
use super::geom::Rect;
use super::platform::{Arena, Contact};
use crate::consts::*;
use crate::renderer::{Animation, Canvas, Sprite};

const CLIP_LEFT: u32 = 0;
const CLIP_RIGHT: u32 = 1;
const CLIP_DIE: u32 = 2;

/// Enemy kinds as configured per level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    /// Straight line; dies on any platform contact
    #[default]
    Linear,
    /// Straight line; bounces off platforms
    Bouncer,
    /// Bounces, and periodically re-aims at the astronaut
    Chaser,
    /// Hops along in sine arcs
    Jumper,
}

impl EnemyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Linear => "linear",
            EnemyKind::Bouncer => "bouncer",
            EnemyKind::Chaser => "chaser",
            EnemyKind::Jumper => "jumper",
        }
    }

    /// Parse a level label; anything unrecognized is a linear enemy
    pub fn from_label(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "bouncer" => EnemyKind::Bouncer,
            "chaser" => EnemyKind::Chaser,
            "jumper" => EnemyKind::Jumper,
            _ => EnemyKind::Linear,
        }
    }
}

/// Kind-specific movement state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Behavior {
    Linear,
    Bouncer,
    Chaser {
        /// Clock time of the next re-aim
        next_aim_ms: u64,
    },
    Jumper {
        /// Jump phase in degrees
        phase: f32,
        /// Phase advance per tick
        phase_step: f32,
        amplitude: i32,
    },
}

/// An enemy
#[derive(Debug, Clone)]
pub struct Enemy {
    rect: Rect,
    sprite: Sprite,
    anim: Animation,
    vel: IVec2,
    behavior: Behavior,
    score: i32,
    dying: bool,
}

fn next_aim_time(now: u64, rng: &mut impl Rng) -> u64 {
    now + CHASER_AIM_MIN_MS + rng.random_range(0..CHASER_AIM_JITTER_MS)
}

impl Enemy {
    /// Spawn an enemy heading towards `facing` at `speed` units per tick
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: EnemyKind,
        pos: IVec2,
        speed: i32,
        score: i32,
        facing: Direction,
        sprite: Sprite,
        now: u64,
        rng: &mut impl Rng,
    ) -> Self {
        assert!(speed > 0, "enemy speed must be positive");
        let mut anim = Animation::new(&sprite);
        let mut vx = match facing {
            Direction::Left => {
                anim.set_clip(CLIP_LEFT);
                -speed
            }
            Direction::Right => {
                anim.set_clip(CLIP_RIGHT);
                speed
            }
        };
        let mut vy = 0;
        let behavior = match kind {
            EnemyKind::Linear => {
                vy = speed / 2 - rng.random_range(0..speed);
                Behavior::Linear
            }
            EnemyKind::Bouncer => {
                vy = speed / 2 - rng.random_range(0..speed);
                Behavior::Bouncer
            }
            EnemyKind::Chaser => {
                vy = speed / 2 - rng.random_range(0..speed);
                Behavior::Chaser {
                    next_aim_ms: next_aim_time(now, rng),
                }
            }
            EnemyKind::Jumper => {
                vx /= 2;
                Behavior::Jumper {
                    amplitude: rng.random_range(6..9),
                    phase: rng.random_range(0..180) as f32,
                    phase_step: rng.random_range(0.3f32..0.7),
                }
            }
        };

        Self {
            rect: Rect::from_pos_size(pos, sprite.size()),
            sprite,
            anim,
            vel: IVec2::new(vx, vy),
            behavior,
            score,
            dying: false,
        }
    }

    pub fn kind(&self) -> EnemyKind {
        match self.behavior {
            Behavior::Linear => EnemyKind::Linear,
            Behavior::Bouncer => EnemyKind::Bouncer,
            Behavior::Chaser { .. } => EnemyKind::Chaser,
            Behavior::Jumper { .. } => EnemyKind::Jumper,
        }
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.rect
    }

    pub fn velocity(&self) -> IVec2 {
        self.vel
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    /// Killed, possibly still playing the death animation
    pub fn is_dying(&self) -> bool {
        self.dying
    }

    /// Death animation has played through; safe to remove
    pub fn is_dead(&self) -> bool {
        self.dying && self.anim.cycles() > 1
    }

    pub fn die(&mut self) {
        if self.dying {
            return;
        }
        self.dying = true;
        self.anim.play(CLIP_DIE, false);
    }

    /// Advance one tick. Returns true if this enemy killed the astronaut.
    pub fn update(&mut self, arena: &Arena, astronaut: &mut Astronaut, now: u64, rng: &mut impl Rng) -> bool {
        self.anim.tick();
        if self.dying {
            return false;
        }

        self.displace(arena, astronaut.position(), now, rng);
        self.react_to_platforms(arena);

        if self.dying || !astronaut.is_hittable() {
            return false;
        }
        if astronaut.bounds().intersects(&self.rect) {
            self.die();
            return astronaut.die();
        }
        false
    }

    fn displace(&mut self, arena: &Arena, target: IVec2, now: u64, rng: &mut impl Rng) {
        match &mut self.behavior {
            Behavior::Linear | Behavior::Bouncer => {}
            Behavior::Chaser { next_aim_ms } => {
                if now >= *next_aim_ms {
                    *next_aim_ms = next_aim_time(now, rng);
                    self.aim_at(target);
                    return;
                }
            }
            Behavior::Jumper {
                phase,
                phase_step,
                amplitude,
            } => {
                *phase = (*phase + *phase_step).min(JUMPER_BOTTOM_PHASE);
                self.vel.y = (*amplitude as f32 * (-*phase).to_radians().sin()) as i32;
            }
        }
        self.shift(arena, self.vel);
    }

    /// Point velocity at the target; vertical speed is half the horizontal
    fn aim_at(&mut self, target: IVec2) {
        let pos = self.rect.pos();
        let speed = self.vel.x.abs();
        self.set_vel_x(if pos.x < target.x { speed } else { -speed });
        let climb = (speed / 2).abs();
        self.vel.y = if pos.y < target.y { climb } else { -climb };
    }

    fn react_to_platforms(&mut self, arena: &Arena) {
        for platform in arena.platforms {
            let contact = platform.hit_v(&self.rect).contact();
            if contact == Contact::None {
                continue;
            }
            match (self.kind(), contact) {
                (EnemyKind::Linear, _) => self.die(),
                (EnemyKind::Jumper, Contact::Top | Contact::Bottom) => {
                    let forced = if contact == Contact::Top {
                        JUMPER_TOP_PHASE
                    } else {
                        JUMPER_BOTTOM_PHASE
                    };
                    if let Behavior::Jumper { phase, .. } = &mut self.behavior {
                        *phase = forced;
                    }
                    let lift = IVec2::new(0, -self.vel.y);
                    self.shift(arena, lift);
                }
                (_, Contact::Top | Contact::Bottom) => self.vel.y = -self.vel.y,
                _ => {
                    let reversed = -self.vel.x;
                    self.set_vel_x(reversed);
                }
            }
        }
    }

    fn set_vel_x(&mut self, vx: i32) {
        if vx > 0 && self.vel.x < 0 {
            self.anim.set_clip(CLIP_RIGHT);
        } else if vx < 0 && self.vel.x > 0 {
            self.anim.set_clip(CLIP_LEFT);
        }
        self.vel.x = vx;
    }

    /// Translate, re-entering from the opposite edge when leaving the world
    fn shift(&mut self, arena: &Arena, delta: IVec2) {
        if self.rect.x < 0 && delta.x < 0 {
            self.rect.x = arena.width;
        } else if self.rect.x > arena.width && delta.x > 0 {
            self.rect.x = -self.rect.w;
        }
        self.rect.translate(delta);
    }

    pub fn draw(&self, canvas: &mut impl Canvas) {
        canvas.sprite(&self.sprite, self.anim.clip, self.anim.frame, self.rect.pos());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::platform::Platform;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn alien() -> Sprite {
        Sprite::new("alien", 20, 20).animated(2, 1)
    }

    fn far_astronaut() -> Astronaut {
        Astronaut::new(IVec2::new(900, 500), Sprite::new("astro", 20, 30), Direction::Left, 10)
    }

    fn spawn(kind: EnemyKind, pos: IVec2, facing: Direction, rng: &mut Pcg32) -> Enemy {
        Enemy::new(kind, pos, 4, 50, facing, alien(), 0, rng)
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(EnemyKind::from_label("bouncer"), EnemyKind::Bouncer);
        assert_eq!(EnemyKind::from_label(" Chaser "), EnemyKind::Chaser);
        assert_eq!(EnemyKind::from_label("jumper"), EnemyKind::Jumper);
        assert_eq!(EnemyKind::from_label("linear"), EnemyKind::Linear);
        assert_eq!(EnemyKind::from_label("dragon"), EnemyKind::Linear);
        assert_eq!(EnemyKind::Chaser.as_str(), "chaser");
    }

    #[test]
    fn test_spawn_velocities() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..50 {
            let e = spawn(EnemyKind::Bouncer, IVec2::ZERO, Direction::Left, &mut rng);
            assert_eq!(e.velocity().x, -4);
            assert!((-1..=2).contains(&e.velocity().y));

            let j = spawn(EnemyKind::Jumper, IVec2::ZERO, Direction::Right, &mut rng);
            assert_eq!(j.velocity().x, 2);
            match *j.behavior() {
                Behavior::Jumper {
                    phase,
                    phase_step,
                    amplitude,
                } => {
                    assert!((0.0..180.0).contains(&phase));
                    assert!((0.3..0.7).contains(&phase_step));
                    assert!((6..9).contains(&amplitude));
                }
                other => panic!("unexpected behavior {other:?}"),
            }
        }
    }

    #[test]
    fn test_linear_dies_on_platform_contact() {
        let mut rng = Pcg32::seed_from_u64(1);
        let platforms = vec![Platform::invisible(Rect::new(100, 0, 50, 600))];
        let arena = Arena {
            width: 800,
            height: 600,
            platforms: &platforms,
        };
        let mut astro = far_astronaut();
        let mut e = spawn(EnemyKind::Linear, IVec2::new(82, 300), Direction::Right, &mut rng);
        e.update(&arena, &mut astro, 0, &mut rng);
        assert!(e.is_dying());
        assert!(!e.is_dead());
    }

    #[test]
    fn test_bouncer_reverses_instead_of_dying() {
        let mut rng = Pcg32::seed_from_u64(1);
        let platforms = vec![Platform::invisible(Rect::new(100, 0, 50, 600))];
        let arena = Arena {
            width: 800,
            height: 600,
            platforms: &platforms,
        };
        let mut astro = far_astronaut();
        for kind in [EnemyKind::Bouncer, EnemyKind::Chaser] {
            let mut e = spawn(kind, IVec2::new(82, 300), Direction::Right, &mut rng);
            e.update(&arena, &mut astro, 0, &mut rng);
            assert!(!e.is_dying());
            assert_eq!(e.velocity().x, -4);
        }
    }

    #[test]
    fn test_bouncer_flips_vertical_on_landing() {
        let mut rng = Pcg32::seed_from_u64(1);
        let platforms = vec![Platform::invisible(Rect::new(0, 400, 800, 20))];
        let arena = Arena {
            width: 800,
            height: 600,
            platforms: &platforms,
        };
        let mut astro = far_astronaut();
        let mut e = spawn(EnemyKind::Bouncer, IVec2::new(300, 379), Direction::Right, &mut rng);
        e.vel.y = 3;
        e.update(&arena, &mut astro, 0, &mut rng);
        assert_eq!(e.velocity().y, -3);
        assert!(!e.is_dying());
    }

    #[test]
    fn test_chaser_reaims_at_astronaut() {
        let mut rng = Pcg32::seed_from_u64(1);
        let arena = Arena {
            width: 800,
            height: 600,
            platforms: &[],
        };
        let mut astro = far_astronaut();
        let mut e = spawn(EnemyKind::Chaser, IVec2::new(300, 100), Direction::Left, &mut rng);
        let before = e.bounds();
        // Far in the future: the aim timer has certainly elapsed
        e.update(&arena, &mut astro, 60_000, &mut rng);
        assert_eq!(e.velocity(), IVec2::new(4, 2));
        assert_eq!(e.bounds(), before, "re-aim tick does not move");
        match *e.behavior() {
            Behavior::Chaser { next_aim_ms } => {
                assert!((63_000..68_000).contains(&next_aim_ms));
            }
            other => panic!("unexpected behavior {other:?}"),
        }
    }

    #[test]
    fn test_jumper_landing_forces_reversal_phase() {
        let mut rng = Pcg32::seed_from_u64(1);
        let platforms = vec![Platform::invisible(Rect::new(0, 400, 800, 20))];
        let arena = Arena {
            width: 800,
            height: 600,
            platforms: &platforms,
        };
        let mut astro = far_astronaut();
        let mut e = spawn(EnemyKind::Jumper, IVec2::new(300, 300), Direction::Right, &mut rng);
        e.behavior = Behavior::Jumper {
            phase: 225.0,
            phase_step: 0.5,
            amplitude: 8,
        };
        let mut landed = false;
        for _ in 0..40 {
            e.update(&arena, &mut astro, 0, &mut rng);
            if let Behavior::Jumper { phase, .. } = *e.behavior() {
                if phase < 180.0 {
                    landed = true;
                    break;
                }
            }
        }
        assert!(landed, "jumper should bounce off the floor");
        assert!(!e.is_dying());
        assert!(e.bounds().bottom() <= 406);
    }

    #[test]
    fn test_wraps_horizontally() {
        let mut rng = Pcg32::seed_from_u64(1);
        let arena = Arena {
            width: 800,
            height: 600,
            platforms: &[],
        };
        let mut astro = far_astronaut();
        let mut e = spawn(EnemyKind::Bouncer, IVec2::new(-2, 100), Direction::Left, &mut rng);
        e.vel.y = 0;
        e.update(&arena, &mut astro, 0, &mut rng);
        assert_eq!(e.bounds().x, 796);

        let mut e = spawn(EnemyKind::Bouncer, IVec2::new(802, 100), Direction::Right, &mut rng);
        e.vel.y = 0;
        e.update(&arena, &mut astro, 0, &mut rng);
        assert_eq!(e.bounds().x, -16);
    }

    #[test]
    fn test_collision_kills_both_without_score_path() {
        let mut rng = Pcg32::seed_from_u64(1);
        let arena = Arena {
            width: 800,
            height: 600,
            platforms: &[],
        };
        let mut astro = Astronaut::new(IVec2::new(100, 100), Sprite::new("astro", 20, 30), Direction::Left, 10);
        let mut e = spawn(EnemyKind::Bouncer, IVec2::new(104, 104), Direction::Left, &mut rng);
        e.vel = IVec2::ZERO;
        assert!(e.update(&arena, &mut astro, 0, &mut rng));
        assert!(e.is_dying());
        assert!(astro.is_dying());
    }

    #[test]
    fn test_dead_after_death_animation_plays_twice() {
        let mut rng = Pcg32::seed_from_u64(1);
        let arena = Arena {
            width: 800,
            height: 600,
            platforms: &[],
        };
        let mut astro = far_astronaut();
        let mut e = spawn(EnemyKind::Linear, IVec2::new(300, 100), Direction::Left, &mut rng);
        e.die();
        let mut ticks = 0;
        while !e.is_dead() {
            e.update(&arena, &mut astro, 0, &mut rng);
            ticks += 1;
        }
        // Two frames, one tick each, more than one full pass
        assert_eq!(ticks, 3);
    }
}
