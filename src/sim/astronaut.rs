//! The player-controlled astronaut

use glam::IVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::laser::Laser;
use super::platform::{Arena, Contact};
use super::ship::Spaceship;
use crate::consts::*;
use crate::renderer::{Animation, Canvas, Sprite};

/// Death animation clip; clips 0..=3 are left/right x flying/walking
const CLIP_DEATH: u32 = 4;

/// Facing direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Left,
    Right,
}

impl Direction {
    /// -1 for left, +1 for right
    #[inline]
    pub fn sign(self) -> i32 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// The three kinds of carriable item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CargoKind {
    Fuel,
    Treasure,
    ShipPart,
}

/// Reference to the draggable the astronaut is holding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cargo {
    pub kind: CargoKind,
    pub id: u32,
}

/// What happened during one astronaut tick
#[derive(Debug, Clone, Default)]
pub struct AstronautTick {
    /// Laser fired this tick
    pub laser: Option<Laser>,
    /// Reached the fuelled ship: the level is completing
    pub boarded: bool,
}

/// The player
#[derive(Debug, Clone)]
pub struct Astronaut {
    rect: Rect,
    sprite: Sprite,
    anim: Animation,
    spawn: IVec2,
    facing: Direction,
    /// Vertical offset of the gun muzzle from the sprite's top
    muzzle_offset: i32,
    jetpack_on: bool,
    rising: bool,
    shooting: bool,
    walking: bool,
    dead: bool,
    boarded: bool,
    /// Ticks until the next shot
    shot_timer: i32,
    range_idx: usize,
    cargo: Option<Cargo>,
}

impl Astronaut {
    pub fn new(spawn: IVec2, sprite: Sprite, facing: Direction, muzzle_offset: i32) -> Self {
        Self {
            rect: Rect::from_pos_size(spawn, sprite.size()),
            anim: Animation::new(&sprite),
            sprite,
            spawn,
            facing,
            muzzle_offset,
            jetpack_on: false,
            rising: false,
            shooting: false,
            walking: false,
            dead: false,
            boarded: false,
            shot_timer: 0,
            range_idx: 0,
            cargo: None,
        }
    }

    // === Input surface ===

    pub fn set_rising(&mut self, rising: bool) {
        self.rising = rising;
    }

    /// Releasing the trigger restarts the range cycle
    pub fn set_shooting(&mut self, shooting: bool) {
        self.shooting = shooting;
        if !shooting {
            self.range_idx = 0;
        }
    }

    pub fn set_walking(&mut self, walking: bool) {
        self.walking = walking;
    }

    pub fn set_direction(&mut self, facing: Direction) {
        self.facing = facing;
    }

    /// Let go of whatever is being carried; no-op when empty-handed.
    ///
    /// The released draggable notices on its next update and starts falling.
    pub fn drop(&mut self) -> Option<Cargo> {
        let cargo = self.cargo.take();
        if let Some(cargo) = cargo {
            log::debug!("astronaut dropped {:?} #{}", cargo.kind, cargo.id);
        }
        cargo
    }

    // === Queries ===

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.rect
    }

    pub fn position(&self) -> IVec2 {
        self.rect.pos()
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn is_jetpack_on(&self) -> bool {
        self.jetpack_on
    }

    pub fn is_rising(&self) -> bool {
        self.rising
    }

    pub fn is_shooting(&self) -> bool {
        self.shooting
    }

    pub fn is_walking(&self) -> bool {
        self.walking
    }

    /// Inside the departing ship
    pub fn is_boarded(&self) -> bool {
        self.boarded
    }

    /// Killed, death animation possibly still playing
    pub fn is_dying(&self) -> bool {
        self.dead
    }

    /// Death animation has played through
    pub fn is_dead(&self) -> bool {
        self.dead && self.anim.cycles() > 1
    }

    /// Alive and on screen: enemies can collide with it
    pub fn is_hittable(&self) -> bool {
        !self.dead && !self.boarded
    }

    pub fn cargo(&self) -> Option<Cargo> {
        self.cargo
    }

    pub fn is_carrying(&self) -> bool {
        self.cargo.is_some()
    }

    pub fn holds(&self, cargo: Cargo) -> bool {
        self.cargo == Some(cargo)
    }

    /// Free hands and able to grab something
    pub fn can_pick_up(&self) -> bool {
        self.cargo.is_none() && self.is_hittable()
    }

    pub fn range_index(&self) -> usize {
        self.range_idx
    }

    // === Lifecycle ===

    /// Take hold of a draggable. Refused while anything is already held.
    pub fn pick(&mut self, cargo: Cargo) -> bool {
        if !self.can_pick_up() {
            return false;
        }
        log::debug!("astronaut picked up {:?} #{}", cargo.kind, cargo.id);
        self.cargo = Some(cargo);
        true
    }

    /// Kill the astronaut. Returns true only on the first call.
    pub fn die(&mut self) -> bool {
        if self.dead {
            return false;
        }
        self.anim.play(CLIP_DEATH, false);
        self.dead = true;
        self.drop();
        log::info!("astronaut died at {:?}", self.position());
        true
    }

    /// Back to the spawn point, alive, for a new attempt
    pub fn reset(&mut self) {
        self.rect.set_pos(self.spawn);
        self.dead = false;
        self.boarded = false;
        self.anim.play(0, true);
    }

    /// Advance one tick of movement, firing and landing
    pub fn update(
        &mut self,
        arena: &Arena,
        ship: &Spaceship,
        fuel_percent: u32,
        rng: &mut impl Rng,
    ) -> AstronautTick {
        let mut tick = AstronautTick::default();
        if self.dead || self.boarded {
            return tick;
        }

        let dy = if self.rising { -FLY_SPEED } else { FLY_SPEED };
        let dx = match (self.walking, self.rising) {
            (true, true) => FLY_SPEED * self.facing.sign(),
            (true, false) => WALK_SPEED * self.facing.sign(),
            _ => 0,
        };
        self.shift(arena, IVec2::new(dx, dy));

        if self.shooting {
            tick.laser = self.fire(rng);
        }

        // Flying unless a platform top says otherwise
        self.jetpack_on = true;
        let probe = self.rect;
        for platform in arena.platforms {
            let hit = platform.hit_v(&probe);
            if hit.is_zero() {
                continue;
            }
            self.shift(arena, hit.0);
            if hit.contact() == Contact::Top {
                self.jetpack_on = false;
            }
        }

        if fuel_percent >= 100 && ship.bounds().intersects(&self.rect) {
            log::info!("astronaut boarded the ship");
            self.boarded = true;
            self.rect.set_pos(IVec2::new(HIDDEN_POS.0, HIDDEN_POS.1));
            tick.boarded = true;
        }
        tick
    }

    /// Fixed-rate fire with a cycling range
    fn fire(&mut self, rng: &mut impl Rng) -> Option<Laser> {
        if self.shot_timer > 0 {
            self.shot_timer -= 1;
            return None;
        }
        self.range_idx = (self.range_idx + 1) % SHOT_RANGES.len();
        let x = match self.facing {
            Direction::Left => self.rect.x,
            Direction::Right => self.rect.right(),
        };
        let origin = IVec2::new(x, self.rect.y + self.muzzle_offset);
        let range = SHOT_RANGES[self.range_idx] * self.facing.sign();
        self.shot_timer = SHOT_COOLDOWN;
        Some(Laser::new(origin, range, rng))
    }

    /// Translate with a ceiling clamp and horizontal wrap
    fn shift(&mut self, arena: &Arena, delta: IVec2) {
        let mut delta = delta;
        if self.rect.y + delta.y < 0 {
            delta.y = -self.rect.y;
        }
        delta.x += crate::wrap_correction(self.rect.x, arena.width);
        self.rect.translate(delta);
    }

    /// Pick the clip from facing and jetpack state, then advance the frame
    pub fn animate(&mut self) {
        if self.anim.clip != CLIP_DEATH {
            let mut clip = match self.facing {
                Direction::Left => 0,
                Direction::Right => 1,
            };
            if !self.jetpack_on {
                clip += 2;
            }
            self.anim.set_clip(clip);
        }
        self.anim.tick();
        if self.anim.clip != CLIP_DEATH && !self.walking && !self.jetpack_on {
            self.anim.frame = 0;
        }
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

    fn astronaut_at(x: i32, y: i32) -> Astronaut {
        Astronaut::new(IVec2::new(x, y), Sprite::new("astro", 20, 30).animated(2, 1), Direction::Right, 10)
    }

    fn far_ship() -> Spaceship {
        Spaceship::new(IVec2::new(700, 300), Sprite::new("ship", 40, 60), 1)
    }

    #[test]
    fn test_falls_then_lands() {
        let mut rng = Pcg32::seed_from_u64(1);
        let platforms = vec![Platform::invisible(Rect::new(0, 400, 800, 20))];
        let arena = Arena {
            width: 800,
            height: 600,
            platforms: &platforms,
        };
        let ship = far_ship();
        let mut astro = astronaut_at(100, 300);
        for _ in 0..30 {
            astro.update(&arena, &ship, 0, &mut rng);
        }
        assert_eq!(astro.bounds().bottom(), 400);
        assert!(!astro.is_jetpack_on());

        astro.set_rising(true);
        astro.update(&arena, &ship, 0, &mut rng);
        assert!(astro.is_jetpack_on());
        assert_eq!(astro.bounds().bottom(), 394);
    }

    #[test]
    fn test_walk_and_fly_speeds() {
        let mut rng = Pcg32::seed_from_u64(1);
        let arena = Arena {
            width: 800,
            height: 600,
            platforms: &[],
        };
        let ship = far_ship();
        let mut astro = astronaut_at(100, 300);
        astro.set_walking(true);
        astro.set_direction(Direction::Left);
        astro.update(&arena, &ship, 0, &mut rng);
        assert_eq!(astro.position(), IVec2::new(96, 306));

        astro.set_rising(true);
        astro.update(&arena, &ship, 0, &mut rng);
        assert_eq!(astro.position(), IVec2::new(90, 300));
    }

    #[test]
    fn test_ceiling_clamp_and_wrap() {
        let mut rng = Pcg32::seed_from_u64(1);
        let arena = Arena {
            width: 800,
            height: 600,
            platforms: &[],
        };
        let ship = far_ship();
        let mut astro = astronaut_at(-2, 3);
        astro.set_rising(true);
        astro.update(&arena, &ship, 0, &mut rng);
        assert_eq!(astro.position(), IVec2::new(798, 0));
    }

    #[test]
    fn test_fire_cycles_ranges_at_fixed_rate() {
        let mut rng = Pcg32::seed_from_u64(1);
        let arena = Arena {
            width: 2000,
            height: 600,
            platforms: &[],
        };
        let ship = far_ship();
        let mut astro = astronaut_at(100, 100);
        astro.set_rising(true);
        astro.set_shooting(true);

        let mut shots = Vec::new();
        for tick in 0..11 {
            if let Some(laser) = astro.update(&arena, &ship, 0, &mut rng).laser {
                shots.push((tick, laser.step()));
            }
        }
        // One shot every SHOT_COOLDOWN + 1 ticks, ranges 300, 450, 600
        assert_eq!(shots, vec![(0, 30.0), (5, 45.0), (10, 60.0)]);

        astro.set_shooting(false);
        assert_eq!(astro.range_index(), 0);
    }

    #[test]
    fn test_laser_leaves_from_leading_edge() {
        let mut rng = Pcg32::seed_from_u64(1);
        let arena = Arena {
            width: 800,
            height: 600,
            platforms: &[],
        };
        let ship = far_ship();
        let mut astro = astronaut_at(100, 100);
        astro.set_rising(true);
        astro.set_shooting(true);
        let laser = astro.update(&arena, &ship, 0, &mut rng).laser.unwrap();
        // Rose 6 units; muzzle 10 below the top; right edge at 120
        assert_eq!(laser.from, glam::Vec2::new(120.0, 104.0));

        astro.set_direction(Direction::Left);
        astro.set_shooting(false);
        astro.set_shooting(true);
        for _ in 0..4 {
            astro.update(&arena, &ship, 0, &mut rng);
        }
        let laser = astro.update(&arena, &ship, 0, &mut rng).laser.unwrap();
        assert_eq!(laser.from.x, astro.position().x as f32);
        assert!(laser.step() < 0.0);
    }

    #[test]
    fn test_single_cargo() {
        let mut astro = astronaut_at(0, 0);
        let fuel = Cargo {
            kind: CargoKind::Fuel,
            id: 1,
        };
        let gem = Cargo {
            kind: CargoKind::Treasure,
            id: 2,
        };
        assert!(astro.pick(fuel));
        assert!(!astro.pick(gem));
        assert!(astro.holds(fuel));
        assert_eq!(astro.drop(), Some(fuel));
        assert_eq!(astro.drop(), None);
        assert!(astro.pick(gem));
    }

    #[test]
    fn test_death_is_idempotent_and_drops_cargo() {
        let mut astro = astronaut_at(0, 0);
        astro.pick(Cargo {
            kind: CargoKind::ShipPart,
            id: 3,
        });
        assert!(astro.die());
        assert!(!astro.die());
        assert!(!astro.is_carrying());
        assert!(astro.is_dying());
        assert!(!astro.is_dead());
        assert!(!astro.can_pick_up());

        for _ in 0..3 {
            astro.animate();
        }
        assert!(astro.is_dead());

        astro.reset();
        assert!(!astro.is_dying());
        assert_eq!(astro.position(), IVec2::ZERO);
    }

    #[test]
    fn test_boards_fuelled_ship() {
        let mut rng = Pcg32::seed_from_u64(1);
        let arena = Arena {
            width: 800,
            height: 600,
            platforms: &[],
        };
        let ship = Spaceship::new(IVec2::new(100, 100), Sprite::new("ship", 40, 60), 1);
        let mut astro = astronaut_at(110, 110);

        let tick = astro.update(&arena, &ship, 80, &mut rng);
        assert!(!tick.boarded);

        let tick = astro.update(&arena, &ship, 100, &mut rng);
        assert!(tick.boarded);
        assert_eq!(astro.position(), IVec2::new(HIDDEN_POS.0, HIDDEN_POS.1));
        assert!(!astro.is_hittable());
    }
}
