//! Timed spawners for fuel, treasure and enemies
//!
//! Generators only decide *when* and *where* something appears; the world
//! owns the spawned entities and reports deliveries back.

use glam::IVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::astronaut::Direction;
use super::enemy::{Enemy, EnemyKind};
use crate::consts::{ENEMY_CADENCE_MS, ENEMY_EDGE_INSET};
use crate::renderer::Sprite;

/// Deadline re-armed with a random delay in `[min, max)`
#[derive(Debug, Clone, Copy)]
struct SpawnTimer {
    min_ms: u64,
    range_ms: u64,
    next_ms: u64,
}

impl SpawnTimer {
    fn new(min_ms: u64, max_ms: u64, now: u64, rng: &mut impl Rng) -> Self {
        assert!(min_ms < max_ms, "spawn interval must be a non-empty range ({min_ms}..{max_ms})");
        let mut timer = Self {
            min_ms,
            range_ms: max_ms - min_ms,
            next_ms: 0,
        };
        timer.arm(now, rng);
        timer
    }

    fn arm(&mut self, now: u64, rng: &mut impl Rng) {
        self.next_ms = now + self.min_ms + rng.random_range(0..self.range_ms);
    }

    #[inline]
    fn due(&self, now: u64) -> bool {
        self.next_ms <= now
    }
}

/// Random x keeping a sprite-width margin on both sides
fn spawn_x(width: i32, sprite_w: i32, rng: &mut impl Rng) -> i32 {
    sprite_w + rng.random_range(0..(width - 2 * sprite_w).max(1))
}

// === Fuel ===

/// Drops fuel one unit at a time once the ship is assembled
#[derive(Debug, Clone)]
pub struct FuelGenerator {
    max_fuel: u32,
    created: u32,
    delivered: u32,
    /// A spawned unit has not reached the ship yet
    outstanding: bool,
    timer: SpawnTimer,
    sprite: Sprite,
}

impl FuelGenerator {
    pub fn new(max_fuel: u32, min_ms: u64, max_ms: u64, sprite: Sprite, now: u64, rng: &mut impl Rng) -> Self {
        assert!(max_fuel > 0, "a level needs at least one fuel unit");
        Self {
            max_fuel,
            created: 0,
            delivered: 0,
            outstanding: false,
            timer: SpawnTimer::new(min_ms, max_ms, now, rng),
            sprite,
        }
    }

    pub fn sprite(&self) -> &Sprite {
        &self.sprite
    }

    pub fn max_fuel(&self) -> u32 {
        self.max_fuel
    }

    pub fn delivered(&self) -> u32 {
        self.delivered
    }

    pub fn has_more_fuel(&self) -> bool {
        self.created < self.max_fuel
    }

    /// Share of the fuel delivered, 0..=100
    pub fn percent(&self) -> u32 {
        self.delivered * 100 / self.max_fuel
    }

    /// Spawn position of a new unit, if one is due
    pub fn update(&mut self, ship_complete: bool, width: i32, now: u64, rng: &mut impl Rng) -> Option<IVec2> {
        if !self.has_more_fuel() || !ship_complete || self.outstanding || !self.timer.due(now) {
            return None;
        }
        self.created += 1;
        self.outstanding = true;
        self.timer.arm(now, rng);
        Some(IVec2::new(spawn_x(width, self.sprite.width, rng), 0))
    }

    /// A unit reached the ship: unblock the next one
    pub fn fuel_delivered(&mut self, now: u64, rng: &mut impl Rng) {
        self.delivered = (self.delivered + 1).min(self.max_fuel);
        self.outstanding = false;
        self.timer.arm(now, rng);
        log::debug!("fuel {}/{} delivered", self.delivered, self.max_fuel);
    }
}

// === Treasure ===

/// One entry of the treasure table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreasureKind {
    /// Weight out of 100
    pub probability: u32,
    pub lifetime_ms: u64,
    pub score: i32,
    pub sprite: Sprite,
}

/// A treasure the world should create
#[derive(Debug, Clone, PartialEq)]
pub struct TreasureSpawn {
    pub pos: IVec2,
    pub kind: TreasureKind,
}

/// Spawns treasures picked from a weighted table, up to a live cap
#[derive(Debug, Clone)]
pub struct TreasureGenerator {
    kinds: Vec<TreasureKind>,
    max_alive: usize,
    alive: usize,
    timer: SpawnTimer,
}

impl TreasureGenerator {
    pub fn new(
        max_alive: usize,
        min_ms: u64,
        max_ms: u64,
        kinds: Vec<TreasureKind>,
        now: u64,
        rng: &mut impl Rng,
    ) -> Self {
        let total: u32 = kinds.iter().map(|k| k.probability).sum();
        if total != 100 {
            log::warn!("treasure probabilities sum to {total}, not 100");
        }
        Self {
            kinds,
            max_alive,
            alive: 0,
            timer: SpawnTimer::new(min_ms, max_ms, now, rng),
        }
    }

    pub fn alive(&self) -> usize {
        self.alive
    }

    pub fn kinds(&self) -> &[TreasureKind] {
        &self.kinds
    }

    /// Weighted pick: cumulative probabilities against a draw in `[0, 100)`
    fn pick(&self, rng: &mut impl Rng) -> Option<&TreasureKind> {
        let draw = rng.random_range(0..100);
        let mut total = 0;
        self.kinds.iter().find(|kind| {
            total += kind.probability;
            draw < total
        })
    }

    pub fn update(&mut self, width: i32, now: u64, rng: &mut impl Rng) -> Option<TreasureSpawn> {
        if self.alive >= self.max_alive || !self.timer.due(now) {
            return None;
        }
        let spawn = self.pick(rng).cloned().map(|kind| {
            let x = spawn_x(width, kind.sprite.width, rng);
            TreasureSpawn {
                pos: IVec2::new(x, 0),
                kind,
            }
        });
        if spawn.is_some() {
            self.alive += 1;
        }
        self.timer.arm(now, rng);
        spawn
    }

    /// A treasure was delivered or expired
    pub fn treasure_removed(&mut self) {
        self.alive = self.alive.saturating_sub(1);
    }
}

// === Enemies ===

/// Spawns bursts of one enemy kind on a fixed cadence
#[derive(Debug, Clone)]
pub struct EnemyGenerator {
    kind: EnemyKind,
    max_alive: usize,
    speed: i32,
    score: i32,
    sprite: Sprite,
    next_ms: u64,
}

impl EnemyGenerator {
    pub fn new(kind: EnemyKind, max_alive: usize, speed: i32, score: i32, sprite: Sprite, now: u64) -> Self {
        Self {
            kind,
            max_alive,
            speed,
            score,
            sprite,
            next_ms: now + ENEMY_CADENCE_MS,
        }
    }

    pub fn kind(&self) -> EnemyKind {
        self.kind
    }

    pub fn max_alive(&self) -> usize {
        self.max_alive
    }

    /// Enemies to add this tick given how many are currently alive
    pub fn update(&mut self, alive: usize, width: i32, height: i32, now: u64, rng: &mut impl Rng) -> Vec<Enemy> {
        if alive >= self.max_alive || self.next_ms > now {
            return Vec::new();
        }
        let burst = (self.max_alive - alive) / 2 + 1;
        let spawned: Vec<Enemy> = (0..burst).map(|_| self.spawn_one(width, height, now, rng)).collect();
        self.next_ms = now + ENEMY_CADENCE_MS;
        log::debug!("spawned {} {} enemies", spawned.len(), self.kind.as_str());
        spawned
    }

    /// Enters just inside a random edge, heading for the other one
    fn spawn_one(&self, width: i32, height: i32, now: u64, rng: &mut impl Rng) -> Enemy {
        let y = rng.random_range(0..(height - 2 * self.sprite.height).max(1));
        let (x, facing) = if rng.random_range(0..2) == 0 {
            (ENEMY_EDGE_INSET - self.sprite.width, Direction::Right)
        } else {
            (width - ENEMY_EDGE_INSET, Direction::Left)
        };
        Enemy::new(
            self.kind,
            IVec2::new(x, y),
            self.speed,
            self.score,
            facing,
            self.sprite.clone(),
            now,
            rng,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn gem(probability: u32, score: i32) -> TreasureKind {
        TreasureKind {
            probability,
            lifetime_ms: 5_000,
            score,
            sprite: Sprite::new("gem", 16, 16),
        }
    }

    #[test]
    #[should_panic(expected = "non-empty range")]
    fn test_empty_interval_is_rejected() {
        let mut rng = Pcg32::seed_from_u64(1);
        FuelGenerator::new(3, 500, 500, Sprite::new("fuel", 10, 10), 0, &mut rng);
    }

    #[test]
    fn test_fuel_waits_for_complete_ship_and_delivery() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut fuel = FuelGenerator::new(2, 0, 1, Sprite::new("fuel", 10, 10), 0, &mut rng);
        assert_eq!(fuel.update(false, 800, 10, &mut rng), None);

        let pos = fuel.update(true, 800, 10, &mut rng).unwrap();
        assert_eq!(pos.y, 0);
        assert!((10..790).contains(&pos.x));

        // Blocked until the first unit is delivered
        assert_eq!(fuel.update(true, 800, 20, &mut rng), None);
        assert_eq!(fuel.percent(), 0);
        fuel.fuel_delivered(20, &mut rng);
        assert_eq!(fuel.percent(), 50);

        assert!(fuel.update(true, 800, 30, &mut rng).is_some());
        fuel.fuel_delivered(30, &mut rng);
        assert_eq!(fuel.percent(), 100);
        assert!(!fuel.has_more_fuel());
        assert_eq!(fuel.update(true, 800, 40, &mut rng), None);
    }

    #[test]
    fn test_fuel_respects_deadline() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut fuel = FuelGenerator::new(5, 1_000, 2_000, Sprite::new("fuel", 10, 10), 0, &mut rng);
        assert_eq!(fuel.update(true, 800, 999, &mut rng), None);
        assert!(fuel.update(true, 800, 2_000, &mut rng).is_some());
    }

    #[test]
    fn test_single_treasure_cap_scenario() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut spawner = TreasureGenerator::new(1, 0, 1, vec![gem(100, 50)], 0, &mut rng);

        let first = spawner.update(800, 0, &mut rng).unwrap();
        assert_eq!(first.kind.score, 50);
        assert_eq!(spawner.alive(), 1);

        for now in 1..50 {
            assert_eq!(spawner.update(800, now, &mut rng), None);
        }

        spawner.treasure_removed();
        assert!(spawner.update(800, 50, &mut rng).is_some());
        assert_eq!(spawner.alive(), 1);
    }

    #[test]
    fn test_weighted_pick_covers_table() {
        let mut rng = Pcg32::seed_from_u64(4);
        let spawner = TreasureGenerator::new(1, 0, 1, vec![gem(70, 10), gem(30, 99)], 0, &mut rng);
        let mut common = 0;
        let mut rare = 0;
        for _ in 0..1_000 {
            match spawner.pick(&mut rng).map(|k| k.score) {
                Some(10) => common += 1,
                Some(99) => rare += 1,
                other => panic!("unexpected pick {other:?}"),
            }
        }
        assert!(common > rare);
        assert!(rare > 200);
    }

    #[test]
    fn test_unmatched_draw_spawns_nothing() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut spawner = TreasureGenerator::new(1, 0, 1, vec![gem(0, 10)], 0, &mut rng);
        assert_eq!(spawner.update(800, 0, &mut rng), None);
        assert_eq!(spawner.alive(), 0);
    }

    #[test]
    fn test_enemy_burst_and_cadence() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut spawner = EnemyGenerator::new(EnemyKind::Bouncer, 6, 4, 25, Sprite::new("alien", 20, 20), 0);
        assert!(spawner.update(0, 800, 600, 799, &mut rng).is_empty());

        let burst = spawner.update(0, 800, 600, 800, &mut rng);
        assert_eq!(burst.len(), 4);
        for enemy in &burst {
            assert_eq!(enemy.kind(), EnemyKind::Bouncer);
            let x = enemy.bounds().x;
            assert!(x == ENEMY_EDGE_INSET - 20 || x == 800 - ENEMY_EDGE_INSET);
            if x < 0 {
                assert!(enemy.velocity().x > 0);
            } else {
                assert!(enemy.velocity().x < 0);
            }
            assert!((0..560).contains(&enemy.bounds().y));
        }

        // Next cadence tick
        assert!(spawner.update(4, 800, 600, 1_599, &mut rng).is_empty());
        assert_eq!(spawner.update(4, 800, 600, 1_600, &mut rng).len(), 2);
        assert!(spawner.update(6, 800, 600, 5_000, &mut rng).is_empty());
    }
}
