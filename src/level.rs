//! Level descriptions
//!
//! A level is a JSON document describing the world size, the astronaut, the
//! ship and its loose parts, the platforms and the three generators. The
//! loader validates it once and then builds a [`World`] from it.

use std::path::Path;

use glam::IVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::CEILING_THICKNESS;
use crate::error::{LevelError, Result};
use crate::renderer::Sprite;
use crate::sim::{
    Astronaut, Clock, Direction, EnemyGenerator, EnemyKind, FuelGenerator, PartSpawn, Platform, Rect, Spaceship,
    TreasureGenerator, TreasureKind, World, WorldParts,
};

/// A sprite placed somewhere in the level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placed {
    pub pos: IVec2,
    pub sprite: Sprite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstronautConfig {
    pub spawn: IVec2,
    #[serde(default)]
    pub facing: Direction,
    /// Gun height below the sprite's top
    pub muzzle_offset: i32,
    pub sprite: Sprite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipConfig {
    /// The base, already standing in the level
    pub base: Placed,
    /// Remaining parts in assembly order
    #[serde(default)]
    pub parts: Vec<Placed>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelConfig {
    pub count: u32,
    pub min_ms: u64,
    pub max_ms: u64,
    pub sprite: Sprite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyConfig {
    /// linear, bouncer, chaser or jumper; anything else is linear
    pub kind: String,
    pub max_alive: usize,
    pub speed: i32,
    pub score: i32,
    pub sprite: Sprite,
}

fn default_max_treasures() -> usize {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreasureConfig {
    #[serde(default = "default_max_treasures")]
    pub max_alive: usize,
    pub min_ms: u64,
    pub max_ms: u64,
    pub kinds: Vec<TreasureKind>,
}

/// One level, as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub background: Sprite,
    pub astronaut: AstronautConfig,
    pub ship: ShipConfig,
    #[serde(default)]
    pub platforms: Vec<Placed>,
    pub fuel: FuelConfig,
    pub enemies: EnemyConfig,
    pub treasures: TreasureConfig,
}

impl LevelConfig {
    /// Read and validate a level file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let level = Self::from_json(&json)?;
        log::info!("Loaded level '{}' from {}", level.name, path.display());
        Ok(level)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let level: Self = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    /// Reject anything the simulation would treat as a broken invariant
    pub fn validate(&self) -> Result<()> {
        let fail = |reason: String| -> Result<()> { Err(LevelError::invalid(&self.name, reason)) };

        if self.width <= 0 || self.height <= 0 {
            return fail(format!("world size {}x{} must be positive", self.width, self.height));
        }

        let mut sprites = vec![&self.background, &self.astronaut.sprite, &self.ship.base.sprite];
        sprites.extend(self.ship.parts.iter().map(|p| &p.sprite));
        sprites.extend(self.platforms.iter().map(|p| &p.sprite));
        sprites.push(&self.fuel.sprite);
        sprites.push(&self.enemies.sprite);
        sprites.extend(self.treasures.kinds.iter().map(|k| &k.sprite));
        if let Some(bad) = sprites.iter().find(|s| s.width <= 0 || s.height <= 0) {
            return fail(format!("sprite '{}' has non-positive size", bad.name));
        }

        if self.fuel.count == 0 {
            return fail("fuel count must be positive".into());
        }
        if self.fuel.min_ms >= self.fuel.max_ms {
            return fail(format!("fuel interval {}..{} is empty", self.fuel.min_ms, self.fuel.max_ms));
        }
        if self.treasures.min_ms >= self.treasures.max_ms {
            return fail(format!(
                "treasure interval {}..{} is empty",
                self.treasures.min_ms, self.treasures.max_ms
            ));
        }
        if self.treasures.kinds.is_empty() {
            return fail("treasure table is empty".into());
        }
        let total: u32 = self.treasures.kinds.iter().map(|k| k.probability).sum();
        if total > 100 {
            return fail(format!("treasure probabilities sum to {total}, above 100"));
        }
        if self.enemies.speed <= 0 {
            return fail(format!("enemy speed {} must be positive", self.enemies.speed));
        }
        Ok(())
    }

    /// Build a fresh world for this level.
    ///
    /// Appends the implicit ceiling platform spanning the whole width.
    pub fn build_world(&self, seed: u64, clock: Box<dyn Clock>) -> World {
        let mut rng = Pcg32::seed_from_u64(seed);
        let now = clock.now_ms();

        let astronaut = Astronaut::new(
            self.astronaut.spawn,
            self.astronaut.sprite.clone(),
            self.astronaut.facing,
            self.astronaut.muzzle_offset,
        );
        let ship = Spaceship::new(
            self.ship.base.pos,
            self.ship.base.sprite.clone(),
            self.ship.parts.len() + 1,
        );
        let parts = self
            .ship
            .parts
            .iter()
            .map(|p| PartSpawn {
                pos: p.pos,
                sprite: p.sprite.clone(),
            })
            .collect();

        let mut platforms: Vec<Platform> = self
            .platforms
            .iter()
            .map(|p| Platform::new(p.pos, p.sprite.clone()))
            .collect();
        platforms.push(Platform::invisible(Rect::new(
            -10,
            -CEILING_THICKNESS,
            self.width + 20,
            CEILING_THICKNESS,
        )));

        let fuel_gen = FuelGenerator::new(
            self.fuel.count,
            self.fuel.min_ms,
            self.fuel.max_ms,
            self.fuel.sprite.clone(),
            now,
            &mut rng,
        );
        let treasure_gen = TreasureGenerator::new(
            self.treasures.max_alive,
            self.treasures.min_ms,
            self.treasures.max_ms,
            self.treasures.kinds.clone(),
            now,
            &mut rng,
        );
        let enemy_gen = EnemyGenerator::new(
            EnemyKind::from_label(&self.enemies.kind),
            self.enemies.max_alive,
            self.enemies.speed,
            self.enemies.score,
            self.enemies.sprite.clone(),
            now,
        );

        log::debug!(
            "building level '{}' ({}x{}, {} platforms, {} ship parts, seed {seed})",
            self.name,
            self.width,
            self.height,
            platforms.len(),
            self.ship.parts.len() + 1
        );

        World::new(
            WorldParts {
                width: self.width,
                height: self.height,
                background: self.background.clone(),
                astronaut,
                ship,
                parts,
                platforms,
                fuel_gen,
                treasure_gen,
                enemy_gen,
            },
            clock,
            rng,
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sim::{FixedStepClock, WorldPhase};

    pub(crate) const SAMPLE: &str = r#"{
        "name": "test",
        "width": 800,
        "height": 600,
        "background": { "name": "space", "width": 800, "height": 600 },
        "astronaut": {
            "spawn": [380, 470],
            "facing": "right",
            "muzzle_offset": 12,
            "sprite": { "name": "astro", "width": 20, "height": 30, "frames": 4, "delay": 2 }
        },
        "ship": {
            "base": { "pos": [600, 440], "sprite": { "name": "ship0", "width": 40, "height": 60 } },
            "parts": [
                { "pos": [120, 200], "sprite": { "name": "ship1", "width": 40, "height": 30 } },
                { "pos": [420, 240], "sprite": { "name": "ship2", "width": 40, "height": 30 } }
            ]
        },
        "platforms": [
            { "pos": [0, 500], "sprite": { "name": "floor", "width": 800, "height": 20 } },
            { "pos": [80, 230], "sprite": { "name": "ledge", "width": 120, "height": 12 } },
            { "pos": [380, 270], "sprite": { "name": "ledge", "width": 120, "height": 12 } }
        ],
        "fuel": { "count": 3, "min_ms": 1000, "max_ms": 3000, "sprite": { "name": "fuel", "width": 16, "height": 14 } },
        "enemies": {
            "kind": "bouncer", "max_alive": 4, "speed": 4, "score": 25,
            "sprite": { "name": "meteor", "width": 24, "height": 18, "frames": 2, "delay": 3 }
        },
        "treasures": {
            "min_ms": 4000,
            "max_ms": 9000,
            "kinds": [
                { "probability": 70, "lifetime_ms": 8000, "score": 100, "sprite": { "name": "gem", "width": 14, "height": 12 } },
                { "probability": 30, "lifetime_ms": 5000, "score": 250, "sprite": { "name": "gold", "width": 14, "height": 12 } }
            ]
        }
    }"#;

    #[test]
    fn test_parse_sample() {
        let level = LevelConfig::from_json(SAMPLE).unwrap();
        assert_eq!(level.name, "test");
        assert_eq!(level.astronaut.spawn, IVec2::new(380, 470));
        assert_eq!(level.astronaut.facing, Direction::Right);
        assert_eq!(level.ship.parts.len(), 2);
        assert_eq!(level.treasures.max_alive, 1);
        assert_eq!(level.enemies.sprite.delay, 3);
        assert_eq!(level.fuel.sprite.delay, 1);
    }

    #[test]
    fn test_world_gets_ceiling() {
        let level = LevelConfig::from_json(SAMPLE).unwrap();
        let world = level.build_world(1, Box::new(FixedStepClock::new(30)));
        let ceiling = world.platforms().last().unwrap();
        assert!(ceiling.sprite().is_none());
        assert_eq!(ceiling.bounds(), Rect::new(-10, -10, 820, 10));
        assert_eq!(world.platforms().len(), 4);
        assert_eq!(world.ship().part_count(), 3);
        assert_eq!(world.parts().len(), 2);
        assert_eq!(world.phase(), WorldPhase::Starting);
    }

    #[test]
    fn test_validation_failures() {
        let mut level = LevelConfig::from_json(SAMPLE).unwrap();
        level.fuel.count = 0;
        assert!(matches!(level.validate(), Err(LevelError::Invalid { .. })));

        let mut level = LevelConfig::from_json(SAMPLE).unwrap();
        level.treasures.min_ms = level.treasures.max_ms;
        assert!(level.validate().unwrap_err().to_string().contains("interval"));

        let mut level = LevelConfig::from_json(SAMPLE).unwrap();
        level.treasures.kinds[0].probability = 90;
        assert!(level.validate().unwrap_err().to_string().contains("above 100"));

        let mut level = LevelConfig::from_json(SAMPLE).unwrap();
        level.platforms[1].sprite.width = 0;
        assert!(level.validate().unwrap_err().to_string().contains("ledge"));

        let mut level = LevelConfig::from_json(SAMPLE).unwrap();
        level.width = 0;
        assert!(level.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = LevelConfig::load(Path::new("/nonexistent/level.json")).unwrap_err();
        assert!(matches!(err, LevelError::Io { .. }));
    }

    #[test]
    fn test_bundled_levels_parse() {
        for path in ["levels/level1.json", "levels/level2.json"] {
            let full = Path::new(env!("CARGO_MANIFEST_DIR")).join(path);
            LevelConfig::load(&full).unwrap();
        }
    }
}
