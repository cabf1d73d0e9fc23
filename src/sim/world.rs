//! The world: sole owner of every entity, advanced one tick at a time
//!
//! Phases:
//! - `Starting`: only falling things (ship, pickups) move, until everything settles
//! - `Playing`: full simulation, generators running
//! - `Completing`: the astronaut boarded; the ship lifts off
//! - `Ending`: the astronaut died; the world winds down until its death animation ends

use glam::IVec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::astronaut::{Astronaut, Direction};
use super::clock::Clock;
use super::draggable::{DragContext, DragEvent, Delivery, Draggable, Fuel, Payload, ShipPart, Treasure};
use super::enemy::Enemy;
use super::generator::{EnemyGenerator, FuelGenerator, TreasureGenerator};
use super::geom::Rect;
use super::laser::Laser;
use super::platform::{Arena, Platform};
use super::ship::Spaceship;
use crate::consts::SHIP_ASCENT;
use crate::renderer::{Canvas, Sprite};

/// Returned by [`World::update`] on the tick the ship leaves the world.
/// Not a score.
pub const SHIP_DEPARTED: i32 = -1;

/// Master state of a level attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WorldPhase {
    #[default]
    Starting,
    Playing,
    Ending,
    Completing,
}

/// Player input for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    /// Jetpack thrust
    pub rising: bool,
    /// Fire held
    pub shooting: bool,
    /// Walk/fly sideways in this direction
    pub walk: Option<Direction>,
    /// Let go of the carried item
    pub drop: bool,
}

/// A ship piece waiting somewhere in the level
#[derive(Debug, Clone)]
pub struct PartSpawn {
    pub pos: IVec2,
    pub sprite: Sprite,
}

/// Everything a level provides to build a world
#[derive(Debug)]
pub struct WorldParts {
    pub width: i32,
    pub height: i32,
    pub background: Sprite,
    pub astronaut: Astronaut,
    pub ship: Spaceship,
    /// Loose ship parts in assembly order, starting with part 1
    pub parts: Vec<PartSpawn>,
    pub platforms: Vec<Platform>,
    pub fuel_gen: FuelGenerator,
    pub treasure_gen: TreasureGenerator,
    pub enemy_gen: EnemyGenerator,
}

/// The complete simulation state of one level
pub struct World {
    width: i32,
    height: i32,
    background: Sprite,
    astronaut: Astronaut,
    ship: Spaceship,
    platforms: Vec<Platform>,
    lasers: Vec<Laser>,
    enemies: Vec<Enemy>,
    fuels: Vec<Draggable<Fuel>>,
    treasures: Vec<Draggable<Treasure>>,
    parts: Vec<Draggable<ShipPart>>,
    fuel_gen: FuelGenerator,
    treasure_gen: TreasureGenerator,
    enemy_gen: EnemyGenerator,
    phase: WorldPhase,
    completed: bool,
    /// Score accumulated during the current tick
    tick_score: i32,
    next_id: u32,
    clock: Box<dyn Clock>,
    rng: Pcg32,
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("phase", &self.phase)
            .field("enemies", &self.enemies.len())
            .field("lasers", &self.lasers.len())
            .field("fuel_percent", &self.fuel_percent())
            .finish_non_exhaustive()
    }
}

/// Tick every item of one draggable list, collecting (index, event) pairs
fn tick_draggables<P: Payload>(items: &mut [Draggable<P>], ctx: &mut DragContext) -> Vec<(usize, DragEvent)> {
    items
        .iter_mut()
        .enumerate()
        .filter_map(|(i, item)| item.update(ctx).map(|event| (i, event)))
        .collect()
}

impl World {
    pub fn new(parts: WorldParts, clock: Box<dyn Clock>, rng: Pcg32) -> Self {
        let mut world = Self {
            width: parts.width,
            height: parts.height,
            background: parts.background,
            astronaut: parts.astronaut,
            ship: parts.ship,
            platforms: parts.platforms,
            lasers: Vec::new(),
            enemies: Vec::new(),
            fuels: Vec::new(),
            treasures: Vec::new(),
            parts: Vec::new(),
            fuel_gen: parts.fuel_gen,
            treasure_gen: parts.treasure_gen,
            enemy_gen: parts.enemy_gen,
            phase: WorldPhase::Starting,
            completed: false,
            tick_score: 0,
            next_id: 1,
            clock,
            rng,
        };
        for (offset, spawn) in parts.parts.into_iter().enumerate() {
            let id = world.next_entity_id();
            let index = offset + 1;
            world
                .parts
                .push(Draggable::new(id, spawn.pos, spawn.sprite, ShipPart { index }));
        }
        world
    }

    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // === Queries ===

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn phase(&self) -> WorldPhase {
        self.phase
    }

    pub fn astronaut(&self) -> &Astronaut {
        &self.astronaut
    }

    pub fn ship(&self) -> &Spaceship {
        &self.ship
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn lasers(&self) -> &[Laser] {
        &self.lasers
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn fuels(&self) -> &[Draggable<Fuel>] {
        &self.fuels
    }

    pub fn treasures(&self) -> &[Draggable<Treasure>] {
        &self.treasures
    }

    pub fn parts(&self) -> &[Draggable<ShipPart>] {
        &self.parts
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Delivered fuel as a percentage of the level's total
    pub fn fuel_percent(&self) -> u32 {
        self.fuel_gen.percent()
    }

    /// The ship has left the world
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// The astronaut's death animation has finished
    pub fn is_over(&self) -> bool {
        self.astronaut.is_dead()
    }

    // === Control ===

    /// Start (or restart after a lost life) an attempt at this level
    pub fn play(&mut self) {
        log::info!("world starting");
        self.phase = WorldPhase::Starting;
        self.astronaut.reset();
    }

    /// Feed one tick of player input to the astronaut
    pub fn apply_input(&mut self, input: &TickInput) {
        let astronaut = &mut self.astronaut;
        astronaut.set_rising(input.rising);
        astronaut.set_shooting(input.shooting);
        match input.walk {
            Some(dir) => {
                astronaut.set_direction(dir);
                astronaut.set_walking(true);
            }
            None => astronaut.set_walking(false),
        }
        if input.drop {
            astronaut.drop();
        }
    }

    /// Add a fuel unit falling from `pos`
    pub fn add_fuel(&mut self, pos: IVec2) -> u32 {
        let id = self.next_entity_id();
        let sprite = self.fuel_gen.sprite().clone();
        self.fuels.push(Draggable::new(id, pos, sprite, Fuel));
        log::debug!("fuel #{id} spawned at {pos:?}");
        id
    }

    pub fn add_enemy(&mut self, enemy: Enemy) {
        self.enemies.push(enemy);
    }

    /// Advance one tick.
    ///
    /// Returns the score earned this tick, or [`SHIP_DEPARTED`] on the tick
    /// the ship leaves the top of the world.
    pub fn update(&mut self) -> i32 {
        self.clock.tick();
        let now = self.clock.now_ms();
        self.tick_score = 0;

        let result = match self.phase {
            WorldPhase::Starting => {
                self.settle_scene(now);
                0
            }
            WorldPhase::Playing => {
                self.update_elements(now);
                if self.phase == WorldPhase::Playing {
                    self.run_generators(now);
                    self.update_astronaut();
                    self.update_lasers();
                }
                self.tick_score
            }
            WorldPhase::Completing => {
                self.update_elements(now);
                self.ship.translate(IVec2::new(0, -SHIP_ASCENT));
                if self.ship.bounds().bottom() <= 0 {
                    log::info!("ship departed");
                    self.completed = true;
                    SHIP_DEPARTED
                } else {
                    0
                }
            }
            WorldPhase::Ending => {
                self.update_elements(now);
                0
            }
        };

        if self.phase != WorldPhase::Completing {
            self.astronaut.animate();
        }
        result
    }

    /// Let the ship and pickups fall into place
    fn settle_scene(&mut self, now: u64) {
        self.ship.update(&self.platforms);
        self.update_draggables(now);
        self.prune();

        let settled = !self.ship.is_falling()
            && !self.fuels.iter().any(|d| d.is_falling())
            && !self.treasures.iter().any(|d| d.is_falling())
            && !self.parts.iter().any(|d| d.is_falling());
        if settled {
            log::info!("scene settled, playing");
            self.phase = WorldPhase::Playing;
        }
    }

    /// Ship, enemies and pickups, then removal of finished entities
    fn update_elements(&mut self, now: u64) {
        self.ship.update(&self.platforms);

        let arena = Arena {
            width: self.width,
            height: self.height,
            platforms: &self.platforms,
        };
        let mut astronaut_killed = false;
        for enemy in &mut self.enemies {
            astronaut_killed |= enemy.update(&arena, &mut self.astronaut, now, &mut self.rng);
        }
        if astronaut_killed {
            self.enter_ending();
        }

        self.update_draggables(now);
        self.prune();
    }

    fn update_draggables(&mut self, now: u64) {
        let mut ctx = DragContext {
            arena: Arena {
                width: self.width,
                height: self.height,
                platforms: &self.platforms,
            },
            astronaut: &mut self.astronaut,
            ship: &self.ship,
            now,
        };
        let fuel_events = tick_draggables(&mut self.fuels, &mut ctx);
        let treasure_events = tick_draggables(&mut self.treasures, &mut ctx);
        let part_events = tick_draggables(&mut self.parts, &mut ctx);

        for (_, event) in fuel_events {
            if let DragEvent::Delivered(Delivery::Fuel) = event {
                self.fuel_gen.fuel_delivered(now, &mut self.rng);
            }
        }
        for (_, event) in treasure_events {
            if let DragEvent::Delivered(Delivery::Treasure { score }) = event {
                log::debug!("treasure delivered for {score}");
                self.tick_score += score;
            }
            self.treasure_gen.treasure_removed();
        }
        for (i, event) in part_events {
            if let DragEvent::Delivered(Delivery::Part { index }) = event {
                let part = &self.parts[i];
                self.ship.attach_part(index, part.sprite().clone(), part.bounds());
            }
        }
    }

    fn run_generators(&mut self, now: u64) {
        if let Some(spawn) = self.treasure_gen.update(self.width, now, &mut self.rng) {
            let id = self.next_entity_id();
            let treasure = Treasure::new(spawn.kind.score, spawn.kind.lifetime_ms, now);
            self.treasures.push(Draggable::new(id, spawn.pos, spawn.kind.sprite, treasure));
            log::debug!("treasure #{id} spawned at {:?}", spawn.pos);
        }

        if let Some(pos) = self
            .fuel_gen
            .update(self.ship.is_complete(), self.width, now, &mut self.rng)
        {
            self.add_fuel(pos);
        }

        let spawned = self
            .enemy_gen
            .update(self.enemies.len(), self.width, self.height, now, &mut self.rng);
        self.enemies.extend(spawned);
    }

    fn update_astronaut(&mut self) {
        let fuel_percent = self.fuel_percent();
        let arena = Arena {
            width: self.width,
            height: self.height,
            platforms: &self.platforms,
        };
        let tick = self
            .astronaut
            .update(&arena, &self.ship, fuel_percent, &mut self.rng);
        if let Some(laser) = tick.laser {
            self.lasers.push(laser);
        }
        if tick.boarded {
            self.enter_completing();
        }
    }

    fn update_lasers(&mut self) {
        let arena = Arena {
            width: self.width,
            height: self.height,
            platforms: &self.platforms,
        };
        for laser in &mut self.lasers {
            self.tick_score += laser.update(&arena, &mut self.enemies);
        }
    }

    fn prune(&mut self) {
        self.lasers.retain(Laser::is_alive);
        self.enemies.retain(|e| !e.is_dead());
        self.fuels.retain(Draggable::is_active);
        self.treasures.retain(Draggable::is_active);
        self.parts.retain(Draggable::is_active);
    }

    fn enter_completing(&mut self) {
        log::info!("astronaut aboard, ship lifting off");
        self.phase = WorldPhase::Completing;
        self.lasers.clear();
    }

    fn enter_ending(&mut self) {
        log::info!("astronaut lost");
        self.phase = WorldPhase::Ending;
        self.lasers.clear();
        self.enemies.clear();
    }

    // === Rendering ===

    pub fn draw(&self, canvas: &mut impl Canvas) {
        canvas.sprite(&self.background, 0, 0, IVec2::ZERO);
        if self.phase != WorldPhase::Completing {
            self.astronaut.draw(canvas);
        }
        for platform in &self.platforms {
            if let Some(sprite) = platform.sprite() {
                canvas.sprite(sprite, 0, 0, platform.bounds().pos());
            }
        }
        for laser in &self.lasers {
            laser.draw(canvas);
        }
        for enemy in &self.enemies {
            enemy.draw(canvas);
        }
        for fuel in &self.fuels {
            fuel.draw(canvas);
        }
        for treasure in &self.treasures {
            treasure.draw(canvas);
        }
        for part in &self.parts {
            part.draw(canvas);
        }
        self.ship.draw(canvas);
    }

    /// Bounds of everything currently alive, for debugging overlays
    pub fn debug_bounds(&self) -> Vec<Rect> {
        let mut bounds = vec![self.astronaut.bounds(), self.ship.bounds()];
        bounds.extend(self.enemies.iter().map(Enemy::bounds));
        bounds.extend(self.fuels.iter().map(Draggable::bounds));
        bounds.extend(self.treasures.iter().map(Draggable::bounds));
        bounds.extend(self.parts.iter().map(Draggable::bounds));
        bounds
    }
}
