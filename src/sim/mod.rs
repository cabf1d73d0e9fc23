//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One `update` per fixed tick
//! - Seeded RNG only, threaded through every random decision
//! - Time read from an injected [`Clock`], sampled once per tick
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies beyond the [`Canvas`](crate::renderer::Canvas) trait

pub mod astronaut;
pub mod clock;
pub mod draggable;
pub mod enemy;
pub mod generator;
pub mod geom;
pub mod laser;
pub mod platform;
pub mod ship;
pub mod world;

pub use astronaut::{Astronaut, AstronautTick, Cargo, CargoKind, Direction};
pub use clock::{Clock, FixedStepClock, ManualClock, SystemClock};
pub use draggable::{DragContext, DragEvent, DragState, Delivery, Draggable, Fuel, Payload, ShipPart, Treasure};
pub use enemy::{Behavior, Enemy, EnemyKind};
pub use generator::{EnemyGenerator, FuelGenerator, TreasureGenerator, TreasureKind, TreasureSpawn};
pub use geom::Rect;
pub use laser::Laser;
pub use platform::{Arena, Contact, HitVector, Platform};
pub use ship::{ShipSegment, Spaceship};
pub use world::{PartSpawn, SHIP_DEPARTED, TickInput, World, WorldParts, WorldPhase};
