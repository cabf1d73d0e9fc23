//! Fall / rest / carry / drop / deliver protocol shared by every pickup
//!
//! The state machine lives once in [`Draggable`]; what differs between fuel,
//! treasure and ship parts is a small [`Payload`] capability set.

use glam::IVec2;

use super::astronaut::{Astronaut, Cargo, CargoKind};
use super::geom::Rect;
use super::platform::Arena;
use super::ship::Spaceship;
use crate::consts::{FALL_SPEED, PICKUP_COOLDOWN};
use crate::renderer::{Animation, Canvas, Sprite};

/// Lifecycle of a draggable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Falling,
    Rest,
    Dragged,
    /// Released over the ship, falling into it
    Dropping,
    /// Terminal
    Delivered,
}

/// Side effect a delivery has on the world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Fuel,
    Treasure { score: i32 },
    Part { index: usize },
}

/// Outcome of a draggable tick that the world must act on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEvent {
    Delivered(Delivery),
    Expired,
}

/// Kind-specific behaviour plugged into [`Draggable`]
pub trait Payload {
    const KIND: CargoKind;

    /// Extra pickup condition on top of the shared ones
    fn pickable(&self, _ship: &Spaceship) -> bool {
        true
    }

    /// Whether touching the ship completes the delivery
    fn deliverable(&self, _ship: &Spaceship) -> bool {
        true
    }

    fn on_state_change(&mut self, _state: DragState, _now: u64) {}

    /// True once the payload has run out of time in `state`
    fn expired(&self, _state: DragState, _now: u64) -> bool {
        false
    }

    fn delivery(&self) -> Delivery;
}

/// A fuel unit
#[derive(Debug, Clone, Copy, Default)]
pub struct Fuel;

impl Payload for Fuel {
    const KIND: CargoKind = CargoKind::Fuel;

    fn delivery(&self) -> Delivery {
        Delivery::Fuel
    }
}

/// A treasure with a score and a lifetime that pauses while carried
#[derive(Debug, Clone, Copy)]
pub struct Treasure {
    score: i32,
    deadline: u64,
    /// Remaining life captured when the clock was paused
    paused_left: Option<u64>,
}

impl Treasure {
    pub fn new(score: i32, lifetime_ms: u64, now: u64) -> Self {
        Self {
            score,
            deadline: now + lifetime_ms,
            paused_left: None,
        }
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn deadline(&self) -> u64 {
        self.deadline
    }
}

impl Payload for Treasure {
    const KIND: CargoKind = CargoKind::Treasure;

    fn on_state_change(&mut self, state: DragState, now: u64) {
        match (state, self.paused_left) {
            (DragState::Dragged, None) => {
                self.paused_left = Some(self.deadline.saturating_sub(now));
            }
            (DragState::Dragged, Some(_)) => {}
            (_, Some(left)) => {
                self.deadline = now + left;
                self.paused_left = None;
            }
            (_, None) => {}
        }
    }

    fn expired(&self, state: DragState, now: u64) -> bool {
        !matches!(state, DragState::Dragged | DragState::Dropping) && now >= self.deadline
    }

    fn delivery(&self) -> Delivery {
        Delivery::Treasure { score: self.score }
    }
}

/// One piece of the ship, identified by its assembly order
#[derive(Debug, Clone, Copy)]
pub struct ShipPart {
    pub index: usize,
}

impl Payload for ShipPart {
    const KIND: CargoKind = CargoKind::ShipPart;

    /// Parts are delivered strictly in order
    fn pickable(&self, ship: &Spaceship) -> bool {
        self.index == ship.next_part_due()
    }

    fn deliverable(&self, ship: &Spaceship) -> bool {
        self.pickable(ship)
    }

    fn delivery(&self) -> Delivery {
        Delivery::Part { index: self.index }
    }
}

/// What a draggable needs to see of the world for one tick
pub struct DragContext<'a, 'w> {
    pub arena: Arena<'w>,
    pub astronaut: &'a mut Astronaut,
    pub ship: &'a Spaceship,
    pub now: u64,
}

/// A pickup following the shared protocol
#[derive(Debug, Clone)]
pub struct Draggable<P: Payload> {
    id: u32,
    rect: Rect,
    sprite: Sprite,
    anim: Animation,
    state: DragState,
    /// Ticks until pickup is allowed again
    cooldown: u32,
    carry_offset: IVec2,
    expired: bool,
    payload: P,
}

impl<P: Payload> Draggable<P> {
    /// A new draggable starts falling from `pos`
    pub fn new(id: u32, pos: IVec2, sprite: Sprite, payload: P) -> Self {
        Self {
            id,
            rect: Rect::from_pos_size(pos, sprite.size()),
            anim: Animation::new(&sprite),
            sprite,
            state: DragState::Falling,
            cooldown: 0,
            carry_offset: IVec2::ZERO,
            expired: false,
            payload,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn cargo(&self) -> Cargo {
        Cargo {
            kind: P::KIND,
            id: self.id,
        }
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.rect
    }

    pub fn sprite(&self) -> &Sprite {
        &self.sprite
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    /// Still part of the world
    pub fn is_active(&self) -> bool {
        !self.expired && self.state != DragState::Delivered
    }

    /// Moving under gravity
    pub fn is_falling(&self) -> bool {
        matches!(self.state, DragState::Falling | DragState::Dropping)
    }

    fn set_state(&mut self, state: DragState, now: u64) {
        self.state = state;
        self.payload.on_state_change(state, now);
    }

    /// Let go of a carried draggable: it falls and cannot be re-grabbed for a while
    pub fn release(&mut self, now: u64) {
        if self.state != DragState::Dragged {
            return;
        }
        self.cooldown = PICKUP_COOLDOWN;
        self.set_state(DragState::Falling, now);
        log::debug!("{:?} #{} released", P::KIND, self.id);
    }

    /// Advance one tick of the protocol
    pub fn update(&mut self, ctx: &mut DragContext) -> Option<DragEvent> {
        if !self.is_active() {
            return None;
        }
        self.anim.tick();

        if self.payload.expired(self.state, ctx.now) {
            self.expired = true;
            log::debug!("{:?} #{} expired", P::KIND, self.id);
            return Some(DragEvent::Expired);
        }

        // The astronaut let go (explicit drop or death)
        if self.state == DragState::Dragged && !ctx.astronaut.holds(self.cargo()) {
            self.release(ctx.now);
        }

        if self.state == DragState::Dragged {
            self.follow(ctx);
            return None;
        }

        self.cooldown = self.cooldown.saturating_sub(1);
        if self.is_falling() {
            self.rect.translate(IVec2::new(0, FALL_SPEED));
            if let Some(hit) = ctx.arena.first_hit(&self.rect) {
                self.rect.translate(hit.0);
                self.set_state(DragState::Rest, ctx.now);
            }
        }

        if self.try_pickup(ctx) {
            return None;
        }

        if ctx.ship.bounds().intersects(&self.rect) && self.payload.deliverable(ctx.ship) {
            self.set_state(DragState::Delivered, ctx.now);
            log::debug!("{:?} #{} delivered", P::KIND, self.id);
            return Some(DragEvent::Delivered(self.payload.delivery()));
        }
        None
    }

    /// Ride along with the astronaut; let go over the ship's drop zone
    fn follow(&mut self, ctx: &mut DragContext) {
        self.rect.set_pos(ctx.astronaut.position() + self.carry_offset);
        let zone = ctx.ship.drop_zone(ctx.arena.platforms);
        if zone.intersects(&self.rect) {
            ctx.astronaut.drop();
            self.cooldown = PICKUP_COOLDOWN;
            self.set_state(DragState::Dropping, ctx.now);
            let center = self.rect.center();
            self.rect.set_center(IVec2::new(zone.center().x, center.y));
        }
    }

    fn try_pickup(&mut self, ctx: &mut DragContext) -> bool {
        let eligible = self.cooldown == 0
            && matches!(self.state, DragState::Falling | DragState::Rest)
            && self.payload.pickable(ctx.ship)
            && ctx.astronaut.can_pick_up();
        if !eligible {
            return false;
        }
        let astro = ctx.astronaut.bounds();
        if !astro.intersects(&self.rect) || !ctx.astronaut.pick(self.cargo()) {
            return false;
        }
        self.carry_offset = IVec2::new((astro.w - self.rect.w) / 2, astro.h - self.rect.h);
        self.set_state(DragState::Dragged, ctx.now);
        true
    }

    pub fn draw(&self, canvas: &mut impl Canvas) {
        canvas.sprite(&self.sprite, self.anim.clip, self.anim.frame, self.rect.pos());
    }
}
