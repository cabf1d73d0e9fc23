//! The player's spaceship: assembled part by part, then fuelled

use std::cell::OnceCell;

use glam::IVec2;

use super::geom::Rect;
use super::platform::Platform;
use crate::consts::FALL_SPEED;
use crate::renderer::{Canvas, Sprite};

/// A placed piece of the ship
#[derive(Debug, Clone)]
pub struct ShipSegment {
    pub sprite: Sprite,
    pub rect: Rect,
}

/// The ship. Segment 0 is the base and defines the ship's bounds.
#[derive(Debug, Clone)]
pub struct Spaceship {
    segments: Vec<ShipSegment>,
    part_count: usize,
    falling: bool,
    drop_zone: OnceCell<Rect>,
}

impl Spaceship {
    /// Create a ship whose base sits at `pos` and which needs `part_count`
    /// pieces in total (base included).
    pub fn new(pos: IVec2, base: Sprite, part_count: usize) -> Self {
        assert!(part_count >= 1, "a ship needs at least its base part");
        let rect = Rect::from_pos_size(pos, base.size());
        Self {
            segments: vec![ShipSegment { sprite: base, rect }],
            part_count,
            falling: true,
            drop_zone: OnceCell::new(),
        }
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.segments[0].rect
    }

    pub fn position(&self) -> IVec2 {
        self.bounds().pos()
    }

    /// Index of the part that must be delivered next
    #[inline]
    pub fn next_part_due(&self) -> usize {
        self.segments.len()
    }

    pub fn part_count(&self) -> usize {
        self.part_count
    }

    pub fn is_complete(&self) -> bool {
        self.next_part_due() == self.part_count
    }

    pub fn is_falling(&self) -> bool {
        self.falling
    }

    pub fn set_falling(&mut self, falling: bool) {
        self.falling = falling;
    }

    pub fn segments(&self) -> &[ShipSegment] {
        &self.segments
    }

    /// Move every placed segment
    pub fn translate(&mut self, delta: IVec2) {
        for segment in &mut self.segments {
            segment.rect.translate(delta);
        }
    }

    /// Fall until resting on a platform
    pub fn update(&mut self, platforms: &[Platform]) {
        if !self.falling {
            return;
        }
        self.translate(IVec2::new(0, FALL_SPEED));
        for platform in platforms {
            let inter = platform.bounds().intersection(&self.bounds());
            if !inter.is_empty() {
                self.translate(IVec2::new(0, -inter.h));
                self.falling = false;
            }
        }
    }

    /// Area above the ship where carried items are let go.
    ///
    /// Half the ship's width, centred on it, reaching from the top of the world
    /// (or the underside of any platform covering it) down to the ship's base.
    /// Computed on first use and cached.
    pub fn drop_zone(&self, platforms: &[Platform]) -> Rect {
        *self.drop_zone.get_or_init(|| {
            let ship = self.bounds();
            let width = ship.w / 2;
            let mut zone = Rect::new(ship.x + width / 2, 0, width, ship.bottom());
            for platform in platforms {
                let p = platform.bounds();
                if p.intersects(&zone) {
                    zone.y = p.bottom();
                    zone.h = ship.bottom() - zone.y;
                }
            }
            zone
        })
    }

    /// Stack a delivered part on top of the previous one.
    ///
    /// Keeps the part's horizontal position; returns where it was placed.
    pub fn attach_part(&mut self, index: usize, sprite: Sprite, rect: Rect) -> Rect {
        debug_assert_eq!(index, self.next_part_due(), "ship parts must arrive in order");
        let below = self.segments[self.segments.len() - 1].rect;
        let placed = Rect::new(rect.x, below.y - rect.h, rect.w, rect.h);
        self.segments.push(ShipSegment {
            sprite,
            rect: placed,
        });
        log::debug!(
            "ship part {} attached ({}/{})",
            index,
            self.next_part_due(),
            self.part_count
        );
        placed
    }

    pub fn draw(&self, canvas: &mut impl Canvas) {
        for segment in &self.segments {
            canvas.sprite(&segment.sprite, 0, 0, segment.rect.pos());
        }
    }
}
