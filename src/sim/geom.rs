//! Integer rectangle geometry
//!
//! Everything in the world is an axis-aligned rectangle on an integer grid.
//! Intersection follows the usual screen convention: `x` grows right, `y`
//! grows down, and a rectangle covers `[x, x + w) x [y, y + h)`.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_pos_size(pos: IVec2, size: IVec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    #[inline]
    pub fn pos(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    #[inline]
    pub fn size(&self) -> IVec2 {
        IVec2::new(self.w, self.h)
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn center(&self) -> IVec2 {
        IVec2::new(self.x + self.w / 2, self.y + self.h / 2)
    }

    pub fn set_pos(&mut self, pos: IVec2) {
        self.x = pos.x;
        self.y = pos.y;
    }

    pub fn translate(&mut self, delta: IVec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// Move so the center lands on `center`
    pub fn set_center(&mut self, center: IVec2) {
        self.x = center.x - self.w / 2;
        self.y = center.y - self.h / 2;
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Overlap of two rectangles; may have non-positive size when disjoint.
    pub fn intersection(&self, other: &Rect) -> Rect {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        Rect::new(x1, y1, x2 - x1, y2 - y1)
    }

    /// True when the two rectangles share interior area (touching edges don't count)
    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty() && !other.is_empty() && !self.intersection(other).is_empty()
    }

    /// Segment/rectangle test using outcode clipping.
    ///
    /// The segment counts as hitting when any point of it lies inside the
    /// closed rectangle.
    pub fn intersects_segment(&self, from: Vec2, to: Vec2) -> bool {
        let (mut x1, mut y1) = (from.x, from.y);
        let (x2, y2) = (to.x, to.y);

        let out2 = self.outcode(x2, y2);
        if out2 == 0 {
            return true;
        }
        loop {
            let out1 = self.outcode(x1, y1);
            if out1 == 0 {
                return true;
            }
            if out1 & out2 != 0 {
                return false;
            }
            if out1 & (OUT_LEFT | OUT_RIGHT) != 0 {
                let mut x = self.x as f32;
                if out1 & OUT_RIGHT != 0 {
                    x += self.w as f32;
                }
                y1 += (x - x1) * (y2 - y1) / (x2 - x1);
                x1 = x;
            } else {
                let mut y = self.y as f32;
                if out1 & OUT_BOTTOM != 0 {
                    y += self.h as f32;
                }
                x1 += (y - y1) * (x2 - x1) / (y2 - y1);
                y1 = y;
            }
        }
    }

    fn outcode(&self, px: f32, py: f32) -> u8 {
        let mut out = 0;
        if self.w <= 0 {
            out |= OUT_LEFT | OUT_RIGHT;
        } else if px < self.x as f32 {
            out |= OUT_LEFT;
        } else if px > self.right() as f32 {
            out |= OUT_RIGHT;
        }
        if self.h <= 0 {
            out |= OUT_TOP | OUT_BOTTOM;
        } else if py < self.y as f32 {
            out |= OUT_TOP;
        } else if py > self.bottom() as f32 {
            out |= OUT_BOTTOM;
        }
        out
    }
}

const OUT_LEFT: u8 = 1;
const OUT_TOP: u8 = 2;
const OUT_RIGHT: u8 = 4;
const OUT_BOTTOM: u8 = 8;
