//! Static platforms and the hit vector used by every moving entity

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use crate::consts::CONTACT_DEPTH;
use crate::renderer::Sprite;

/// Which side of a platform was struck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Contact {
    None,
    /// Landed on the platform (pushed up)
    Top,
    /// Hit the underside (pushed down)
    Bottom,
    /// Hit the left side (pushed left)
    Left,
    /// Hit the right side (pushed right)
    Right,
}

/// Correction vector returned by [`Platform::hit_v`]
///
/// Only one axis is ever non-zero; its sign encodes the side that was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HitVector(pub IVec2);

impl HitVector {
    pub const ZERO: Self = Self(IVec2::ZERO);

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == IVec2::ZERO
    }

    pub fn contact(&self) -> Contact {
        let v = self.0;
        match (v.x, v.y) {
            (0, 0) => Contact::None,
            (0, y) if y < 0 => Contact::Top,
            (0, _) => Contact::Bottom,
            (x, 0) if x < 0 => Contact::Left,
            _ => Contact::Right,
        }
    }
}

/// Static part of the world every entity collides with
#[derive(Debug, Clone, Copy)]
pub struct Arena<'a> {
    pub width: i32,
    pub height: i32,
    pub platforms: &'a [Platform],
}

impl Arena<'_> {
    /// First non-zero hit vector against any platform, in platform order
    pub fn first_hit(&self, moving: &Rect) -> Option<HitVector> {
        self.platforms
            .iter()
            .map(|p| p.hit_v(moving))
            .find(|hit| !hit.is_zero())
    }
}

/// A rectangle of static collision geometry
#[derive(Debug, Clone)]
pub struct Platform {
    bounds: Rect,
    /// None for invisible geometry such as the ceiling
    sprite: Option<Sprite>,
}

impl Platform {
    pub fn new(pos: IVec2, sprite: Sprite) -> Self {
        Self {
            bounds: Rect::from_pos_size(pos, sprite.size()),
            sprite: Some(sprite),
        }
    }

    /// Collision-only platform with no visual
    pub fn invisible(bounds: Rect) -> Self {
        Self {
            bounds,
            sprite: None,
        }
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn sprite(&self) -> Option<&Sprite> {
        self.sprite.as_ref()
    }

    /// Correction for a rectangle overlapping this platform.
    ///
    /// Shallow overlaps flush with the platform's top report a landing, shallow
    /// overlaps flush with the mover's own top report an underside hit, anything
    /// else is a side hit decided by which left edge the overlap starts on.
    pub fn hit_v(&self, moving: &Rect) -> HitVector {
        let platform = self.bounds;
        let inter = platform.intersection(moving);
        if inter.is_empty() {
            return HitVector::ZERO;
        }
        if inter.h <= CONTACT_DEPTH && inter.y == platform.y {
            HitVector(IVec2::new(0, -inter.h))
        } else if inter.h <= CONTACT_DEPTH && inter.y == moving.y {
            HitVector(IVec2::new(0, inter.h))
        } else if inter.x == platform.x {
            HitVector(IVec2::new(-inter.w, 0))
        } else {
            HitVector(IVec2::new(inter.w, 0))
        }
    }
}
