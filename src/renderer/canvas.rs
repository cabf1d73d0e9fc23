//! Draw surface trait and a recording implementation

use glam::{IVec2, Vec2};

use super::sprite::Sprite;

/// Anything the world can be drawn onto
pub trait Canvas {
    /// Blit `frame` of `clip` of a sprite with its top-left corner at `pos`
    fn sprite(&mut self, sprite: &Sprite, clip: u32, frame: u32, pos: IVec2);

    /// Draw a laser beam
    fn line(&mut self, from: Vec2, to: Vec2, color: [f32; 4]);
}

/// A single recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Sprite {
        name: String,
        clip: u32,
        frame: u32,
        pos: IVec2,
    },
    Line {
        from: Vec2,
        to: Vec2,
        color: [f32; 4],
    },
}

/// Canvas that records commands in draw order
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Names of blitted sprites, in draw order
    pub fn sprite_names(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Sprite { name, .. } => Some(name.as_str()),
            DrawCommand::Line { .. } => None,
        })
    }

    pub fn line_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
            .count()
    }
}

impl Canvas for DrawList {
    fn sprite(&mut self, sprite: &Sprite, clip: u32, frame: u32, pos: IVec2) {
        self.commands.push(DrawCommand::Sprite {
            name: sprite.name.clone(),
            clip,
            frame,
            pos,
        });
    }

    fn line(&mut self, from: Vec2, to: Vec2, color: [f32; 4]) {
        self.commands.push(DrawCommand::Line { from, to, color });
    }
}
