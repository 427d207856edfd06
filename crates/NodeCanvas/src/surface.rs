//! # Drawing Surface
//!
//! The scene never draws pixels itself. It issues immediate-mode calls against a
//! [`Surface`] supplied by the host (a 2D canvas, a GPU painter, a test recorder).
//!
//! [`RecordingSurface`] is a display-list implementation: every call is appended as a
//! [`DrawCommand`] that the host can replay, diff, or inspect.

use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};

use crate::config::Style;
use crate::model::Shape;

/// Immediate-mode paint primitives the scene relies on.
///
/// Coordinates are surface-local and subject to the current transform, which is
/// modified by [`translate`](Surface::translate) and [`rotate`](Surface::rotate) and
/// scoped by [`save`](Surface::save) / [`restore`](Surface::restore).
pub trait Surface {
    /// Logical size of the surface.
    fn size(&self) -> Vec2;
    /// Clears a rectangle (ignores the current transform).
    fn clear_rect(&mut self, pos: Vec2, size: Vec2);
    /// Pushes the current transform.
    fn save(&mut self);
    /// Pops the transform pushed by the matching `save`.
    fn restore(&mut self);
    fn translate(&mut self, offset: Vec2);
    /// Rotates subsequent drawing by `angle` radians.
    fn rotate(&mut self, angle: f32);
    /// Strokes the outline of `shape`.
    fn stroke_path(&mut self, shape: &Shape, color: Vec4, width: f32);
    /// Fills `shape`. Open curves are closed implicitly.
    fn fill_path(&mut self, shape: &Shape, color: Vec4);
    /// Draws `text` with the top-left of its box at `origin`.
    fn fill_text(&mut self, text: &str, origin: Vec2, style: &Style);
    /// Width and height of `text` in the given style.
    fn measure_text(&self, text: &str, style: &Style) -> Vec2;
}

/// A single recorded drawing primitive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    Clear {
        pos: Vec2,
        size: Vec2,
    },
    Save,
    Restore,
    Translate(Vec2),
    Rotate(f32),
    Stroke {
        shape: Shape,
        color: Vec4,
        width: f32,
    },
    Fill {
        shape: Shape,
        color: Vec4,
    },
    Text {
        /// Top-left of the text box in the current transform.
        origin: Vec2,
        text: String,
        color: Vec4,
        /// Font size in surface units.
        size: f32,
    },
}

/// A list of draw commands representing everything painted since the last take.
pub type RenderList = Vec<DrawCommand>;

/// [`Surface`] that records a [`RenderList`] instead of painting.
#[derive(Clone, Debug)]
pub struct RecordingSurface {
    size: Vec2,
    commands: RenderList,
}

impl RecordingSurface {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Returns the recorded commands and starts a fresh list.
    pub fn take(&mut self) -> RenderList {
        std::mem::take(&mut self.commands)
    }

    /// Commands recorded after the most recent full clear, i.e. the last complete frame.
    pub fn last_frame(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|cmd| matches!(cmd, DrawCommand::Clear { .. }))
            .unwrap_or(0);
        &self.commands[start..]
    }

    /// Number of clears recorded, which equals the number of full repaints.
    pub fn clear_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|cmd| matches!(cmd, DrawCommand::Clear { .. }))
            .count()
    }

    pub fn resize(&mut self, size: Vec2) {
        self.size = size;
    }
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new(Vec2::new(800.0, 600.0))
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn clear_rect(&mut self, pos: Vec2, size: Vec2) {
        self.commands.push(DrawCommand::Clear { pos, size });
    }

    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }

    fn translate(&mut self, offset: Vec2) {
        self.commands.push(DrawCommand::Translate(offset));
    }

    fn rotate(&mut self, angle: f32) {
        self.commands.push(DrawCommand::Rotate(angle));
    }

    fn stroke_path(&mut self, shape: &Shape, color: Vec4, width: f32) {
        self.commands.push(DrawCommand::Stroke {
            shape: shape.clone(),
            color,
            width,
        });
    }

    fn fill_path(&mut self, shape: &Shape, color: Vec4) {
        self.commands.push(DrawCommand::Fill {
            shape: shape.clone(),
            color,
        });
    }

    fn fill_text(&mut self, text: &str, origin: Vec2, style: &Style) {
        self.commands.push(DrawCommand::Text {
            origin,
            text: text.to_string(),
            color: style.text_color,
            size: style.font_size,
        });
    }

    fn measure_text(&self, text: &str, style: &Style) -> Vec2 {
        // Rough monospace estimate; real hosts measure with their font stack.
        Vec2::new(
            text.chars().count() as f32 * style.font_size * 0.6,
            style.font_size,
        )
    }
}
