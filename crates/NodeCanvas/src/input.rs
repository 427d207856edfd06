//! # Input Protocol
//!
//! This module defines the pointer events the host forwards to the Scene.
//! Positions are in surface-local coordinates (the same space entities live in).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Native pointer event kinds the scene understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerKind {
    /// The pointer moved over the surface.
    Move,
    /// A button was pressed.
    Down,
    /// A button was released.
    Up,
    /// A full press/release on the same spot.
    Click,
    /// The pointer left the surface.
    Out,
}

/// A single native pointer event.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    pub kind: PointerKind,
    /// Surface-local position.
    pub pos: Vec2,
}

impl PointerInput {
    pub fn new(kind: PointerKind, pos: Vec2) -> Self {
        Self { kind, pos }
    }

    pub fn moved(pos: Vec2) -> Self {
        Self::new(PointerKind::Move, pos)
    }

    pub fn down(pos: Vec2) -> Self {
        Self::new(PointerKind::Down, pos)
    }

    pub fn up(pos: Vec2) -> Self {
        Self::new(PointerKind::Up, pos)
    }

    pub fn click(pos: Vec2) -> Self {
        Self::new(PointerKind::Click, pos)
    }

    pub fn out(pos: Vec2) -> Self {
        Self::new(PointerKind::Out, pos)
    }
}
