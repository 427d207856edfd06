//! # Scene Data Model
//!
//! Entities live in a flat arena (`SlotMap`) owned by the [`Scene`](crate::scene::Scene).
//! Relationships between boxes and arrows are stored as `EntityId` handles rather than
//! references, so removing an entity can never leave a dangling pointer behind; at
//! worst a stale handle fails to resolve.

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use crate::config::Style;
use crate::layout;
use crate::math::Rect;

pub use uuid::Uuid;

new_key_type! {
    /// Unique identifier for an Entity.
    pub struct EntityId;
}

bitflags! {
    /// Bitflags representing various boolean states of an Entity.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct EntityFlags: u8 {
        /// The entity is neither painted nor hit-tested.
        const HIDDEN = 1 << 0;
        /// The entity is being dragged by the pointer.
        const DRAGGING = 1 << 1;
    }
}

/// Outline of an entity in its local frame (relative to `position`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Axis-aligned rectangle.
    Rect {
        /// Top-left corner in local units.
        origin: Vec2,
        /// Width and height.
        size: Vec2,
    },
    /// Closed polygon.
    Polygon(Vec<Vec2>),
    /// Open quadratic Bezier.
    Quadratic {
        start: Vec2,
        control: Vec2,
        end: Vec2,
    },
    /// Open cubic Bezier.
    Cubic {
        start: Vec2,
        cp1: Vec2,
        cp2: Vec2,
        end: Vec2,
    },
}

/// Arrow-specific state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArrowData {
    /// Entity the arrow starts at, if connected.
    pub from: Option<EntityId>,
    /// Entity the arrow points to, if connected.
    pub to: Option<EntityId>,
    /// Tip of the arrow. The tail is the entity's `position`.
    pub end_position: Vec2,
    /// Where along the curve the arrowhead sits, in (0, 1).
    pub ratio: f32,
}

/// The two kinds of entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Box,
    Arrow(ArrowData),
}

/// A drawable, addressable thing in the scene.
#[derive(Clone, Debug)]
pub struct Entity {
    /// Self-reference ID.
    pub id: EntityId,
    /// Stable UUID for diagnostics.
    pub uuid: Uuid,
    /// Free-form name, handy in logs.
    pub name: String,
    /// Top-left of a box; tail of an arrow.
    pub position: Vec2,
    /// Outline painted for a box. Arrows compute theirs from their end points.
    pub path: Option<Shape>,
    /// Local-frame rectangle used for hit-testing and anchoring.
    pub raw_rect: Option<Rect>,
    /// Visual style.
    pub style: Style,
    /// Label drawn at the center of a box.
    pub text: String,
    /// State flags.
    pub flags: EntityFlags,
    /// Arrows that use this entity as an endpoint.
    pub connected_lines: Vec<EntityId>,
    /// Box or Arrow specifics.
    pub kind: EntityKind,
}

impl Entity {
    pub fn is_arrow(&self) -> bool {
        matches!(self.kind, EntityKind::Arrow(_))
    }

    pub fn is_box(&self) -> bool {
        matches!(self.kind, EntityKind::Box)
    }

    /// Whether the entity is painted and hit-tested.
    pub fn displayed(&self) -> bool {
        !self.flags.contains(EntityFlags::HIDDEN)
    }

    pub fn arrow(&self) -> Option<&ArrowData> {
        match &self.kind {
            EntityKind::Arrow(data) => Some(data),
            EntityKind::Box => None,
        }
    }

    pub fn arrow_mut(&mut self) -> Option<&mut ArrowData> {
        match &mut self.kind {
            EntityKind::Arrow(data) => Some(data),
            EntityKind::Box => None,
        }
    }

    /// The local rectangle translated into the scene frame.
    pub fn bounds(&self) -> Option<Rect> {
        self.raw_rect.map(|r| r.translate(self.position))
    }

    /// Absolute polygon used for hit-testing a box.
    pub fn vertices(&self) -> Option<[Vec2; 4]> {
        self.bounds().map(|b| b.vertices())
    }

    /// `[start, control, end]` of an arrow's quadratic curve, as painted.
    pub fn stops(&self, margin: f32) -> Option<[Vec2; 3]> {
        let arrow = self.arrow()?;
        let start = self.position;
        let end = layout::normalize_end_point(start, arrow.end_position, margin);
        Some([start, layout::route_control_point(start, end, margin), end])
    }

    /// Returns true if `other` is one of this arrow's endpoints.
    pub fn has_endpoint(&self, other: EntityId) -> bool {
        self.arrow()
            .is_some_and(|a| a.from == Some(other) || a.to == Some(other))
    }
}

/// Options for creating a box. Anything left `None` falls back to the scene defaults.
#[derive(Clone, Debug, Default)]
pub struct BoxOptions {
    pub name: String,
    pub position: Vec2,
    pub path: Option<Shape>,
    pub raw_rect: Option<Rect>,
    pub style: Option<Style>,
    pub text: String,
    pub hidden: bool,
}

impl BoxOptions {
    /// A plain rectangle at `position` with matching outline and hit area.
    pub fn rect(name: impl Into<String>, position: Vec2, size: Vec2) -> Self {
        Self {
            name: name.into(),
            position,
            path: Some(Shape::Rect {
                origin: Vec2::ZERO,
                size,
            }),
            raw_rect: Some(Rect::new(Vec2::ZERO, size)),
            ..Default::default()
        }
    }

    /// A rectangle described by raw `[x, y, width, height]` vertex data in the local
    /// frame. Malformed data leaves the box without an outline or hit area.
    pub fn from_raw(name: impl Into<String>, position: Vec2, raw: &[f32]) -> Self {
        let raw_rect = Rect::from_raw(raw);
        Self {
            name: name.into(),
            position,
            path: raw_rect.map(|r| Shape::Rect {
                origin: r.min,
                size: r.size(),
            }),
            raw_rect,
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }
}

/// Options for creating an arrow.
#[derive(Clone, Debug, Default)]
pub struct ArrowOptions {
    pub name: String,
    /// Tail position.
    pub start: Vec2,
    /// Tip position; defaults to `start`.
    pub end: Option<Vec2>,
    /// Arrowhead placement; defaults to the scene's configured ratio.
    pub ratio: Option<f32>,
    pub style: Option<Style>,
}

/// Partial style update. `None` fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StylePatch {
    pub fill: Option<glam::Vec4>,
    pub stroke: Option<glam::Vec4>,
    pub text_color: Option<glam::Vec4>,
    pub font_family: Option<String>,
    pub font_size: Option<f32>,
}

impl StylePatch {
    /// Applies the patch, returning true if anything actually changed.
    pub fn apply(&self, style: &mut Style) -> bool {
        let mut changed = false;
        fn set<T: PartialEq + Clone>(slot: &mut T, value: &Option<T>, changed: &mut bool) {
            if let Some(v) = value
                && *slot != *v
            {
                *slot = v.clone();
                *changed = true;
            }
        }
        set(&mut style.fill, &self.fill, &mut changed);
        set(&mut style.stroke, &self.stroke, &mut changed);
        set(&mut style.text_color, &self.text_color, &mut changed);
        set(&mut style.font_family, &self.font_family, &mut changed);
        set(&mut style.font_size, &self.font_size, &mut changed);
        changed
    }
}
