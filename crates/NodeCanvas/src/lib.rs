//! # NodeCanvas
//!
//! `node_canvas` is a small retained-mode diagramming engine: boxes connected by curved
//! arrows, painted onto a host-supplied 2D surface. It owns the scene state, the
//! geometry, and pointer resolution, while the host provides the pixels and the frame
//! clock.
//!
//! ## Core Architecture
//! - **Geometry (`src/math.rs`)**: point-in-polygon and point-on-curve tests.
//! - **Layout (`src/layout.rs`)**: arrow direction, routing and anchor placement.
//! - **Scene (`src/scene.rs`)**: the entity arena, paint order, and relationships.
//! - **Batch (`src/batch.rs`)**: coalesces redraw requests into one animation tick.
//! - **Surface (`src/surface.rs`)**: the drawing trait and a display-list recorder.
//! - **Interaction (`src/interaction.rs`, `src/hit.rs`)**: hit-testing and pointer events.

pub mod batch;
pub mod config;
pub mod error;
pub mod hit;
pub mod input;
pub mod interaction;
pub mod layout;
pub mod math;
pub mod model;
pub mod painter;
pub mod scene;
pub mod surface;

// Re-exports for convenience
pub use batch::{FrameHandle, FrameScheduler, ManualFrames};
pub use config::{AnchorMode, CurveKind, SceneConfig, Style};
pub use error::{Result, SceneError};
pub use input::{PointerInput, PointerKind};
pub use interaction::{EventKind, PointerEvent, SubscriptionId};
pub use model::{ArrowOptions, BoxOptions, Entity, EntityId, StylePatch};
pub use scene::{AnchorRequest, AnchorRole, Scene};
pub use surface::{DrawCommand, RecordingSurface, Surface};

/// Binds a scene to `surface` with the default configuration.
pub fn init<S: Surface + 'static>(surface: S, scheduler: impl FrameScheduler + 'static) -> Scene<S> {
    Scene::new(surface, scheduler, SceneConfig::default())
}
