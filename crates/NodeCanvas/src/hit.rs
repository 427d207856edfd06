//! # Hit Testing
//!
//! Resolves a surface-local point to the topmost displayed entity under it. The
//! registry's paint order is walked from the end (topmost) backward and the first
//! match wins.
//!
//! - Arrows match when the point is within `curve_margin` of a sample on their curve.
//! - Boxes match when the point is inside their translated `raw_rect`. The boundary is
//!   half-open: the left and top edges are inside, the right and bottom edges outside.

use glam::Vec2;

use crate::config::{CurveKind, SceneConfig};
use crate::math::{self, Rect};
use crate::model::{Entity, EntityId, EntityKind};
use crate::scene::Scene;
use crate::surface::Surface;

/// Which entities a query considers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Filter {
    Any,
    Boxes,
    Arrows,
}

/// Returns true if `point` hits `entity`.
///
/// `precheck` rejects arrow hits outside the start/end bounding box (grown by the
/// curve margin) before the curve is sampled.
pub fn entity_contains(entity: &Entity, point: Vec2, config: &SceneConfig, precheck: bool) -> bool {
    match &entity.kind {
        EntityKind::Box => entity
            .vertices()
            .is_some_and(|vertices| math::point_in_polygon(point, &vertices)),
        EntityKind::Arrow(_) => match config.curve_kind {
            CurveKind::Quadratic => {
                let Some(stops) = entity.stops(config.direction_margin) else {
                    return false;
                };
                let [start, _, end] = stops;
                if precheck
                    && !Rect::from_points(start, end)
                        .expand(config.curve_margin)
                        .contains(point)
                {
                    return false;
                }
                math::point_on_quadratic_curve(
                    &stops,
                    point,
                    config.curve_margin,
                    config.curve_probe_limit,
                )
            }
            CurveKind::Cubic => {
                let Some([start, _, end]) = entity.stops(config.direction_margin) else {
                    return false;
                };
                let (cp1, cp2) = math::calculate_bezier_points(start, end);
                math::point_on_cubic_curve(
                    &[start, cp1, cp2, end],
                    point,
                    config.curve_margin,
                    config.curve_probe_limit,
                )
            }
        },
    }
}

impl<S: Surface + 'static> Scene<S> {
    /// Topmost displayed entity under `point`.
    pub fn top_entity_at(&self, point: Vec2) -> Option<EntityId> {
        self.resolve(point, Filter::Any)
    }

    /// Topmost displayed box under `point`, ignoring arrows.
    pub fn top_box_at(&self, point: Vec2) -> Option<EntityId> {
        self.resolve(point, Filter::Boxes)
    }

    /// Topmost displayed arrow under `point`, ignoring boxes.
    pub fn top_arrow_at(&self, point: Vec2) -> Option<EntityId> {
        self.resolve(point, Filter::Arrows)
    }

    fn resolve(&self, point: Vec2, filter: Filter) -> Option<EntityId> {
        let config = self.config();
        let precheck = filter == Filter::Arrows && config.arrow_bounds_precheck;

        let hit = self
            .entities()
            .rev()
            .filter(|entity| entity.displayed())
            .filter(|entity| match filter {
                Filter::Any => true,
                Filter::Boxes => entity.is_box(),
                Filter::Arrows => entity.is_arrow(),
            })
            .find(|entity| entity_contains(entity, point, config, precheck))
            .map(|entity| entity.id);

        tracing::trace!(?point, ?filter, ?hit, "hit test");
        hit
    }
}
