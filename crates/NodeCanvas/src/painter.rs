use glam::Vec2;

use crate::config::{CurveKind, SceneConfig};
use crate::layout;
use crate::math;
use crate::model::{ArrowData, Entity, EntityKind, Shape};
use crate::surface::Surface;

/// Hook invoked after an entity has been painted.
///
/// Box callbacks run with the surface translated to the box's position, so they can
/// decorate it in local coordinates.
pub type DrawCallback<S> = Box<dyn FnMut(&Entity, &mut S)>;

/// Default arrowhead: a narrow triangle pointing along +x.
pub fn default_arrow_head() -> Shape {
    Shape::Polygon(vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(0.0, 5.0),
        Vec2::new(15.0, 0.0),
        Vec2::new(0.0, -5.0),
    ])
}

/// Paints one entity. Hidden entities are skipped.
pub fn draw_entity<S: Surface>(
    surface: &mut S,
    entity: &Entity,
    config: &SceneConfig,
    callbacks: Option<&mut Vec<DrawCallback<S>>>,
) {
    if !entity.displayed() {
        return;
    }
    match &entity.kind {
        EntityKind::Box => draw_box(surface, entity, callbacks),
        EntityKind::Arrow(arrow) => {
            draw_arrow(surface, entity, arrow, config);
            for cb in callbacks.into_iter().flatten() {
                cb(entity, surface);
            }
        }
    }
}

/// Translate to the box, stroke, fill, label, then run the draw callbacks.
fn draw_box<S: Surface>(
    surface: &mut S,
    entity: &Entity,
    callbacks: Option<&mut Vec<DrawCallback<S>>>,
) {
    surface.save();
    surface.translate(entity.position);

    if let Some(path) = &entity.path {
        surface.stroke_path(path, entity.style.stroke, 1.0);
        surface.fill_path(path, entity.style.fill);

        if let Some(rect) = entity.raw_rect
            && !entity.text.is_empty()
        {
            let extent = surface.measure_text(&entity.text, &entity.style);
            let origin = rect.center() - extent / 2.0;
            surface.fill_text(&entity.text, origin, &entity.style);
        }
    }

    for cb in callbacks.into_iter().flatten() {
        cb(entity, surface);
    }

    surface.restore();
}

/// Resolved geometry of an arrow as it is painted.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrowGeometry {
    /// The curve itself.
    pub curve: Shape,
    /// Where the arrowhead sits.
    pub tip: Vec2,
    /// Rotation of the arrowhead in radians.
    pub angle: f32,
}

/// Computes the painted curve and arrowhead placement for an arrow.
pub fn arrow_geometry(start: Vec2, end: Vec2, ratio: f32, config: &SceneConfig) -> ArrowGeometry {
    let end = layout::normalize_end_point(start, end, config.direction_margin);
    let t = layout::clamp_ratio(ratio);

    let (curve, tip, tangent) = match config.curve_kind {
        CurveKind::Quadratic => {
            let control = layout::route_control_point(start, end, config.direction_margin);
            (
                Shape::Quadratic {
                    start,
                    control,
                    end,
                },
                math::quadratic_point(start, control, end, t),
                math::quadratic_derivative(start, control, end, t),
            )
        }
        CurveKind::Cubic => {
            let (cp1, cp2) = math::calculate_bezier_points(start, end);
            (
                Shape::Cubic {
                    start,
                    cp1,
                    cp2,
                    end,
                },
                math::cubic_point(start, cp1, cp2, end, t),
                math::cubic_derivative(start, cp1, cp2, end, t),
            )
        }
    };

    ArrowGeometry {
        curve,
        tip,
        angle: tangent.y.atan2(tangent.x),
    }
}

fn draw_arrow<S: Surface>(surface: &mut S, entity: &Entity, arrow: &ArrowData, config: &SceneConfig) {
    let geometry = arrow_geometry(entity.position, arrow.end_position, arrow.ratio, config);

    surface.stroke_path(&geometry.curve, entity.style.stroke, config.arrow_line_width);

    let head = config
        .arrow_head
        .as_ref()
        .map(|points| Shape::Polygon(points.clone()))
        .unwrap_or_else(default_arrow_head);

    surface.save();
    surface.translate(geometry.tip);
    surface.rotate(geometry.angle);
    surface.fill_path(&head, entity.style.fill);
    surface.restore();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrowhead_follows_the_tangent() {
        let config = SceneConfig::default();
        // Level arrow pointing right: head angle 0.
        let g = arrow_geometry(Vec2::ZERO, Vec2::new(100.0, 0.0), 0.5, &config);
        assert_eq!(g.tip, Vec2::new(25.0, 0.0));
        assert!(g.angle.abs() < 1e-6);

        // Level arrow pointing left: head angle pi.
        let g = arrow_geometry(Vec2::ZERO, Vec2::new(-100.0, 0.0), 0.5, &config);
        assert!((g.angle.abs() - std::f32::consts::PI).abs() < 1e-6);
    }

    #[test]
    fn near_level_end_is_snapped() {
        let config = SceneConfig::default();
        let g = arrow_geometry(Vec2::ZERO, Vec2::new(100.0, 3.0), 0.5, &config);
        match g.curve {
            Shape::Quadratic { end, .. } => assert_eq!(end, Vec2::new(100.0, 0.0)),
            other => panic!("unexpected curve {other:?}"),
        }
    }
}
