//! # Layout Kernel
//!
//! Arrow routing and anchoring. An arrow is a single elbow-shaped quadratic curve whose
//! control point is chosen from the coarse direction between its end points.
//!
//! The two classifiers, [`direction`] and [`direction_for_start`], break ties in
//! different ways on purpose. Arrow routing depends on the difference, so keep them
//! separate.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::math::Rect;

/// Default tolerance band for [`direction`] and [`direction_for_start`].
pub const DEFAULT_DIRECTION_MARGIN: f32 = 5.0;

/// Coarse direction of one point relative to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Top,
    Bottom,
    Left,
    Right,
}

/// Returns true if `diff` is within the tolerance band.
pub fn within_margin(diff: f32, margin: f32) -> bool {
    diff.abs() < margin
}

/// Classifies `end` relative to `start`.
///
/// Nearly-level pairs are horizontal; everything else is vertical.
pub fn direction(start: Vec2, end: Vec2, margin: f32) -> Direction {
    if within_margin(start.y - end.y, margin) {
        if start.x > end.x {
            Direction::Left
        } else {
            Direction::Right
        }
    } else if start.y > end.y {
        Direction::Top
    } else {
        Direction::Bottom
    }
}

/// Classifies the pair for placing the *start* anchor.
pub fn direction_for_start(start: Vec2, end: Vec2, margin: f32) -> Direction {
    match direction(start, end, margin) {
        Direction::Top | Direction::Bottom => {
            if within_margin(start.x - end.x, margin) {
                if end.y > start.y {
                    Direction::Top
                } else {
                    Direction::Bottom
                }
            } else if end.x > start.x {
                Direction::Left
            } else {
                Direction::Right
            }
        }
        Direction::Left | Direction::Right => {
            if within_margin(start.y - end.y, margin) {
                if end.x > start.x {
                    Direction::Left
                } else {
                    Direction::Right
                }
            } else if end.y > start.y {
                Direction::Top
            } else {
                Direction::Bottom
            }
        }
    }
}

/// Control point of the elbow curve from `p1` to `p2`.
pub fn route_control_point(p1: Vec2, p2: Vec2, margin: f32) -> Vec2 {
    match direction(p1, p2, margin) {
        Direction::Top | Direction::Bottom => Vec2::new(p2.x, p1.y),
        Direction::Left | Direction::Right => Vec2::new(p1.x, p2.y),
    }
}

/// Snaps `end` onto `start` per axis when the two are within the margin, so
/// near-straight arrows render perfectly straight.
pub fn normalize_end_point(start: Vec2, end: Vec2, margin: f32) -> Vec2 {
    let snap = |s: f32, e: f32| if within_margin(s - e, margin) { s } else { e };
    Vec2::new(snap(start.x, end.x), snap(start.y, end.y))
}

/// Clamps an arrowhead ratio away from the curve ends.
pub fn clamp_ratio(ratio: f32) -> f32 {
    ratio.clamp(0.001, 0.999)
}

/// Midpoint of the box edge named by `direction`.
///
/// `Left` resolves to the box's right edge and `Right` to its left edge: an arrow
/// arriving "from the left" attaches to the side facing it.
pub fn anchor_on_edge(direction: Direction, bounds: Rect) -> Vec2 {
    let Rect { min, max } = bounds;
    let mid = bounds.center();
    match direction {
        Direction::Top => Vec2::new(mid.x, min.y),
        Direction::Bottom => Vec2::new(mid.x, max.y),
        Direction::Left => Vec2::new(max.x, mid.y),
        Direction::Right => Vec2::new(min.x, mid.y),
    }
}

/// Center of the box; the default anchor.
pub fn endpoint_center(bounds: Rect) -> Vec2 {
    bounds.center()
}

/// Places an anchor on `bounds` for an arrow running from `start` to `end`.
///
/// The start anchor uses [`direction_for_start`], the end anchor [`direction`].
pub fn place_point_on_edge(
    start: Vec2,
    end: Vec2,
    bounds: Rect,
    is_start: bool,
    margin: f32,
) -> Vec2 {
    let dir = if is_start {
        direction_for_start(start, end, margin)
    } else {
        direction(start, end, margin)
    };
    anchor_on_edge(dir, bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    const M: f32 = DEFAULT_DIRECTION_MARGIN;

    #[test]
    fn level_points_are_horizontal() {
        let a = Vec2::new(100.0, 100.0);
        assert_eq!(direction(a, Vec2::new(200.0, 102.0), M), Direction::Right);
        assert_eq!(direction(a, Vec2::new(0.0, 98.0), M), Direction::Left);
    }

    #[test]
    fn vertical_dominates_diagonals() {
        let a = Vec2::new(100.0, 100.0);
        assert_eq!(direction(a, Vec2::new(300.0, 50.0), M), Direction::Top);
        assert_eq!(direction(a, Vec2::new(-300.0, 150.0), M), Direction::Bottom);
        assert_eq!(direction(a, Vec2::new(101.0, 300.0), M), Direction::Bottom);
    }

    #[test]
    fn start_direction_uses_inverted_rules() {
        let a = Vec2::new(100.0, 100.0);
        // Straight down: end.y > start.y reports Top for the start anchor.
        assert_eq!(direction_for_start(a, Vec2::new(102.0, 300.0), M), Direction::Top);
        assert_eq!(direction_for_start(a, Vec2::new(98.0, 0.0), M), Direction::Bottom);
        // Diagonal: horizontal component decides.
        assert_eq!(direction_for_start(a, Vec2::new(300.0, 300.0), M), Direction::Left);
        assert_eq!(direction_for_start(a, Vec2::new(0.0, 300.0), M), Direction::Right);
        // Level: end to the right reports Left.
        assert_eq!(direction_for_start(a, Vec2::new(300.0, 101.0), M), Direction::Left);
        assert_eq!(direction_for_start(a, Vec2::new(0.0, 101.0), M), Direction::Right);
    }

    #[test]
    fn control_point_forms_an_elbow() {
        let p1 = Vec2::new(0.0, 0.0);
        let p2 = Vec2::new(100.0, 100.0);
        assert_eq!(route_control_point(p1, p2, M), Vec2::new(100.0, 0.0));
        let level = Vec2::new(100.0, 2.0);
        assert_eq!(route_control_point(p1, level, M), Vec2::new(0.0, 2.0));
    }

    #[test]
    fn edge_anchors() {
        let b = Rect::new(Vec2::new(10.0, 20.0), Vec2::new(100.0, 50.0));
        assert_eq!(anchor_on_edge(Direction::Top, b), Vec2::new(60.0, 20.0));
        assert_eq!(anchor_on_edge(Direction::Bottom, b), Vec2::new(60.0, 70.0));
        assert_eq!(anchor_on_edge(Direction::Left, b), Vec2::new(110.0, 45.0));
        assert_eq!(anchor_on_edge(Direction::Right, b), Vec2::new(10.0, 45.0));
        assert_eq!(endpoint_center(b), Vec2::new(60.0, 45.0));
    }

    #[test]
    fn place_point_on_edge_picks_classifier_by_role() {
        let b = Rect::new(Vec2::new(0.0, 0.0), Vec2::new(100.0, 50.0));
        let start = Vec2::new(50.0, 25.0);
        let end = Vec2::new(400.0, 300.0);
        // Start: diagonal, end to the right -> Left -> right edge.
        assert_eq!(place_point_on_edge(start, end, b, true, M), Vec2::new(100.0, 25.0));
        // End: end below -> Bottom -> bottom edge.
        assert_eq!(place_point_on_edge(start, end, b, false, M), Vec2::new(50.0, 50.0));
    }

    #[test]
    fn end_point_snaps_within_margin() {
        let s = Vec2::new(10.0, 10.0);
        assert_eq!(normalize_end_point(s, Vec2::new(13.0, 80.0), M), Vec2::new(10.0, 80.0));
        assert_eq!(normalize_end_point(s, Vec2::new(80.0, 80.0), M), Vec2::new(80.0, 80.0));
    }

    #[test]
    fn ratio_is_clamped() {
        assert_eq!(clamp_ratio(0.0), 0.001);
        assert_eq!(clamp_ratio(1.0), 0.999);
        assert_eq!(clamp_ratio(0.3), 0.3);
    }
}
