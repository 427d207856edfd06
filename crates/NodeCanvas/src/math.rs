//! # Geometry Kernel
//!
//! Stateless hit-testing and curve helpers. Everything here works in surface units
//! with `glam::Vec2` points.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Default number of samples allowed per curve test.
pub const DEFAULT_PROBE_LIMIT: usize = 150;

/// Axis-aligned rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    /// Smallest rectangle containing both points.
    pub fn from_points(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Builds a rectangle from `[x, y, width, height]`.
    ///
    /// Only rectangles are supported: extra values are ignored with a warning, and
    /// fewer than four values yield `None`.
    pub fn from_raw(raw: &[f32]) -> Option<Self> {
        if raw.len() > 4 {
            tracing::warn!(len = raw.len(), "only rectangles are supported, extra vertex data ignored");
        }
        match raw {
            [x, y, w, h, ..] => Some(Self::new(Vec2::new(*x, *y), Vec2::new(*w, *h))),
            _ => {
                tracing::warn!(len = raw.len(), "rectangle needs [x, y, width, height]");
                None
            }
        }
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn translate(&self, offset: Vec2) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn expand(&self, amount: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(amount),
            max: self.max + Vec2::splat(amount),
        }
    }

    /// Corners in clockwise order starting at the top-left.
    pub fn vertices(&self) -> [Vec2; 4] {
        [
            self.min,
            Vec2::new(self.max.x, self.min.y),
            self.max,
            Vec2::new(self.min.x, self.max.y),
        ]
    }
}

/// Crossing-number (PNPOLY) point-in-polygon test.
///
/// The polygon is implicitly closed. For a rectangle this makes the left and top
/// edges inside and the right and bottom edges outside (half-open).
pub fn point_in_polygon(point: Vec2, vertices: &[Vec2]) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (vi, vj) = (vertices[i], vertices[j]);
        if (vi.y > point.y) != (vj.y > point.y)
            && point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Euclidean distance.
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Evaluates a quadratic Bezier at `t`.
pub fn quadratic_point(p0: Vec2, p1: Vec2, p2: Vec2, t: f32) -> Vec2 {
    let mt = 1.0 - t;
    p0 * (mt * mt) + p1 * (2.0 * mt * t) + p2 * (t * t)
}

/// First derivative of a quadratic Bezier at `t`.
pub fn quadratic_derivative(p0: Vec2, p1: Vec2, p2: Vec2, t: f32) -> Vec2 {
    (p1 - p0) * (2.0 * (1.0 - t)) + (p2 - p1) * (2.0 * t)
}

/// Evaluates a cubic Bezier at `t`.
pub fn cubic_point(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let mt = 1.0 - t;
    p0 * (mt * mt * mt) + p1 * (3.0 * mt * mt * t) + p2 * (3.0 * mt * t * t) + p3 * (t * t * t)
}

/// First derivative of a cubic Bezier at `t`.
pub fn cubic_derivative(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let mt = 1.0 - t;
    (p1 - p0) * (3.0 * mt * mt) + (p2 - p1) * (6.0 * mt * t) + (p3 - p2) * (3.0 * t * t)
}

/// Calculates the two control points for a cubic Bezier curve connecting `start` to `end`.
///
/// This assumes a horizontal flow (left-to-right).
pub fn calculate_bezier_points(start: Vec2, end: Vec2) -> (Vec2, Vec2) {
    let dist = start.distance(end);
    let control_dist = (dist * 0.5).min(150.0);
    let cp1 = start + Vec2::new(control_dist, 0.0);
    let cp2 = end - Vec2::new(control_dist, 0.0);
    (cp1, cp2)
}

/// Number of interior samples for a curve whose chord is `chord` long.
fn probe_count(chord: f32, limit: usize) -> usize {
    ((chord / 2.0).floor() as usize).min(limit)
}

/// Parameters `t` strictly inside (0, 1) at which a curve is sampled.
///
/// Very short curves (fewer than two probes) are sampled once at the midpoint.
fn sample_params(chord: f32, limit: usize) -> impl Iterator<Item = f32> {
    let n = probe_count(chord, limit);
    let (steps, count) = if n < 2 { (2, 1) } else { (n, n - 1) };
    (1..=count).map(move |i| i as f32 / steps as f32)
}

/// Approximate test for whether `point` lies on a quadratic Bezier.
///
/// `control_points` must be exactly `[start, control, end]`; anything else logs a
/// warning and returns `false`. The curve is sampled `floor(chord / 2)` times (capped
/// at `probe_limit`) and the point matches if any sample is closer than `margin`.
pub fn point_on_quadratic_curve(
    control_points: &[Vec2],
    point: Vec2,
    margin: f32,
    probe_limit: usize,
) -> bool {
    let [start, control, end] = control_points else {
        tracing::warn!(
            len = control_points.len(),
            "only quadratic Bezier curves (3 control points) are supported"
        );
        return false;
    };
    sample_params(distance(*start, *end), probe_limit)
        .any(|t| quadratic_point(*start, *control, *end, t).distance(point) < margin)
}

/// Approximate test for whether `point` lies on a cubic Bezier `[start, cp1, cp2, end]`.
pub fn point_on_cubic_curve(
    control_points: &[Vec2],
    point: Vec2,
    margin: f32,
    probe_limit: usize,
) -> bool {
    let [start, cp1, cp2, end] = control_points else {
        tracing::warn!(
            len = control_points.len(),
            "cubic Bezier curves need exactly 4 control points"
        );
        return false;
    };
    sample_params(distance(*start, *end), probe_limit)
        .any(|t| cubic_point(*start, *cp1, *cp2, *end, t).distance(point) < margin)
}
