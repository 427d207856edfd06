//! # Configuration
//!
//! This module defines the configuration struct for the Scene.

use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};

use crate::{layout, math};

/// Configuration parameters for a Scene.
///
/// These settings tune hit-testing tolerances, arrow routing and the default look of
/// newly created entities.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Distance under which a point counts as "on" an arrow stroke. Default: 4.0.
    pub curve_margin: f32,
    /// Tolerance band used when classifying arrow direction. Default: 5.0.
    pub direction_margin: f32,
    /// Upper bound on samples taken per curve hit test. Default: 150.
    pub curve_probe_limit: usize,
    /// Default position of the arrowhead along the curve, in (0, 1). Default: 0.5.
    pub arrow_ratio: f32,
    /// Stroke width of arrows. Default: 2.0.
    pub arrow_line_width: f32,
    /// Replaces the default triangular arrowhead. Points are local to the arrow tip,
    /// pointing along +x.
    #[serde(default)]
    pub arrow_head: Option<Vec<Vec2>>,
    /// How arrows attach to connected boxes when no override is installed.
    #[serde(default)]
    pub anchor_mode: AnchorMode,
    /// Curve family used to draw and hit-test arrows.
    #[serde(default)]
    pub curve_kind: CurveKind,
    /// Reject arrow hits outside the start/end bounding box before sampling the curve.
    /// Only applies to [`Scene::top_arrow_at`](crate::scene::Scene::top_arrow_at).
    pub arrow_bounds_precheck: bool,
    /// Visual defaults.
    #[serde(default)]
    pub style: SceneStyle,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            curve_margin: 4.0,
            direction_margin: layout::DEFAULT_DIRECTION_MARGIN,
            curve_probe_limit: math::DEFAULT_PROBE_LIMIT,
            arrow_ratio: 0.5,
            arrow_line_width: 2.0,
            arrow_head: None,
            anchor_mode: AnchorMode::default(),
            curve_kind: CurveKind::default(),
            arrow_bounds_precheck: true,
            style: SceneStyle::default(),
        }
    }
}

/// Default anchoring rule for arrows connected to boxes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnchorMode {
    /// Attach at the center of the box.
    #[default]
    Center,
    /// Attach at the midpoint of the edge facing the other endpoint.
    Edge,
}

/// Curve family for arrows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveKind {
    /// Single-control-point elbow curve.
    #[default]
    Quadratic,
    /// Horizontal-flow cubic Bezier.
    Cubic,
}

/// Default styles applied to new entities.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneStyle {
    /// Style merged under every new box's options.
    #[serde(default)]
    pub box_default: Style,
    /// Style merged under every new arrow's options.
    #[serde(default = "Style::arrow")]
    pub arrow_default: Style,
}

impl Default for SceneStyle {
    fn default() -> Self {
        Self {
            box_default: Style::default(),
            arrow_default: Style::arrow(),
        }
    }
}

/// Visual style of an entity.
///
/// For arrows, `stroke` colors the curve and `fill` colors the arrowhead.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// Fill color (RGBA, 0.0 - 1.0).
    pub fill: Vec4,
    /// Outline color.
    pub stroke: Vec4,
    /// Label color.
    pub text_color: Vec4,
    /// Font family of the label.
    pub font_family: String,
    /// Font size in surface units.
    pub font_size: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: Vec4::ONE,
            stroke: Vec4::new(0.0, 0.0, 0.0, 1.0),
            text_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            font_family: "Arial".to_string(),
            font_size: 14.0,
        }
    }
}

impl Style {
    /// Default arrow look: black curve, black head.
    pub fn arrow() -> Self {
        Self {
            fill: Vec4::new(0.0, 0.0, 0.0, 1.0),
            ..Self::default()
        }
    }
}
