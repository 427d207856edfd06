use glam::Vec2;
use node_canvas::layout::{self, Direction};
use node_canvas::math::{self, Rect};

const MARGIN: f32 = 4.0;

#[test]
fn test_point_in_rectangle() {
    let rect = Rect::new(Vec2::new(10.0, 10.0), Vec2::new(100.0, 50.0));
    let vertices = rect.vertices();

    // Strictly inside
    assert!(math::point_in_polygon(Vec2::new(50.0, 30.0), &vertices));
    assert!(math::point_in_polygon(Vec2::new(109.9, 59.9), &vertices));

    // Strictly outside
    assert!(!math::point_in_polygon(Vec2::new(5.0, 30.0), &vertices));
    assert!(!math::point_in_polygon(Vec2::new(50.0, 61.0), &vertices));
    assert!(!math::point_in_polygon(Vec2::new(200.0, 200.0), &vertices));
}

#[test]
fn test_rectangle_boundary_is_half_open() {
    let rect = Rect::new(Vec2::new(10.0, 10.0), Vec2::new(100.0, 50.0));
    let vertices = rect.vertices();

    // Left and top edges count as inside
    assert!(math::point_in_polygon(Vec2::new(10.0, 30.0), &vertices));
    assert!(math::point_in_polygon(Vec2::new(50.0, 10.0), &vertices));
    assert!(math::point_in_polygon(Vec2::new(10.0, 10.0), &vertices));

    // Right and bottom edges count as outside
    assert!(!math::point_in_polygon(Vec2::new(110.0, 30.0), &vertices));
    assert!(!math::point_in_polygon(Vec2::new(50.0, 60.0), &vertices));
    assert!(!math::point_in_polygon(Vec2::new(110.0, 60.0), &vertices));
}

#[test]
fn test_degenerate_polygon() {
    assert!(!math::point_in_polygon(Vec2::ZERO, &[]));
    assert!(!math::point_in_polygon(
        Vec2::ZERO,
        &[Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0)]
    ));
}

#[test]
fn test_point_on_quadratic_curve() {
    // Elbow from (0,0) to (100,100) bending through (100,0); passes (75,25) at t = 0.5.
    let stops = [Vec2::ZERO, Vec2::new(100.0, 0.0), Vec2::new(100.0, 100.0)];

    assert!(math::point_on_quadratic_curve(&stops, Vec2::new(75.0, 25.0), MARGIN, 150));
    // Within the margin of a sample
    assert!(math::point_on_quadratic_curve(&stops, Vec2::new(75.0, 27.0), MARGIN, 150));

    // More than twice the margin away from the curve
    let off_curve = Vec2::new(75.0, 25.0) - Vec2::new(1.0, -1.0).normalize() * 9.0;
    assert!(!math::point_on_quadratic_curve(&stops, off_curve, MARGIN, 150));
    assert!(!math::point_on_quadratic_curve(&stops, Vec2::new(50.0, 50.0), MARGIN, 150));
}

#[test]
fn test_short_curve_is_sampled_at_midpoint() {
    let stops = [Vec2::ZERO, Vec2::ZERO, Vec2::new(2.0, 0.0)];
    // Midpoint of this curve is (0.5, 0)
    assert!(math::point_on_quadratic_curve(&stops, Vec2::new(0.5, 0.0), MARGIN, 150));
    assert!(!math::point_on_quadratic_curve(&stops, Vec2::new(0.5, 10.0), MARGIN, 150));
}

#[test]
fn test_curve_spec_must_have_three_points() {
    let four = [Vec2::ZERO, Vec2::ONE, Vec2::ONE, Vec2::new(2.0, 2.0)];
    assert!(!math::point_on_quadratic_curve(&four, Vec2::ONE, MARGIN, 150));
    assert!(math::point_on_cubic_curve(&four, Vec2::ONE, MARGIN, 150));
}

#[test]
fn test_point_on_cubic_curve() {
    let start = Vec2::ZERO;
    let end = Vec2::new(200.0, 100.0);
    let (cp1, cp2) = math::calculate_bezier_points(start, end);
    let curve = [start, cp1, cp2, end];

    // Symmetric curve: midpoint is the chord midpoint
    let mid = math::cubic_point(start, cp1, cp2, end, 0.5);
    assert!((mid - Vec2::new(100.0, 50.0)).length() < 1e-3);

    assert!(math::point_on_cubic_curve(&curve, Vec2::new(100.0, 50.0), MARGIN, 150));
    assert!(!math::point_on_cubic_curve(&curve, Vec2::new(100.0, 0.0), MARGIN, 150));
}

#[test]
fn test_arrow_routing_between_level_boxes() {
    let a = Rect::new(Vec2::ZERO, Vec2::new(100.0, 50.0));
    let b = Rect::new(Vec2::new(300.0, 0.0), Vec2::new(100.0, 50.0));
    let (start, end) = (a.center(), b.center());

    assert_eq!(layout::direction(start, end, 5.0), Direction::Right);
    assert_eq!(layout::direction_for_start(start, end, 5.0), Direction::Left);

    // The start leaves through A's right edge, the end lands on B's left edge.
    assert_eq!(
        layout::place_point_on_edge(start, end, a, true, 5.0),
        Vec2::new(100.0, 25.0)
    );
    assert_eq!(
        layout::place_point_on_edge(start, end, b, false, 5.0),
        Vec2::new(300.0, 25.0)
    );
}

#[test]
fn test_direction_asymmetry_is_preserved() {
    let start = Vec2::new(100.0, 100.0);
    let below = Vec2::new(101.0, 300.0);
    // Same pair, different answers depending on which end is being anchored.
    assert_eq!(layout::direction(start, below, 5.0), Direction::Bottom);
    assert_eq!(layout::direction_for_start(start, below, 5.0), Direction::Top);
}
