//! Plane geometry helpers in canvas space.
//!
//! Angles in this module use the canvas rotation convention: 0° points
//! towards +y (down on screen) and angles grow clockwise, the same sense as a
//! CSS `rotateZ` transform.

use kurbo::{Affine, Point};

/// Number of decimal digits kept when converting between pixels and canvas fractions.
pub const ROUNDING_DECIMALS: i32 = 4;

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    a.distance(b)
}

/// Angle of the vector `start → end` in canvas degrees, in `[0, 360)`.
///
/// Axis-aligned pairs are resolved without `atan2` so they come out as
/// exactly 0, 90, 180 or 270. Equal points give 0.
pub fn angle_between(start: Point, end: Point) -> f64 {
    if start.x == end.x {
        return if start.y <= end.y { 0.0 } else { 180.0 };
    }

    if start.y == end.y {
        return if start.x < end.x { 270.0 } else { 90.0 };
    }

    let degrees = (end.y - start.y).atan2(end.x - start.x).to_degrees();
    (degrees + 270.0) % 360.0
}

/// Rotate `point` about `origin` by `degrees` (clockwise on screen).
pub fn rotate_point(point: Point, origin: Point, degrees: f64) -> Point {
    Affine::rotate_about(degrees.to_radians(), origin) * point
}

/// Bring any angle into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if normalized >= 360.0 { 0.0 } else { normalized }
}

/// Convert a canvas rotation into a compass course (0 = north).
pub fn canvas_to_course_degrees(canvas_degrees: f64) -> f64 {
    normalize_degrees(canvas_degrees + 180.0)
}

/// Round to [`ROUNDING_DECIMALS`] decimal digits.
pub fn round4(value: f64) -> f64 {
    let factor = 10f64.powi(ROUNDING_DECIMALS);
    (value * factor).round() / factor
}

/// Whether `p` lies inside triangle `abc` or on one of its edges.
pub fn point_in_triangle(p: Point, a: Point, b: Point, c: Point) -> bool {
    let d1 = signed_area(p, a, b);
    let d2 = signed_area(p, b, c);
    let d3 = signed_area(p, c, a);

    let has_negative = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_positive = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;

    !(has_negative && has_positive)
}

fn signed_area(a: Point, b: Point, c: Point) -> f64 {
    (a.x - c.x) * (b.y - c.y) - (b.x - c.x) * (a.y - c.y)
}

/// Slope/intercept form `y = slope * x + intercept`.
///
/// For vertical lines both values are NaN; check [`Line::is_vertical`] first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineEquation {
    pub slope: f64,
    pub intercept: f64,
}

/// An infinite line through two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub start: Point,
    pub end: Point,
}

impl Line {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn is_vertical(&self) -> bool {
        self.start.x == self.end.x
    }

    pub fn is_horizontal(&self) -> bool {
        self.start.y == self.end.y
    }

    /// `(y2 - y1) / (x2 - x1)`, NaN when vertical.
    pub fn slope(&self) -> f64 {
        let dx = self.end.x - self.start.x;
        if dx != 0.0 {
            (self.end.y - self.start.y) / dx
        } else {
            f64::NAN
        }
    }

    /// Where the line crosses x = 0, NaN when vertical.
    pub fn y_intercept(&self) -> f64 {
        let slope = self.slope();
        if slope.is_nan() {
            return f64::NAN;
        }
        self.start.y - self.start.x * slope
    }

    /// Where the line crosses y = 0. Vertical lines return their x,
    /// horizontal lines return NaN.
    pub fn x_intercept(&self) -> f64 {
        let slope = self.slope();
        if slope.is_nan() {
            return self.start.x;
        }
        if slope == 0.0 {
            return f64::NAN;
        }
        -self.y_intercept() / slope
    }

    pub fn equation(&self) -> LineEquation {
        LineEquation {
            slope: self.slope(),
            intercept: self.y_intercept(),
        }
    }
}

/// Foot of the perpendicular from `point` onto the infinite `line`.
pub fn closest_point_on_line(line: &Line, point: Point) -> Point {
    if line.is_vertical() {
        return Point::new(line.start.x, point.y);
    }

    if line.is_horizontal() {
        return Point::new(point.x, line.start.y);
    }

    let direction = line.end - line.start;
    let t = (point - line.start).dot(direction) / direction.hypot2();
    line.start + direction * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_point_eq(actual: Point, expected: Point) {
        assert!(
            (actual.x - expected.x).abs() < 1e-9 && (actual.y - expected.y).abs() < 1e-9,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn test_distance() {
        assert!((distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0)) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_angle_between_same_point_is_zero() {
        let p = Point::new(12.5, -3.0);
        assert_eq!(angle_between(p, p), 0.0);
    }

    #[test]
    fn test_angle_between_axis_aligned_is_exact() {
        let c = Point::new(100.0, 100.0);
        assert_eq!(angle_between(c, Point::new(100.0, 150.0)), 0.0);
        assert_eq!(angle_between(c, Point::new(50.0, 100.0)), 90.0);
        assert_eq!(angle_between(c, Point::new(100.0, 20.0)), 180.0);
        assert_eq!(angle_between(c, Point::new(130.0, 100.0)), 270.0);
    }

    #[test]
    fn test_angle_between_diagonals() {
        let c = Point::ZERO;
        assert!((angle_between(c, Point::new(1.0, 1.0)) - 315.0).abs() < 1e-9);
        assert!((angle_between(c, Point::new(-1.0, 1.0)) - 45.0).abs() < 1e-9);
        assert!((angle_between(c, Point::new(-1.0, -1.0)) - 135.0).abs() < 1e-9);
        assert!((angle_between(c, Point::new(1.0, -1.0)) - 225.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotate_point_identity() {
        let p = Point::new(3.0, 7.0);
        let origin = Point::new(1.0, 1.0);
        assert_point_eq(rotate_point(p, origin, 0.0), p);
        assert_point_eq(rotate_point(p, origin, 360.0), p);
    }

    #[test]
    fn test_rotate_point_matches_angle_convention() {
        // A point straight below the origin sits at 0°; rotating it by 90°
        // must land where angle_between reports 90°.
        let origin = Point::new(10.0, 10.0);
        let rotated = rotate_point(Point::new(10.0, 20.0), origin, 90.0);
        assert_point_eq(rotated, Point::new(0.0, 10.0));
        assert_eq!(angle_between(origin, Point::new(0.0, 10.0)), 90.0);
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(720.0), 0.0);
        assert_eq!(normalize_degrees(359.5), 359.5);
    }

    #[test]
    fn test_course_degrees() {
        assert_eq!(canvas_to_course_degrees(180.0), 0.0);
        assert_eq!(canvas_to_course_degrees(0.0), 180.0);
        assert_eq!(canvas_to_course_degrees(270.0), 90.0);
    }

    #[test]
    fn test_round4() {
        assert_eq!(round4(0.123456), 0.1235);
        assert_eq!(round4(2.0), 2.0);
    }

    #[test]
    fn test_point_in_triangle() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        let c = Point::new(0.0, 10.0);
        let centroid = Point::new(10.0 / 3.0, 10.0 / 3.0);

        assert!(point_in_triangle(centroid, a, b, c));
        assert!(point_in_triangle(Point::new(5.0, 0.0), a, b, c)); // on an edge
        assert!(!point_in_triangle(Point::new(100.0, 100.0), a, b, c));
        assert!(!point_in_triangle(Point::new(6.0, 6.0), a, b, c));
    }

    #[test]
    fn test_line_properties() {
        let vertical = Line::new(Point::new(3.0, 0.0), Point::new(3.0, 9.0));
        assert!(vertical.is_vertical());
        assert!(vertical.slope().is_nan());
        assert!(vertical.equation().intercept.is_nan());
        assert_eq!(vertical.x_intercept(), 3.0);

        let horizontal = Line::new(Point::new(0.0, 2.0), Point::new(5.0, 2.0));
        assert!(horizontal.is_horizontal());
        assert_eq!(horizontal.slope(), 0.0);
        assert!(horizontal.x_intercept().is_nan());

        let diagonal = Line::new(Point::new(0.0, 1.0), Point::new(1.0, 2.0));
        let eq = diagonal.equation();
        assert!((eq.slope - 1.0).abs() < f64::EPSILON);
        assert!((eq.intercept - 1.0).abs() < f64::EPSILON);
        assert!((diagonal.x_intercept() + 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_closest_point_on_vertical_and_horizontal_lines() {
        let vertical = Line::new(Point::new(3.0, 0.0), Point::new(3.0, 10.0));
        assert_point_eq(closest_point_on_line(&vertical, Point::new(7.0, 4.0)), Point::new(3.0, 4.0));

        let horizontal = Line::new(Point::new(0.0, 2.0), Point::new(5.0, 2.0));
        assert_point_eq(closest_point_on_line(&horizontal, Point::new(4.0, 9.0)), Point::new(4.0, 2.0));
    }

    #[test]
    fn test_closest_point_is_perpendicular_foot() {
        let line = Line::new(Point::new(0.0, 1.0), Point::new(1.0, 2.0));
        let p = Point::new(2.0, 0.0);
        let foot = closest_point_on_line(&line, p);

        assert_point_eq(foot, Point::new(0.5, 1.5));
        // foot satisfies y = slope * x + intercept
        let eq = line.equation();
        assert!((foot.y - (eq.slope * foot.x + eq.intercept)).abs() < 1e-9);
        // and p - foot is orthogonal to the line
        assert!((p - foot).dot(line.end - line.start).abs() < 1e-9);
    }

    #[test]
    fn test_closest_point_of_point_on_line_is_itself() {
        let line = Line::new(Point::new(-4.0, 3.0), Point::new(8.0, -6.0));
        let on_line = Point::new(4.0, -3.0);
        assert_point_eq(closest_point_on_line(&line, on_line), on_line);
    }
}
