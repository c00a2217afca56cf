//! Plane geometry used for hit testing and hit-point projection
//!
//! All coordinates are in display pixels. Points carry no identity.

use serde::{Deserialize, Serialize};

/// A coordinate in the plane
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn minus(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }
}

/// A pointer sample: a point plus its timestamp in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimedPoint {
    pub x: f64,
    pub y: f64,
    /// Timestamp in milliseconds
    pub t: f64,
}

impl TimedPoint {
    pub fn new(x: f64, y: f64, t: f64) -> Self {
        Self { x, y, t }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Result of projecting a point onto a line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// The projected point on the line
    pub point: Point,
    /// Line parameter of the projection (0 at the line start, 1 at the line end).
    ///
    /// `None` when the line has zero length and no axis is defined.
    pub t: Option<f64>,
}

/// Euclidean distance between two points
pub fn distance(a: Point, b: Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Orthogonal projection of `point` onto the infinite line through `start` and `end`
///
/// A zero-length line returns `start` with `t = None`.
pub fn project(start: Point, end: Point, point: Point) -> Projection {
    let axis = end.minus(start);
    let axis_squared = axis.dot(axis);
    if axis_squared == 0.0 {
        return Projection {
            point: start,
            t: None,
        };
    }

    let t = point.minus(start).dot(axis) / axis_squared;
    Projection {
        point: Point::new(start.x + t * axis.x, start.y + t * axis.y),
        t: Some(t),
    }
}

/// Which side of the directed line `start -> end` the point lies on
///
/// Returns `1.0` for the left side and on the line, `-1.0` otherwise.
pub fn is_left(start: Point, end: Point, point: Point) -> f64 {
    let cross = (end.x - start.x) * (point.y - start.y) - (end.y - start.y) * (point.x - start.x);
    if cross >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// `1.0` for non-negative values, `-1.0` otherwise
pub fn sign(value: f64) -> f64 {
    if value >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_distance_symmetric_and_zero_on_self() {
        let pairs = [
            (Point::new(0.0, 0.0), Point::new(3.0, 4.0)),
            (Point::new(-12.5, 7.0), Point::new(310.0, 200.0)),
            (Point::new(1e-3, -1e-3), Point::new(1e-3, -1e-3)),
        ];

        for (a, b) in pairs {
            assert_eq!(distance(a, b), distance(b, a));
            assert_eq!(distance(a, a), 0.0);
            assert_eq!(distance(b, b), 0.0);
        }

        assert!((distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0)) - 5.0).abs() < EPS);
    }

    #[test]
    fn test_project_point_on_segment_is_fixed() {
        let start = Point::new(10.0, 10.0);
        let end = Point::new(110.0, 60.0);

        for fraction in [0.0, 0.25, 0.5, 1.0] {
            let on_line = Point::new(10.0 + 100.0 * fraction, 10.0 + 50.0 * fraction);
            let projection = project(start, end, on_line);

            assert!((projection.point.x - on_line.x).abs() < EPS);
            assert!((projection.point.y - on_line.y).abs() < EPS);
            assert!((projection.t.unwrap() - fraction).abs() < EPS);
        }
    }

    #[test]
    fn test_project_off_axis_point() {
        let projection = project(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(110.0, -7.0),
        );

        assert!((projection.point.x - 110.0).abs() < EPS);
        assert!(projection.point.y.abs() < EPS);
        assert!((projection.t.unwrap() - 1.1).abs() < EPS);
    }

    #[test]
    fn test_project_zero_length_line() {
        let start = Point::new(5.0, 5.0);
        let projection = project(start, start, Point::new(9.0, 1.0));

        assert_eq!(projection.point, start);
        assert!(projection.t.is_none());
    }

    #[test]
    fn test_is_left_antisymmetric() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(100.0, 20.0);

        for p in [
            Point::new(50.0, 40.0),
            Point::new(50.0, -40.0),
            Point::new(-3.0, 1.0),
            Point::new(200.0, 39.0),
        ] {
            assert_eq!(is_left(a, b, p), -is_left(b, a, p));
        }
    }

    #[test]
    fn test_is_left_boundary_counts_as_left() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);

        assert_eq!(is_left(a, b, Point::new(5.0, 0.0)), 1.0);
        assert_eq!(is_left(b, a, Point::new(5.0, 0.0)), 1.0);
    }

    #[test]
    fn test_sign() {
        assert_eq!(sign(0.0), 1.0);
        assert_eq!(sign(2.5), 1.0);
        assert_eq!(sign(-0.1), -1.0);
        assert_eq!(sign(f64::NAN), -1.0);
    }
}
