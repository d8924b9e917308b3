//! Planar geometry for zone membership tests

use serde::{Deserialize, Serialize};

/// Tolerance used when testing whether a point lies on a polygon edge
const EDGE_EPSILON: f64 = 1e-9;

/// Point in frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point {
    fn from(xy: [f64; 2]) -> Self {
        Self::new(xy[0], xy[1])
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Closed simple polygon; the last vertex connects back to the first
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    pub fn new(vertices: Vec<Point>) -> Self {
        Self { vertices }
    }

    /// Build a polygon from integer pixel pairs, the usual way zones are authored
    pub fn from_pixels(pixels: &[[i32; 2]]) -> Self {
        Self::new(
            pixels
                .iter()
                .map(|[x, y]| Point::new(*x as f64, *y as f64))
                .collect(),
        )
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// A polygon needs at least three vertices to enclose anything
    pub fn is_degenerate(&self) -> bool {
        self.vertices.len() < 3 || self.area() <= EDGE_EPSILON
    }

    /// Unsigned area (shoelace formula)
    pub fn area(&self) -> f64 {
        let n = self.vertices.len();
        if n < 3 {
            return 0.0;
        }

        let twice: f64 = (0..n)
            .map(|i| {
                let a = &self.vertices[i];
                let b = &self.vertices[(i + 1) % n];
                a.x * b.y - b.x * a.y
            })
            .sum();

        twice.abs() / 2.0
    }

    /// Mean of the vertices
    pub fn center(&self) -> Point {
        if self.vertices.is_empty() {
            return Point::default();
        }
        let n = self.vertices.len() as f64;
        let (sx, sy) = self
            .vertices
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point::new(sx / n, sy / n)
    }

    /// Check if a point is inside this polygon using ray casting.
    /// Points on an edge or vertex count as inside; a degenerate polygon
    /// contains nothing.
    pub fn contains(&self, p: &Point) -> bool {
        if self.is_degenerate() {
            return false;
        }

        let n = self.vertices.len();
        let mut inside = false;
        let mut j = n - 1;

        for i in 0..n {
            let vi = &self.vertices[i];
            let vj = &self.vertices[j];

            if on_segment(p, vi, vj) {
                return true;
            }

            if ((vi.y > p.y) != (vj.y > p.y))
                && (p.x < (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x)
            {
                inside = !inside;
            }
            j = i;
        }

        inside
    }
}

impl From<Vec<Point>> for Polygon {
    fn from(vertices: Vec<Point>) -> Self {
        Self::new(vertices)
    }
}

fn on_segment(p: &Point, a: &Point, b: &Point) -> bool {
    let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
    if cross.abs() > EDGE_EPSILON {
        return false;
    }

    p.x >= a.x.min(b.x) - EDGE_EPSILON
        && p.x <= a.x.max(b.x) + EDGE_EPSILON
        && p.y >= a.y.min(b.y) - EDGE_EPSILON
        && p.y <= a.y.max(b.y) + EDGE_EPSILON
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        Polygon::from_pixels(&[[0, 0], [10, 0], [10, 10], [0, 10]])
    }

    #[test]
    fn test_contains_interior_and_exterior() {
        let poly = square();
        assert!(poly.contains(&Point::new(5.0, 5.0)));
        assert!(!poly.contains(&Point::new(15.0, 5.0)));
        assert!(!poly.contains(&Point::new(-0.5, 5.0)));
    }

    #[test]
    fn test_contains_edges_and_vertices() {
        let poly = square();
        assert!(poly.contains(&Point::new(10.0, 5.0)));
        assert!(poly.contains(&Point::new(5.0, 0.0)));
        assert!(poly.contains(&Point::new(0.0, 0.0)));
        assert!(poly.contains(&Point::new(10.0, 10.0)));
    }

    #[test]
    fn test_contains_concave() {
        // U shape opening upward
        let poly = Polygon::from_pixels(&[
            [0, 0],
            [30, 0],
            [30, 30],
            [20, 30],
            [20, 10],
            [10, 10],
            [10, 30],
            [0, 30],
        ]);

        assert!(poly.contains(&Point::new(5.0, 20.0)));
        assert!(poly.contains(&Point::new(25.0, 20.0)));
        assert!(!poly.contains(&Point::new(15.0, 20.0)));
        assert!(poly.contains(&Point::new(15.0, 5.0)));
    }

    #[test]
    fn test_degenerate_polygon_contains_nothing() {
        let line = Polygon::from_pixels(&[[0, 0], [10, 10]]);
        assert!(line.is_degenerate());
        assert!(!line.contains(&Point::new(5.0, 5.0)));

        let empty = Polygon::default();
        assert!(empty.is_degenerate());
        assert!(!empty.contains(&Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_collinear_polygon_contains_nothing() {
        let flat = Polygon::from_pixels(&[[0, 0], [10, 10], [20, 20]]);
        assert!(flat.is_degenerate());
        assert!(!flat.contains(&Point::new(5.0, 5.0)));
        assert!(!flat.contains(&Point::new(10.0, 10.0)));
        assert!(!flat.contains(&Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_area_and_center() {
        let poly = square();
        assert_eq!(poly.area(), 100.0);
        assert_eq!(poly.center(), Point::new(5.0, 5.0));
    }

    #[test]
    fn test_polygon_deserialize() {
        let poly: Polygon = serde_json::from_str("[[0, 0], [4, 0], [4, 4]]").unwrap();
        assert_eq!(poly.vertices().len(), 3);
        assert_eq!(poly.vertices()[1], Point::new(4.0, 0.0));
    }
}
