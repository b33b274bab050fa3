//! Value types shared by triangulation and spanning-tree extraction.
//!
//! Points are compared by value after snapping each coordinate to a grid of
//! [`POINT_TOLERANCE`]. Two points that snap to the same cell are the same
//! graph vertex, and every `Eq`/`Hash` impl in this module goes through that
//! snapped key so hash-based collections stay consistent with equality.

use core::hash::{Hash, Hasher};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Grid spacing used to snap coordinates before comparing or hashing points.
pub const POINT_TOLERANCE: f64 = 1e-9;

/// 2D floating-point position, used as a graph vertex.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Snapped integer key; equal keys mean equal points.
    #[inline]
    pub fn key(&self) -> (i64, i64) {
        (snap(self.x), snap(self.y))
    }

    #[inline]
    pub fn distance_squared(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    #[inline]
    pub fn distance(&self, other: &Point) -> f64 {
        libm::sqrt(self.distance_squared(other))
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[inline]
fn snap(v: f64) -> i64 {
    libm::round(v / POINT_TOLERANCE) as i64
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// Undirected segment between two points. `Edge::new(a, b) == Edge::new(b, a)`.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Edge {
    pub start: Point,
    pub end: Point,
}

impl Edge {
    #[inline]
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.start.distance(&self.end)
    }

    fn sorted_keys(&self) -> ((i64, i64), (i64, i64)) {
        let a = self.start.key();
        let b = self.end.key();
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.sorted_keys() == other.sorted_keys()
    }
}

impl Eq for Edge {}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sorted_keys().hash(state);
    }
}

/// Three points and the three edges `ab`, `bc`, `ca` joining them.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Triangle {
    pub vertices: [Point; 3],
}

impl Triangle {
    #[inline]
    pub const fn new(a: Point, b: Point, c: Point) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    #[inline]
    pub fn edges(&self) -> [Edge; 3] {
        let [a, b, c] = self.vertices;
        [Edge::new(a, b), Edge::new(b, c), Edge::new(c, a)]
    }

    #[inline]
    pub fn has_vertex(&self, p: &Point) -> bool {
        self.vertices.iter().any(|v| v == p)
    }

    pub fn shares_vertex_with(&self, other: &Triangle) -> bool {
        other.vertices.iter().any(|v| self.has_vertex(v))
    }

    /// Inclusive: points on the circumcircle count as inside. Zero-area
    /// triangles contain nothing.
    pub fn circumcircle_contains(&self, p: &Point) -> bool {
        let [a, b, c] = self.vertices;
        let area = self.signed_double_area();
        let d = in_circle(&a, &b, &c, p);
        (area > 0.0 && d >= 0.0) || (area < 0.0 && d <= 0.0)
    }

    /// Twice the signed area; positive for counter-clockwise winding.
    #[inline]
    pub fn signed_double_area(&self) -> f64 {
        let [a, b, c] = self.vertices;
        orient2d(&a, &b, &c)
    }

    /// Strict interior test; points on an edge are outside.
    pub fn strictly_contains(&self, p: &Point) -> bool {
        let [a, b, c] = self.vertices;
        let d1 = orient2d(&a, &b, p);
        let d2 = orient2d(&b, &c, p);
        let d3 = orient2d(&c, &a, p);
        (d1 > 0.0 && d2 > 0.0 && d3 > 0.0) || (d1 < 0.0 && d2 < 0.0 && d3 < 0.0)
    }
}

/// Twice the signed area of `abc`: positive when `c` lies left of `a -> b`,
/// zero when the three are collinear.
#[inline]
pub fn orient2d(a: &Point, b: &Point, c: &Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)
}

/// In-circle determinant of `p` against the circle through `a`, `b`, `c`.
///
/// For counter-clockwise `abc` the result is positive inside the circle,
/// zero on it and negative outside; clockwise input flips the sign. Every
/// term is formed from differences against `p`, so the sign is exact while
/// the products of four coordinate differences fit in an `f64` mantissa
/// (half-unit room centers in regions up to a few thousand cells across).
pub fn in_circle(a: &Point, b: &Point, c: &Point, p: &Point) -> f64 {
    let (ax, ay) = (a.x - p.x, a.y - p.y);
    let (bx, by) = (b.x - p.x, b.y - p.y);
    let (cx, cy) = (c.x - p.x, c.y - p.y);
    (ax * ax + ay * ay) * (bx * cy - by * cx) - (bx * bx + by * by) * (ax * cy - ay * cx)
        + (cx * cx + cy * cy) * (ax * by - ay * bx)
}
