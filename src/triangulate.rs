//! Incremental Bowyer–Watson Delaunay triangulation.
//!
//! Points are inserted in input order into a triangulation seeded with a
//! single super-triangle. Each insertion removes every triangle whose
//! circumcircle contains the new point, then fans the new point out to the
//! boundary of the removed region. Triangles still touching a
//! super-triangle vertex are dropped at the end.
//!
//! The super-triangle vertices never enter a predicate at their finite
//! positions. Each one is treated as `anchor + λ·ray` for an unbounded λ,
//! where the anchor is a point inside the super-triangle and the ray points
//! at the vertex. An in-circle test against such a vertex is a polynomial in
//! λ, decided by its leading coefficient. The result is therefore the
//! Delaunay triangulation of the input itself, hull included, for any
//! enclosing super-triangle. Exactly collinear inputs triangulate to
//! nothing.

use alloc::vec::Vec;
use core::cmp::Ordering;
use core::ops::{Add, Mul, Sub};

use hashbrown::{HashMap, HashSet};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{DelveError, Result};
use crate::geometry::{Edge, Point, Triangle};

/// Source layout proportions: the super-triangle reaches two box
/// widths/heights past the bounding box of the input.
pub const DEFAULT_SUPER_TRIANGLE_SCALE: f64 = 2.0;

/// Largest accepted scale. The triangulation does not depend on the scale;
/// larger frames only cost precision in the containment check.
pub const MAX_SUPER_TRIANGLE_SCALE: f64 = 1_000.0;

/// Integer lengths tried, coarse first, when rounding the anchor-to-vertex
/// rays. Small integers keep every polynomial coefficient exact.
const RAY_RESOLUTIONS: [f64; 3] = [64.0, 4_096.0, 262_144.0];

/// Synthetic triangle that must strictly enclose every input point. Stored
/// counter-clockwise.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SuperTriangle {
    triangle: Triangle,
}

impl SuperTriangle {
    /// Clockwise input is reordered to `a, c, b`.
    pub fn new(a: Point, b: Point, c: Point) -> Self {
        let triangle = Triangle::new(a, b, c);
        if triangle.signed_double_area() < 0.0 {
            Self {
                triangle: Triangle::new(a, c, b),
            }
        } else {
            Self { triangle }
        }
    }

    /// Builds a triangle around the bounding box of `points`, pushed out by
    /// `scale` box widths/heights on each side. Box sides shorter than one
    /// unit are widened to one.
    ///
    /// Any `scale > 1` strictly encloses the box; at `scale == 2` over a
    /// `w x h` region at the origin the vertices are `(-2w, -2h)`,
    /// `(3w, -2h)` and `(w/2, 3h)`.
    pub fn enclosing(points: &[Point], scale: f64) -> Self {
        let mut min = Point::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        if points.is_empty() {
            min = Point::new(0.0, 0.0);
            max = Point::new(0.0, 0.0);
        }

        let w = (max.x - min.x).max(1.0);
        let h = (max.y - min.y).max(1.0);
        let max_x = min.x + w;
        let max_y = min.y + h;

        Self::new(
            Point::new(min.x - scale * w, min.y - scale * h),
            Point::new(max_x + scale * w, min.y - scale * h),
            Point::new(min.x + w / 2.0, max_y + scale * h),
        )
    }

    #[inline]
    pub fn triangle(&self) -> Triangle {
        self.triangle
    }

    #[inline]
    pub fn vertices(&self) -> [Point; 3] {
        self.triangle.vertices
    }

    #[inline]
    pub fn strictly_contains(&self, p: &Point) -> bool {
        self.triangle.strictly_contains(p)
    }

    /// True if `t` uses any super-triangle vertex.
    #[inline]
    pub fn touches(&self, t: &Triangle) -> bool {
        self.triangle.shares_vertex_with(t)
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Triangulation {
    triangles: Vec<Triangle>,
    super_triangle: SuperTriangle,
}

impl Triangulation {
    /// Counter-clockwise triangles in creation order.
    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn into_triangles(self) -> Vec<Triangle> {
        self.triangles
    }

    #[inline]
    pub fn super_triangle(&self) -> SuperTriangle {
        self.super_triangle
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Triangle sides with shared sides listed once, in first-seen order.
    pub fn edges(&self) -> Vec<Edge> {
        let mut seen = HashSet::with_capacity(self.triangles.len() * 3);
        let mut out = Vec::with_capacity(self.triangles.len() * 2);
        for t in &self.triangles {
            for e in t.edges() {
                if seen.insert(e) {
                    out.push(e);
                }
            }
        }
        out
    }
}

/// Rejects scales outside `(1, MAX_SUPER_TRIANGLE_SCALE]`.
pub(crate) fn check_scale(scale: f64) -> Result<()> {
    if !scale.is_finite() || scale <= 1.0 || scale > MAX_SUPER_TRIANGLE_SCALE {
        return Err(DelveError::InvalidConfig(
            "super-triangle scale must lie in (1, 1000]",
        ));
    }
    Ok(())
}

/// Triangulates `points` inside [`SuperTriangle::enclosing`] with the given
/// scale.
pub fn triangulate(points: &[Point], scale: f64) -> Result<Triangulation> {
    check_scale(scale)?;
    if points.iter().any(|p| !p.is_finite()) {
        return Err(DelveError::InvalidConfig("points must have finite coordinates"));
    }
    triangulate_within(points, SuperTriangle::enclosing(points, scale))
}

/// Triangulates `points` starting from a caller-supplied super-triangle.
///
/// Fails fast if any point is duplicated or not strictly inside
/// `super_triangle`.
pub fn triangulate_within(points: &[Point], super_triangle: SuperTriangle) -> Result<Triangulation> {
    let [a, b, c] = super_triangle.vertices();
    let super_triangle = SuperTriangle::new(a, b, c);
    if super_triangle.triangle.signed_double_area() == 0.0 {
        return Err(DelveError::InvalidConfig("super-triangle is degenerate"));
    }

    let mut seen = HashSet::with_capacity(points.len());
    for p in points {
        if !seen.insert(*p) {
            return Err(DelveError::DuplicatePoint { x: p.x, y: p.y });
        }
        if !super_triangle.strictly_contains(p) {
            return Err(DelveError::PointOutsideSuperTriangle { x: p.x, y: p.y });
        }
    }
    if points.is_empty() {
        return Ok(Triangulation {
            triangles: Vec::new(),
            super_triangle,
        });
    }

    let horizon = Horizon::new(points, &super_triangle)?;
    let mut triangles = alloc::vec![super_triangle.triangle];
    for (step, point) in points.iter().enumerate() {
        let mut bad = Vec::new();
        let mut good = Vec::with_capacity(triangles.len() + 2);
        for t in triangles {
            if horizon.in_conflict(&t, point) {
                bad.push(t);
            } else {
                good.push(t);
            }
        }

        let boundary = cavity_boundary(&bad);
        trace!(step, removed = bad.len(), boundary = boundary.len(), "inserted point");
        good.extend(
            boundary
                .into_iter()
                .map(|edge| Triangle::new(edge.start, edge.end, *point)),
        );
        triangles = good;
    }

    let before = triangles.len();
    triangles.retain(|t| !super_triangle.touches(t));
    debug!(
        points = points.len(),
        triangles = triangles.len(),
        stripped = before - triangles.len(),
        "triangulation complete"
    );

    Ok(Triangulation {
        triangles,
        super_triangle,
    })
}

/// Edges that belong to exactly one of the removed triangles, in first-seen
/// order. Each edge keeps the direction it has in its triangle, so the
/// boundary runs counter-clockwise around the cavity.
fn cavity_boundary(bad: &[Triangle]) -> Vec<Edge> {
    let mut counts: HashMap<Edge, u32> = HashMap::with_capacity(bad.len() * 3);
    let mut order = Vec::with_capacity(bad.len() * 3);
    for t in bad {
        for e in t.edges() {
            let count = counts.entry(e).or_insert(0);
            if *count == 0 {
                order.push(e);
            }
            *count += 1;
        }
    }
    order.retain(|e| counts.get(e) == Some(&1));
    order
}

/// Super-triangle vertices pushed out to infinity: vertex `i` stands for
/// `anchor + λ·rays[i]` with λ unbounded.
#[derive(Clone, Debug)]
struct Horizon {
    vertices: [Point; 3],
    anchor: Point,
    rays: [(f64, f64); 3],
}

impl Horizon {
    /// Picks the first input point whose rays towards the super vertices
    /// pass through no other input point, then a few points just off the
    /// first input point. A ray through two input points would leave them
    /// collinear with a super vertex for every λ.
    fn new(points: &[Point], super_triangle: &SuperTriangle) -> Result<Self> {
        let vertices = super_triangle.vertices();
        let nudged = points.first().into_iter().flat_map(|first| {
            (1..=4u8).flat_map(move |i| {
                (1..=4u8).map(move |j| {
                    Point::new(first.x + f64::from(i) / 32.0, first.y + f64::from(j) / 64.0)
                })
            })
        });
        let candidates = points.iter().map(|p| (*p, 1)).chain(nudged.map(|p| (p, 0)));

        for (anchor, own) in candidates {
            if !super_triangle.strictly_contains(&anchor) {
                continue;
            }
            let Some(rays) = snapped_rays(&vertices, &anchor) else {
                continue;
            };
            let clear = rays.iter().all(|&(dx, dy)| {
                points
                    .iter()
                    .filter(|q| dx * (q.y - anchor.y) - dy * (q.x - anchor.x) == 0.0)
                    .count()
                    <= own
            });
            if clear {
                trace!(x = anchor.x, y = anchor.y, "anchored super-triangle");
                return Ok(Self {
                    vertices,
                    anchor,
                    rays,
                });
            }
        }
        Err(DelveError::InvalidConfig(
            "no anchor point clear of the super-triangle rays",
        ))
    }

    #[inline]
    fn vertex_index(&self, v: &Point) -> Option<usize> {
        self.vertices.iter().position(|s| s == v)
    }

    /// Inclusive in-circle test of `p` against `t`.
    fn in_conflict(&self, t: &Triangle, p: &Point) -> bool {
        let lifted = t.vertices.map(|v| self.vertex_index(&v));
        if lifted.iter().all(Option::is_none) {
            return t.circumcircle_contains(p);
        }

        // Rotate super vertices to the front; cyclic shifts keep the sign.
        let is_super = |k: usize| lifted[k % 3].is_some();
        let first = (0..3)
            .find(|&r| is_super(r) >= is_super(r + 1) && is_super(r + 1) >= is_super(r + 2))
            .unwrap_or(0);
        let [[x1, y1, z1], [x2, y2, z2], [x3, y3, z3]] = [0, 1, 2].map(|k| {
            let i = (first + k) % 3;
            self.row(&t.vertices[i], lifted[i], p)
        });
        let det = x1 * (y2 * z3 - z2 * y3) - y1 * (x2 * z3 - z2 * x3) + z1 * (x2 * y3 - y2 * x3);
        det.sign_at_infinity() != Ordering::Less
    }

    /// `(x, y, x² + y²)` of `v` relative to `p`.
    fn row(&self, v: &Point, lifted: Option<usize>, p: &Point) -> [Poly; 3] {
        let (x, y) = match lifted {
            Some(i) => {
                let (dx, dy) = self.rays[i];
                (
                    Poly::linear(self.anchor.x - p.x, dx),
                    Poly::linear(self.anchor.y - p.y, dy),
                )
            }
            None => (Poly::constant(v.x - p.x), Poly::constant(v.y - p.y)),
        };
        [x, y, x * x + y * y]
    }
}

/// Anchor-to-vertex directions rounded to small integers, at the coarsest
/// resolution that still winds counter-clockwise around the anchor.
fn snapped_rays(vertices: &[Point; 3], anchor: &Point) -> Option<[(f64, f64); 3]> {
    RAY_RESOLUTIONS.iter().find_map(|&resolution| {
        let rays = vertices.map(|v| {
            let dx = v.x - anchor.x;
            let dy = v.y - anchor.y;
            let reach = libm::fmax(libm::fabs(dx), libm::fabs(dy));
            (
                libm::round(dx * resolution / reach),
                libm::round(dy * resolution / reach),
            )
        });
        let winds = (0..3).all(|i| {
            let (ax, ay) = rays[i];
            let (bx, by) = rays[(i + 1) % 3];
            ax * by - ay * bx > 0.0
        });
        winds.then_some(rays)
    })
}

/// Polynomial in λ, lowest degree first. In-circle determinants against
/// super vertices stay within degree 4.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Poly([f64; 5]);

impl Poly {
    const fn constant(c: f64) -> Self {
        Self([c, 0.0, 0.0, 0.0, 0.0])
    }

    const fn linear(c: f64, slope: f64) -> Self {
        Self([c, slope, 0.0, 0.0, 0.0])
    }

    /// Sign for all sufficiently large λ.
    fn sign_at_infinity(&self) -> Ordering {
        match self.0.iter().rev().find(|c| **c != 0.0) {
            Some(c) if *c > 0.0 => Ordering::Greater,
            Some(_) => Ordering::Less,
            None => Ordering::Equal,
        }
    }
}

impl Add for Poly {
    type Output = Poly;

    fn add(self, rhs: Poly) -> Poly {
        Poly(core::array::from_fn(|i| self.0[i] + rhs.0[i]))
    }
}

impl Sub for Poly {
    type Output = Poly;

    fn sub(self, rhs: Poly) -> Poly {
        Poly(core::array::from_fn(|i| self.0[i] - rhs.0[i]))
    }
}

impl Mul for Poly {
    type Output = Poly;

    /// Terms above λ⁴ are dropped.
    fn mul(self, rhs: Poly) -> Poly {
        let mut out = [0.0; 5];
        for (i, a) in self.0.iter().enumerate() {
            for (j, b) in rhs.0.iter().enumerate().take(5 - i) {
                out[i + j] += a * b;
            }
        }
        Poly(out)
    }
}
