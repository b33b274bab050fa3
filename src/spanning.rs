use alloc::vec::Vec;

use hashbrown::HashSet;
use tracing::debug;

use crate::disjoint_set::DisjointSet;
use crate::geometry::{Edge, Point};

/// Drops repeated undirected edges, keeping the first occurrence.
pub fn unique_edges(edges: &[Edge]) -> Vec<Edge> {
    let mut seen = HashSet::with_capacity(edges.len());
    edges.iter().copied().filter(|e| seen.insert(*e)).collect()
}

/// Every pair `(points[i], points[j])` with `i < j`, in index order.
pub fn complete_graph_edges(points: &[Point]) -> Vec<Edge> {
    let mut out = Vec::with_capacity(points.len() * points.len().saturating_sub(1) / 2);
    for (i, a) in points.iter().enumerate() {
        for b in &points[i + 1..] {
            out.push(Edge::new(*a, *b));
        }
    }
    out
}

pub fn total_length(edges: &[Edge]) -> f64 {
    edges.iter().map(Edge::length).sum()
}

/// Kruskal's algorithm over the endpoints of `edges`.
///
/// Edges are deduplicated, then stably sorted by Euclidean length so equal
/// lengths keep their input order. The result is a minimum spanning forest:
/// one tree per connected component of the input.
pub fn minimum_spanning_edges(edges: &[Edge]) -> Vec<Edge> {
    let mut candidates = unique_edges(edges);
    candidates.sort_by(|a, b| a.length().total_cmp(&b.length()));

    let mut sets = DisjointSet::with_capacity(candidates.len());
    for e in &candidates {
        sets.make_set(e.start);
        sets.make_set(e.end);
    }
    let vertices = sets.len();

    let mut out = Vec::with_capacity(vertices.saturating_sub(1));
    for e in &candidates {
        if out.len() + 1 >= vertices {
            break;
        }
        if sets.union(&e.start, &e.end) {
            out.push(*e);
        }
    }

    debug!(
        candidates = candidates.len(),
        vertices,
        accepted = out.len(),
        components = sets.set_count(),
        "spanning edges extracted"
    );
    out
}
