//! Seeded dungeon layout generation.
//!
//! A rectangular region is cut into rooms by repeated axis-aligned cuts, the
//! room centers are Delaunay-triangulated (Bowyer–Watson), and Kruskal's
//! algorithm keeps the minimum spanning subset of the triangle edges as
//! corridors. The same [`GenerationConfig`] always yields the same
//! [`GenerationResult`].
//!
//! ```
//! use delve::{generate, GenerationConfig};
//!
//! let result = generate(&GenerationConfig::new(48, 32, 10, 7)).unwrap();
//! assert_eq!(result.spanning_edges.len(), result.rooms.len() - 1);
//! ```

#![no_std]

extern crate alloc;

pub mod config;
pub mod coord;
pub mod disjoint_set;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod observer;
pub mod partition;
pub mod pipeline;
pub mod spanning;
pub mod triangulate;

pub use config::{GenerationConfig, TriangulationConfig};
pub use coord::Coord2;
pub use disjoint_set::DisjointSet;
pub use error::{DelveError, Result};
pub use geometry::{in_circle, orient2d, Edge, Point, Triangle};
pub use grid::Grid;
pub use observer::{GenerationObserver, NoOpGenerationObserver};
pub use partition::{
    partition, partition_observed, CutAxis, PartitionConfig, PartitionResult, Room, SplitPolicy,
};
pub use pipeline::{generate, generate_observed, generate_with_rng, CellKind, GenerationResult};
pub use spanning::{complete_graph_edges, minimum_spanning_edges, total_length, unique_edges};
pub use triangulate::{
    triangulate, triangulate_within, SuperTriangle, Triangulation, DEFAULT_SUPER_TRIANGLE_SCALE,
    MAX_SUPER_TRIANGLE_SCALE,
};
