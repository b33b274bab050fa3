//! End-to-end generation: partition the region, triangulate the room
//! centers, and keep the minimum spanning subset of the triangulation edges.

use alloc::vec::Vec;

use hashbrown::HashSet;
use rand_chacha::ChaCha8Rng;
use rand_core::{RngCore, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::GenerationConfig;
use crate::coord::Coord2;
use crate::error::{DelveError, Result};
use crate::geometry::{Edge, Point, Triangle};
use crate::grid::Grid;
use crate::observer::{GenerationObserver, NoOpGenerationObserver};
use crate::partition::{partition_observed, Room};
use crate::spanning::{complete_graph_edges, minimum_spanning_edges, total_length};
use crate::triangulate::triangulate;

/// Classification of one region cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CellKind {
    #[default]
    Unassigned,
    Floor,
    Cut,
}

/// Output of one generation run, in region coordinates.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GenerationResult {
    pub region: Room,
    pub rooms: Vec<Room>,
    pub cut_cells: Vec<Coord2>,
    /// Delaunay triangulation of the room centers: counter-clockwise
    /// triangles tiling their convex hull, empty when the centers are
    /// collinear.
    pub triangles: Vec<Triangle>,
    /// Corridors between room centers; a spanning tree when there is more
    /// than one room.
    pub spanning_edges: Vec<Edge>,
    pub cuts_made: u32,
}

impl GenerationResult {
    pub fn room_centers(&self) -> Vec<Point> {
        self.rooms.iter().map(Room::center).collect()
    }

    pub fn total_corridor_length(&self) -> f64 {
        total_length(&self.spanning_edges)
    }

    /// Region-sized grid, indexed from the region origin, marking room cells
    /// as `Floor` and cut-line cells as `Cut`.
    pub fn rasterize(&self) -> Grid<CellKind> {
        let origin = self.region.position();
        let mut grid = Grid::new_filled(self.region.width, self.region.height, CellKind::Unassigned);
        for room in &self.rooms {
            for cell in room.cells() {
                grid.set(cell - origin, CellKind::Floor);
            }
        }
        for &cell in &self.cut_cells {
            grid.set(cell - origin, CellKind::Cut);
        }
        grid
    }
}

/// Runs the pipeline with a `ChaCha8Rng` seeded from `config.seed`.
pub fn generate(config: &GenerationConfig) -> Result<GenerationResult> {
    generate_observed(config, &mut NoOpGenerationObserver)
}

pub fn generate_observed<O: GenerationObserver + ?Sized>(
    config: &GenerationConfig,
    observer: &mut O,
) -> Result<GenerationResult> {
    config.validate()?;
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    run(config, &mut rng, observer)
}

/// Runs the pipeline drawing randomness from `rng`; `config.seed` is ignored.
pub fn generate_with_rng(config: &GenerationConfig, rng: &mut impl RngCore) -> Result<GenerationResult> {
    config.validate()?;
    run(config, rng, &mut NoOpGenerationObserver)
}

fn run<O: GenerationObserver + ?Sized>(
    config: &GenerationConfig,
    rng: &mut impl RngCore,
    observer: &mut O,
) -> Result<GenerationResult> {
    info!(
        width = config.width,
        height = config.height,
        cut_budget = config.cut_budget,
        seed = config.seed,
        "starting generation"
    );

    let region = config.region();
    let parted = partition_observed(
        region.clone(),
        config.cut_budget,
        &config.partition,
        rng,
        &mut *observer,
    )?;

    let centers = collect_centers(&parted.rooms, &mut *observer)?;
    let triangulation = triangulate(&centers, config.triangulation.super_triangle_scale)?;
    for t in triangulation.triangles() {
        observer.on_triangle(t);
    }

    // Fewer than three centers, or collinear ones, leave no triangles.
    let spanning_edges = if triangulation.is_empty() {
        debug!(rooms = centers.len(), "no triangles; spanning the complete graph");
        minimum_spanning_edges(&complete_graph_edges(&centers))
    } else {
        minimum_spanning_edges(&triangulation.edges())
    };
    for e in &spanning_edges {
        observer.on_spanning_edge(e);
    }

    info!(
        rooms = parted.rooms.len(),
        cuts = parted.cuts_made,
        cut_cells = parted.cut_cells.len(),
        triangles = triangulation.len(),
        spanning_edges = spanning_edges.len(),
        "generation complete"
    );

    Ok(GenerationResult {
        region,
        rooms: parted.rooms,
        cut_cells: parted.cut_cells,
        triangles: triangulation.into_triangles(),
        spanning_edges,
        cuts_made: parted.cuts_made,
    })
}

/// Room centers in room order. Two rooms with the same center would merge
/// into one graph vertex, so that is rejected outright.
fn collect_centers<O: GenerationObserver + ?Sized>(rooms: &[Room], observer: &mut O) -> Result<Vec<Point>> {
    let mut seen = HashSet::with_capacity(rooms.len());
    let mut centers = Vec::with_capacity(rooms.len());
    for room in rooms {
        let center = room.center();
        if !seen.insert(center) {
            return Err(DelveError::DuplicateRoomCenter {
                x: center.x,
                y: center.y,
            });
        }
        observer.on_room_center(room, center);
        centers.push(center);
    }
    Ok(centers)
}
