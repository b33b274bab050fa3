use crate::coord::Coord2;
use crate::geometry::{Edge, Point, Triangle};
use crate::partition::{CutAxis, Room};

/// Hooks for a collaborator that wants to draw or record intermediate
/// generation output. Every method defaults to doing nothing.
pub trait GenerationObserver {
    /// `parent` has just been split; `cells` is the cut line.
    fn on_cut(&mut self, _parent: &Room, _axis: CutAxis, _cells: &[Coord2]) {}
    fn on_room_center(&mut self, _room: &Room, _center: Point) {}
    /// Called once per triangle that survives super-triangle cleanup.
    fn on_triangle(&mut self, _triangle: &Triangle) {}
    fn on_spanning_edge(&mut self, _edge: &Edge) {}
}

pub struct NoOpGenerationObserver;
impl GenerationObserver for NoOpGenerationObserver {}
