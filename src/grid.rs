use alloc::vec::Vec;

use crate::coord::Coord2;

/// 2D rectangular grid backed by a flat Vec. Coordinates are local: the
/// first cell is `(0, 0)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid<T> {
    cells: Vec<T>,
    width: u32,
    height: u32,
}

impl<T: Clone> Grid<T> {
    pub fn new_filled(width: u32, height: u32, fill: T) -> Self {
        let len = width as usize * height as usize;
        Self {
            cells: alloc::vec![fill; len],
            width,
            height,
        }
    }

    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, coord: Coord2) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && coord.x < self.width as i32
            && coord.y < self.height as i32
    }

    /// Ignores out-of-bounds writes.
    pub fn set(&mut self, coord: Coord2, value: T) {
        if !self.in_bounds(coord) {
            return;
        }
        if let Some(index) = coord.to_index(self.width) {
            self.cells[index] = value;
        }
    }

    #[inline]
    pub fn cells(&self) -> &[T] {
        &self.cells
    }
}
