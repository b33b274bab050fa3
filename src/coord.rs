use core::ops::Sub;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 2D integer coordinate for grid cells.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Coord2 {
    pub x: i32,
    pub y: i32,
}

impl Coord2 {
    pub const ZERO: Coord2 = Coord2 { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Row-major index of this coordinate inside a `width`-wide grid whose
    /// first cell sits at the origin.
    #[inline]
    pub fn to_index(self, width: u32) -> Option<usize> {
        if width == 0 || self.x < 0 || self.y < 0 || self.x >= width as i32 {
            return None;
        }
        Some((self.y as usize) * (width as usize) + (self.x as usize))
    }
}

impl Sub for Coord2 {
    type Output = Coord2;

    fn sub(self, rhs: Self) -> Self::Output {
        Coord2::new(self.x - rhs.x, self.y - rhs.y)
    }
}
