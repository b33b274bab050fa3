#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::coord::Coord2;
use crate::error::Result;
use crate::partition::{PartitionConfig, Room, SplitPolicy};
use crate::triangulate::{check_scale, DEFAULT_SUPER_TRIANGLE_SCALE};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TriangulationConfig {
    /// How far the super-triangle reaches past the room-center bounding box,
    /// in box widths/heights. Must lie in `(1, 1000]`. The triangulation
    /// itself does not depend on it.
    pub super_triangle_scale: f64,
}

impl Default for TriangulationConfig {
    fn default() -> Self {
        Self {
            super_triangle_scale: DEFAULT_SUPER_TRIANGLE_SCALE,
        }
    }
}

/// Everything one generation run depends on. Equal configs produce equal
/// results.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GenerationConfig {
    pub width: u32,
    pub height: u32,
    pub cut_budget: u32,
    pub seed: u64,
    /// Bottom-left cell of the region.
    pub origin: Coord2,
    pub partition: PartitionConfig,
    pub triangulation: TriangulationConfig,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 48,
            cut_budget: 12,
            seed: 0,
            origin: Coord2::ZERO,
            partition: PartitionConfig::default(),
            triangulation: TriangulationConfig::default(),
        }
    }
}

impl GenerationConfig {
    pub fn new(width: u32, height: u32, cut_budget: u32, seed: u64) -> Self {
        Self {
            width,
            height,
            cut_budget,
            seed,
            ..Self::default()
        }
    }

    /// Places the region so `center` is its middle cell, or the cell just
    /// past the middle along an even-length side. The origin saturates at
    /// `i32::MIN`; [`validate`](Self::validate) rejects regions that then
    /// run past `i32::MAX`.
    #[must_use]
    pub fn centered_on(mut self, center: Coord2) -> Self {
        let back = |c: i32, len: u32| c.saturating_sub(i32::try_from(len / 2).unwrap_or(i32::MAX));
        self.origin = Coord2::new(back(center.x, self.width), back(center.y, self.height));
        self
    }

    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub const fn with_cut_budget(mut self, cut_budget: u32) -> Self {
        self.cut_budget = cut_budget;
        self
    }

    #[must_use]
    pub const fn with_origin(mut self, origin: Coord2) -> Self {
        self.origin = origin;
        self
    }

    #[must_use]
    pub fn with_split_policy(mut self, policy: SplitPolicy) -> Self {
        self.partition.policy = policy;
        self
    }

    /// The region as a [`Room`] anchored at `origin`.
    pub fn region(&self) -> Room {
        Room::new(self.origin.x, self.origin.y, self.width, self.height)
    }

    pub fn validate(&self) -> Result<()> {
        self.region().validate()?;
        check_scale(self.triangulation.super_triangle_scale)?;
        self.partition.validate()
    }
}
