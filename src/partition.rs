use alloc::vec::Vec;

use rand_core::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coord::Coord2;
use crate::error::{DelveError, Result};
use crate::geometry::Point;
use crate::observer::{GenerationObserver, NoOpGenerationObserver};

/// Axis-aligned block of grid cells. `(x, y)` is the bottom-left cell.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Room {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    /// Cells of the cut line this room was split off along, empty for the
    /// root region.
    pub cut_cells: Vec<Coord2>,
}

impl Room {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            cut_cells: Vec::new(),
        }
    }

    /// Checks that the room has cells and that every cell, plus the
    /// exclusive far edge, stays within `i32` coordinates.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(DelveError::EmptyRegion {
                width: self.width,
                height: self.height,
            });
        }
        if i32::try_from(self.width).is_err() || i32::try_from(self.height).is_err() {
            return Err(DelveError::InvalidConfig("region dimensions exceed i32 range"));
        }
        let far_x = i64::from(self.x) + i64::from(self.width);
        let far_y = i64::from(self.y) + i64::from(self.height);
        if far_x > i64::from(i32::MAX) || far_y > i64::from(i32::MAX) {
            return Err(DelveError::InvalidConfig("region extends past i32 coordinates"));
        }
        Ok(())
    }

    #[inline]
    pub fn position(&self) -> Coord2 {
        Coord2::new(self.x, self.y)
    }

    #[inline]
    pub fn center(&self) -> Point {
        Point::new(
            f64::from(self.x) + f64::from(self.width) / 2.0,
            f64::from(self.y) + f64::from(self.height) / 2.0,
        )
    }

    #[inline]
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    #[inline]
    pub fn contains(&self, c: Coord2) -> bool {
        c.x >= self.x
            && c.y >= self.y
            && i64::from(c.x) < i64::from(self.x) + i64::from(self.width)
            && i64::from(c.y) < i64::from(self.y) + i64::from(self.height)
    }

    #[inline]
    pub fn intersects(&self, other: &Room) -> bool {
        let a_right = i64::from(self.x) + i64::from(self.width);
        let a_top = i64::from(self.y) + i64::from(self.height);
        let b_right = i64::from(other.x) + i64::from(other.width);
        let b_top = i64::from(other.y) + i64::from(other.height);

        i64::from(self.x) < b_right
            && i64::from(other.x) < a_right
            && i64::from(self.y) < b_top
            && i64::from(other.y) < a_top
    }

    /// Every cell of the room, row by row from the bottom.
    pub fn cells(&self) -> impl Iterator<Item = Coord2> + '_ {
        (0..self.height as i32)
            .flat_map(move |dy| (0..self.width as i32).map(move |dx| Coord2::new(self.x + dx, self.y + dy)))
    }

    /// Half-open range of legal cut offsets along `axis`, or `None` if a cut
    /// would leave an empty child.
    pub fn split_band(&self, axis: CutAxis, config: &PartitionConfig) -> Option<(u32, u32)> {
        let length = match axis {
            CutAxis::Horizontal => self.height,
            CutAxis::Vertical => self.width,
        };
        let lo = ((f64::from(length) * config.min_fraction) as u32).max(1);
        let hi = ((f64::from(length) * config.max_fraction) as u32).min(length.saturating_sub(1));
        (lo < hi).then_some((lo, hi))
    }

    pub fn is_splittable(&self, config: &PartitionConfig) -> bool {
        self.split_band(CutAxis::Horizontal, config).is_some()
            || self.split_band(CutAxis::Vertical, config).is_some()
    }

    /// Splits at `offset` cells from the bottom (horizontal) or left
    /// (vertical) edge. The row or column at `offset` becomes the cut line and
    /// belongs to neither child.
    ///
    /// `offset` must satisfy `1 <= offset <= length - 2`.
    pub fn split(&self, axis: CutAxis, offset: u32) -> (Room, Room, Vec<Coord2>) {
        let cut = offset as i32;
        let (mut first, mut second, line) = match axis {
            CutAxis::Horizontal => {
                let line: Vec<Coord2> = (0..self.width as i32)
                    .map(|dx| Coord2::new(self.x + dx, self.y + cut))
                    .collect();
                (
                    Room::new(self.x, self.y, self.width, offset),
                    Room::new(self.x, self.y + cut + 1, self.width, self.height.saturating_sub(offset + 1)),
                    line,
                )
            }
            CutAxis::Vertical => {
                let line: Vec<Coord2> = (0..self.height as i32)
                    .map(|dy| Coord2::new(self.x + cut, self.y + dy))
                    .collect();
                (
                    Room::new(self.x, self.y, offset, self.height),
                    Room::new(self.x + cut + 1, self.y, self.width.saturating_sub(offset + 1), self.height),
                    line,
                )
            }
        };
        first.cut_cells = line.clone();
        second.cut_cells = line.clone();
        (first, second, line)
    }
}

/// Orientation of a cut line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CutAxis {
    /// Line runs along x and splits the height.
    Horizontal,
    /// Line runs along y and splits the width.
    Vertical,
}

impl CutAxis {
    #[inline]
    pub const fn other(self) -> Self {
        match self {
            CutAxis::Horizontal => CutAxis::Vertical,
            CutAxis::Vertical => CutAxis::Horizontal,
        }
    }
}

/// Which room of the pool receives the next cut.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SplitPolicy {
    /// Uniformly random among rooms that can still be split.
    #[default]
    Uniform,
    /// Splittable room with the largest area; ties go to the earliest room.
    Largest,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PartitionConfig {
    /// Lower bound of the cut band as a fraction of the axis length.
    pub min_fraction: f64,
    /// Exclusive upper bound of the cut band.
    pub max_fraction: f64,
    /// Chance of a horizontal cut when the room is not taller than wide.
    pub horizontal_bias: f64,
    pub policy: SplitPolicy,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            min_fraction: 0.2,
            max_fraction: 0.8,
            horizontal_bias: 0.5,
            policy: SplitPolicy::Uniform,
        }
    }
}

impl PartitionConfig {
    pub fn validate(&self) -> Result<()> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !in_unit(self.min_fraction) || !in_unit(self.max_fraction) {
            return Err(DelveError::InvalidConfig("cut fractions must lie in [0, 1]"));
        }
        if self.min_fraction >= self.max_fraction {
            return Err(DelveError::InvalidConfig(
                "min_fraction must be below max_fraction",
            ));
        }
        if !in_unit(self.horizontal_bias) {
            return Err(DelveError::InvalidConfig("horizontal_bias must lie in [0, 1]"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PartitionResult {
    pub rooms: Vec<Room>,
    /// Every cut-line cell, in cut order.
    pub cut_cells: Vec<Coord2>,
    pub cuts_made: u32,
}

pub fn partition(
    region: Room,
    cut_budget: u32,
    config: &PartitionConfig,
    rng: &mut impl RngCore,
) -> Result<PartitionResult> {
    partition_observed(region, cut_budget, config, rng, &mut NoOpGenerationObserver)
}

/// Cuts `region` up to `cut_budget` times. Stops early, without error, once
/// no room in the pool can be split.
pub fn partition_observed<O: GenerationObserver + ?Sized>(
    region: Room,
    cut_budget: u32,
    config: &PartitionConfig,
    rng: &mut impl RngCore,
    observer: &mut O,
) -> Result<PartitionResult> {
    config.validate()?;
    region.validate()?;

    let mut out = PartitionResult {
        rooms: alloc::vec![region],
        ..PartitionResult::default()
    };

    while out.cuts_made < cut_budget {
        let Some(index) = pick_room(&out.rooms, config, rng) else {
            debug!(
                cuts_made = out.cuts_made,
                cut_budget, "no splittable room left; stopping early"
            );
            break;
        };
        let Some(axis) = choose_axis(&out.rooms[index], config, rng) else {
            break;
        };
        let Some((lo, hi)) = out.rooms[index].split_band(axis, config) else {
            break;
        };

        let room = out.rooms.remove(index);
        let offset = rand_range_u32(rng, lo, hi - 1);
        let (first, second, line) = room.split(axis, offset);
        debug!(
            ?axis,
            offset,
            x = room.x,
            y = room.y,
            width = room.width,
            height = room.height,
            "cut room"
        );
        observer.on_cut(&room, axis, &line);

        out.cut_cells.extend_from_slice(&line);
        out.rooms.push(first);
        out.rooms.push(second);
        out.cuts_made += 1;
    }

    Ok(out)
}

fn pick_room(rooms: &[Room], config: &PartitionConfig, rng: &mut impl RngCore) -> Option<usize> {
    match config.policy {
        SplitPolicy::Uniform => {
            let candidates: Vec<usize> = rooms
                .iter()
                .enumerate()
                .filter(|(_, room)| room.is_splittable(config))
                .map(|(i, _)| i)
                .collect();
            match candidates.len() {
                0 => None,
                1 => Some(candidates[0]),
                n => Some(candidates[(rng.next_u32() as usize) % n]),
            }
        }
        SplitPolicy::Largest => {
            let mut best: Option<(usize, u64)> = None;
            for (i, room) in rooms.iter().enumerate() {
                if !room.is_splittable(config) {
                    continue;
                }
                if best.map_or(true, |(_, area)| room.area() > area) {
                    best = Some((i, room.area()));
                }
            }
            best.map(|(i, _)| i)
        }
    }
}

fn choose_axis(room: &Room, config: &PartitionConfig, rng: &mut impl RngCore) -> Option<CutAxis> {
    let preferred = if room.height > room.width || rand01(rng) < config.horizontal_bias {
        CutAxis::Horizontal
    } else {
        CutAxis::Vertical
    };
    [preferred, preferred.other()]
        .into_iter()
        .find(|axis| room.split_band(*axis, config).is_some())
}

fn rand_range_u32(rng: &mut impl RngCore, min: u32, max: u32) -> u32 {
    if min >= max {
        return min;
    }
    let span = max - min + 1;
    min + (rng.next_u32() % span)
}

fn rand01(rng: &mut impl RngCore) -> f64 {
    f64::from(rng.next_u32()) / f64::from(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashbrown::HashSet;

    struct TestRng(u64);

    impl RngCore for TestRng {
        fn next_u32(&mut self) -> u32 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (self.0 >> 32) as u32
        }
        fn next_u64(&mut self) -> u64 {
            ((self.next_u32() as u64) << 32) | self.next_u32() as u64
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            rand_core::impls::fill_bytes_via_next(self, dest);
        }
        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> core::result::Result<(), rand_core::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    fn assert_tiles(region: &Room, result: &PartitionResult) {
        let mut seen = HashSet::new();
        for room in &result.rooms {
            assert!(room.width >= 1 && room.height >= 1);
            for cell in room.cells() {
                assert!(region.contains(cell));
                assert!(seen.insert(cell), "cell {cell:?} covered twice");
            }
        }
        for &cell in &result.cut_cells {
            assert!(region.contains(cell));
            assert!(seen.insert(cell), "cut cell {cell:?} overlaps");
        }
        assert_eq!(seen.len() as u64, region.area());
    }

    #[test]
    fn single_cut_makes_two_rooms() {
        let region = Room::new(0, 0, 20, 20);
        let mut rng = TestRng(42);
        let result = partition(region.clone(), 1, &PartitionConfig::default(), &mut rng).unwrap();
        assert_eq!(result.rooms.len(), 2);
        assert_eq!(result.cuts_made, 1);
        assert_eq!(result.cut_cells.len(), 20);
        assert_tiles(&region, &result);
    }

    #[test]
    fn rooms_tile_region() {
        for seed in 0..200u64 {
            let mut rng = TestRng(seed);
            let width = 1 + (seed % 47) as u32;
            let height = 1 + (seed % 31) as u32;
            let region = Room::new(-(width as i32) / 2, -(height as i32) / 2, width, height);
            let budget = (seed % 25) as u32;
            let result = partition(region.clone(), budget, &PartitionConfig::default(), &mut rng).unwrap();
            assert!(result.cuts_made <= budget);
            assert_eq!(result.rooms.len() as u32, result.cuts_made + 1);
            assert_tiles(&region, &result);
        }
    }

    #[test]
    fn rooms_never_overlap() {
        let region = Room::new(0, 0, 64, 48);
        let mut rng = TestRng(12345);
        let result = partition(region, 20, &PartitionConfig::default(), &mut rng).unwrap();
        for i in 0..result.rooms.len() {
            for j in (i + 1)..result.rooms.len() {
                assert!(!result.rooms[i].intersects(&result.rooms[j]));
            }
        }
    }

    #[test]
    fn stops_early_on_small_region() {
        let mut rng = TestRng(7);
        let result = partition(Room::new(0, 0, 1, 1), 5, &PartitionConfig::default(), &mut rng).unwrap();
        assert_eq!(result.cuts_made, 0);
        assert_eq!(result.rooms, alloc::vec![Room::new(0, 0, 1, 1)]);

        let result = partition(Room::new(0, 0, 3, 1), 5, &PartitionConfig::default(), &mut rng).unwrap();
        assert_eq!(result.cuts_made, 1);
        assert_eq!(result.cut_cells, alloc::vec![Coord2::new(1, 0)]);
    }

    #[test]
    fn exhausts_splittable_rooms() {
        let region = Room::new(0, 0, 10, 10);
        let mut rng = TestRng(3);
        let config = PartitionConfig::default();
        let result = partition(region.clone(), 1000, &config, &mut rng).unwrap();
        assert!(result.cuts_made < 1000);
        assert!(result.rooms.iter().all(|r| !r.is_splittable(&config)));
        assert_tiles(&region, &result);
    }

    #[test]
    fn tall_rooms_cut_horizontally() {
        let mut rng = TestRng(11);
        let result = partition(Room::new(0, 0, 5, 40), 1, &PartitionConfig::default(), &mut rng).unwrap();
        assert!(result.rooms.iter().all(|r| r.width == 5));
        assert!(result.cut_cells.iter().all(|c| c.y == result.cut_cells[0].y));
    }

    #[test]
    fn cut_offset_stays_in_band() {
        for seed in 0..100u64 {
            let mut rng = TestRng(seed);
            let result = partition(Room::new(0, 0, 5, 50), 1, &PartitionConfig::default(), &mut rng).unwrap();
            let y = result.cut_cells[0].y;
            assert!((10..40).contains(&y), "offset {y} outside band");
        }
    }

    #[test]
    fn children_record_their_cut_line() {
        let mut rng = TestRng(5);
        let result = partition(Room::new(0, 0, 30, 30), 1, &PartitionConfig::default(), &mut rng).unwrap();
        for room in &result.rooms {
            assert_eq!(room.cut_cells, result.cut_cells);
        }
    }

    #[test]
    fn split_leaves_one_cell_gap() {
        let room = Room::new(2, 3, 10, 6);
        let (a, b, line) = room.split(CutAxis::Vertical, 4);
        assert_eq!((a.x, a.width), (2, 4));
        assert_eq!((b.x, b.width), (7, 5));
        assert_eq!(line.len(), 6);
        assert!(line.iter().all(|c| c.x == 6));
    }

    #[test]
    fn largest_policy_targets_biggest_room() {
        let config = PartitionConfig {
            policy: SplitPolicy::Largest,
            ..PartitionConfig::default()
        };
        let mut rng = TestRng(21);
        let result = partition(Room::new(0, 0, 40, 40), 2, &config, &mut rng).unwrap();
        let (first_cut, second_cut) = result.cut_cells.split_at(40);
        // The smaller child of the first cut is left untouched at the front.
        let untouched = &result.rooms[0];
        assert_eq!(untouched.cut_cells.as_slice(), first_cut);
        let split_area = result.rooms[1].area() + result.rooms[2].area() + second_cut.len() as u64;
        assert!(untouched.area() <= split_area);
    }

    #[test]
    fn same_seed_same_partition() {
        let region = Room::new(0, 0, 48, 32);
        let a = partition(region.clone(), 10, &PartitionConfig::default(), &mut TestRng(77)).unwrap();
        let b = partition(region, 10, &PartitionConfig::default(), &mut TestRng(77)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_bad_config() {
        let config = PartitionConfig {
            min_fraction: 0.8,
            max_fraction: 0.2,
            ..PartitionConfig::default()
        };
        let err = partition(Room::new(0, 0, 10, 10), 1, &config, &mut TestRng(1)).unwrap_err();
        assert!(matches!(err, DelveError::InvalidConfig(_)));

        let err = partition(Room::new(0, 0, 0, 10), 1, &PartitionConfig::default(), &mut TestRng(1)).unwrap_err();
        assert_eq!(err, DelveError::EmptyRegion { width: 0, height: 10 });
    }

    #[test]
    fn rejects_regions_past_i32_coordinates() {
        let config = PartitionConfig::default();
        let near_edge = Room::new(i32::MAX - 5, 0, 20, 20);
        let err = partition(near_edge, 3, &config, &mut TestRng(1)).unwrap_err();
        assert!(matches!(err, DelveError::InvalidConfig(_)));

        let too_wide = Room::new(0, 0, u32::MAX, 3);
        let err = partition(too_wide, 1, &config, &mut TestRng(1)).unwrap_err();
        assert!(matches!(err, DelveError::InvalidConfig(_)));

        let below_origin = Room::new(i32::MIN, i32::MIN, 40, 40);
        assert_eq!(below_origin.validate(), Ok(()));
        let result = partition(below_origin, 4, &config, &mut TestRng(1)).unwrap();
        assert_eq!(result.cuts_made, 4);
    }

    #[test]
    fn region_may_end_exactly_at_i32_max() {
        let flush = Room::new(i32::MAX - 20, i32::MAX - 20, 20, 20);
        assert_eq!(flush.validate(), Ok(()));
        let result = partition(flush, 3, &PartitionConfig::default(), &mut TestRng(9)).unwrap();
        let area: u64 = result.rooms.iter().map(Room::area).sum();
        assert_eq!(area + result.cut_cells.len() as u64, 400);
    }
}
