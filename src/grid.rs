//! Food grid and occupancy index for collision checks.

use crate::cell::{CellId, Position};
use crate::config::FoodConfig;
use crate::food::FoodTile;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Occupancy index: which cell, if any, sits on each tile
#[derive(Clone, Debug)]
pub struct Occupancy {
    width: usize,
    height: usize,
    slots: Vec<Option<CellId>>,
}

impl Occupancy {
    /// Create an empty index for a `width x height` grid
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            slots: vec![None; width * height],
        }
    }

    /// Clear all entries
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    #[inline]
    fn index(&self, pos: Position) -> Option<usize> {
        (pos.x < self.width && pos.y < self.height).then(|| pos.y * self.width + pos.x)
    }

    /// Record `id` at `pos`
    #[inline]
    pub fn insert(&mut self, pos: Position, id: CellId) {
        if let Some(i) = self.index(pos) {
            self.slots[i] = Some(id);
        }
    }

    /// Free `pos` if `id` holds it
    #[inline]
    pub fn remove(&mut self, pos: Position, id: CellId) {
        if let Some(i) = self.index(pos) {
            if self.slots[i] == Some(id) {
                self.slots[i] = None;
            }
        }
    }

    /// Cell recorded at `pos`
    #[inline]
    pub fn get(&self, pos: Position) -> Option<CellId> {
        self.index(pos).and_then(|i| self.slots[i])
    }

    /// Move `id` from `from` to `to`
    #[inline]
    pub fn relocate(&mut self, id: CellId, from: Position, to: Position) {
        self.remove(from, id);
        self.insert(to, id);
    }

    /// Number of occupied tiles
    pub fn count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

/// Fixed `width x height` array of food tiles, row-major
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<FoodTile>,
}

impl Grid {
    /// Create a grid of empty tiles
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![FoodTile::new(0, 0, 0, 0); width * height],
        }
    }

    /// Create a grid from row-major tiles
    pub fn from_tiles(width: usize, height: usize, tiles: Vec<FoodTile>) -> Option<Self> {
        (tiles.len() == width * height).then_some(Self { width, height, tiles })
    }

    /// Re-randomize every tile
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R, config: &FoodConfig) {
        for tile in &mut self.tiles {
            tile.randomize(rng, config);
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of tiles
    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Tile at position
    #[inline]
    pub fn get(&self, pos: Position) -> Option<&FoodTile> {
        self.contains(pos).then(|| &self.tiles[pos.y * self.width + pos.x])
    }

    /// Mutable tile at position
    #[inline]
    pub fn get_mut(&mut self, pos: Position) -> Option<&mut FoodTile> {
        if self.contains(pos) {
            Some(&mut self.tiles[pos.y * self.width + pos.x])
        } else {
            None
        }
    }

    /// Food count at position, 0 outside the grid
    #[inline]
    pub fn food_at(&self, pos: Position) -> u32 {
        self.get(pos).map_or(0, |t| t.count)
    }

    /// Regenerate every tile
    pub fn tick(&mut self) {
        for tile in &mut self.tiles {
            tile.tick();
        }
    }

    /// All tiles, row-major
    pub fn tiles(&self) -> &[FoodTile] {
        &self.tiles
    }

    /// Mutable access to all tiles, row-major
    pub fn tiles_mut(&mut self) -> &mut [FoodTile] {
        &mut self.tiles
    }

    /// Iterate tiles with their positions
    pub fn iter(&self) -> impl Iterator<Item = (Position, &FoodTile)> + '_ {
        let width = self.width;
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, t)| (Position::new(i % width, i / width), t))
    }

    /// Get total food in the grid
    pub fn total_food(&self) -> u64 {
        self.tiles.iter().map(|t| t.count as u64).sum()
    }
}
