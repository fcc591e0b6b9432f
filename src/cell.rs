//! Cell structure and health behaviour.

use crate::config::CellConfig;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Stable cell identifier, unique within a generation
pub type CellId = usize;

/// Grid coordinate of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Offset by `(dx, dy)`, or `None` if that leaves the `width x height` grid
    pub fn offset(self, dx: i32, dy: i32, width: usize, height: usize) -> Option<Position> {
        let x = self.x.checked_add_signed(dx as isize)?;
        let y = self.y.checked_add_signed(dy as isize)?;
        (x < width && y < height).then_some(Position { x, y })
    }
}

/// A cell in the simulation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub id: CellId,
    pub position: Position,
    pub health: i32,
    /// Effect of the most recent heal
    pub last_health_delta: i32,
}

impl Cell {
    /// Create a cell with explicit health
    pub fn new(id: CellId, position: Position, health: i32) -> Self {
        Self {
            id,
            position,
            health,
            last_health_delta: 0,
        }
    }

    /// Create a cell with starting health drawn from
    /// `[health_min + health_max / 2, health_max)`
    pub fn spawn<R: Rng + ?Sized>(id: CellId, position: Position, rng: &mut R, config: &CellConfig) -> Self {
        let low = config.health_min.saturating_add(config.health_max / 2);
        let health = rng.gen_range(low..config.health_max);
        Self::new(id, position, health)
    }

    /// Apply per-tick health decay, never dropping below `health_min`
    #[inline]
    pub fn tick(&mut self, config: &CellConfig) {
        self.health = self.health.saturating_sub(config.health_decay).max(config.health_min);
    }

    /// Heal by `amount` (or `heal_fallback`), kept within
    /// `[health_min, health_max]`.
    ///
    /// Records and returns the health actually gained.
    pub fn heal(&mut self, amount: Option<i32>, config: &CellConfig) -> i32 {
        let old = self.health;
        let amount = amount.unwrap_or(config.heal_fallback);
        self.health = self
            .health
            .saturating_add(amount)
            .min(config.health_max)
            .max(config.health_min);
        self.last_health_delta = self.health - old;
        self.last_health_delta
    }

    /// Check if the cell is dead under the given bounds
    #[inline]
    pub fn is_dead(&self, config: &CellConfig) -> bool {
        self.health <= config.health_min
    }

    #[inline]
    pub fn is_alive(&self, config: &CellConfig) -> bool {
        !self.is_dead(config)
    }
}
