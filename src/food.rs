//! Food tiles: consumable, regenerating food held by every grid tile.

use crate::config::FoodConfig;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Food held by one grid tile
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodTile {
    /// Current food units
    pub count: u32,
    /// Floor for consumption
    pub min: u32,
    /// Ceiling for regeneration
    pub max: u32,
    /// Food regained per tick
    pub regen_per_tick: u32,
    /// Reserved for special tiles; never set on playable tiles
    pub is_magic: bool,
}

impl FoodTile {
    /// Create a tile with explicit values.
    ///
    /// `count` is clamped into `[min, max]`.
    pub fn new(count: u32, min: u32, max: u32, regen_per_tick: u32) -> Self {
        debug_assert!(min <= max, "food tile min {} above max {}", min, max);
        Self {
            count: count.clamp(min, max),
            min,
            max,
            regen_per_tick,
            is_magic: false,
        }
    }

    /// Create a tile with randomized bounds and count
    pub fn random<R: Rng + ?Sized>(rng: &mut R, config: &FoodConfig) -> Self {
        let mut tile = Self::new(0, 0, 0, 0);
        tile.randomize(rng, config);
        tile
    }

    /// Draw fresh bounds, regeneration rate and count.
    ///
    /// `min` comes from `[min_count, max_count / 3)`, `max` from
    /// `[min, max_count)`, `regen_per_tick` from `[0, regen_max)` and `count`
    /// from `[min, max]`.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R, config: &FoodConfig) {
        self.min = rng.gen_range(config.min_count..config.max_count / 3);
        self.max = rng.gen_range(self.min..config.max_count);
        self.regen_per_tick = if config.regen_max > 0 {
            rng.gen_range(0..config.regen_max)
        } else {
            0
        };
        self.count = rng.gen_range(self.min..=self.max);
        self.is_magic = false;
    }

    /// Consume up to `damage` units without going below `min`.
    ///
    /// Returns the amount actually removed.
    #[inline]
    pub fn hit(&mut self, damage: u32) -> u32 {
        let old = self.count;
        self.count = old.saturating_sub(damage).max(self.min);
        old - self.count
    }

    /// Regenerate, saturating at `max`
    #[inline]
    pub fn tick(&mut self) {
        self.count = self.count.saturating_add(self.regen_per_tick).min(self.max);
    }
}
