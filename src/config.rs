//! Configuration system for the cell world.
//!
//! Supports YAML configuration files with defaults matching the classic
//! 1600x900 world of 50px tiles.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub world: WorldConfig,
    pub cells: CellConfig,
    pub food: FoodConfig,
    #[serde(default)]
    pub episode: EpisodeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// World geometry. The grid is `world_width / tile_size` by
/// `world_height / tile_size` tiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// World width in pixels
    pub world_width: usize,
    /// World height in pixels
    pub world_height: usize,
    /// Side of one tile in pixels
    pub tile_size: usize,
}

/// Cell population and health economics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellConfig {
    /// Number of cells spawned on every (re)start
    pub population: usize,
    /// Health at or below which a cell is dead
    pub health_min: i32,
    /// Health ceiling
    pub health_max: i32,
    /// Health lost per tick
    pub health_decay: i32,
    /// Heal amount used when none is given
    pub heal_fallback: i32,
}

/// Food tile economics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodConfig {
    /// Lowest floor a tile may be generated with
    pub min_count: u32,
    /// Upper bound (exclusive) for generated tile ceilings
    pub max_count: u32,
    /// Upper bound (exclusive) for per-tick regeneration
    pub regen_max: u32,
    /// Food removed from a tile by one hit
    pub damage: u32,
    /// Consumed food is divided by this to get health
    pub food_to_health_divisor: u32,
}

/// Episode driver and fitness shaping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeConfig {
    /// Episode stops once this many iterations have run
    pub max_iterations: u64,
    /// World ticks happen every N-th iteration
    pub tick_every: u64,
    /// Fitness gained per point of last health delta
    pub health_delta_weight: f64,
    /// Fitness lost when a cell dies
    pub death_penalty: f64,
    /// Fitness lost per blocked or out-of-bounds move
    pub illegal_move_penalty: f64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Ticks between stats snapshots
    pub stats_interval: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            cells: CellConfig::default(),
            food: FoodConfig::default(),
            episode: EpisodeConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            world_width: 1600,
            world_height: 900,
            tile_size: 50,
        }
    }
}

impl WorldConfig {
    /// Grid width in tiles
    pub fn grid_width(&self) -> usize {
        self.world_width.checked_div(self.tile_size).unwrap_or(0)
    }

    /// Grid height in tiles
    pub fn grid_height(&self) -> usize {
        self.world_height.checked_div(self.tile_size).unwrap_or(0)
    }

    /// Total number of tiles
    pub fn tile_count(&self) -> usize {
        self.grid_width() * self.grid_height()
    }
}

impl Default for CellConfig {
    fn default() -> Self {
        Self {
            population: 50,
            health_min: 0,
            health_max: 100,
            health_decay: 13,
            heal_fallback: 20,
        }
    }
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            min_count: 0,
            max_count: 40,
            regen_max: 6,
            damage: 40,
            food_to_health_divisor: 2,
        }
    }
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tick_every: 3,
            health_delta_weight: 0.1,
            death_penalty: 1.0,
            illegal_move_penalty: 1.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            stats_interval: 50,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.world.tile_size == 0 {
            return invalid("tile_size must be > 0");
        }
        let tiles = self.world.tile_count();
        if tiles == 0 {
            return invalid("world must be at least one tile wide and high");
        }
        if self.cells.population >= tiles {
            return Err(ConfigError::Invalid(format!(
                "population {} must be smaller than the {} tiles of the grid",
                self.cells.population, tiles
            )));
        }
        if self.cells.health_min >= self.cells.health_max {
            return invalid("health_min must be below health_max");
        }
        match self.cells.health_min.checked_add(self.cells.health_max / 2) {
            Some(low) if low < self.cells.health_max => {}
            Some(_) => return invalid("starting health range is empty"),
            None => return invalid("health_min + health_max / 2 overflows"),
        }
        if self.cells.health_decay < 0 {
            return invalid("health_decay must be >= 0");
        }
        if self.cells.heal_fallback < 0 {
            return invalid("heal_fallback must be >= 0");
        }
        if self.food.max_count > i32::MAX as u32 {
            return invalid("max_count must fit in a health value");
        }
        if self.food.food_to_health_divisor == 0 {
            return invalid("food_to_health_divisor must be > 0");
        }
        if self.food.min_count >= self.food.max_count / 3 {
            return invalid("min_count must be below max_count / 3");
        }
        if self.episode.tick_every == 0 {
            return invalid("tick_every must be > 0");
        }
        if self.logging.stats_interval == 0 {
            return invalid("stats_interval must be > 0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.world.grid_width(), 32);
        assert_eq!(config.world.grid_height(), 18);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let loaded: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_population_must_fit_grid() {
        let mut config = Config::default();
        config.world.world_width = 100;
        config.world.world_height = 100;
        config.cells.population = 4;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.cells.population = 3;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_tile_size_rejected() {
        let mut config = Config::default();
        config.world.tile_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_divisor_rejected() {
        let mut config = Config::default();
        config.food.food_to_health_divisor = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_health_overflow_rejected() {
        let mut config = Config::default();
        config.cells.health_min = 1_500_000_000;
        config.cells.health_max = 2_000_000_000;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_oversized_food_rejected() {
        let mut config = Config::default();
        config.food.max_count = u32::MAX;
        config.food.damage = u32::MAX;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.food.max_count = i32::MAX as u32;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_optional_sections_default() {
        let yaml = r#"
world:
  world_width: 200
  world_height: 100
  tile_size: 50
cells:
  population: 3
  health_min: 0
  health_max: 100
  health_decay: 13
  heal_fallback: 20
food:
  min_count: 0
  max_count: 40
  regen_max: 6
  damage: 40
  food_to_health_divisor: 2
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.episode, EpisodeConfig::default());
        assert_eq!(config.world.tile_count(), 8);
        assert!(config.validate().is_ok());
    }
}
