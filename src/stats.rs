//! Statistics tracking for the simulation.

use crate::cell::Cell;
use crate::config::CellConfig;
use crate::grid::Grid;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Statistics snapshot for a simulation tick
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Current simulation tick
    pub time: u64,
    /// Live cell count
    pub population: usize,
    /// Mean health across live cells
    pub health_mean: f32,
    /// Lowest health among live cells
    pub health_min: i32,
    /// Highest health among live cells
    pub health_max: i32,
    /// Total food in the world
    pub total_food: u64,
    /// Cells removed since the last restart
    pub deaths: usize,
    /// Moves applied since the last restart
    pub moves_accepted: usize,
    /// Blocked or out-of-bounds moves since the last restart
    pub moves_rejected: usize,
}

impl Stats {
    /// Create new empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Update stats from current simulation state
    pub fn update(&mut self, cells: &[Cell], grid: &Grid, config: &CellConfig) {
        let alive: Vec<&Cell> = cells.iter().filter(|c| c.is_alive(config)).collect();
        self.population = alive.len();

        if alive.is_empty() {
            self.health_mean = 0.0;
            self.health_min = 0;
            self.health_max = 0;
        } else {
            self.health_mean = alive.iter().map(|c| c.health as f32).sum::<f32>() / alive.len() as f32;
            self.health_min = alive.iter().map(|c| c.health).min().unwrap_or(0);
            self.health_max = alive.iter().map(|c| c.health).max().unwrap_or(0);
        }

        self.total_food = grid.total_food();
    }

    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "T:{:6} | Pop:{:4} | HP:{:5.1} [{:3}..{:3}] | Food:{:6} | Moves:{}/{} | Deaths:{}",
            self.time,
            self.population,
            self.health_mean,
            self.health_min,
            self.health_max,
            self.total_food,
            self.moves_accepted,
            self.moves_accepted + self.moves_rejected,
            self.deaths
        )
    }
}

/// Historical statistics tracker
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsHistory {
    /// All recorded stats snapshots
    pub snapshots: Vec<Stats>,
    /// Recording interval
    pub interval: u64,
}

impl StatsHistory {
    /// Create new history with recording interval
    pub fn new(interval: u64) -> Self {
        Self {
            snapshots: Vec::new(),
            interval: interval.max(1),
        }
    }

    /// Record a stats snapshot
    pub fn record(&mut self, stats: Stats) {
        self.snapshots.push(stats);
    }

    /// Get population over time
    pub fn population_series(&self) -> Vec<(u64, usize)> {
        self.snapshots.iter().map(|s| (s.time, s.population)).collect()
    }

    /// Get total food over time
    pub fn food_series(&self) -> Vec<(u64, u64)> {
        self.snapshots.iter().map(|s| (s.time, s.total_food)).collect()
    }

    /// Save history to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)
    }

    /// Load history from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Position;
    use crate::food::FoodTile;

    #[test]
    fn test_stats_update() {
        let config = CellConfig::default();
        let cells = vec![
            Cell::new(0, Position::new(0, 0), 40),
            Cell::new(1, Position::new(1, 0), 80),
            Cell::new(2, Position::new(0, 1), 0),
        ];
        let grid = Grid::from_tiles(2, 1, vec![FoodTile::new(5, 0, 10, 0), FoodTile::new(7, 0, 10, 0)])
            .unwrap();

        let mut stats = Stats::new();
        stats.update(&cells, &grid, &config);

        assert_eq!(stats.population, 2);
        assert_eq!(stats.health_mean, 60.0);
        assert_eq!(stats.health_min, 40);
        assert_eq!(stats.health_max, 80);
        assert_eq!(stats.total_food, 12);
        assert!(stats.summary().contains("Pop:   2"));
    }

    #[test]
    fn test_history_save_load() {
        let mut history = StatsHistory::new(10);
        history.record(Stats {
            time: 10,
            population: 4,
            total_food: 99,
            ..Stats::default()
        });

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        history.save(&path).unwrap();

        let loaded = StatsHistory::load(&path).unwrap();
        assert_eq!(loaded.interval, 10);
        assert_eq!(loaded.population_series(), vec![(10, 4)]);
        assert_eq!(loaded.food_series(), vec![(10, 99)]);
    }
}
