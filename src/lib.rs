//! # cellworld
//!
//! Discrete-time grid simulation of cells competing for regenerating food.
//!
//! ## Features
//!
//! - **Deterministic**: seeded ChaCha random number generation
//! - **Explicit**: moves are validated one call at a time, in caller order
//! - **Pluggable**: any [`policy::Policy`] can drive the cells
//! - **Configurable**: YAML configuration files
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cellworld::{Config, World};
//!
//! let mut world = World::new(Config::default()).unwrap();
//!
//! // Move cell 0 one tile to the right, then advance one tick
//! let outcome = world.apply_action(0, 1, 0).unwrap();
//! println!("moved: {}", outcome.accepted());
//! world.tick();
//!
//! println!("Population: {}", world.population());
//! ```
//!
//! ## Episodes
//!
//! ```rust,no_run
//! use cellworld::{Config, World};
//! use cellworld::episode::run_episode;
//! use cellworld::policy::PolicyKind;
//!
//! let config = Config::default();
//! let mut world = World::new_with_seed(config.clone(), 42).unwrap();
//! let policies = (0..config.cells.population)
//!     .map(|id| PolicyKind::Greedy.build(id as u64))
//!     .collect();
//!
//! let report = run_episode(&mut world, policies).unwrap();
//! println!("{}", report.summary());
//! ```

pub mod cell;
pub mod config;
pub mod episode;
pub mod error;
pub mod food;
pub mod grid;
pub mod observation;
pub mod policy;
pub mod stats;
pub mod world;

// Re-export main types
pub use cell::{Cell, CellId, Position};
pub use config::Config;
pub use error::{ConfigError, SimError};
pub use food::FoodTile;
pub use grid::Grid;
pub use observation::Observation;
pub use policy::{Direction, Policy};
pub use world::{MoveOutcome, World};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a quick headless benchmark of bare ticks
pub fn benchmark(ticks: u64, config: Config) -> Result<BenchmarkResult, SimError> {
    use std::time::Instant;

    let population = config.cells.population;
    let mut world = World::new_with_seed(config, 42)?;

    let start = Instant::now();
    for _ in 0..ticks {
        for id in world.cell_ids() {
            // Edge and collision rejections are part of the workload
            world.apply_action(id, 1, 0)?;
        }
        world.tick();
        world.remove_dead();
        if world.is_extinct() {
            world.restart()?;
        }
    }
    let elapsed = start.elapsed();

    Ok(BenchmarkResult {
        ticks,
        population,
        elapsed_secs: elapsed.as_secs_f64(),
        ticks_per_second: ticks as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
    })
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub ticks: u64,
    pub population: usize,
    pub elapsed_secs: f64,
    pub ticks_per_second: f64,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Ticks: {}", self.ticks)?;
        writeln!(f, "Population: {}", self.population)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} ticks/s", self.ticks_per_second)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_quick_simulation() {
        let mut world = World::new(Config::default()).unwrap();

        world.run(100);

        assert_eq!(world.time, 100);
        assert!(world.is_extinct());
    }

    #[test]
    fn test_benchmark() {
        let result = benchmark(100, Config::default()).unwrap();

        assert_eq!(result.ticks, 100);
        assert!(result.ticks_per_second > 0.0);
    }
}
