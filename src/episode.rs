//! Episode driver: runs one generation of policies over a world and keeps
//! the fitness ledger.
//!
//! Each iteration ticks the world every `tick_every` iterations, then walks
//! the surviving cells in id order. Dead cells are penalized once and
//! dropped together with their policy; live cells collect
//! `health_delta_weight * last_health_delta`, observe, decide and move, and
//! lose `illegal_move_penalty` for every blocked or out-of-bounds move.

use crate::cell::CellId;
use crate::config::Config;
use crate::error::SimError;
use crate::policy::Policy;
use crate::world::World;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Policy bound to one cell for the length of an episode
struct Binding {
    id: CellId,
    policy: Box<dyn Policy>,
    fitness: f64,
}

/// Outcome of one episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeReport {
    /// World generation the episode ran in
    pub generation: u64,
    /// Random seed of the world
    pub seed: u64,
    /// Iterations completed
    pub iterations: u64,
    /// Final fitness, indexed by cell id
    pub fitness: Vec<f64>,
    /// Cells that died during the episode
    pub deaths: usize,
    /// Cells still alive when the episode stopped
    pub survivors: usize,
    /// Blocked or out-of-bounds moves
    pub rejected_moves: usize,
}

impl EpisodeReport {
    /// Mean fitness across all cells
    pub fn mean_fitness(&self) -> f64 {
        if self.fitness.is_empty() {
            0.0
        } else {
            self.fitness.iter().sum::<f64>() / self.fitness.len() as f64
        }
    }

    /// Fittest cell and its fitness
    pub fn best(&self) -> Option<(CellId, f64)> {
        self.fitness
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Format as a one-line summary
    pub fn summary(&self) -> String {
        let (best_id, best) = self.best().unwrap_or((0, 0.0));
        format!(
            "Gen:{:4} | Iter:{:4} | Deaths:{:4} | Alive:{:4} | Illegal:{:5} | Fit mean:{:8.2} best:{:8.2} (#{})",
            self.generation,
            self.iterations,
            self.deaths,
            self.survivors,
            self.rejected_moves,
            self.mean_fitness(),
            best,
            best_id
        )
    }
}

/// Restart the world and run one episode with one policy per cell, in id
/// order
pub fn run_episode(world: &mut World, policies: Vec<Box<dyn Policy>>) -> Result<EpisodeReport, SimError> {
    run_episode_with_callback(world, policies, |_, _| {})
}

/// Like [`run_episode`], calling `callback` after every iteration
pub fn run_episode_with_callback<F>(
    world: &mut World,
    policies: Vec<Box<dyn Policy>>,
    mut callback: F,
) -> Result<EpisodeReport, SimError>
where
    F: FnMut(&World, u64),
{
    world.restart()?;

    let ids = world.cell_ids();
    if policies.len() != ids.len() {
        return Err(SimError::PolicyCount {
            expected: ids.len(),
            found: policies.len(),
        });
    }

    let episode = world.config.episode.clone();
    let cell_config = world.config.cells.clone();

    let mut bindings: Vec<Binding> = ids
        .iter()
        .zip(policies)
        .map(|(&id, policy)| Binding { id, policy, fitness: 0.0 })
        .collect();
    let mut fitness = vec![0.0; ids.len()];
    let mut deaths = 0;
    let mut rejected_moves = 0;
    let mut iteration = 0u64;

    while !bindings.is_empty() {
        if iteration % episode.tick_every == 0 {
            world.tick();
        }

        for binding in bindings.iter_mut() {
            let cell = world.cell(binding.id).ok_or(SimError::UnknownCell(binding.id))?;
            if cell.is_dead(&cell_config) {
                binding.fitness -= episode.death_penalty;
                continue;
            }
            binding.fitness += episode.health_delta_weight * cell.last_health_delta as f64;

            let observation = world.observe(binding.id)?;
            let (dx, dy) = binding.policy.decide(&observation).delta();
            if !world.apply_action(binding.id, dx, dy)?.accepted() {
                binding.fitness -= episode.illegal_move_penalty;
                rejected_moves += 1;
            }
        }

        for id in world.remove_dead() {
            if let Some(pos) = bindings.iter().position(|b| b.id == id) {
                let binding = bindings.remove(pos);
                fitness[binding.id] = binding.fitness;
                deaths += 1;
            }
        }

        iteration += 1;
        callback(world, iteration);
        if iteration > episode.max_iterations {
            break;
        }
    }

    let survivors = bindings.len();
    for binding in bindings {
        fitness[binding.id] = binding.fitness;
    }

    log::debug!(
        "Episode finished: generation {}, {} iterations, {} deaths",
        world.generation,
        iteration,
        deaths
    );

    Ok(EpisodeReport {
        generation: world.generation,
        seed: world.seed(),
        iterations: iteration,
        fitness,
        deaths,
        survivors,
        rejected_moves,
    })
}

/// Run one independent episode per seed on the rayon pool.
///
/// `factory(id, seed)` builds the policy for each cell. Each world is
/// driven by a single thread.
pub fn run_seeds<F>(config: &Config, seeds: &[u64], factory: F) -> Result<Vec<EpisodeReport>, SimError>
where
    F: Fn(CellId, u64) -> Box<dyn Policy> + Sync,
{
    seeds
        .par_iter()
        .map(|&seed| {
            let mut world = World::new_with_seed(config.clone(), seed)?;
            let policies = (0..world.config.cells.population)
                .map(|id| factory(id, seed))
                .collect();
            run_episode(&mut world, policies)
        })
        .collect()
}
