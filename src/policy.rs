//! Decision policies: turn an observation into a move direction.
//!
//! The engine never depends on a policy; drivers map the chosen
//! [`Direction`] to a step and call `World::apply_action`.

use crate::observation::Observation;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// The four moves a policy may choose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Left,
    Down,
    Right,
}

impl Direction {
    /// All directions in output-index order
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Left, Direction::Down, Direction::Right];

    /// Step `(dx, dy)` for this direction; y grows downward
    #[inline]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Down => (0, 1),
            Direction::Right => (1, 0),
        }
    }

    /// Direction for an output index (0 = up, 1 = left, 2 = down, 3 = right)
    pub fn from_index(index: usize) -> Option<Direction> {
        Self::ALL.get(index).copied()
    }

    /// Decode network outputs by argmax; ties go to the lowest index.
    /// Returns `None` unless exactly four finite outputs are given.
    pub fn from_outputs(outputs: &[f32]) -> Option<Direction> {
        if outputs.len() != Self::ALL.len() || outputs.iter().any(|v| !v.is_finite()) {
            return None;
        }
        let mut best = 0;
        for (i, &v) in outputs.iter().enumerate().skip(1) {
            if v > outputs[best] {
                best = i;
            }
        }
        Self::from_index(best)
    }
}

/// Chooses a direction for one cell each iteration
pub trait Policy {
    fn decide(&mut self, observation: &Observation) -> Direction;
}

impl<F> Policy for F
where
    F: FnMut(&Observation) -> Direction,
{
    fn decide(&mut self, observation: &Observation) -> Direction {
        self(observation)
    }
}

/// Uniformly random moves from a seeded generator
pub struct RandomPolicy {
    rng: ChaCha8Rng,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn decide(&mut self, _observation: &Observation) -> Direction {
        *Direction::ALL
            .choose(&mut self.rng)
            .unwrap_or(&Direction::Up)
    }
}

/// Steps onto the richest free neighbouring tile.
///
/// Falls back to the first in-bounds direction when every neighbour is
/// blocked, so the move may still be rejected.
#[derive(Debug, Default, Clone)]
pub struct GreedyPolicy;

impl Policy for GreedyPolicy {
    fn decide(&mut self, observation: &Observation) -> Direction {
        let mut choice: Option<(Direction, u32)> = None;
        for dir in Direction::ALL {
            let (dx, dy) = dir.delta();
            if !observation.in_bounds(dx, dy) || observation.occupied_toward(dx, dy) {
                continue;
            }
            let food = observation.food_toward(dx, dy).unwrap_or(0);
            if choice.map_or(true, |(_, best)| food > best) {
                choice = Some((dir, food));
            }
        }

        choice.map(|(dir, _)| dir).unwrap_or_else(|| {
            Direction::ALL
                .into_iter()
                .find(|d| {
                    let (dx, dy) = d.delta();
                    observation.in_bounds(dx, dy)
                })
                .unwrap_or(Direction::Up)
        })
    }
}

/// Built-in policies selectable from configuration or the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    Random,
    Greedy,
}

impl PolicyKind {
    /// Build a policy instance; `seed` only matters for random policies
    pub fn build(self, seed: u64) -> Box<dyn Policy> {
        match self {
            PolicyKind::Random => Box::new(RandomPolicy::new(seed)),
            PolicyKind::Greedy => Box::new(GreedyPolicy),
        }
    }
}
