//! Per-cell observations handed to decision policies.

use crate::cell::Position;
use serde::{Deserialize, Serialize};

/// Offsets of the food sensors: the four orthogonal neighbours, then the
/// cell's own tile
pub const FOOD_OFFSETS: [(i32, i32); 5] = [(0, 1), (1, 0), (0, -1), (-1, 0), (0, 0)];

/// Offsets of the occupancy sensors: orthogonal neighbours, then diagonals
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (0, 1),
    (1, 0),
    (0, -1),
    (-1, 0),
    (-1, 1),
    (1, -1),
    (-1, -1),
    (1, 1),
];

/// Number of values produced by [`Observation::to_inputs`]
pub const INPUT_SIZE: usize = 3 + FOOD_OFFSETS.len() + NEIGHBOR_OFFSETS.len();

/// What one cell can see of the world
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub position: Position,
    pub health: i32,
    /// Food counts in [`FOOD_OFFSETS`] order, 0 outside the grid
    pub food: [u32; 5],
    /// Live-cell presence in [`NEIGHBOR_OFFSETS`] order
    pub neighbors: [bool; 8],
    /// Grid dimensions, so policies can avoid the edge
    pub grid_width: usize,
    pub grid_height: usize,
}

impl Observation {
    /// Flatten into a network input vector:
    /// `[x, y, health, food.., neighbors..]`
    pub fn to_inputs(&self) -> [f32; INPUT_SIZE] {
        let mut inputs = [0.0f32; INPUT_SIZE];
        inputs[0] = self.position.x as f32;
        inputs[1] = self.position.y as f32;
        inputs[2] = self.health as f32;
        for (slot, &food) in inputs[3..8].iter_mut().zip(self.food.iter()) {
            *slot = food as f32;
        }
        for (slot, &occupied) in inputs[8..].iter_mut().zip(self.neighbors.iter()) {
            *slot = if occupied { 1.0 } else { 0.0 };
        }
        inputs
    }

    /// Whether stepping by `(dx, dy)` stays on the grid
    pub fn in_bounds(&self, dx: i32, dy: i32) -> bool {
        self.position
            .offset(dx, dy, self.grid_width, self.grid_height)
            .is_some()
    }

    /// Food sensed at an orthogonal offset, if it is one of the sensors
    pub fn food_toward(&self, dx: i32, dy: i32) -> Option<u32> {
        FOOD_OFFSETS
            .iter()
            .position(|&o| o == (dx, dy))
            .map(|i| self.food[i])
    }

    /// Whether a live cell sits at a neighbouring offset
    pub fn occupied_toward(&self, dx: i32, dy: i32) -> bool {
        NEIGHBOR_OFFSETS
            .iter()
            .position(|&o| o == (dx, dy))
            .is_some_and(|i| self.neighbors[i])
    }
}
