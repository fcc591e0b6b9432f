//! World simulation engine: population lifecycle, movement and ticks.

use crate::cell::{Cell, CellId, Position};
use crate::config::Config;
use crate::error::SimError;
use crate::grid::{Grid, Occupancy};
use crate::observation::{Observation, FOOD_OFFSETS, NEIGHBOR_OFFSETS};
use crate::stats::{Stats, StatsHistory};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Result of a movement attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The cell moved and ate from its new tile
    Moved { consumed: u32, healed: i32 },
    /// Another live cell holds the target tile
    Blocked { by: CellId },
    /// The target lies outside the grid
    OutOfBounds,
}

impl MoveOutcome {
    /// Whether the move was applied
    #[inline]
    pub fn accepted(&self) -> bool {
        matches!(self, MoveOutcome::Moved { .. })
    }
}

/// The simulation world
pub struct World {
    // Population, in spawn order
    cells: Vec<Cell>,

    // Environment
    grid: Grid,
    occupancy: Occupancy,
    magic_marker: Option<Position>,

    // State
    pub time: u64,
    pub generation: u64,

    // Configuration
    pub config: Config,

    // Statistics
    pub stats: Stats,
    pub stats_history: StatsHistory,
    moves_accepted: usize,
    moves_rejected: usize,

    // Random number generator (seeded for reproducibility)
    rng: ChaCha8Rng,
    seed: u64,
}

impl World {
    /// Create a new world with the given configuration
    pub fn new(config: Config) -> Result<Self, SimError> {
        let seed = rand::thread_rng().gen();
        Self::new_with_seed(config, seed)
    }

    /// Create a new world with a specific seed for reproducibility
    pub fn new_with_seed(config: Config, seed: u64) -> Result<Self, SimError> {
        config.validate()?;

        let width = config.world.grid_width();
        let height = config.world.grid_height();

        let mut world = Self {
            cells: Vec::with_capacity(config.cells.population),
            grid: Grid::new(width, height),
            occupancy: Occupancy::new(width, height),
            magic_marker: None,
            time: 0,
            generation: 0,
            stats_history: StatsHistory::new(config.logging.stats_interval),
            config,
            stats: Stats::new(),
            moves_accepted: 0,
            moves_rejected: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        };

        world.spawn(world.config.cells.population)?;

        log::info!(
            "World created: {}x{} tiles, {} cells, seed {}",
            width,
            height,
            world.cells.len(),
            seed
        );

        Ok(world)
    }

    /// Build a world from explicit parts, without randomization.
    ///
    /// The configuration must validate and describe the grid's size. Cells
    /// must have distinct ids and lie inside the grid on distinct tiles.
    pub fn from_parts(config: Config, grid: Grid, mut cells: Vec<Cell>) -> Result<Self, SimError> {
        config.validate()?;
        let (width, height) = (config.world.grid_width(), config.world.grid_height());
        if grid.width() != width || grid.height() != height {
            return Err(SimError::Configuration(format!(
                "grid is {}x{} tiles but the world config describes {}x{}",
                grid.width(),
                grid.height(),
                width,
                height
            )));
        }

        cells.sort_by_key(|c| c.id);
        if let Some(pair) = cells.windows(2).find(|w| w[0].id == w[1].id) {
            return Err(SimError::Configuration(format!("duplicate cell id {}", pair[0].id)));
        }

        let mut occupancy = Occupancy::new(grid.width(), grid.height());
        for cell in &cells {
            if !grid.contains(cell.position) {
                return Err(SimError::Configuration(format!(
                    "cell {} at ({}, {}) lies outside the grid",
                    cell.id, cell.position.x, cell.position.y
                )));
            }
            if occupancy.get(cell.position).is_some() {
                return Err(SimError::Configuration(format!(
                    "cell {} shares tile ({}, {})",
                    cell.id, cell.position.x, cell.position.y
                )));
            }
            occupancy.insert(cell.position, cell.id);
        }

        Ok(Self {
            cells,
            stats_history: StatsHistory::new(config.logging.stats_interval.max(1)),
            grid,
            occupancy,
            magic_marker: None,
            time: 0,
            generation: 0,
            config,
            stats: Stats::new(),
            moves_accepted: 0,
            moves_rejected: 0,
            rng: ChaCha8Rng::seed_from_u64(0),
            seed: 0,
        })
    }

    /// Populate the world with `population` cells on distinct random tiles
    /// and re-randomize all food.
    ///
    /// Fails if the grid has no tile left over for the magic marker.
    pub fn spawn(&mut self, population: usize) -> Result<(), SimError> {
        let tiles = self.grid.len();
        if population >= tiles {
            return Err(SimError::Configuration(format!(
                "population {} must be smaller than the {} tiles of the grid",
                population, tiles
            )));
        }

        let width = self.grid.width();
        let height = self.grid.height();
        let mut coords: Vec<Position> = (0..width)
            .flat_map(|x| (0..height).map(move |y| Position::new(x, y)))
            .collect();
        coords.shuffle(&mut self.rng);

        self.cells.clear();
        self.occupancy.clear();
        for (id, &pos) in coords.iter().take(population).enumerate() {
            let cell = Cell::spawn(id, pos, &mut self.rng, &self.config.cells);
            self.occupancy.insert(pos, id);
            self.cells.push(cell);
        }

        self.grid.randomize(&mut self.rng, &self.config.food);
        // Marker only: the tile keeps is_magic == false
        self.magic_marker = Some(coords[population]);

        self.stats.update(&self.cells, &self.grid, &self.config.cells);
        Ok(())
    }

    /// Clear the population and spawn a fresh one of the configured size
    pub fn restart(&mut self) -> Result<(), SimError> {
        self.cells.clear();
        self.stats = Stats::new();
        self.stats_history = StatsHistory::new(self.stats_history.interval);
        self.time = 0;
        self.moves_accepted = 0;
        self.moves_rejected = 0;
        self.spawn(self.config.cells.population)?;
        self.generation += 1;
        log::debug!("World restarted: generation {}", self.generation);
        Ok(())
    }

    /// Try to move a cell by `(dx, dy)` and eat from the target tile.
    ///
    /// Moves are checked against the current positions of all other cells,
    /// so when several cells target one tile in the same step, the first
    /// caller wins. A rejected move leaves cells and food untouched; only
    /// the rejected-move counter reported in [`Stats`] advances.
    pub fn apply_action(&mut self, id: CellId, dx: i32, dy: i32) -> Result<MoveOutcome, SimError> {
        if dx.abs() + dy.abs() > 1 {
            return Err(SimError::InvalidStep { dx, dy });
        }
        let idx = self.index_of(id).ok_or(SimError::UnknownCell(id))?;
        if self.cells[idx].is_dead(&self.config.cells) {
            return Err(SimError::DeadCell(id));
        }

        let from = self.cells[idx].position;
        let Some(target) = from.offset(dx, dy, self.grid.width(), self.grid.height()) else {
            self.moves_rejected += 1;
            return Ok(MoveOutcome::OutOfBounds);
        };

        if let Some(other) = self.live_occupant(target) {
            if other != id {
                self.moves_rejected += 1;
                return Ok(MoveOutcome::Blocked { by: other });
            }
        }

        let consumed = match self.grid.get_mut(target) {
            Some(tile) => tile.hit(self.config.food.damage),
            None => 0,
        };
        let amount = i32::try_from(consumed / self.config.food.food_to_health_divisor).unwrap_or(i32::MAX);

        let cell = &mut self.cells[idx];
        cell.position = target;
        let healed = cell.heal(Some(amount), &self.config.cells);
        self.occupancy.relocate(id, from, target);
        self.moves_accepted += 1;

        Ok(MoveOutcome::Moved { consumed, healed })
    }

    /// Advance one tick: health decay for live cells, regeneration for
    /// every tile. Each entity only touches itself, so order is irrelevant.
    pub fn tick(&mut self) {
        let cell_config = &self.config.cells;
        for cell in self.cells.iter_mut().filter(|c| c.is_alive(cell_config)) {
            cell.tick(cell_config);
        }
        self.grid.tick();
        self.time += 1;
        self.update_stats();
    }

    /// Remove dead cells, freeing their tiles. Returns the removed ids.
    pub fn remove_dead(&mut self) -> Vec<CellId> {
        let cell_config = &self.config.cells;
        let mut removed = Vec::new();
        for cell in self.cells.iter().filter(|c| c.is_dead(cell_config)) {
            self.occupancy.remove(cell.position, cell.id);
            removed.push(cell.id);
        }
        self.cells.retain(|c| c.is_alive(cell_config));

        if !removed.is_empty() {
            self.stats.deaths += removed.len();
            log::debug!("Removed {} dead cells at tick {}", removed.len(), self.time);
        }
        removed
    }

    /// Build the observation for one live cell
    pub fn observe(&self, id: CellId) -> Result<Observation, SimError> {
        let cell = self.cell(id).ok_or(SimError::UnknownCell(id))?;
        let width = self.grid.width();
        let height = self.grid.height();
        let pos = cell.position;

        let mut food = [0u32; 5];
        for (slot, &(dx, dy)) in food.iter_mut().zip(FOOD_OFFSETS.iter()) {
            *slot = pos
                .offset(dx, dy, width, height)
                .map_or(0, |p| self.grid.food_at(p));
        }

        let mut neighbors = [false; 8];
        for (slot, &(dx, dy)) in neighbors.iter_mut().zip(NEIGHBOR_OFFSETS.iter()) {
            *slot = pos
                .offset(dx, dy, width, height)
                .and_then(|p| self.live_occupant(p))
                .is_some();
        }

        Ok(Observation {
            position: pos,
            health: cell.health,
            food,
            neighbors,
            grid_width: width,
            grid_height: height,
        })
    }

    /// Live cell standing on `pos`, if any
    pub fn live_occupant(&self, pos: Position) -> Option<CellId> {
        self.occupancy
            .get(pos)
            .filter(|&id| self.cell(id).is_some_and(|c| c.is_alive(&self.config.cells)))
    }

    fn index_of(&self, id: CellId) -> Option<usize> {
        // Ids are assigned in spawn order and removal keeps that order
        self.cells.binary_search_by_key(&id, |c| c.id).ok()
    }

    /// Look up a cell by id
    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.index_of(id).map(|i| &self.cells[i])
    }

    /// All cells still in the world, including dead ones not yet removed
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Ids of all cells, in order
    pub fn cell_ids(&self) -> Vec<CellId> {
        self.cells.iter().map(|c| c.id).collect()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Tile picked at spawn for a future special tile
    pub fn magic_marker(&self) -> Option<Position> {
        self.magic_marker
    }

    /// Update statistics
    fn update_stats(&mut self) {
        self.stats.time = self.time;
        self.stats.moves_accepted = self.moves_accepted;
        self.stats.moves_rejected = self.moves_rejected;
        self.stats.update(&self.cells, &self.grid, &self.config.cells);

        if self.time % self.stats_history.interval == 0 {
            self.stats_history.record(self.stats.clone());
        }
    }

    /// Run the given number of bare ticks, without any movement
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// Get current count of live cells
    pub fn population(&self) -> usize {
        let cell_config = &self.config.cells;
        self.cells.iter().filter(|c| c.is_alive(cell_config)).count()
    }

    /// Check if every cell is dead
    pub fn is_extinct(&self) -> bool {
        self.population() == 0
    }

    /// Get seed for reproducibility
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::food::FoodTile;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.world.world_width = 500;
        config.world.world_height = 400;
        config.cells.population = 20;
        config
    }

    /// The 2x2 world: one cell at (0,0) with 50 health, food 10 at (0,1)
    fn small_world(second_cell: bool) -> World {
        let mut config = Config::default();
        config.world.world_width = 100;
        config.world.world_height = 100;
        config.cells.population = 1;
        config.food.damage = 40;
        config.food.food_to_health_divisor = 2;

        let mut tiles = vec![FoodTile::new(0, 0, 40, 0); 4];
        tiles[2] = FoodTile::new(10, 0, 40, 0);
        let grid = Grid::from_tiles(2, 2, tiles).unwrap();

        let mut cells = vec![Cell::new(0, Position::new(0, 0), 50)];
        if second_cell {
            cells.push(Cell::new(1, Position::new(0, 1), 80));
        }
        World::from_parts(config, grid, cells).unwrap()
    }

    #[test]
    fn test_world_creation() {
        let config = test_config();
        let world = World::new(config.clone()).unwrap();

        assert_eq!(world.population(), config.cells.population);
        assert_eq!(world.time, 0);
        assert_eq!(world.grid().width(), 10);
        assert_eq!(world.grid().height(), 8);
    }

    #[test]
    fn test_spawn_rejects_full_grid() {
        let mut config = test_config();
        config.cells.population = 80;
        assert!(matches!(
            World::new_with_seed(config, 1),
            Err(SimError::Configuration(_))
        ));

        let mut world = World::new_with_seed(test_config(), 1).unwrap();
        assert!(world.spawn(80).is_err());
        assert!(world.spawn(79).is_ok());
        assert_eq!(world.cells().len(), 79);
    }

    #[test]
    fn test_spawn_distinct_positions() {
        let world = World::new_with_seed(test_config(), 5).unwrap();
        let mut seen = std::collections::HashSet::new();
        for (i, cell) in world.cells().iter().enumerate() {
            assert_eq!(cell.id, i);
            assert!(world.grid().contains(cell.position));
            assert!(seen.insert(cell.position));
        }

        let marker = world.magic_marker().unwrap();
        assert!(!seen.contains(&marker));
        assert!(world.grid().tiles().iter().all(|t| !t.is_magic));
    }

    #[test]
    fn test_accepted_move_eats_and_heals() {
        let mut world = small_world(false);

        let outcome = world.apply_action(0, 0, 1).unwrap();
        assert_eq!(outcome, MoveOutcome::Moved { consumed: 10, healed: 5 });

        let cell = world.cell(0).unwrap();
        assert_eq!(cell.position, Position::new(0, 1));
        assert_eq!(cell.health, 55);
        assert_eq!(cell.last_health_delta, 5);
        assert_eq!(world.grid().food_at(Position::new(0, 1)), 0);
    }

    #[test]
    fn test_accepted_move_heal_capped_at_max() {
        let mut world = small_world(false);
        world.cells[0].health = 98;
        world.grid.get_mut(Position::new(0, 1)).unwrap().count = 40;

        let outcome = world.apply_action(0, 0, 1).unwrap();
        assert_eq!(outcome, MoveOutcome::Moved { consumed: 40, healed: 2 });
        let cell = world.cell(0).unwrap();
        assert_eq!(cell.health, 100);
        assert_eq!(cell.last_health_delta, 2);
    }

    #[test]
    fn test_huge_meal_keeps_health_in_bounds() {
        let mut config = Config::default();
        config.world.world_width = 100;
        config.world.world_height = 100;
        config.cells.population = 1;
        config.food.max_count = i32::MAX as u32;
        config.food.damage = u32::MAX;
        config.food.food_to_health_divisor = 1;

        let mut tiles = vec![FoodTile::new(0, 0, 40, 0); 4];
        tiles[2] = FoodTile::new(u32::MAX, 0, u32::MAX, 0);
        let grid = Grid::from_tiles(2, 2, tiles).unwrap();
        let mut world = World::from_parts(config, grid, vec![Cell::new(0, Position::new(0, 0), 50)]).unwrap();

        let outcome = world.apply_action(0, 0, 1).unwrap();
        assert_eq!(outcome, MoveOutcome::Moved { consumed: u32::MAX, healed: 50 });
        assert_eq!(world.cell(0).unwrap().health, 100);
    }

    #[test]
    fn test_from_parts_validates_config() {
        let cells = || vec![Cell::new(0, Position::new(0, 0), 50)];

        let mut config = small_world(false).config;
        config.food.food_to_health_divisor = 0;
        let err = World::from_parts(config, Grid::new(2, 2), cells()).err();
        assert!(matches!(err, Some(SimError::Configuration(_))));

        let config = small_world(false).config;
        let err = World::from_parts(config.clone(), Grid::new(3, 2), cells()).err();
        assert!(matches!(err, Some(SimError::Configuration(_))));

        let mut world = World::from_parts(config, Grid::new(2, 2), cells()).unwrap();
        world.restart().unwrap();
        assert_eq!(world.population(), 1);
    }

    #[test]
    fn test_blocked_move_leaves_world_untouched() {
        let mut world = small_world(true);
        let cells_before = world.cells().to_vec();
        let grid_before = world.grid().clone();

        let outcome = world.apply_action(0, 0, 1).unwrap();
        assert_eq!(outcome, MoveOutcome::Blocked { by: 1 });
        assert!(!outcome.accepted());
        assert_eq!(world.cells(), &cells_before[..]);
        assert_eq!(world.grid(), &grid_before);

        // Only the rejection counter moves
        world.config.cells.health_decay = 0;
        world.tick();
        assert_eq!(world.stats.moves_rejected, 1);
        assert_eq!(world.stats.moves_accepted, 0);
        assert_eq!(world.cells(), &cells_before[..]);
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let mut world = small_world(false);
        assert_eq!(world.apply_action(0, -1, 0).unwrap(), MoveOutcome::OutOfBounds);
        assert_eq!(world.apply_action(0, 0, -1).unwrap(), MoveOutcome::OutOfBounds);
        assert_eq!(world.cell(0).unwrap().position, Position::new(0, 0));
    }

    #[test]
    fn test_contract_violations() {
        let mut world = small_world(false);
        assert_eq!(world.apply_action(0, 1, 1), Err(SimError::InvalidStep { dx: 1, dy: 1 }));
        assert_eq!(world.apply_action(0, 2, 0), Err(SimError::InvalidStep { dx: 2, dy: 0 }));
        assert_eq!(world.apply_action(7, 1, 0), Err(SimError::UnknownCell(7)));

        world.cells[0].health = 0;
        assert_eq!(world.apply_action(0, 1, 0), Err(SimError::DeadCell(0)));
    }

    #[test]
    fn test_null_move_eats_own_tile() {
        let mut world = small_world(false);
        world.apply_action(0, 0, 1).unwrap();
        world.grid.get_mut(Position::new(0, 1)).unwrap().count = 8;

        let outcome = world.apply_action(0, 0, 0).unwrap();
        assert_eq!(outcome, MoveOutcome::Moved { consumed: 8, healed: 4 });
    }

    #[test]
    fn test_dead_cells_do_not_block() {
        let mut world = small_world(true);
        world.cells[1].health = 0;

        assert!(world.apply_action(0, 0, 1).unwrap().accepted());
        assert_eq!(world.remove_dead(), vec![1]);
        assert_eq!(world.cell(0).unwrap().position, Position::new(0, 1));
        assert_eq!(world.live_occupant(Position::new(0, 1)), Some(0));
    }

    #[test]
    fn test_first_caller_wins_shared_target() {
        let mut config = Config::default();
        config.world.world_width = 150;
        config.world.world_height = 50;
        config.cells.population = 2;
        let grid = Grid::new(3, 1);
        let cells = vec![
            Cell::new(0, Position::new(0, 0), 60),
            Cell::new(1, Position::new(2, 0), 60),
        ];
        let mut world = World::from_parts(config, grid, cells).unwrap();

        assert!(world.apply_action(1, -1, 0).unwrap().accepted());
        assert_eq!(world.apply_action(0, 1, 0).unwrap(), MoveOutcome::Blocked { by: 1 });
    }

    #[test]
    fn test_tick_decays_and_regenerates() {
        let mut world = small_world(false);
        world.grid.get_mut(Position::new(1, 1)).unwrap().regen_per_tick = 3;

        world.tick();
        assert_eq!(world.cell(0).unwrap().health, 37);
        assert_eq!(world.grid().food_at(Position::new(1, 1)), 3);
        assert_eq!(world.time, 1);
    }

    #[test]
    fn test_observation() {
        let world = small_world(true);
        let obs = world.observe(0).unwrap();

        assert_eq!(obs.position, Position::new(0, 0));
        assert_eq!(obs.health, 50);
        // down (0,1) has food 10, right/own empty, up/left outside
        assert_eq!(obs.food, [10, 0, 0, 0, 0]);
        assert_eq!(obs.neighbors, [true, false, false, false, false, false, false, false]);
        assert!(world.observe(9).is_err());
    }

    #[test]
    fn test_restart_resets_population() {
        let mut world = World::new_with_seed(test_config(), 42).unwrap();
        world.run(10);
        world.remove_dead();

        world.restart().unwrap();
        assert_eq!(world.cells().len(), 20);
        assert_eq!(world.generation, 1);
        assert_eq!(world.time, 0);
        assert_eq!(world.cell_ids(), (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_reproducibility() {
        let mut world1 = World::new_with_seed(test_config(), 42).unwrap();
        let mut world2 = World::new_with_seed(test_config(), 42).unwrap();

        for id in 0..20 {
            let a = world1.apply_action(id, 1, 0).unwrap();
            let b = world2.apply_action(id, 1, 0).unwrap();
            assert_eq!(a, b);
        }
        world1.run(5);
        world2.run(5);

        assert_eq!(world1.cells(), world2.cells());
        assert_eq!(world1.grid(), world2.grid());
    }
}
