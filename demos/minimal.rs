//! Minimal example of a cellworld simulation

use cellworld::policy::{GreedyPolicy, Policy};
use cellworld::{Config, World};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cellworld - Minimal Example");
    println!("===========================\n");

    // Create world with seeded RNG for reproducibility
    let config = Config::default();
    let mut world = World::new_with_seed(config, 42)?;
    let mut policy = GreedyPolicy;

    println!("Initial state:");
    println!("  Population: {}", world.population());
    println!("  Grid: {}x{}", world.grid().width(), world.grid().height());
    println!();

    let steps = 200;
    for step in 0..steps {
        // Every cell moves, then the world ticks
        for id in world.cell_ids() {
            let observation = world.observe(id)?;
            let (dx, dy) = policy.decide(&observation).delta();
            world.apply_action(id, dx, dy)?;
        }
        world.tick();
        let removed = world.remove_dead();

        if !removed.is_empty() || (step + 1) % 10 == 0 {
            println!("{}", world.stats.summary());
        }

        // Stop if extinct
        if world.is_extinct() {
            println!("\nPopulation went extinct at tick {}", world.time);
            break;
        }
    }

    println!("\nFinal state:");
    println!("  Population: {}", world.population());
    println!("  Food: {}", world.grid().total_food());

    Ok(())
}
