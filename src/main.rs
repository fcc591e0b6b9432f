//! cellworld - CLI Entry Point
//!
//! Headless driver for the cell world simulation.

use cellworld::episode::{run_episode_with_callback, run_seeds};
use cellworld::policy::PolicyKind;
use cellworld::{benchmark, Config, World};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "cellworld")]
#[command(version)]
#[command(about = "Grid simulation of cells competing for regenerating food")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run episodes, one per generation
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Number of generations to run
        #[arg(short, long, default_value = "10")]
        generations: u64,

        /// Policy driving every cell
        #[arg(short, long, value_enum, default_value = "greedy")]
        policy: PolicyKind,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Write the tick statistics of the last generation to this JSON file
        #[arg(long)]
        stats: Option<PathBuf>,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Run one episode per seed in parallel
    Sweep {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Number of seeds
        #[arg(short, long, default_value = "16")]
        seeds: u64,

        /// First seed
        #[arg(long, default_value = "0")]
        first_seed: u64,

        /// Policy driving every cell
        #[arg(short, long, value_enum, default_value = "greedy")]
        policy: PolicyKind,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of ticks
        #[arg(short, long, default_value = "10000")]
        ticks: u64,

        /// Population size
        #[arg(short, long, default_value = "50")]
        population: usize,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = match &cli.command {
        Commands::Run { config, .. } | Commands::Sweep { config, .. } if config.exists() => {
            Config::from_file(config)
                .map(|c| c.logging.log_level)
                .unwrap_or_else(|_| "info".to_string())
        }
        _ => "info".to_string(),
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    match cli.command {
        Commands::Run {
            config,
            generations,
            policy,
            seed,
            stats,
            quiet,
        } => run_generations(&config, generations, policy, seed, stats, quiet),

        Commands::Sweep {
            config,
            seeds,
            first_seed,
            policy,
        } => run_sweep(&config, seeds, first_seed, policy),

        Commands::Benchmark { ticks, population } => run_benchmark(ticks, population),

        Commands::Init { output } => generate_config(output),
    }
}

fn load_config(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    if path.exists() {
        log::info!("Loading config from: {:?}", path);
        Ok(Config::from_file(path)?)
    } else {
        log::info!("Using default configuration");
        Ok(Config::default())
    }
}

fn run_generations(
    config_path: &Path,
    generations: u64,
    policy: PolicyKind,
    seed: Option<u64>,
    stats_path: Option<PathBuf>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;

    let mut world = match seed {
        Some(s) => World::new_with_seed(config.clone(), s)?,
        None => World::new(config.clone())?,
    };

    println!("Starting simulation");
    println!(
        "  Grid: {}x{} tiles",
        world.grid().width(),
        world.grid().height()
    );
    println!("  Population: {}", config.cells.population);
    println!("  Policy: {:?}", policy);
    println!("  Seed: {}", world.seed());
    println!();

    let start = Instant::now();
    let stats_interval = config.logging.stats_interval;

    for generation in 0..generations {
        let policies = (0..config.cells.population)
            .map(|id| policy.build(world.seed() ^ (generation << 32) ^ id as u64))
            .collect();

        let report = run_episode_with_callback(&mut world, policies, |world, iteration| {
            if !quiet && iteration % stats_interval == 0 {
                log::info!("{}", world.stats.summary());
            }
        })?;

        println!("{}", report.summary());
    }

    let elapsed = start.elapsed();
    println!();
    println!("=== Simulation Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Generations: {}", generations);

    if let Some(path) = stats_path {
        world.stats_history.save(&path)?;
        println!("Stats history: {:?}", path);
    }

    Ok(())
}

fn run_sweep(
    config_path: &Path,
    seeds: u64,
    first_seed: u64,
    policy: PolicyKind,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let seeds: Vec<u64> = (first_seed..first_seed + seeds).collect();

    println!("=== Seed Sweep ===");
    println!("Seeds: {}..{}", first_seed, first_seed + seeds.len() as u64);
    println!("Policy: {:?}", policy);
    println!();

    let start = Instant::now();
    let reports = run_seeds(&config, &seeds, |id, seed| policy.build(seed ^ id as u64))?;

    for report in &reports {
        println!("Seed {:6} | {}", report.seed, report.summary());
    }

    if !reports.is_empty() {
        let n = reports.len() as f64;
        let mean = reports.iter().map(|r| r.mean_fitness()).sum::<f64>() / n;
        let iterations = reports.iter().map(|r| r.iterations as f64).sum::<f64>() / n;
        println!();
        println!("Mean fitness: {:.3}", mean);
        println!("Mean episode length: {:.1} iterations", iterations);
    }
    println!("Time: {:.2}s", start.elapsed().as_secs_f64());

    Ok(())
}

fn run_benchmark(ticks: u64, population: usize) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== cellworld Benchmark ===");
    println!("Ticks: {}", ticks);
    println!("Population: {}", population);
    println!();

    let mut config = Config::default();
    config.cells.population = population;
    config.validate()?;

    let result = benchmark(ticks, config)?;
    println!("{}", result);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}
