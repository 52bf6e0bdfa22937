#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Town Defence session without a display.

use std::{path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use env_logger::{Builder, Env};
use log::LevelFilter;
use town_defence_core::Outcome;
use town_defence_headless::{GameConfig, Simulation};
use town_defence_world::query;

/// Runs a headless Town Defence session and reports how it ended.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML game file; the built-in tuning is used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Seed overriding the one in the game file.
    #[arg(short, long)]
    seed: Option<u64>,
    /// Simulated seconds to run before giving up.
    #[arg(short, long, default_value_t = 120.0)]
    duration: f32,
    /// Length of a simulation step in milliseconds.
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,
    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

/// Entry point for the Town Defence command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    ensure!(args.tick_ms > 0, "--tick-ms must be positive");
    ensure!(
        args.duration.is_finite() && args.duration >= 0.0,
        "--duration must be a non-negative number of seconds"
    );

    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let duration = Duration::try_from_secs_f32(args.duration)
        .with_context(|| format!("--duration of {} seconds is too long", args.duration))?;

    let mut simulation = Simulation::headless(config);
    let _ = simulation.trigger_waves();
    let elapsed = simulation.run_for(duration, Duration::from_millis(args.tick_ms));

    let world = simulation.world();
    let outcome = match simulation.outcome() {
        Some(Outcome::Victory) => "victory",
        Some(Outcome::GameOver) => "game over",
        None => "undecided",
    };
    println!("outcome: {outcome}");
    println!("elapsed: {:.2}s", elapsed.as_secs_f32());
    match query::current_wave(world) {
        Some(wave) => println!("wave: {}", wave.number()),
        None => println!("wave: none"),
    }
    match query::town_health(world) {
        Some(health) => println!("town health: {health}"),
        None => println!("town health: no town"),
    }
    println!("enemies alive: {}", query::enemies_alive(world));
    if let Some(scene) = simulation.requested_scene() {
        println!("next scene: {scene}");
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let mut builder = Builder::from_env(Env::default().default_filter_or(level.to_string()));
    let _ = builder.try_init();
}
