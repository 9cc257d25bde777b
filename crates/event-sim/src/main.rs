//! Live world event simulation
//!
//! Drives the event engine through simulated world ticks and prints what
//! happens.

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use event_engine::{EngineConfig, EventCatalog, EventEngine, ManualClock};
use event_sim::{SimSettings, SimSummary, WorldTick};
use event_types::Timestamp;

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "event_sim")]
#[command(about = "Runs live world events against simulated players")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 288)]
    ticks: u64,

    /// World minutes per tick
    #[arg(long, default_value_t = 5)]
    tick_minutes: u64,

    /// Number of simulated players
    #[arg(long, default_value_t = 12)]
    players: usize,

    /// Engine config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Event catalog file (TOML); the built-in catalog when omitted
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// World start time in milliseconds since the Unix epoch
    #[arg(long, default_value_t = 1_700_000_000_000)]
    start_time: u64,

    /// Write the final events state as JSON to this path
    #[arg(long)]
    output_state: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "event_engine=debug"; RUST_LOG otherwise
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let filter = match &args.log_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    let catalog = match &args.catalog {
        Some(path) => EventCatalog::from_file(path)?,
        None => EventCatalog::builtin()?,
    };

    println!("Live World Event Simulation");
    println!("===========================");
    println!("Seed: {}", args.seed);
    println!("Ticks: {} x {} min", args.ticks, args.tick_minutes);
    println!("Players: {}", args.players);
    println!("Event types: {}", catalog.len());
    println!();

    let start = Timestamp::from_millis(args.start_time);
    let clock = ManualClock::new(start);
    let engine = EventEngine::with_clock(catalog, config, Arc::new(clock.clone()));
    let settings = SimSettings {
        seed: args.seed,
        tick: Duration::from_secs(args.tick_minutes * 60),
        players: args.players,
    };

    let mut world = WorldTick::new(engine, clock, settings);
    let summary = world.run(args.ticks);

    print_summary(&summary, world.now().saturating_since(start));

    if let Some(path) = &args.output_state {
        let json = serde_json::to_string_pretty(world.state())?;
        fs::write(path, json)?;
        println!("Wrote events state to {}", path.display());
    }

    Ok(())
}

fn print_summary(summary: &SimSummary, elapsed: Duration) {
    println!();
    println!("Simulation complete");
    println!("===================");
    println!("Ticks run: {} ({} world minutes)", summary.ticks, elapsed.as_secs() / 60);
    println!("Events started: {}", summary.events_started);
    println!("  Completed: {}", summary.events_completed);
    println!("  Expired: {}", summary.events_expired);
    println!("Launches dropped: {}", summary.launches_dropped);
    println!("Total contributions: {}", summary.total_contributions);
}
