//! World-tick driver for the live event engine.
//!
//! Runs an [`EventEngine`](event_engine::EventEngine) against a manual clock,
//! letting a seeded crowd of simulated players join and contribute to
//! whatever events the scheduler launches.

pub mod world;

pub use world::{SimSettings, SimSummary, WorldTick};

use rand::rngs::SmallRng;

/// Seeded random number generator driving player behaviour
pub struct SimRng(pub SmallRng);
