//! One world tick at a time.
//!
//! Each tick advances the clock, sweeps expired events, launches whatever the
//! scheduler queued for now, keeps one entry queued ahead, and lets players
//! pitch in. An event whose contributions reach the goal is ended as
//! completed on the spot.

use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use event_engine::{EventEngine, EventError, EventsState, ManualClock};
use event_types::{EndReason, EventStatus, Timestamp};

use crate::SimRng;

/// Chance that a given player acts on a given event in one tick
const ACTIVITY_CHANCE: f64 = 0.3;

/// Largest single contribution a player makes
const MAX_CONTRIBUTION: i64 = 10;

/// Knobs of a simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimSettings {
    /// Seed for both the scheduler and the player crowd
    pub seed: u64,
    /// World time covered by one tick
    pub tick: Duration,
    /// Number of simulated players
    pub players: usize,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            seed: 42,
            tick: Duration::from_secs(5 * 60),
            players: 12,
        }
    }
}

/// Totals reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimSummary {
    pub ticks: u64,
    pub events_started: u64,
    pub events_completed: u64,
    pub events_expired: u64,
    /// Scheduled entries that failed admission when they came due
    pub launches_dropped: u64,
    pub total_contributions: u64,
}

/// The world-tick loop around one engine and one state.
pub struct WorldTick {
    engine: EventEngine,
    clock: ManualClock,
    state: EventsState,
    rng: SimRng,
    players: Vec<String>,
    settings: SimSettings,
    summary: SimSummary,
    announcements: Vec<String>,
}

impl WorldTick {
    /// `clock` must be the clock `engine` was built with.
    pub fn new(engine: EventEngine, clock: ManualClock, settings: SimSettings) -> Self {
        let players = (1..=settings.players)
            .map(|n| format!("player_{:03}", n))
            .collect();
        Self {
            engine,
            clock,
            state: EventsState::new(),
            rng: SimRng(SmallRng::seed_from_u64(settings.seed)),
            players,
            settings,
            summary: SimSummary::default(),
            announcements: Vec::new(),
        }
    }

    pub fn state(&self) -> &EventsState {
        &self.state
    }

    pub fn now(&self) -> Timestamp {
        self.engine.now()
    }

    /// Announcements made so far, oldest first.
    pub fn announcements(&self) -> &[String] {
        &self.announcements
    }

    /// Summary of the run so far, with end counts read from the history.
    pub fn summary(&self) -> SimSummary {
        let ended_with = |status| {
            self.state
                .history()
                .iter()
                .filter(|e| e.status == status)
                .count() as u64
        };
        SimSummary {
            events_completed: ended_with(EventStatus::Completed),
            events_expired: ended_with(EventStatus::Expired),
            ..self.summary.clone()
        }
    }

    /// Runs `ticks` ticks.
    pub fn run(&mut self, ticks: u64) -> SimSummary {
        for _ in 0..ticks {
            self.tick();
        }
        self.summary()
    }

    /// Advances the world by one tick.
    pub fn tick(&mut self) {
        self.clock.advance(self.settings.tick);
        self.summary.ticks += 1;

        let active = self.engine.get_active_events(&mut self.state);
        tracing::debug!(
            "Tick {} at {}: {} active",
            self.summary.ticks,
            self.now(),
            active.len()
        );

        self.launch_due();

        if self.state.upcoming().is_empty() {
            let now = self.now();
            if self
                .engine
                .queue_scheduled_event(&mut self.state, now, self.settings.seed)
                .is_none()
            {
                tracing::debug!("Nothing to schedule at {}", now);
            }
        }

        self.simulate_players();
    }

    fn launch_due(&mut self) {
        for outcome in self.engine.launch_due_events(&mut self.state) {
            match outcome.result {
                Ok(instance) => {
                    self.summary.events_started += 1;
                    let line = self
                        .engine
                        .format_event_announcement(Some((&instance).into()));
                    println!("{}", line);
                    self.announcements.push(line);
                }
                Err(e) => {
                    self.summary.launches_dropped += 1;
                    tracing::info!("Skipped {}: {}", outcome.scheduled.type_id, e.reason());
                }
            }
        }
    }

    fn simulate_players(&mut self) {
        let instance_ids: Vec<String> = self
            .state
            .active()
            .iter()
            .map(|e| e.instance_id.clone())
            .collect();

        for instance_id in instance_ids {
            for player in &self.players {
                if !self.rng.0.gen_bool(ACTIVITY_CHANCE) {
                    continue;
                }
                let amount = self.rng.0.gen_range(1..=MAX_CONTRIBUTION);
                match self
                    .engine
                    .contribute(&mut self.state, &instance_id, player, amount)
                {
                    Ok(receipt) => {
                        self.summary.total_contributions += amount as u64;
                        if receipt.goal_reached {
                            if let Ok(ended) =
                                self.engine
                                    .end(&mut self.state, &instance_id, EndReason::Completed)
                            {
                                tracing::info!(
                                    "{} completed with {} contributed",
                                    ended.instance_id,
                                    ended.total_contributions
                                );
                            }
                            break;
                        }
                    }
                    Err(EventError::EventFull { .. }) => {
                        tracing::debug!("{} turned away from full {}", player, instance_id);
                    }
                    Err(e) => {
                        tracing::warn!("{} could not contribute to {}: {}", player, instance_id, e);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use event_engine::{EngineConfig, EventCatalog};

    const T0: Timestamp = Timestamp::from_millis(1_700_000_000_000);

    fn world(seed: u64) -> WorldTick {
        let clock = ManualClock::new(T0);
        let engine = EventEngine::with_clock(
            EventCatalog::builtin().unwrap(),
            EngineConfig::default(),
            Arc::new(clock.clone()),
        );
        let settings = SimSettings {
            seed,
            ..SimSettings::default()
        };
        WorldTick::new(engine, clock, settings)
    }

    #[test]
    fn test_tick_advances_clock() {
        let mut world = world(1);
        world.tick();
        world.tick();
        assert_eq!(world.now(), T0.plus_minutes(10));
        assert_eq!(world.summary().ticks, 2);
    }

    #[test]
    fn test_first_tick_queues_an_event() {
        let mut world = world(7);
        world.tick();
        assert_eq!(world.state().upcoming().len(), 1);
        assert!(world.state().upcoming()[0].scheduled_time > world.now());
    }

    #[test]
    fn test_events_get_launched_and_accounted() {
        let mut world = world(42);
        let summary = world.run(300);

        assert!(summary.events_started > 0);
        assert_eq!(
            summary.events_started,
            summary.events_completed + summary.events_expired + world.state().active().len() as u64
        );
        assert_eq!(world.announcements().len() as u64, summary.events_started);
        assert!(world
            .announcements()
            .iter()
            .all(|line| line.starts_with("[EVENT] ")));
    }

    #[test]
    fn test_completed_events_reached_their_goal() {
        let mut world = world(3);
        world.run(300);

        for ended in world.state().history() {
            match ended.status {
                EventStatus::Completed => {
                    assert!(ended.completed);
                    assert!(ended.total_contributions >= ended.contribution_goal);
                }
                EventStatus::Expired => assert!(!ended.completed),
                other => panic!("unexpected status {}", other),
            }
        }
    }

    #[test]
    fn test_same_seed_same_world() {
        let mut a = world(99);
        let mut b = world(99);
        assert_eq!(a.run(150), b.run(150));
        assert_eq!(a.state(), b.state());
        assert_eq!(a.announcements(), b.announcements());
    }

    #[test]
    fn test_state_exports_as_json() {
        let mut world = world(5);
        world.run(50);

        let json = serde_json::to_string(world.state()).unwrap();
        let restored: EventsState = serde_json::from_str(&json).unwrap();
        assert_eq!(&restored, world.state());
    }
}
