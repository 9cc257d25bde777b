//! Live world event engine: admission, expiry, participation and scheduling.
//!
//! The engine creates, admits, runs, expires and archives time-boxed world
//! events, tracks who takes part and how much they contribute, and picks
//! future events deterministically from a `(world_time, seed)` pair.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  create/start/end   ┌─────────────┐
//! │ world tick   │ ──────────────────▶ │ EventEngine │──┐ catalog, config, clock
//! │ driver       │  join/contribute    └─────────────┘  │
//! └──────────────┘         │                            ▼
//!                          └──────── &mut ──────▶ EventsState
//! ```
//!
//! [`EventEngine`] owns the immutable catalog, the configuration and the
//! clock. [`EventsState`] is owned by the caller and mutated in place.
//!
//! # Modules
//!
//! - [`catalog`]: Event templates, built-in catalog and TOML loading
//! - [`state`]: The mutable registry of active and ended events
//! - [`lifecycle`]: `create`, `start`, `end` and the lazy expiry sweep
//! - [`participation`]: join, leave and contribute
//! - [`progress`]: Goal progress, rewards and effects lookups
//! - [`scheduler`]: Deterministic next-event selection
//! - [`query`]: Zone and history queries, announcements

pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod participation;
pub mod progress;
pub mod query;
pub mod scheduler;
pub mod state;

pub use catalog::{default_catalog_toml, EventCatalog};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    default_config_toml, EngineConfig, LimitsConfig, SchedulerConfig, DEFAULT_HISTORY_LIMIT,
    MAX_CONCURRENT_EVENTS,
};
pub use error::{CatalogError, ConfigError, EventError};
pub use lifecycle::{CreateOptions, LaunchOutcome};
pub use participation::Contribution;
pub use progress::EventProgress;
pub use query::{Announce, HistoryQuery};
pub use scheduler::{mix64, KeyedStream};
pub use state::EventsState;

use std::fmt;
use std::sync::Arc;

use event_types::{EventTemplate, Timestamp};

/// Service object driving an [`EventsState`].
///
/// Cloning is cheap; clones share the catalog and the clock.
#[derive(Clone)]
pub struct EventEngine {
    catalog: Arc<EventCatalog>,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
}

impl EventEngine {
    /// Creates an engine on the system clock with default configuration.
    pub fn new(catalog: EventCatalog) -> Self {
        Self::with_clock(catalog, EngineConfig::default(), Arc::new(SystemClock))
    }

    /// Creates an engine with explicit configuration and time provider.
    pub fn with_clock(catalog: EventCatalog, config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            config,
            clock,
        }
    }

    /// Creates an engine over the built-in catalog.
    pub fn with_builtin_catalog(
        config: EngineConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, CatalogError> {
        Ok(Self::with_clock(EventCatalog::builtin()?, config, clock))
    }

    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current time according to the injected clock.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Looks up a template by type id.
    pub fn template(&self, type_id: &str) -> Option<&EventTemplate> {
        self.catalog.get(type_id)
    }

    /// Returns true if `type_id` may not start yet.
    pub fn is_on_cooldown(&self, state: &EventsState, type_id: &str) -> bool {
        state.is_on_cooldown(type_id, self.now())
    }
}

impl fmt::Debug for EventEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEngine")
            .field("templates", &self.catalog.len())
            .field("config", &self.config)
            .field("now", &self.now())
            .finish()
    }
}

/// Engine on a manual clock over the built-in catalog, for tests.
#[cfg(test)]
pub(crate) fn test_engine(start: Timestamp) -> (EventEngine, ManualClock) {
    let clock = ManualClock::new(start);
    let engine = EventEngine::with_builtin_catalog(EngineConfig::default(), Arc::new(clock.clone()))
        .expect("builtin catalog parses");
    (engine, clock)
}
