//! Error types for the event engine.
//!
//! [`EventError`] values are expected outcomes (a full event, a cooldown)
//! that callers branch on. [`CatalogError`] and [`ConfigError`] only occur
//! while loading static configuration.

use std::path::PathBuf;

/// Expected failure of an engine operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    /// The type id is not in the catalog
    #[error("unknown event type '{0}'")]
    UnknownEventType(String),
    /// The instance handed to `start` cannot be admitted
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The concurrency cap is already filled
    #[error("maximum of {max} concurrent events reached")]
    MaxConcurrentEventsReached { max: usize },
    /// Another instance of the same type is running
    #[error("an instance of '{0}' is already active")]
    EventAlreadyActive(String),
    /// The type ended too recently
    #[error("event type '{type_id}' is on cooldown until {until}")]
    EventOnCooldown {
        type_id: String,
        until: event_types::Timestamp,
    },
    /// No active instance with this id
    #[error("event '{0}' not found")]
    EventNotFound(String),
    /// The player is already a participant
    #[error("player '{player_id}' already joined '{instance_id}'")]
    AlreadyJoined {
        instance_id: String,
        player_id: String,
    },
    /// The player is not a participant
    #[error("player '{player_id}' has not joined '{instance_id}'")]
    NotJoined {
        instance_id: String,
        player_id: String,
    },
    /// The participant cap is reached
    #[error("event '{instance_id}' is full ({max} participants)")]
    EventFull { instance_id: String, max: usize },
    /// Contribution amounts must be positive
    #[error("invalid contribution amount {0}")]
    InvalidAmount(i64),
}

impl EventError {
    /// Stable snake_case code for this failure, suitable for wire envelopes.
    pub fn reason(&self) -> &'static str {
        match self {
            EventError::UnknownEventType(_) => "unknown_event_type",
            EventError::InvalidInput(_) => "invalid_input",
            EventError::MaxConcurrentEventsReached { .. } => "max_concurrent_events_reached",
            EventError::EventAlreadyActive(_) => "event_already_active",
            EventError::EventOnCooldown { .. } => "event_on_cooldown",
            EventError::EventNotFound(_) => "event_not_found",
            EventError::AlreadyJoined { .. } => "already_joined",
            EventError::NotJoined { .. } => "not_joined",
            EventError::EventFull { .. } => "event_full",
            EventError::InvalidAmount(_) => "invalid_amount",
        }
    }
}

/// Errors that can occur while loading or validating an event catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("IO error reading catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("catalog defines no events")]
    Empty,
    #[error("duplicate event id '{0}'")]
    DuplicateId(String),
    #[error("event '{id}' is invalid: {reason}")]
    InvalidTemplate { id: String, reason: String },
}

/// Errors that can occur during configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
