//! Shared data types for the live world event engine.
//!
//! This crate contains pure data structures with no engine logic.
//! It is a dependency for all other crates in the workspace.

pub mod instance;
pub mod schedule;
pub mod template;
pub mod timestamp;

// Re-export time types
pub use timestamp::{
    hours_to_duration, minutes_to_duration, Timestamp, MS_PER_HOUR, MS_PER_MINUTE,
};

// Re-export template types
pub use template::{
    EffectValue, EventCategory, EventEffect, EventRewards, EventTemplate, ParseKindError,
    RewardTier, RewardTierKind,
};

// Re-export instance types
pub use instance::{generate_instance_id, EndReason, EventInstance, EventStatus};

pub use schedule::ScheduledEvent;
