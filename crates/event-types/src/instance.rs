//! Event instances: concrete, timestamped occurrences of a template.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::template::{EventCategory, EventTemplate};
use crate::timestamp::Timestamp;

/// Lifecycle status of an instance.
///
/// Transitions only move forward: pending → active → completed | expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Built but not admitted yet
    #[default]
    Pending,
    /// Running and accepting participants
    Active,
    /// Ended with the goal met or by an explicit completion
    Completed,
    /// Ran out of time
    Expired,
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventStatus::Pending => write!(f, "pending"),
            EventStatus::Active => write!(f, "active"),
            EventStatus::Completed => write!(f, "completed"),
            EventStatus::Expired => write!(f, "expired"),
        }
    }
}

/// Why an instance left the active set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    #[default]
    Completed,
    Expired,
}

impl EndReason {
    /// Terminal status an instance takes when ended for this reason.
    pub fn status(self) -> EventStatus {
        match self {
            EndReason::Completed => EventStatus::Completed,
            EndReason::Expired => EventStatus::Expired,
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.status().fmt(f)
    }
}

/// A single occurrence of an event type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventInstance {
    /// Unique for the lifetime of the owning state store
    pub instance_id: String,
    /// Template this instance was built from
    pub type_id: String,
    pub category: EventCategory,
    pub zone: String,
    pub status: EventStatus,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    /// Running sum of every contribution; not clamped to the goal
    pub total_contributions: u64,
    pub completed: bool,
    /// Copied from the template at creation
    pub contribution_goal: u64,
    /// Copied from the template at creation; `None` means unbounded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_participants: Option<usize>,
}

impl EventInstance {
    /// Builds a pending instance of `template` starting at `start_time`.
    pub fn pending(
        instance_id: impl Into<String>,
        template: &EventTemplate,
        zone: impl Into<String>,
        start_time: Timestamp,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            type_id: template.id.clone(),
            category: template.category,
            zone: zone.into(),
            status: EventStatus::Pending,
            start_time,
            end_time: start_time + template.duration(),
            total_contributions: 0,
            completed: false,
            contribution_goal: template.contribution_goal,
            max_participants: template.max_participants,
        }
    }

    /// Returns true once `now` has reached the end time.
    pub fn has_elapsed(&self, now: Timestamp) -> bool {
        self.end_time <= now
    }

    /// Returns true if the participant cap allows another player.
    pub fn has_room_for(&self, current_participants: usize) -> bool {
        self.max_participants
            .map_or(true, |max| current_participants < max)
    }

    /// Returns true if the contribution total has reached the goal.
    pub fn goal_reached(&self) -> bool {
        self.total_contributions >= self.contribution_goal
    }
}

/// Generates an instance ID from the type and a store-wide sequence number.
pub fn generate_instance_id(type_id: &str, sequence: u64) -> String {
    format!("{}#{:05}", type_id, sequence)
}
