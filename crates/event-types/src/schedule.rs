//! Scheduled-but-not-started events.

use serde::{Deserialize, Serialize};

use crate::timestamp::Timestamp;

/// A scheduler pick waiting for its start time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub type_id: String,
    pub zone: String,
    /// Always strictly after the world time it was scheduled from
    pub scheduled_time: Timestamp,
}

impl ScheduledEvent {
    pub fn new(type_id: impl Into<String>, zone: impl Into<String>, scheduled_time: Timestamp) -> Self {
        Self {
            type_id: type_id.into(),
            zone: zone.into(),
            scheduled_time,
        }
    }

    /// Returns true once `now` has reached the scheduled time.
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.scheduled_time <= now
    }
}
