//! Zone and history queries, and the plain-text announcement.

use event_types::{EventCategory, EventInstance};

use crate::state::EventsState;
use crate::EventEngine;

/// Prefix of every announcement line.
pub const ANNOUNCEMENT_PREFIX: &str = "[EVENT] ";

/// Filters for [`EventEngine::get_event_history`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    pub category: Option<EventCategory>,
    pub type_id: Option<String>,
    /// Maximum entries; the configured default when unset
    pub limit: Option<usize>,
}

impl HistoryQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: EventCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn type_id(mut self, type_id: impl Into<String>) -> Self {
        self.type_id = Some(type_id.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn matches(&self, instance: &EventInstance) -> bool {
        self.category.map_or(true, |c| instance.category == c)
            && self
                .type_id
                .as_deref()
                .map_or(true, |t| instance.type_id == t)
    }
}

/// What to announce: a bare type id or a concrete instance.
#[derive(Debug, Clone, Copy)]
pub enum Announce<'a> {
    Type(&'a str),
    Instance(&'a EventInstance),
}

impl<'a> From<&'a str> for Announce<'a> {
    fn from(type_id: &'a str) -> Self {
        Announce::Type(type_id)
    }
}

impl<'a> From<&'a EventInstance> for Announce<'a> {
    fn from(instance: &'a EventInstance) -> Self {
        Announce::Instance(instance)
    }
}

impl EventEngine {
    /// Active events in `zone`. Does not sweep.
    pub fn get_events_by_zone(&self, state: &EventsState, zone: &str) -> Vec<EventInstance> {
        state
            .active()
            .iter()
            .filter(|e| e.zone == zone)
            .cloned()
            .collect()
    }

    /// Ended events matching `query`, most recent first.
    pub fn get_event_history(&self, state: &EventsState, query: &HistoryQuery) -> Vec<EventInstance> {
        let limit = query
            .limit
            .unwrap_or(self.config.limits.history_query_limit);
        state
            .history()
            .iter()
            .rev()
            .filter(|e| query.matches(e))
            .take(limit)
            .cloned()
            .collect()
    }

    /// One-line announcement. `None` yields an empty string.
    pub fn format_event_announcement(&self, subject: Option<Announce<'_>>) -> String {
        match subject {
            None => String::new(),
            Some(Announce::Type(type_id)) => {
                format!("{}{}", ANNOUNCEMENT_PREFIX, self.announce_message(type_id))
            }
            Some(Announce::Instance(instance)) => format!(
                "{}{} (zone: {})",
                ANNOUNCEMENT_PREFIX,
                self.announce_message(&instance.type_id),
                instance.zone
            ),
        }
    }

    fn announce_message(&self, type_id: &str) -> &str {
        self.catalog
            .get(type_id)
            .map(|t| t.announce_message.as_str())
            .unwrap_or("Unknown event")
    }
}
