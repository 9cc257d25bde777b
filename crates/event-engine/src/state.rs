//! Mutable event registry owned by the world simulation loop.
//!
//! [`EventsState`] holds active events, history, participants, contributions,
//! cooldowns and the upcoming queue. Fields are private so every mutation
//! goes through the engine, which keeps the invariants intact:
//!
//! - at most one active instance per type id
//! - instance ids are never reused (the sequence counter lives here)
//! - per-instance contributions always sum to the instance total

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use event_types::{generate_instance_id, EventInstance, ScheduledEvent, Timestamp};

/// Registry of active and ended events plus their bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventsState {
    /// Running instances in start order
    active_events: Vec<EventInstance>,
    /// Ended instances, oldest first
    event_history: Vec<EventInstance>,
    /// Distinct player ids per instance, in join order
    participants: HashMap<String, Vec<String>>,
    /// Accumulated contribution per instance and player
    contributions: HashMap<String, HashMap<String, u64>>,
    /// Earliest time each type may start again
    cooldowns: HashMap<String, Timestamp>,
    /// Scheduled entries waiting for their start time
    upcoming_events: Vec<ScheduledEvent>,
    /// Next instance sequence number
    next_sequence: u64,
}

impl EventsState {
    /// Creates an empty state store.
    pub fn new() -> Self {
        Self {
            next_sequence: 1,
            ..Self::default()
        }
    }

    /// Running instances in start order. Does not sweep expired ones.
    pub fn active(&self) -> &[EventInstance] {
        &self.active_events
    }

    /// Ended instances, oldest first.
    pub fn history(&self) -> &[EventInstance] {
        &self.event_history
    }

    /// Scheduled entries waiting for their start time.
    pub fn upcoming(&self) -> &[ScheduledEvent] {
        &self.upcoming_events
    }

    /// All recorded cooldowns.
    pub fn cooldowns(&self) -> &HashMap<String, Timestamp> {
        &self.cooldowns
    }

    /// Time before which `type_id` may not start again, if any was recorded.
    pub fn cooldown_until(&self, type_id: &str) -> Option<Timestamp> {
        self.cooldowns.get(type_id).copied()
    }

    /// Returns true if `type_id` may not start at `now`.
    pub fn is_on_cooldown(&self, type_id: &str, now: Timestamp) -> bool {
        self.cooldown_until(type_id).is_some_and(|until| now < until)
    }

    /// Finds an active instance by id.
    pub fn find_active(&self, instance_id: &str) -> Option<&EventInstance> {
        self.active_events
            .iter()
            .find(|e| e.instance_id == instance_id)
    }

    /// Finds an ended instance by id.
    pub fn find_in_history(&self, instance_id: &str) -> Option<&EventInstance> {
        self.event_history
            .iter()
            .find(|e| e.instance_id == instance_id)
    }

    /// Returns true if an instance of `type_id` is running.
    pub fn has_active_type(&self, type_id: &str) -> bool {
        self.active_events.iter().any(|e| e.type_id == type_id)
    }

    /// Returns true if the id belongs to a running or ended instance.
    pub fn knows_instance(&self, instance_id: &str) -> bool {
        self.find_active(instance_id).is_some() || self.find_in_history(instance_id).is_some()
    }

    /// Participants of an instance, or an empty slice.
    pub fn participants_of(&self, instance_id: &str) -> &[String] {
        self.participants
            .get(instance_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Contribution map of an instance, if it received any.
    pub fn contributions_of(&self, instance_id: &str) -> Option<&HashMap<String, u64>> {
        self.contributions.get(instance_id)
    }

    pub fn active_len(&self) -> usize {
        self.active_events.len()
    }

    // ---- mutation, crate-internal ----

    pub(crate) fn next_instance_id(&mut self, type_id: &str) -> String {
        // States built through Default start at 0; never hand out 0.
        if self.next_sequence == 0 {
            self.next_sequence = 1;
        }
        let id = generate_instance_id(type_id, self.next_sequence);
        self.next_sequence += 1;
        id
    }

    pub(crate) fn activate(&mut self, instance: EventInstance) {
        self.participants
            .insert(instance.instance_id.clone(), Vec::new());
        self.active_events.push(instance);
    }

    pub(crate) fn active_position(&self, instance_id: &str) -> Option<usize> {
        self.active_events
            .iter()
            .position(|e| e.instance_id == instance_id)
    }

    pub(crate) fn active_mut(&mut self, instance_id: &str) -> Option<&mut EventInstance> {
        self.active_events
            .iter_mut()
            .find(|e| e.instance_id == instance_id)
    }

    pub(crate) fn active_mut_at(&mut self, position: usize) -> Option<&mut EventInstance> {
        self.active_events.get_mut(position)
    }

    /// Moves the active instance at `position` into history.
    pub(crate) fn retire(&mut self, position: usize, cooldown_until: Timestamp) -> &EventInstance {
        let instance = self.active_events.remove(position);
        self.cooldowns
            .insert(instance.type_id.clone(), cooldown_until);
        self.event_history.push(instance);
        &self.event_history[self.event_history.len() - 1]
    }

    pub(crate) fn participants_mut(&mut self, instance_id: &str) -> &mut Vec<String> {
        self.participants
            .entry(instance_id.to_string())
            .or_default()
    }

    /// Overwrites one player's accumulated contribution to an instance.
    pub(crate) fn set_contribution(&mut self, instance_id: &str, player_id: &str, total: u64) {
        self.contributions
            .entry(instance_id.to_string())
            .or_default()
            .insert(player_id.to_string(), total);
    }

    pub(crate) fn push_upcoming(&mut self, entry: ScheduledEvent) {
        self.upcoming_events.push(entry);
    }

    /// Removes and returns every upcoming entry due at `now`, earliest first.
    pub(crate) fn take_due_upcoming(&mut self, now: Timestamp) -> Vec<ScheduledEvent> {
        let (mut due, waiting): (Vec<_>, Vec<_>) = self
            .upcoming_events
            .drain(..)
            .partition(|entry| entry.is_due(now));
        self.upcoming_events = waiting;
        due.sort_by_key(|entry| entry.scheduled_time);
        due
    }
}
