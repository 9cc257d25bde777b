//! Event lifecycle: create, admit, end, and the lazy expiry sweep.
//!
//! Instances are built pending by [`EventEngine::create`], admitted by
//! [`EventEngine::start`] and retired by [`EventEngine::end`]. Expired
//! instances are retired as a side effect of [`EventEngine::get_active_events`]
//! and of admission control in `start`; `join`, `leave` and `contribute` do
//! not sweep, so an instance past its end time keeps accepting contributions
//! until the next sweep.

use event_types::{EndReason, EventInstance, EventStatus, ScheduledEvent, Timestamp};

use crate::error::EventError;
use crate::state::EventsState;
use crate::EventEngine;

/// Optional overrides for [`EventEngine::create`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateOptions {
    /// Zone to use instead of the template's first zone
    pub zone: Option<String>,
    /// Start time to use instead of the clock
    pub start_time: Option<Timestamp>,
}

impl CreateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the zone.
    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    /// Sets the start time.
    pub fn with_start_time(mut self, start_time: Timestamp) -> Self {
        self.start_time = Some(start_time);
        self
    }
}

/// Result of launching one due upcoming entry.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchOutcome {
    /// The queue entry that came due
    pub scheduled: ScheduledEvent,
    /// The started instance, or why it could not start
    pub result: Result<EventInstance, EventError>,
}

impl EventEngine {
    /// Builds a pending instance of `type_id`.
    ///
    /// The instance is not visible to any query until it is started.
    pub fn create(
        &self,
        state: &mut EventsState,
        type_id: &str,
        opts: CreateOptions,
    ) -> Result<EventInstance, EventError> {
        let template = self
            .catalog
            .get(type_id)
            .ok_or_else(|| EventError::UnknownEventType(type_id.to_string()))?;

        let zone = match opts.zone {
            Some(zone) => zone,
            None => template.default_zone().unwrap_or_default().to_string(),
        };
        let start_time = opts.start_time.unwrap_or_else(|| self.now());
        let instance_id = state.next_instance_id(type_id);

        Ok(EventInstance::pending(instance_id, template, zone, start_time))
    }

    /// Admits a pending instance into the active set.
    ///
    /// Expired instances are swept first, then admission control runs in
    /// this order: concurrency cap, one active instance per type, cooldown.
    /// On success the instance (and the caller's copy) becomes active.
    pub fn start(
        &self,
        state: &mut EventsState,
        instance: &mut EventInstance,
    ) -> Result<(), EventError> {
        if instance.status != EventStatus::Pending {
            return Err(EventError::InvalidInput(format!(
                "instance {} is {}, expected pending",
                instance.instance_id, instance.status
            )));
        }
        if !self.catalog.contains(&instance.type_id) {
            return Err(EventError::InvalidInput(format!(
                "instance {} references unknown type {}",
                instance.instance_id, instance.type_id
            )));
        }
        if state.knows_instance(&instance.instance_id) {
            return Err(EventError::InvalidInput(format!(
                "instance {} was already started",
                instance.instance_id
            )));
        }

        self.sweep_expired(state);

        let max = self.config.limits.max_concurrent_events;
        if state.active_len() >= max {
            tracing::debug!("Rejected {}: {} events already active", instance.instance_id, max);
            return Err(EventError::MaxConcurrentEventsReached { max });
        }
        if state.has_active_type(&instance.type_id) {
            tracing::debug!("Rejected {}: type already active", instance.instance_id);
            return Err(EventError::EventAlreadyActive(instance.type_id.clone()));
        }
        let now = self.now();
        if let Some(until) = state.cooldown_until(&instance.type_id) {
            if now < until {
                tracing::debug!(
                    "Rejected {}: {} cooling down until {}",
                    instance.instance_id,
                    instance.type_id,
                    until
                );
                return Err(EventError::EventOnCooldown {
                    type_id: instance.type_id.clone(),
                    until,
                });
            }
        }

        instance.status = EventStatus::Active;
        state.activate(instance.clone());
        tracing::info!(
            "Started event {} in {} (ends at {})",
            instance.instance_id,
            instance.zone,
            instance.end_time
        );
        Ok(())
    }

    /// Ends an active instance and records its type's cooldown.
    ///
    /// Returns the archived history entry.
    pub fn end(
        &self,
        state: &mut EventsState,
        instance_id: &str,
        reason: EndReason,
    ) -> Result<EventInstance, EventError> {
        let position = state
            .active_position(instance_id)
            .ok_or_else(|| EventError::EventNotFound(instance_id.to_string()))?;
        Ok(self.retire(state, position, reason, self.now()))
    }

    /// Retires every active instance whose end time has passed.
    ///
    /// Returns the archived entries in the order they were retired.
    pub fn sweep_expired(&self, state: &mut EventsState) -> Vec<EventInstance> {
        let now = self.now();
        let mut swept = Vec::new();
        while let Some(position) = state.active().iter().position(|e| e.has_elapsed(now)) {
            swept.push(self.retire(state, position, EndReason::Expired, now));
        }
        swept
    }

    /// Returns a copy of the active events after sweeping expired ones.
    pub fn get_active_events(&self, state: &mut EventsState) -> Vec<EventInstance> {
        self.sweep_expired(state);
        state.active().to_vec()
    }

    /// Creates and starts every upcoming entry that is due, earliest first.
    ///
    /// Due entries leave the queue whether or not they could start.
    pub fn launch_due_events(&self, state: &mut EventsState) -> Vec<LaunchOutcome> {
        let now = self.now();
        state
            .take_due_upcoming(now)
            .into_iter()
            .map(|scheduled| {
                let opts = CreateOptions::new().with_zone(scheduled.zone.clone());
                let result = self.create(state, &scheduled.type_id, opts).and_then(|mut instance| {
                    self.start(state, &mut instance)?;
                    Ok(instance)
                });
                if let Err(e) = &result {
                    tracing::debug!("Dropped scheduled {}: {}", scheduled.type_id, e);
                }
                LaunchOutcome { scheduled, result }
            })
            .collect()
    }

    fn retire(
        &self,
        state: &mut EventsState,
        position: usize,
        reason: EndReason,
        now: Timestamp,
    ) -> EventInstance {
        let type_id = state.active()[position].type_id.clone();
        let cooldown_until = match self.catalog.get(&type_id) {
            Some(template) => now + template.cooldown(),
            None => {
                tracing::warn!("Ending {} with no template in catalog; no cooldown applied", type_id);
                now
            }
        };

        if let Some(instance) = state.active_mut_at(position) {
            instance.status = reason.status();
            instance.completed = reason == EndReason::Completed;
        }
        let archived = state.retire(position, cooldown_until).clone();
        tracing::info!(
            "Event {} {} with {} contributed; {} cooling down until {}",
            archived.instance_id,
            reason,
            archived.total_contributions,
            type_id,
            cooldown_until
        );
        archived
    }
}
