//! Participation tracking: join, leave and contribute.
//!
//! These operations act on the active set as it stands; they never sweep
//! expired instances themselves.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::EventError;
use crate::state::EventsState;
use crate::EventEngine;

/// Outcome of a successful contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    /// Instance total after this contribution
    pub total: u64,
    /// True once the total has reached the goal
    pub goal_reached: bool,
    /// True if this call added the player as a participant
    pub auto_joined: bool,
}

impl EventEngine {
    /// Adds `player_id` to the participants of an active instance.
    pub fn join(
        &self,
        state: &mut EventsState,
        instance_id: &str,
        player_id: &str,
    ) -> Result<(), EventError> {
        let instance = state
            .find_active(instance_id)
            .ok_or_else(|| EventError::EventNotFound(instance_id.to_string()))?;
        let participants = state.participants_of(instance_id);
        if participants.iter().any(|p| p == player_id) {
            return Err(EventError::AlreadyJoined {
                instance_id: instance_id.to_string(),
                player_id: player_id.to_string(),
            });
        }
        if !instance.has_room_for(participants.len()) {
            return Err(EventError::EventFull {
                instance_id: instance_id.to_string(),
                max: instance.max_participants.unwrap_or_default(),
            });
        }

        let participants = state.participants_mut(instance_id);
        participants.push(player_id.to_string());
        tracing::debug!("{} joined {} ({} participants)", player_id, instance_id, participants.len());
        Ok(())
    }

    /// Removes `player_id` from the participants of an active instance.
    ///
    /// Contributions already made stay on record.
    pub fn leave(
        &self,
        state: &mut EventsState,
        instance_id: &str,
        player_id: &str,
    ) -> Result<(), EventError> {
        if state.find_active(instance_id).is_none() {
            return Err(EventError::EventNotFound(instance_id.to_string()));
        }

        let participants = state.participants_mut(instance_id);
        let position = participants
            .iter()
            .position(|p| p == player_id)
            .ok_or_else(|| EventError::NotJoined {
                instance_id: instance_id.to_string(),
                player_id: player_id.to_string(),
            })?;
        participants.remove(position);
        tracing::debug!("{} left {}", player_id, instance_id);
        Ok(())
    }

    /// Copy of the participant list; empty for unknown instances.
    pub fn get_participants(&self, state: &EventsState, instance_id: &str) -> Vec<String> {
        state.participants_of(instance_id).to_vec()
    }

    /// Records a contribution, joining the player first if needed.
    ///
    /// Auto-join still respects the participant cap. The instance total is
    /// not clamped to the goal.
    pub fn contribute(
        &self,
        state: &mut EventsState,
        instance_id: &str,
        player_id: &str,
        amount: i64,
    ) -> Result<Contribution, EventError> {
        if amount <= 0 {
            return Err(EventError::InvalidAmount(amount));
        }
        let amount = amount as u64;

        // Both counters are checked before anything changes, so an overflow
        // leaves the state untouched.
        let total = state
            .find_active(instance_id)
            .ok_or_else(|| EventError::EventNotFound(instance_id.to_string()))?
            .total_contributions
            .checked_add(amount)
            .ok_or(EventError::InvalidAmount(amount as i64))?;
        let player_total = self
            .contribution_of(state, instance_id, player_id)
            .checked_add(amount)
            .ok_or(EventError::InvalidAmount(amount as i64))?;

        let mut auto_joined = false;
        if !state.participants_of(instance_id).iter().any(|p| p == player_id) {
            self.join(state, instance_id, player_id)?;
            auto_joined = true;
        }

        let instance = state
            .active_mut(instance_id)
            .ok_or_else(|| EventError::EventNotFound(instance_id.to_string()))?;
        instance.total_contributions = total;
        let goal_reached = instance.goal_reached();

        state.set_contribution(instance_id, player_id, player_total);
        tracing::debug!(
            "{} contributed {} to {} (total {}, goal reached: {})",
            player_id,
            amount,
            instance_id,
            total,
            goal_reached
        );

        Ok(Contribution {
            total,
            goal_reached,
            auto_joined,
        })
    }

    /// Accumulated contribution of one player to one instance.
    pub fn contribution_of(&self, state: &EventsState, instance_id: &str, player_id: &str) -> u64 {
        state
            .contributions_of(instance_id)
            .and_then(|m| m.get(player_id).copied())
            .unwrap_or(0)
    }

    /// Copy of every player's contribution to an instance.
    pub fn contributions(&self, state: &EventsState, instance_id: &str) -> HashMap<String, u64> {
        state.contributions_of(instance_id).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::CreateOptions;
    use crate::test_engine;
    use event_types::{EndReason, EventInstance, Timestamp};
    use std::time::Duration;

    const T0: Timestamp = Timestamp::from_millis(1_700_000_000_000);

    fn started(engine: &EventEngine, state: &mut EventsState, type_id: &str) -> EventInstance {
        let mut instance = engine.create(state, type_id, CreateOptions::new()).unwrap();
        engine.start(state, &mut instance).unwrap();
        instance
    }

    #[test]
    fn test_join_and_duplicate_join() {
        let (engine, _clock) = test_engine(T0);
        let mut state = EventsState::new();
        let id = started(&engine, &mut state, "meteor_shower").instance_id;

        assert!(engine.join(&mut state, &id, "alice").is_ok());
        let err = engine.join(&mut state, &id, "alice").unwrap_err();

        assert_eq!(err.reason(), "already_joined");
        assert_eq!(engine.get_participants(&state, &id), vec!["alice"]);
    }

    #[test]
    fn test_join_unknown_instance() {
        let (engine, _clock) = test_engine(T0);
        let mut state = EventsState::new();
        let err = engine.join(&mut state, "nope#00001", "alice").unwrap_err();
        assert_eq!(err.reason(), "event_not_found");
        assert!(engine.get_participants(&state, "nope#00001").is_empty());
    }

    #[test]
    fn test_join_respects_cap() {
        let (engine, _clock) = test_engine(T0);
        let mut state = EventsState::new();
        // vanishing_merchant caps at 10
        let id = started(&engine, &mut state, "vanishing_merchant").instance_id;
        for i in 0..10 {
            engine.join(&mut state, &id, &format!("player_{}", i)).unwrap();
        }

        let err = engine.join(&mut state, &id, "latecomer").unwrap_err();
        assert_eq!(err.reason(), "event_full");
        assert_eq!(engine.get_participants(&state, &id).len(), 10);
    }

    #[test]
    fn test_leave() {
        let (engine, _clock) = test_engine(T0);
        let mut state = EventsState::new();
        let id = started(&engine, &mut state, "meteor_shower").instance_id;
        engine.join(&mut state, &id, "alice").unwrap();
        engine.join(&mut state, &id, "bob").unwrap();

        engine.leave(&mut state, &id, "alice").unwrap();
        assert_eq!(engine.get_participants(&state, &id), vec!["bob"]);

        let err = engine.leave(&mut state, &id, "alice").unwrap_err();
        assert_eq!(err.reason(), "not_joined");

        let err = engine.leave(&mut state, "nope#00001", "bob").unwrap_err();
        assert_eq!(err.reason(), "event_not_found");
    }

    #[test]
    fn test_participants_are_a_copy() {
        let (engine, _clock) = test_engine(T0);
        let mut state = EventsState::new();
        let id = started(&engine, &mut state, "meteor_shower").instance_id;
        engine.join(&mut state, &id, "alice").unwrap();

        let mut copy = engine.get_participants(&state, &id);
        copy.push("mallory".to_string());
        assert_eq!(engine.get_participants(&state, &id).len(), 1);
    }

    #[test]
    fn test_contribute_auto_joins_and_accumulates() {
        let (engine, _clock) = test_engine(T0);
        let mut state = EventsState::new();
        let id = started(&engine, &mut state, "meteor_shower").instance_id;

        let first = engine.contribute(&mut state, &id, "bob", 10).unwrap();
        assert!(first.auto_joined);
        assert_eq!(first.total, 10);
        assert!(!first.goal_reached);
        assert_eq!(engine.get_participants(&state, &id), vec!["bob"]);

        let second = engine.contribute(&mut state, &id, "bob", 15).unwrap();
        assert!(!second.auto_joined);
        assert_eq!(second.total, 25);
        assert_eq!(engine.contribution_of(&state, &id, "bob"), 25);
        assert_eq!(engine.get_participants(&state, &id).len(), 1);
    }

    #[test]
    fn test_contribute_rejects_non_positive() {
        let (engine, _clock) = test_engine(T0);
        let mut state = EventsState::new();
        let id = started(&engine, &mut state, "meteor_shower").instance_id;

        assert_eq!(
            engine.contribute(&mut state, &id, "alice", 0).unwrap_err(),
            EventError::InvalidAmount(0)
        );
        assert_eq!(
            engine.contribute(&mut state, &id, "alice", -5).unwrap_err().reason(),
            "invalid_amount"
        );
        assert!(engine.get_participants(&state, &id).is_empty());
    }

    #[test]
    fn test_contribute_to_ended_event() {
        let (engine, _clock) = test_engine(T0);
        let mut state = EventsState::new();
        let id = started(&engine, &mut state, "meteor_shower").instance_id;
        engine.end(&mut state, &id, EndReason::Completed).unwrap();

        let err = engine.contribute(&mut state, &id, "alice", 5).unwrap_err();
        assert_eq!(err.reason(), "event_not_found");
    }

    #[test]
    fn test_goal_reached_on_and_after_crossing() {
        let (engine, _clock) = test_engine(T0);
        let mut state = EventsState::new();
        // meteor_shower goal is 100
        let id = started(&engine, &mut state, "meteor_shower").instance_id;

        assert!(!engine.contribute(&mut state, &id, "alice", 99).unwrap().goal_reached);
        assert!(engine.contribute(&mut state, &id, "bob", 1).unwrap().goal_reached);
        let after = engine.contribute(&mut state, &id, "carol", 50).unwrap();
        assert!(after.goal_reached);
        // Totals are not clamped to the goal.
        assert_eq!(after.total, 150);
    }

    #[test]
    fn test_contributions_sum_to_total() {
        let (engine, _clock) = test_engine(T0);
        let mut state = EventsState::new();
        let id = started(&engine, &mut state, "blooming_festival").instance_id;
        engine.contribute(&mut state, &id, "alice", 7).unwrap();
        engine.contribute(&mut state, &id, "bob", 11).unwrap();
        engine.contribute(&mut state, &id, "alice", 3).unwrap();

        let sum: u64 = engine.contributions(&state, &id).values().sum();
        assert_eq!(sum, state.find_active(&id).unwrap().total_contributions);
        assert_eq!(sum, 21);
    }

    #[test]
    fn test_auto_join_respects_cap() {
        let (engine, _clock) = test_engine(T0);
        let mut state = EventsState::new();
        let id = started(&engine, &mut state, "vanishing_merchant").instance_id;
        for i in 0..10 {
            engine.join(&mut state, &id, &format!("player_{}", i)).unwrap();
        }

        let err = engine.contribute(&mut state, &id, "latecomer", 1).unwrap_err();
        assert_eq!(err.reason(), "event_full");
        assert_eq!(state.find_active(&id).unwrap().total_contributions, 0);

        // Existing participants can still contribute.
        assert!(engine.contribute(&mut state, &id, "player_3", 1).is_ok());
    }

    #[test]
    fn test_unswept_expired_event_still_accepts_contributions() {
        let (engine, clock) = test_engine(T0);
        let mut state = EventsState::new();
        let instance = started(&engine, &mut state, "meteor_shower");

        clock.set(instance.end_time + Duration::from_secs(60));
        let late = engine
            .contribute(&mut state, &instance.instance_id, "alice", 5)
            .unwrap();
        assert_eq!(late.total, 5);

        engine.get_active_events(&mut state);
        let archived = state.find_in_history(&instance.instance_id).unwrap();
        assert_eq!(archived.total_contributions, 5);
        assert!(engine
            .contribute(&mut state, &instance.instance_id, "alice", 5)
            .is_err());
    }

    #[test]
    fn test_contribution_overflow_is_rejected_without_changes() {
        let (engine, _clock) = test_engine(T0);
        let mut state = EventsState::new();
        let id = started(&engine, &mut state, "meteor_shower").instance_id;

        engine.contribute(&mut state, &id, "a", i64::MAX).unwrap();
        let second = engine.contribute(&mut state, &id, "b", i64::MAX).unwrap();
        assert_eq!(second.total, u64::MAX - 1);

        let err = engine.contribute(&mut state, &id, "c", i64::MAX).unwrap_err();
        assert_eq!(err.reason(), "invalid_amount");
        assert!(!state.participants_of(&id).iter().any(|p| p == "c"));

        let err = engine.contribute(&mut state, &id, "a", i64::MAX).unwrap_err();
        assert_eq!(err.reason(), "invalid_amount");

        let total = state.find_active(&id).unwrap().total_contributions;
        let sum: u128 = engine
            .contributions(&state, &id)
            .values()
            .map(|&v| u128::from(v))
            .sum();
        assert_eq!(total, u64::MAX - 1);
        assert_eq!(sum, u128::from(total));
        assert_eq!(engine.contribution_of(&state, &id, "a"), i64::MAX as u64);
    }
}
