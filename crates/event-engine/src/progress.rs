//! Goal progress and catalog reward/effect lookups.

use serde::{Deserialize, Serialize};

use event_types::{EventEffect, EventRewards, RewardTier, RewardTierKind};

use crate::state::EventsState;
use crate::EventEngine;

/// Progress of an instance toward its contribution goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventProgress {
    /// Total contributed so far; may exceed the goal
    pub current: u64,
    pub goal: u64,
    /// Floor of current / goal as a percentage, capped at 100
    pub percent: u8,
}

impl EventProgress {
    pub fn new(current: u64, goal: u64) -> Self {
        Self {
            current,
            goal,
            percent: progress_percent(current, goal),
        }
    }
}

/// `min(100, floor(current * 100 / goal))`, or 0 when the goal is 0.
pub fn progress_percent(current: u64, goal: u64) -> u8 {
    if goal == 0 || current == 0 {
        return 0;
    }
    let percent = (u128::from(current) * 100) / u128::from(goal);
    percent.min(100) as u8
}

impl EventEngine {
    /// Progress of an active or ended instance; `None` if unknown.
    pub fn get_event_progress(&self, state: &EventsState, instance_id: &str) -> Option<EventProgress> {
        state
            .find_active(instance_id)
            .or_else(|| state.find_in_history(instance_id))
            .map(|e| EventProgress::new(e.total_contributions, e.contribution_goal))
    }

    /// Both reward tiers of a type.
    pub fn get_event_rewards(&self, type_id: &str) -> Option<EventRewards> {
        self.catalog.get(type_id).map(|t| t.rewards.clone())
    }

    /// One reward tier of a type, named "participation" or "completion".
    ///
    /// Unknown types and unknown tier names both yield `None`.
    pub fn get_event_reward_tier(&self, type_id: &str, tier: &str) -> Option<RewardTier> {
        let kind: RewardTierKind = tier.parse().ok()?;
        self.catalog
            .get(type_id)
            .map(|t| t.rewards.tier(kind).clone())
    }

    /// Copy of the effects of a type.
    pub fn get_event_effects(&self, type_id: &str) -> Option<Vec<EventEffect>> {
        self.catalog.get(type_id).map(|t| t.effects.clone())
    }
}
