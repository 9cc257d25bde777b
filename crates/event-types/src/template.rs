//! Event templates: the immutable catalog definition of an event type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::timestamp::{hours_to_duration, minutes_to_duration};

/// Broad family an event type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Celestial,
    Nature,
    Social,
    Mystery,
}

impl EventCategory {
    /// All categories in declaration order.
    pub const ALL: [EventCategory; 4] = [
        EventCategory::Celestial,
        EventCategory::Nature,
        EventCategory::Social,
        EventCategory::Mystery,
    ];
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventCategory::Celestial => write!(f, "celestial"),
            EventCategory::Nature => write!(f, "nature"),
            EventCategory::Social => write!(f, "social"),
            EventCategory::Mystery => write!(f, "mystery"),
        }
    }
}

impl FromStr for EventCategory {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "celestial" => Ok(EventCategory::Celestial),
            "nature" => Ok(EventCategory::Nature),
            "social" => Ok(EventCategory::Social),
            "mystery" => Ok(EventCategory::Mystery),
            _ => Err(ParseKindError::InvalidCategory(s.to_string())),
        }
    }
}

/// Which of the two reward tiers a lookup refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardTierKind {
    /// Granted for taking part at all
    Participation,
    /// Granted when the contribution goal is reached
    Completion,
}

impl fmt::Display for RewardTierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewardTierKind::Participation => write!(f, "participation"),
            RewardTierKind::Completion => write!(f, "completion"),
        }
    }
}

impl FromStr for RewardTierKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "participation" => Ok(RewardTierKind::Participation),
            "completion" => Ok(RewardTierKind::Completion),
            _ => Err(ParseKindError::InvalidRewardTier(s.to_string())),
        }
    }
}

/// Error type for parsing categories and reward tiers from strings.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseKindError {
    InvalidCategory(String),
    InvalidRewardTier(String),
}

impl fmt::Display for ParseKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseKindError::InvalidCategory(s) => write!(f, "invalid event category: '{}'", s),
            ParseKindError::InvalidRewardTier(s) => write!(f, "invalid reward tier: '{}'", s),
        }
    }
}

impl std::error::Error for ParseKindError {}

/// Value carried by an effect. The engine never interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EffectValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl fmt::Display for EffectValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffectValue::Flag(b) => write!(f, "{}", b),
            EffectValue::Number(n) => write!(f, "{}", n),
            EffectValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A world modifier applied while an event is running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEffect {
    /// Effect kind, e.g. "xp_multiplier"
    #[serde(rename = "type")]
    pub effect_type: String,
    /// Opaque effect value
    pub value: EffectValue,
}

impl EventEffect {
    pub fn new(effect_type: impl Into<String>, value: EffectValue) -> Self {
        Self {
            effect_type: effect_type.into(),
            value,
        }
    }
}

/// What one reward tier hands out. Granting is up to the economy system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardTier {
    /// Currency amount
    #[serde(default)]
    pub sparks: u64,
    /// Item ids granted alongside the currency
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<String>,
    /// Optional cosmetic title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl RewardTier {
    /// Creates a currency-only tier.
    pub fn sparks(sparks: u64) -> Self {
        Self {
            sparks,
            ..Self::default()
        }
    }
}

/// Both reward tiers of a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRewards {
    pub participation: RewardTier,
    pub completion: RewardTier,
}

impl EventRewards {
    /// Returns the tier of the given kind.
    pub fn tier(&self, kind: RewardTierKind) -> &RewardTier {
        match kind {
            RewardTierKind::Participation => &self.participation,
            RewardTierKind::Completion => &self.completion,
        }
    }
}

/// Catalog definition of one event type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTemplate {
    /// Unique type key, e.g. "meteor_shower"
    pub id: String,
    pub category: EventCategory,
    pub name: String,
    pub description: String,
    /// How long an instance runs once started
    pub duration_minutes: u32,
    /// Zones the event can take place in; the first is the default
    pub zones: Vec<String>,
    pub effects: Vec<EventEffect>,
    pub rewards: EventRewards,
    /// Cumulative contribution needed for the completion tier
    pub contribution_goal: u64,
    /// Label for one contribution unit, e.g. "stars observed"
    pub contribution_unit: String,
    /// Informational weight; scheduling does not use it
    #[serde(default)]
    pub rarity: f64,
    /// Time after an instance ends before the type may start again
    pub cooldown_hours: f64,
    /// Text shown when the event is announced
    pub announce_message: String,
    /// Participant cap; absent means unbounded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_participants: Option<usize>,
}

impl EventTemplate {
    /// Running time of an instance.
    pub fn duration(&self) -> Duration {
        minutes_to_duration(self.duration_minutes)
    }

    /// Cooldown applied when an instance ends.
    pub fn cooldown(&self) -> Duration {
        hours_to_duration(self.cooldown_hours)
    }

    /// Zone used when the caller does not pick one.
    pub fn default_zone(&self) -> Option<&str> {
        self.zones.first().map(String::as_str)
    }

    /// Returns true if `zone` is one of this template's zones.
    pub fn has_zone(&self, zone: &str) -> bool {
        self.zones.iter().any(|z| z == zone)
    }
}
