//! Event catalog: the immutable set of event templates.
//!
//! The catalog is loaded once at startup, either from the built-in TOML
//! document or from a file, and validated before the engine sees it.
//! Template order is preserved because the scheduler indexes into it.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use event_types::{EventCategory, EventTemplate};

use crate::error::CatalogError;

/// On-disk shape of a catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    events: Vec<EventTemplate>,
}

/// Validated, ordered collection of event templates.
#[derive(Debug, Clone)]
pub struct EventCatalog {
    templates: Vec<EventTemplate>,
    /// Maps type ids to positions in `templates`
    index: HashMap<String, usize>,
}

impl EventCatalog {
    /// Builds a catalog from templates, validating each one.
    pub fn new(templates: Vec<EventTemplate>) -> Result<Self, CatalogError> {
        if templates.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for template in &templates {
            validate_template(template)?;
            if !seen.insert(template.id.as_str()) {
                return Err(CatalogError::DuplicateId(template.id.clone()));
            }
        }

        let index = templates
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();

        Ok(Self { templates, index })
    }

    /// Loads a catalog from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&content)
    }

    /// Parses a catalog from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::new(file.events)
    }

    /// Returns the built-in catalog.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_str(&default_catalog_toml())
    }

    /// Looks up a template by type id.
    pub fn get(&self, type_id: &str) -> Option<&EventTemplate> {
        self.index.get(type_id).map(|&i| &self.templates[i])
    }

    /// Returns true if the type id is known.
    pub fn contains(&self, type_id: &str) -> bool {
        self.index.contains_key(type_id)
    }

    /// All templates in catalog order.
    pub fn templates(&self) -> &[EventTemplate] {
        &self.templates
    }

    /// Templates of one category, in catalog order.
    pub fn by_category(&self, category: EventCategory) -> Vec<&EventTemplate> {
        self.templates
            .iter()
            .filter(|t| t.category == category)
            .collect()
    }

    /// Type ids in catalog order.
    pub fn type_ids(&self) -> Vec<&str> {
        self.templates.iter().map(|t| t.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn validate_template(template: &EventTemplate) -> Result<(), CatalogError> {
    let invalid = |reason: &str| CatalogError::InvalidTemplate {
        id: template.id.clone(),
        reason: reason.to_string(),
    };

    if template.id.trim().is_empty() {
        return Err(invalid("id must not be empty"));
    }
    if template.duration_minutes == 0 {
        return Err(invalid("duration_minutes must be positive"));
    }
    if template.zones.is_empty() {
        return Err(invalid("at least one zone is required"));
    }
    if template.effects.is_empty() {
        return Err(invalid("at least one effect is required"));
    }
    if template.effects.iter().any(|e| e.effect_type.trim().is_empty()) {
        return Err(invalid("every effect needs a type"));
    }
    if !(template.cooldown_hours.is_finite() && template.cooldown_hours > 0.0) {
        return Err(invalid("cooldown_hours must be positive"));
    }
    if template.max_participants == Some(0) {
        return Err(invalid("max_participants must be positive when set"));
    }
    Ok(())
}

/// The built-in catalog as a TOML document.
pub fn default_catalog_toml() -> String {
    r#"# Live world event catalog

[[events]]
id = "meteor_shower"
category = "celestial"
name = "Meteor Shower"
description = "Streaks of light cross the night sky. Count the falling stars together."
duration_minutes = 30
zones = ["observatory", "hilltop", "beach"]
contribution_goal = 100
contribution_unit = "stars observed"
rarity = 0.3
cooldown_hours = 6.0
announce_message = "A meteor shower lights up the sky! Head out and count the falling stars."

[[events.effects]]
type = "xp_multiplier"
value = 1.5

[[events.effects]]
type = "rare_drop_chance"
value = 0.1

[events.rewards.participation]
sparks = 10

[events.rewards.completion]
sparks = 50
items = ["star_fragment"]

[[events]]
id = "aurora_borealis"
category = "celestial"
name = "Aurora Borealis"
description = "Green and violet curtains ripple above the northern ridge."
duration_minutes = 45
zones = ["tundra_ridge", "observatory"]
contribution_goal = 60
contribution_unit = "sketches drawn"
rarity = 0.15
cooldown_hours = 12.0
announce_message = "The aurora is dancing over the northern ridge!"

[[events.effects]]
type = "sky_tint"
value = "aurora"

[[events.effects]]
type = "inspiration_bonus"
value = 2

[events.rewards.participation]
sparks = 15

[events.rewards.completion]
sparks = 80
items = ["aurora_dye"]
title = "Skywatcher"

[[events]]
id = "blooming_festival"
category = "nature"
name = "Blooming Festival"
description = "Every flower in the meadow opens at once."
duration_minutes = 60
zones = ["meadow", "garden_district"]
contribution_goal = 200
contribution_unit = "flowers tended"
rarity = 0.5
cooldown_hours = 8.0
announce_message = "The meadow is in full bloom! Help tend the flowers."

[[events.effects]]
type = "gather_yield"
value = 1.25

[events.rewards.participation]
sparks = 8

[events.rewards.completion]
sparks = 40
items = ["rare_seed_pouch"]

[[events]]
id = "great_migration"
category = "nature"
name = "Great Migration"
description = "Herds cross the river delta on their seasonal journey."
duration_minutes = 40
zones = ["river_delta", "plains"]
contribution_goal = 150
contribution_unit = "animals guided"
rarity = 0.35
cooldown_hours = 10.0
announce_message = "The great migration has begun at the river delta!"

[[events.effects]]
type = "wildlife_spawn"
value = true

[events.rewards.participation]
sparks = 12

[events.rewards.completion]
sparks = 60

[[events]]
id = "harvest_gathering"
category = "social"
name = "Harvest Gathering"
description = "Neighbours share the season's bounty in the town square."
duration_minutes = 90
zones = ["town_square", "market"]
contribution_goal = 300
contribution_unit = "dishes shared"
rarity = 0.6
cooldown_hours = 24.0
announce_message = "The harvest gathering is open! Bring a dish to share."
max_participants = 50

[[events.effects]]
type = "cooking_bonus"
value = 1.2

[events.rewards.participation]
sparks = 10

[events.rewards.completion]
sparks = 45
items = ["harvest_basket"]

[[events]]
id = "lantern_parade"
category = "social"
name = "Lantern Parade"
description = "Paper lanterns drift from the square down to the harbor."
duration_minutes = 30
zones = ["town_square", "harbor"]
contribution_goal = 80
contribution_unit = "lanterns lit"
rarity = 0.45
cooldown_hours = 4.0
announce_message = "Lanterns are rising! Join the parade."
max_participants = 30

[[events.effects]]
type = "night_light"
value = true

[events.rewards.participation]
sparks = 6

[events.rewards.completion]
sparks = 30
title = "Lamplighter"

[[events]]
id = "whispering_fog"
category = "mystery"
name = "Whispering Fog"
description = "A fog rolls in and carries voices nobody can place."
duration_minutes = 25
zones = ["old_forest", "ruins"]
contribution_goal = 50
contribution_unit = "whispers recorded"
rarity = 0.2
cooldown_hours = 6.0
announce_message = "A strange fog creeps through the old forest..."

[[events.effects]]
type = "visibility"
value = 0.4

[[events.effects]]
type = "secret_dialogue"
value = true

[events.rewards.participation]
sparks = 12

[events.rewards.completion]
sparks = 70
items = ["fog_lantern"]

[[events]]
id = "vanishing_merchant"
category = "mystery"
name = "Vanishing Merchant"
description = "A merchant with impossible wares appears, then is gone."
duration_minutes = 20
zones = ["market", "crossroads"]
contribution_goal = 25
contribution_unit = "riddles solved"
rarity = 0.1
cooldown_hours = 5.5
announce_message = "A mysterious merchant has appeared. Solve the riddles before they vanish!"
max_participants = 10

[[events.effects]]
type = "shop_inventory"
value = "curios"

[events.rewards.participation]
sparks = 20

[events.rewards.completion]
sparks = 100
items = ["curio_box"]
title = "Riddle Breaker"
"#
    .to_string()
}
