//! The character document: one character's complete sheet.
//!
//! Every top-level section defaults independently, so a stored document that
//! lacks a section (older sheets, partial writes) reads back complete. Keys
//! outside the schema are kept in `extra` and written back untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::attributes::{calculate_derived_stats, Attributes, DerivedStats};
use super::entries::{
    CharacterTrait, ClassEntry, Collection, Currencies, DungeonRecord, Equipment, Experience,
    GuildMembership, InventoryItem, Karma, Legacy, Limitation, Loadout, Mastery, Meter,
    Proficiency, Skill, Spell, SpellSlots, StatModifier, StatusEffect, SurvivalMeters, Talents,
    Title, TrackedEntry, TrackerSettings, UiState,
};
use crate::common::reconcile_edits;
use crate::error::DomainError;
use crate::ids::TitleId;

/// Complete character sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterDocument {
    pub character_name: String,
    pub level: u32,
    pub experience: Experience,

    // Vitals
    pub hp: Meter,
    pub mp: Meter,
    pub stamina: Meter,

    // Stats
    pub attributes: Attributes,
    /// Cached; see [`CharacterDocument::refresh_derived_stats`]
    pub derived_stats: DerivedStats,

    // Progression
    pub classes: Vec<ClassEntry>,
    pub skills: Vec<Skill>,
    pub proficiencies: Vec<Proficiency>,
    pub spells: Vec<Spell>,
    pub spell_slots: SpellSlots,
    pub traits: Vec<CharacterTrait>,
    pub titles: Vec<Title>,
    pub active_title_id: Option<TitleId>,

    // Combat state
    pub modifiers: Vec<StatModifier>,
    pub resistances: Vec<String>,
    pub immunities: Vec<String>,

    // Gear
    pub equipment: Equipment,
    pub inventory: Vec<InventoryItem>,
    pub currencies: Currencies,

    pub legacy: Legacy,
    pub survival: SurvivalMeters,
    pub karma: Karma,
    pub masteries: Vec<Mastery>,
    pub limitations: Vec<Limitation>,
    pub collections: Vec<Collection>,
    pub guilds: Vec<GuildMembership>,
    pub dungeons: Vec<DungeonRecord>,
    pub talents: Talents,
    pub loadouts: Vec<Loadout>,

    // Goals and records
    pub achievements: Vec<TrackedEntry>,
    pub bounties: Vec<TrackedEntry>,
    pub contracts: Vec<TrackedEntry>,
    pub quests: Vec<TrackedEntry>,
    pub status_effects: Vec<StatusEffect>,
    pub reputation: BTreeMap<String, i32>,

    /// User-defined dynamic sections, addressed by raw path only
    pub custom_sections: Map<String, Value>,
    pub notes: String,

    pub settings: TrackerSettings,
    pub ui_state: UiState,

    /// Top-level keys unknown to this schema
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of a lenient decode: the document plus every section that had to be
/// replaced by its default.
#[derive(Debug, Clone)]
pub struct LenientDecode {
    pub document: CharacterDocument,
    pub rejected: Vec<DomainError>,
}

impl CharacterDocument {
    /// Decode a stored document strictly.
    pub fn from_value(value: Value) -> Result<Self, DomainError> {
        if !value.is_object() {
            return Err(DomainError::NotAnObject(json_kind(&value)));
        }
        serde_json::from_value(value).map_err(DomainError::from)
    }

    /// Decode a stored document, defaulting any top-level section that does
    /// not fit the schema instead of failing the whole document.
    pub fn from_value_lenient(value: Value) -> LenientDecode {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return LenientDecode {
                    document: Self::default(),
                    rejected: vec![DomainError::NotAnObject(json_kind(&other))],
                }
            }
        };

        if let Ok(document) = serde_json::from_value::<Self>(Value::Object(map.clone())) {
            return LenientDecode {
                document,
                rejected: Vec::new(),
            };
        }

        // Probe each section alone against defaults for everything else
        let mut accepted = Map::new();
        let mut rejected = Vec::new();
        for (key, section) in map {
            let mut probe = Map::new();
            probe.insert(key.clone(), section);
            match serde_json::from_value::<Self>(Value::Object(probe.clone())) {
                Ok(_) => accepted.extend(probe),
                Err(err) => rejected.push(DomainError::invalid_section(key, err)),
            }
        }

        let document = serde_json::from_value(Value::Object(accepted)).unwrap_or_default();
        LenientDecode { document, rejected }
    }

    /// Encode for storage.
    pub fn to_value(&self) -> Result<Value, DomainError> {
        serde_json::to_value(self).map_err(DomainError::from)
    }

    /// Encode as a replacement for `stored`.
    ///
    /// Parts of `stored` that the typed view cannot hold (unmodeled nested
    /// keys, sections that failed to decode) are kept wherever this document
    /// still matches the view a lenient decode of `stored` produces.
    pub fn to_value_over(&self, stored: &Value) -> Result<Value, DomainError> {
        let edited = self.to_value()?;
        if !stored.is_object() {
            return Ok(edited);
        }
        let view = Self::from_value_lenient(stored.clone()).document.to_value()?;
        Ok(reconcile_edits(stored, &view, &edited))
    }

    /// Recompute the derived-stat cache from the current attributes.
    pub fn refresh_derived_stats(&mut self) -> DerivedStats {
        self.derived_stats = calculate_derived_stats(&self.attributes);
        self.derived_stats
    }

    /// The title referenced by `active_title_id`, if it still exists.
    pub fn active_title(&self) -> Option<&Title> {
        let id = self.active_title_id.as_ref()?;
        self.titles.iter().find(|title| &title.id == id)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
