//! Character document schema.
//!
//! - `document` - the root [`CharacterDocument`] and its decoding rules
//! - `entries` - section value types (vitals, list entries, gear, preferences)
//! - `attributes` - core attributes and derived-stat formulas
//! - `defaults` - the default-state factory
//! - `section` - typed root sections and parsed document paths

pub mod attributes;
pub mod defaults;
pub mod document;
pub mod entries;
pub mod section;

pub use attributes::{
    calculate_derived_stats, AttributeScore, Attributes, DerivedStats, CRIT_CHANCE_CAP,
};
pub use defaults::{create_empty_state, STARTER_LOADOUT_NAME};
pub use document::{CharacterDocument, LenientDecode};
pub use entries::{
    CharacterTrait, ClassEntry, Collection, Currencies, DungeonRecord, Equipment, Experience,
    GuildMembership, InventoryItem, Karma, KarmaEvent, Legacy, Limitation, Loadout, Mastery,
    Meter, Proficiency, Skill, SlotCount, Spell, SpellSlots, StatModifier, StatusEffect,
    SurvivalMeters, Talents, Title, TrackedEntry, TrackerSettings, UiState,
};
pub use section::{DocumentPath, Section};
