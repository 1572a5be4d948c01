//! Section value types for the character document.
//!
//! List entries carry a stable opaque id that is required on the wire; every
//! other field defaults so partially-filled entries written by the UI still
//! decode. Entries whose tabs attach extra fields keep them in `extra`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids::{
    ClassId, CollectionId, DungeonId, EntryId, GuildId, ItemId, LimitationId, LoadoutId,
    MasteryId, ModifierId, ProficiencyId, SkillId, SpellId, StatusEffectId, TalentId, TitleId,
    TraitId,
};

// =============================================================================
// Vitals
// =============================================================================

/// A bounded resource such as HP, MP or a survival meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meter {
    pub current: i32,
    pub max: i32,
}

impl Meter {
    /// A meter filled to `max`.
    pub fn full(max: i32) -> Self {
        Self { current: max, max }
    }
}

impl Default for Meter {
    fn default() -> Self {
        Self::full(100)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    pub current: u64,
    pub to_next_level: u64,
}

impl Default for Experience {
    fn default() -> Self {
        Self {
            current: 0,
            to_next_level: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurvivalMeters {
    pub hunger: Meter,
    pub thirst: Meter,
    pub fatigue: Meter,
}

// =============================================================================
// Progression
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassEntry {
    pub id: ClassId,
    #[serde(default)]
    pub name: String,
    #[serde(default = "one")]
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: SkillId,
    #[serde(default)]
    pub name: String,
    #[serde(default = "one")]
    pub level: u32,
    #[serde(default)]
    pub experience: u32,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proficiency {
    pub id: ProficiencyId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rank: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mastery {
    pub id: MasteryId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rank: u32,
    #[serde(default)]
    pub progress: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Talents {
    pub points: u32,
    pub unlocked: Vec<TalentId>,
}

// =============================================================================
// Magic
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spell {
    pub id: SpellId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub level: u8,
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub prepared: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotCount {
    pub used: u32,
    pub max: u32,
}

/// Spell slots keyed by spell level. Levels 1 through 9 always exist on a
/// fresh sheet; only their counts change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpellSlots(BTreeMap<u8, SlotCount>);

impl SpellSlots {
    pub const LEVELS: std::ops::RangeInclusive<u8> = 1..=9;

    pub fn get(&self, level: u8) -> Option<&SlotCount> {
        self.0.get(&level)
    }

    pub fn get_mut(&mut self, level: u8) -> Option<&mut SlotCount> {
        self.0.get_mut(&level)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &SlotCount)> {
        self.0.iter().map(|(level, count)| (*level, count))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for SpellSlots {
    fn default() -> Self {
        Self(Self::LEVELS.map(|level| (level, SlotCount::default())).collect())
    }
}

// =============================================================================
// Identity
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterTrait {
    pub id: TraitId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub id: TitleId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Limitation {
    pub id: LimitationId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Legacy {
    pub lineage: String,
    pub heritage: String,
    pub ancestors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KarmaEvent {
    #[serde(default)]
    pub amount: i32,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Karma {
    pub value: i32,
    pub history: Vec<KarmaEvent>,
}

// =============================================================================
// Combat state
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatModifier {
    pub id: ModifierId,
    #[serde(default)]
    pub source: String,
    /// Stat or attribute key the modifier applies to
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub value: i32,
    #[serde(default = "yes")]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub id: StatusEffectId,
    #[serde(default)]
    pub name: String,
    /// Remaining turns; `None` lasts until removed
    #[serde(default)]
    pub duration: Option<u32>,
}

// =============================================================================
// Items and gear
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: ItemId,
    #[serde(default)]
    pub name: String,
    #[serde(default = "one")]
    pub quantity: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub value: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Equipped gear. Each slot holds a copy of the inventory item, not a
/// reference to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Equipment {
    pub head: Option<InventoryItem>,
    pub chest: Option<InventoryItem>,
    pub legs: Option<InventoryItem>,
    pub feet: Option<InventoryItem>,
    pub hands: Option<InventoryItem>,
    pub main_hand: Option<InventoryItem>,
    pub off_hand: Option<InventoryItem>,
    pub accessory1: Option<InventoryItem>,
    pub accessory2: Option<InventoryItem>,
}

impl Equipment {
    pub fn equipped(&self) -> impl Iterator<Item = &InventoryItem> {
        [
            &self.head,
            &self.chest,
            &self.legs,
            &self.feet,
            &self.hands,
            &self.main_hand,
            &self.off_hand,
            &self.accessory1,
            &self.accessory2,
        ]
        .into_iter()
        .flatten()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Currencies {
    pub gold: i64,
    pub silver: i64,
    pub copper: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loadout {
    pub id: LoadoutId,
    #[serde(default)]
    pub name: String,
    /// Equipment slot name to inventory item id
    #[serde(default)]
    pub slots: BTreeMap<String, ItemId>,
}

impl Loadout {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: LoadoutId::new(),
            name: name.into(),
            slots: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub items: Vec<String>,
}

// =============================================================================
// Organizations and places
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildMembership {
    pub id: GuildId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rank: String,
    #[serde(default)]
    pub reputation: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DungeonRecord {
    pub id: DungeonId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub floors_cleared: u32,
    #[serde(default)]
    pub completed: bool,
}

// =============================================================================
// Goals and records
// =============================================================================

/// An achievement, bounty, contract or quest.
///
/// The tracker only cares about identity and completion; anything a tab adds
/// (rewards, targets, deadlines) rides along in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedEntry {
    pub id: EntryId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// =============================================================================
// Preferences
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackerSettings {
    /// Recompute derived stats inside every write that changes attributes
    pub auto_calculate_derived: bool,
    pub show_derived_stats: bool,
    pub theme: String,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            auto_calculate_derived: true,
            show_derived_stats: true,
            theme: "default".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiState {
    pub active_tab: String,
    pub collapsed_sections: Vec<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            active_tab: "overview".to_string(),
            collapsed_sections: Vec::new(),
        }
    }
}

fn one() -> u32 {
    1
}

fn yes() -> bool {
    true
}
