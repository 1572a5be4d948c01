//! Default-state factory.

use std::collections::BTreeMap;

use serde_json::Map;

use super::attributes::{calculate_derived_stats, Attributes};
use super::document::CharacterDocument;
use super::entries::{
    Currencies, Equipment, Experience, Karma, Legacy, Loadout, Meter, SpellSlots,
    SurvivalMeters, Talents, TrackerSettings, UiState,
};

/// Name of the loadout every fresh sheet starts with.
pub const STARTER_LOADOUT_NAME: &str = "Default";

/// Build a fresh, fully-populated character document.
///
/// Deterministic except for entry ids: the starter loadout gets a new id on
/// every call, so two fresh documents never compare equal.
pub fn create_empty_state() -> CharacterDocument {
    let attributes = Attributes::default();
    CharacterDocument {
        character_name: String::new(),
        level: 1,
        experience: Experience::default(),
        hp: Meter::full(100),
        mp: Meter::full(50),
        stamina: Meter::full(100),
        derived_stats: calculate_derived_stats(&attributes),
        attributes,
        classes: Vec::new(),
        skills: Vec::new(),
        proficiencies: Vec::new(),
        spells: Vec::new(),
        spell_slots: SpellSlots::default(),
        traits: Vec::new(),
        titles: Vec::new(),
        active_title_id: None,
        modifiers: Vec::new(),
        resistances: Vec::new(),
        immunities: Vec::new(),
        equipment: Equipment::default(),
        inventory: Vec::new(),
        currencies: Currencies::default(),
        legacy: Legacy::default(),
        survival: SurvivalMeters::default(),
        karma: Karma::default(),
        masteries: Vec::new(),
        limitations: Vec::new(),
        collections: Vec::new(),
        guilds: Vec::new(),
        dungeons: Vec::new(),
        talents: Talents::default(),
        loadouts: vec![Loadout::new(STARTER_LOADOUT_NAME)],
        achievements: Vec::new(),
        bounties: Vec::new(),
        contracts: Vec::new(),
        quests: Vec::new(),
        status_effects: Vec::new(),
        reputation: BTreeMap::new(),
        custom_sections: Map::new(),
        notes: String::new(),
        settings: TrackerSettings::default(),
        ui_state: UiState::default(),
        extra: Map::new(),
    }
}

impl Default for CharacterDocument {
    fn default() -> Self {
        create_empty_state()
    }
}
