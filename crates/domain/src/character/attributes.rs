//! Core attributes and the derived combat stats computed from them.
//!
//! Derived stats are cached on the document but are a pure function of the
//! attribute totals (`base + modifier`). All coefficients are expressed in
//! tenths and evaluated with integer floor division, so results never depend
//! on floating point rounding.

use serde::{Deserialize, Serialize};

/// Upper bound for [`DerivedStats::crit_chance`].
pub const CRIT_CHANCE_CAP: i32 = 50;

/// Base critical chance before attribute bonuses.
pub const BASE_CRIT_CHANCE: i32 = 5;

/// Base speed before attribute bonuses.
pub const BASE_SPEED: i32 = 10;

/// Default base value for every attribute on a fresh sheet.
pub const DEFAULT_ATTRIBUTE_BASE: i32 = 10;

/// One attribute: a base score plus a (possibly negative) modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeScore {
    pub base: i32,
    pub modifier: i32,
}

impl AttributeScore {
    pub fn new(base: i32, modifier: i32) -> Self {
        Self { base, modifier }
    }

    /// The effective score used by every formula.
    pub fn total(&self) -> i32 {
        self.base + self.modifier
    }
}

impl Default for AttributeScore {
    fn default() -> Self {
        Self::new(DEFAULT_ATTRIBUTE_BASE, 0)
    }
}

/// The six core attributes, keyed by their short names on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attributes {
    #[serde(rename = "STR")]
    pub strength: AttributeScore,
    #[serde(rename = "DEX")]
    pub dexterity: AttributeScore,
    #[serde(rename = "CON")]
    pub constitution: AttributeScore,
    #[serde(rename = "INT")]
    pub intelligence: AttributeScore,
    #[serde(rename = "WIS")]
    pub wisdom: AttributeScore,
    #[serde(rename = "CHA")]
    pub charisma: AttributeScore,
}

impl Attributes {
    /// Wire keys in display order.
    pub const KEYS: [&'static str; 6] = ["STR", "DEX", "CON", "INT", "WIS", "CHA"];

    /// Look up an attribute by its wire key (`"STR"`, `"DEX"`, ...).
    pub fn get(&self, key: &str) -> Option<&AttributeScore> {
        match key {
            "STR" => Some(&self.strength),
            "DEX" => Some(&self.dexterity),
            "CON" => Some(&self.constitution),
            "INT" => Some(&self.intelligence),
            "WIS" => Some(&self.wisdom),
            "CHA" => Some(&self.charisma),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &AttributeScore)> {
        Self::KEYS
            .into_iter()
            .filter_map(move |key| self.get(key).map(|score| (key, score)))
    }
}

/// Combat stats derived from [`Attributes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DerivedStats {
    pub attack_power: i32,
    pub defense: i32,
    pub magic_power: i32,
    pub crit_chance: i32,
    pub evasion: i32,
    pub speed: i32,
}

impl Default for DerivedStats {
    fn default() -> Self {
        calculate_derived_stats(&Attributes::default())
    }
}

/// `floor(a * wa/10 + b * wb/10)` in exact integer arithmetic.
fn weighted_floor(a: i32, weight_a: i32, b: i32, weight_b: i32) -> i32 {
    (a * weight_a + b * weight_b).div_euclid(10)
}

/// Compute derived stats from attribute totals.
///
/// | Stat | Formula |
/// |------|---------|
/// | attack power | `floor(STR*1.5 + DEX*0.5)` |
/// | defense | `floor(CON*1.2 + STR*0.3)` |
/// | magic power | `floor(INT*1.5 + WIS*0.5)` |
/// | crit chance | `min(50, 5 + floor(DEX*0.3 + WIS*0.1))` |
/// | evasion | `floor(DEX*0.8 + INT*0.2)` |
/// | speed | `10 + floor(DEX*0.5)` |
///
/// Charisma does not feed any derived stat.
pub fn calculate_derived_stats(attributes: &Attributes) -> DerivedStats {
    let str_total = attributes.strength.total();
    let dex = attributes.dexterity.total();
    let con = attributes.constitution.total();
    let int = attributes.intelligence.total();
    let wis = attributes.wisdom.total();

    DerivedStats {
        attack_power: weighted_floor(str_total, 15, dex, 5),
        defense: weighted_floor(con, 12, str_total, 3),
        magic_power: weighted_floor(int, 15, wis, 5),
        crit_chance: (BASE_CRIT_CHANCE + weighted_floor(dex, 3, wis, 1)).min(CRIT_CHANCE_CAP),
        evasion: weighted_floor(dex, 8, int, 2),
        speed: BASE_SPEED + weighted_floor(dex, 5, 0, 0),
    }
}
