//! Typed view over dotted document paths.
//!
//! The first segment of a path is resolved against the closed set of root
//! sections the document schema knows about. Everything after it stays a raw
//! key list so dynamic sections (custom user lists) keep plain string-key
//! semantics.

use std::fmt;

macro_rules! define_sections {
    ($($variant:ident => $key:literal),+ $(,)?) => {
        /// A top-level section of the character document.
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum Section {
            $($variant,)+
            /// A key outside the known schema (kept in the document's `extra` map)
            Other(String),
        }

        impl Section {
            /// Every known section, in schema order.
            pub const KNOWN: &'static [Section] = &[$(Section::$variant,)+];

            /// Resolve a wire key into a section.
            pub fn from_key(key: &str) -> Self {
                match key {
                    $($key => Section::$variant,)+
                    other => Section::Other(other.to_string()),
                }
            }

            /// The wire key of this section.
            pub fn key(&self) -> &str {
                match self {
                    $(Section::$variant => $key,)+
                    Section::Other(key) => key,
                }
            }
        }
    };
}

define_sections! {
    CharacterName => "characterName",
    Level => "level",
    Experience => "experience",
    Hp => "hp",
    Mp => "mp",
    Stamina => "stamina",
    Attributes => "attributes",
    DerivedStats => "derivedStats",
    Classes => "classes",
    Skills => "skills",
    Proficiencies => "proficiencies",
    Spells => "spells",
    SpellSlots => "spellSlots",
    Traits => "traits",
    Titles => "titles",
    ActiveTitleId => "activeTitleId",
    Modifiers => "modifiers",
    Resistances => "resistances",
    Immunities => "immunities",
    Equipment => "equipment",
    Inventory => "inventory",
    Currencies => "currencies",
    Legacy => "legacy",
    Survival => "survival",
    Karma => "karma",
    Masteries => "masteries",
    Limitations => "limitations",
    Collections => "collections",
    Guilds => "guilds",
    Dungeons => "dungeons",
    Talents => "talents",
    Loadouts => "loadouts",
    Achievements => "achievements",
    Bounties => "bounties",
    Contracts => "contracts",
    Quests => "quests",
    StatusEffects => "statusEffects",
    Reputation => "reputation",
    CustomSections => "customSections",
    Notes => "notes",
    Settings => "settings",
    UiState => "uiState",
}

impl Section {
    pub fn is_known(&self) -> bool {
        !matches!(self, Section::Other(_))
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A dotted path with its root segment resolved to a [`Section`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPath {
    raw: String,
    root: Section,
}

impl DocumentPath {
    /// Parse a dotted path. Never fails: unknown roots become [`Section::Other`].
    pub fn parse(path: &str) -> Self {
        let root = Section::from_key(path.split('.').next().unwrap_or_default());
        Self {
            raw: path.to_string(),
            root,
        }
    }

    pub fn root(&self) -> &Section {
        &self.root
    }

    /// True when writing at this path can change `section`.
    pub fn touches(&self, section: &Section) -> bool {
        &self.root == section
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for DocumentPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_keys_round_trip() {
        for section in Section::KNOWN {
            assert_eq!(&Section::from_key(section.key()), section);
            assert!(section.is_known());
        }
    }

    #[test]
    fn unknown_keys_fall_back_to_other() {
        let section = Section::from_key("petTracker");
        assert_eq!(section, Section::Other("petTracker".to_string()));
        assert!(!section.is_known());
        assert_eq!(section.key(), "petTracker");
    }

    #[test]
    fn parse_resolves_root_section() {
        let path = DocumentPath::parse("spellSlots.1.used");
        assert_eq!(path.root(), &Section::SpellSlots);
        assert_eq!(path.to_string(), "spellSlots.1.used");
        assert_eq!(
            DocumentPath::parse("petTracker.name").root(),
            &Section::Other("petTracker".to_string())
        );
    }

    #[test]
    fn section_root_paths() {
        let path = DocumentPath::parse("derivedStats");
        assert!(path.touches(&Section::DerivedStats));
        assert!(!path.touches(&Section::Attributes));
    }

    #[test]
    fn attribute_paths_touch_attributes() {
        assert!(DocumentPath::from("attributes.STR.base").touches(&Section::Attributes));
        assert!(!DocumentPath::from("hp.current").touches(&Section::Attributes));
    }
}
