use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifiers for list entries are opaque strings.
///
/// Fresh ids are UUID v4 text, but anything a caller stored is accepted as-is,
/// so entries created by older sheets (or by hand) still deserialize.
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn from_string(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

// Progression entries
define_id!(ClassId);
define_id!(SkillId);
define_id!(ProficiencyId);
define_id!(MasteryId);
define_id!(TalentId);

// Magic
define_id!(SpellId);

// Identity entries
define_id!(TraitId);
define_id!(TitleId);
define_id!(LimitationId);

// Combat state
define_id!(ModifierId);
define_id!(StatusEffectId);

// Items and gear
define_id!(ItemId);
define_id!(LoadoutId);
define_id!(CollectionId);

// Organizations and places
define_id!(GuildId);
define_id!(DungeonId);

// Goals and records (achievements, bounties, contracts, quests)
define_id!(EntryId);
