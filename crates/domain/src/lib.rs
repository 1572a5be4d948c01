//! RpgTrack domain layer.
//!
//! Pure types and functions for the character tracker: the document schema,
//! its defaults, derived-stat formulas and the JSON path/merge utilities the
//! state store is built on. Nothing here performs I/O.

pub mod character;
pub mod common;
pub mod error;
pub mod ids;

pub use character::{
    calculate_derived_stats, create_empty_state, AttributeScore, Attributes, CharacterDocument,
    DerivedStats, DocumentPath, LenientDecode, Section,
};
pub use common::{deep_merge, get_nested_value, reconcile_edits, set_nested_value};
pub use error::DomainError;
pub use ids::{
    ClassId, CollectionId, DungeonId, EntryId, GuildId, ItemId, LimitationId, LoadoutId,
    MasteryId, ModifierId, ProficiencyId, SkillId, SpellId, StatusEffectId, TalentId, TitleId,
    TraitId,
};
