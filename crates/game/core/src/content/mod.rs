//! Read-only game content.
//!
//! The rules never embed ability numbers or enemy stats. They query a
//! [`ContentOracle`] instead, which the content crate backs with bundled RON
//! catalogs and tests back with small hand-built ones.
mod catalog;
mod templates;

#[cfg(test)]
pub(crate) mod fixtures;

use std::sync::Arc;

pub use catalog::ContentCatalog;
pub use templates::{
    AiPattern, Bounty, EnemyVariant, LayerRoster, LootEntry, PlayerClass, Rarity,
};

use crate::error::{ErrorSeverity, GameError};
use crate::state::{Ability, Item};

/// Lookup interface for static content.
pub trait ContentOracle: Send + Sync {
    fn ability(&self, id: &str) -> Option<Arc<Ability>>;

    fn item(&self, id: &str) -> Option<Arc<Item>>;

    fn enemy_variant(&self, id: &str) -> Option<&EnemyVariant>;

    fn layer_roster(&self, layer: u8) -> Option<&LayerRoster>;

    fn player_class(&self, id: &str) -> Option<&PlayerClass>;

    /// Every class in a stable order.
    fn player_classes(&self) -> Vec<&PlayerClass>;
}

/// Content lookups that failed or catalogs that reference missing entries.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    #[error("{owner} references unknown ability `{ability}`")]
    UnknownAbility { owner: String, ability: String },

    #[error("layer {layer} roster references unknown enemy `{variant}`")]
    UnknownEnemy { layer: u8, variant: String },

    #[error("layer {layer} boss `{variant}` is not marked as a boss")]
    NotABoss { layer: u8, variant: String },

    #[error("unknown player class `{0}`")]
    UnknownClass(String),

    #[error("no roster for layer {0}")]
    MissingRoster(u8),

    #[error("layer {0} roster has no regular enemies")]
    EmptyRoster(u8),

    #[error("{owner} lists {count} abilities, more than the slot capacity")]
    TooManyAbilities { owner: String, count: usize },

    #[error("{owner} references unknown item `{item}`")]
    UnknownItem { owner: String, item: String },

    #[error("{owner} starts with `{item}`, which is not a weapon")]
    NotAWeapon { owner: String, item: String },
}

impl GameError for ContentError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownClass(_) => ErrorSeverity::Validation,
            _ => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownAbility { .. } => "CONTENT_UNKNOWN_ABILITY",
            Self::UnknownEnemy { .. } => "CONTENT_UNKNOWN_ENEMY",
            Self::NotABoss { .. } => "CONTENT_NOT_A_BOSS",
            Self::UnknownClass(_) => "CONTENT_UNKNOWN_CLASS",
            Self::MissingRoster(_) => "CONTENT_MISSING_ROSTER",
            Self::EmptyRoster(_) => "CONTENT_EMPTY_ROSTER",
            Self::TooManyAbilities { .. } => "CONTENT_TOO_MANY_ABILITIES",
            Self::UnknownItem { .. } => "CONTENT_UNKNOWN_ITEM",
            Self::NotAWeapon { .. } => "CONTENT_NOT_A_WEAPON",
        }
    }
}
