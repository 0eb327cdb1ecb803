//! Data-driven content definitions and loaders.
//!
//! This crate houses the static game content and the loaders that turn it
//! into rule-engine types:
//! - Ability templates (RON)
//! - Consumables and equipment (RON)
//! - Enemy variants, loot tables and per-layer rosters (RON)
//! - Playable classes and their unlock requirements (RON)
//! - Game configuration (TOML)
//!
//! The default data set is compiled into the binary (see [`data`]); a data
//! directory with the same layout can replace it at runtime through
//! [`ContentFactory`].
//!
//! Content reaches the rules only through `demonbane_core::ContentOracle` and
//! never appears in persisted state.

pub mod data;

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    AbilityLoader, ClassLoader, ConfigLoader, ContentFactory, EnemyLoader, ItemLoader,
    LoadResult, RosterLoader, bundled_catalog, bundled_config,
};
