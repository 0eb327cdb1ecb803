//! Content loaders for reading game data from files.
//!
//! Each loader parses one file format into `demonbane-core` types. The
//! [`ContentFactory`] combines them into a validated `ContentCatalog`.

pub mod abilities;
pub mod classes;
pub mod config;
pub mod enemies;
pub mod factory;
pub mod items;
pub mod rosters;

pub use abilities::AbilityLoader;
pub use classes::ClassLoader;
pub use config::ConfigLoader;
pub use enemies::EnemyLoader;
pub use factory::{ContentFactory, bundled_catalog, bundled_config};
pub use items::ItemLoader;
pub use rosters::RosterLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
