//! Layer roster loader.

use std::path::Path;

use demonbane_core::LayerRoster;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Roster list structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterCatalog {
    pub rosters: Vec<LayerRoster>,
}

/// Loader for per-layer enemy rosters from RON files.
pub struct RosterLoader;

impl RosterLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<LayerRoster>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(source: &str) -> LoadResult<Vec<LayerRoster>> {
        let catalog: RosterCatalog = ron::from_str(source)
            .map_err(|e| anyhow::anyhow!("Failed to parse roster RON: {}", e))?;

        Ok(catalog.rosters)
    }
}
