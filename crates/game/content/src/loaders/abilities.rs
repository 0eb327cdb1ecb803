//! Ability catalog loader.

use std::path::Path;

use demonbane_core::Ability;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Ability catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityCatalog {
    pub abilities: Vec<Ability>,
}

/// Loader for ability templates from RON files.
pub struct AbilityLoader;

impl AbilityLoader {
    /// Load ability templates from a RON file.
    pub fn load(path: &Path) -> LoadResult<Vec<Ability>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse ability templates from RON source.
    pub fn parse(source: &str) -> LoadResult<Vec<Ability>> {
        let catalog: AbilityCatalog = ron::from_str(source)
            .map_err(|e| anyhow::anyhow!("Failed to parse ability catalog RON: {}", e))?;

        Ok(catalog.abilities)
    }
}
