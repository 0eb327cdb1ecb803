//! Player class loader.

use std::path::Path;

use demonbane_core::PlayerClass;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Class list structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassCatalog {
    pub classes: Vec<PlayerClass>,
}

/// Loader for playable classes from RON files.
pub struct ClassLoader;

impl ClassLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<PlayerClass>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(source: &str) -> LoadResult<Vec<PlayerClass>> {
        let catalog: ClassCatalog = ron::from_str(source)
            .map_err(|e| anyhow::anyhow!("Failed to parse class catalog RON: {}", e))?;

        Ok(catalog.classes)
    }
}
