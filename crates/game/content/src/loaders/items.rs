//! Item catalog loader.

use std::path::Path;

use demonbane_core::Item;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Item catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCatalog {
    pub items: Vec<Item>,
}

/// Loader for consumables and equipment from RON files.
pub struct ItemLoader;

impl ItemLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<Item>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(source: &str) -> LoadResult<Vec<Item>> {
        let catalog: ItemCatalog = ron::from_str(source)
            .map_err(|e| anyhow::anyhow!("Failed to parse item catalog RON: {}", e))?;

        Ok(catalog.items)
    }
}
