//! Enemy variant loader.

use std::path::Path;

use demonbane_core::EnemyVariant;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Enemy catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyCatalog {
    pub enemies: Vec<EnemyVariant>,
}

/// Loader for enemy variants from RON files.
pub struct EnemyLoader;

impl EnemyLoader {
    /// Load enemy variants from a RON file.
    ///
    /// Cross references (abilities, rosters) are checked later, when the
    /// variants are assembled into a catalog.
    pub fn load(path: &Path) -> LoadResult<Vec<EnemyVariant>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(source: &str) -> LoadResult<Vec<EnemyVariant>> {
        let catalog: EnemyCatalog = ron::from_str(source)
            .map_err(|e| anyhow::anyhow!("Failed to parse enemy catalog RON: {}", e))?;

        Ok(catalog.enemies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use demonbane_core::{AiPattern, Rarity};

    #[test]
    fn omitted_fields_default_to_a_regular_tactical_enemy() {
        let enemies = EnemyLoader::parse(
            r#"(
                enemies: [
                    (
                        id: "rat",
                        name: "Rat",
                        stats: (max_health: 5, attack: 2, defense: 0, speed: 3),
                        experience: 1,
                        currency: 1,
                        loot: [(item: "Tail", rarity: Common, chance: 10)],
                    ),
                ],
            )"#,
        )
        .unwrap();

        let rat = &enemies[0];
        assert!(!rat.boss);
        assert!(rat.abilities.is_empty());
        assert_eq!(rat.ai, AiPattern::Tactical);
        assert_eq!(rat.unlock, None);
        assert_eq!(rat.loot[0].rarity, Rarity::Common);
    }
}
