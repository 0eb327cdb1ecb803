//! Content factory for building catalogs from data files.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use demonbane_core::{
    Ability, ContentCatalog, EnemyVariant, GameConfig, Item, LayerRoster, PlayerClass,
};

use crate::data;
use crate::loaders::{
    AbilityLoader, ClassLoader, ConfigLoader, EnemyLoader, ItemLoader, LoadResult, RosterLoader,
};

/// Content factory that loads all game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── abilities.ron
/// ├── items.ron
/// ├── enemies.ron
/// ├── classes.ron
/// └── rosters.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load game configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<GameConfig> {
        ConfigLoader::load(&self.data_dir.join(data::CONFIG_FILE))
    }

    /// Load and validate the full content catalog.
    pub fn load_catalog(&self) -> LoadResult<ContentCatalog> {
        let abilities = AbilityLoader::load(&self.data_dir.join(data::ABILITIES_FILE))?;
        let items = ItemLoader::load(&self.data_dir.join(data::ITEMS_FILE))?;
        let enemies = EnemyLoader::load(&self.data_dir.join(data::ENEMIES_FILE))?;
        let classes = ClassLoader::load(&self.data_dir.join(data::CLASSES_FILE))?;
        let rosters = RosterLoader::load(&self.data_dir.join(data::ROSTERS_FILE))?;

        assemble(abilities, items, enemies, classes, rosters)
            .with_context(|| format!("invalid content in {}", self.data_dir.display()))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// Builds the catalog compiled into the crate.
pub fn bundled_catalog() -> LoadResult<ContentCatalog> {
    assemble(
        AbilityLoader::parse(data::ABILITIES)?,
        ItemLoader::parse(data::ITEMS)?,
        EnemyLoader::parse(data::ENEMIES)?,
        ClassLoader::parse(data::CLASSES)?,
        RosterLoader::parse(data::ROSTERS)?,
    )
    .context("invalid bundled content")
}

/// Parses the configuration compiled into the crate.
pub fn bundled_config() -> LoadResult<GameConfig> {
    ConfigLoader::parse(data::CONFIG)
}

fn assemble(
    abilities: Vec<Ability>,
    items: Vec<Item>,
    enemies: Vec<EnemyVariant>,
    classes: Vec<PlayerClass>,
    rosters: Vec<LayerRoster>,
) -> LoadResult<ContentCatalog> {
    ensure_unique("ability", abilities.iter().map(|ability| ability.id.clone()))?;
    ensure_unique("item", items.iter().map(|item| item.id.clone()))?;
    ensure_unique("enemy", enemies.iter().map(|variant| variant.id.clone()))?;
    ensure_unique("class", classes.iter().map(|class| class.id.clone()))?;
    ensure_unique("roster", rosters.iter().map(|roster| roster.layer.to_string()))?;

    let mut catalog = ContentCatalog::new();
    for ability in abilities {
        catalog.insert_ability(ability);
    }
    for item in items {
        catalog.insert_item(item);
    }
    for variant in enemies {
        catalog.insert_enemy(variant);
    }
    for class in classes {
        catalog.insert_class(class);
    }
    for roster in rosters {
        catalog.insert_roster(roster);
    }

    catalog.validate()?;
    Ok(catalog)
}

fn ensure_unique(kind: &str, ids: impl Iterator<Item = String>) -> LoadResult<()> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id.clone()) {
            anyhow::bail!("duplicate {kind} id `{id}`");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use demonbane_core::{ContentOracle, GameConfig, StartingBonus};

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn bundled_catalog_covers_every_layer() {
        let catalog = bundled_catalog().unwrap();
        for layer in 1..=GameConfig::MAX_LAYERS {
            let roster = catalog.layer_roster(layer).unwrap();
            assert!(!roster.regulars.is_empty());
            assert!(catalog.enemy_variant(&roster.boss).unwrap().boss);
        }
        assert_eq!(catalog.player_classes().len(), 3);
        assert!(catalog.ability("defend").is_some());
    }

    #[test]
    fn classes_start_with_their_weapon_and_a_potion() {
        let catalog = bundled_catalog().unwrap();
        for (class, weapon, attack) in [
            ("crusader", "sword_of_faith", 5),
            ("prophet", "staff_of_light", 3),
            ("templar", "holy_mace", 4),
        ] {
            let player = catalog
                .player_class(class)
                .unwrap()
                .spawn(&StartingBonus::default(), 100, &catalog)
                .unwrap();
            let worn = player.equipment.weapon().unwrap();
            assert_eq!(worn.id, weapon);
            assert_eq!(worn.bonus().attack, attack);
            assert_eq!(player.inventory.count("health_potion"), 1);
        }
    }

    #[test]
    fn every_loot_entry_names_an_item() {
        let catalog = bundled_catalog().unwrap();
        assert!(catalog.item_count() > 3);
        for layer in 1..=GameConfig::MAX_LAYERS {
            let roster = catalog.layer_roster(layer).unwrap();
            for id in roster.regulars.iter().chain(std::iter::once(&roster.boss)) {
                for entry in &catalog.enemy_variant(id).unwrap().loot {
                    assert!(catalog.item(&entry.item).is_some(), "{id} drops {}", entry.item);
                }
            }
        }
    }

    #[test]
    fn locked_classes_require_boss_unlocks_that_exist() {
        let catalog = bundled_catalog().unwrap();
        let unlocks: Vec<String> = (1..=GameConfig::MAX_LAYERS)
            .filter_map(|layer| catalog.layer_roster(layer))
            .filter_map(|roster| catalog.enemy_variant(&roster.boss))
            .filter_map(|boss| boss.unlock.clone())
            .collect();

        let crusader = catalog.player_class("crusader").unwrap();
        assert_eq!(crusader.requires, None);
        for class in catalog.player_classes() {
            if let Some(required) = &class.requires {
                assert!(unlocks.contains(required), "{} is unobtainable", class.id);
            }
        }
    }

    #[test]
    fn bundled_config_matches_defaults() {
        assert_eq!(bundled_config().unwrap(), GameConfig::default());
    }

    #[test]
    fn data_directory_matches_bundled_content() {
        let factory = ContentFactory::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data"));
        let catalog = factory.load_catalog().unwrap();
        assert_eq!(catalog.ability_count(), bundled_catalog().unwrap().ability_count());
        assert_eq!(factory.load_config().unwrap(), GameConfig::default());
    }

    #[test]
    fn missing_directory_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = ContentFactory::new(dir.path()).load_catalog().unwrap_err();
        assert!(err.to_string().contains(data::ABILITIES_FILE));
    }

    #[test]
    fn broken_cross_references_fail_validation() {
        let dir = tempfile::tempdir().unwrap();
        for (name, source) in [
            (data::ABILITIES_FILE, data::ABILITIES),
            (data::ITEMS_FILE, data::ITEMS),
            (data::ENEMIES_FILE, data::ENEMIES),
            (data::CLASSES_FILE, data::CLASSES),
        ] {
            std::fs::write(dir.path().join(name), source).unwrap();
        }
        std::fs::write(
            dir.path().join(data::ROSTERS_FILE),
            r#"(rosters: [(layer: 1, regulars: ["nobody"], boss: "gateway_guardian")])"#,
        )
        .unwrap();

        let err = ContentFactory::new(dir.path()).load_catalog().unwrap_err();
        assert!(format!("{err:#}").contains("nobody"));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let abilities = AbilityLoader::parse(data::ABILITIES).unwrap();
        let mut doubled = abilities.clone();
        doubled.push(abilities[0].clone());
        let err = assemble(
            doubled,
            ItemLoader::parse(data::ITEMS).unwrap(),
            EnemyLoader::parse(data::ENEMIES).unwrap(),
            ClassLoader::parse(data::CLASSES).unwrap(),
            RosterLoader::parse(data::ROSTERS).unwrap(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate ability"));
    }
}
