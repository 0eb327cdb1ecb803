//! Game configuration loader.

use std::path::Path;

use demonbane_core::GameConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for game configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Keys missing from the file keep their [`GameConfig::default`] values.
    pub fn load(path: &Path) -> LoadResult<GameConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(source: &str) -> LoadResult<GameConfig> {
        let config: GameConfig = toml::from_str(source)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        assert_eq!(ConfigLoader::parse("").unwrap(), GameConfig::default());
    }

    #[test]
    fn nested_generation_keys_override_defaults() {
        let config = ConfigLoader::parse(
            r#"
            shop_heal_price = 40

            [generation]
            retry_ceiling = 4

            [generation.weights]
            combat = 90
            "#,
        )
        .unwrap();

        assert_eq!(config.shop_heal_price, 40);
        assert_eq!(config.generation.retry_ceiling, 4);
        assert_eq!(config.generation.weights.combat, 90);
        assert_eq!(
            config.generation.weights.treasure,
            GameConfig::default().generation.weights.treasure
        );
        assert_eq!(config.resource_regen_per_round, GameConfig::DEFAULT_RESOURCE_REGEN);
    }

    #[test]
    fn wrong_types_are_rejected() {
        let err = ConfigLoader::parse("shop_heal_price = \"cheap\"").unwrap_err();
        assert!(err.to_string().contains("config TOML"));
    }
}
