use crate::layer::GeneratorConfig;

/// Game configuration constants and tunable parameters.
///
/// Capacity constants are compile-time because they size fixed-capacity
/// containers. Everything else is a runtime knob that can be overridden from a
/// TOML file through the content crate's loader.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct GameConfig {
    /// Resource points restored to every living entity at round start.
    pub resource_regen_per_round: u32,
    /// Currency a shop charges for one healing service.
    pub shop_heal_price: u32,
    /// Percentage of max health a shop visit restores.
    pub shop_heal_percent: u32,
    /// Experience required for the first level-up.
    pub base_experience_threshold: u32,
    /// Percentage growth of the threshold per level (150 = ×1.5).
    pub experience_growth_percent: u32,
    /// Layer generator parameters.
    pub generation: GeneratorConfig,
}

impl GameConfig {
    // ===== compile-time constants used as type parameters =====
    /// Number of layers in a full descent. Clearing the last boss wins the run.
    pub const MAX_LAYERS: u8 = 7;
    pub const MAX_STATUS_EFFECTS: usize = 12;
    pub const MAX_ABILITIES: usize = 8;
    pub const MAX_ENEMIES_PER_ENCOUNTER: usize = 6;

    // ===== combat defaults =====
    pub const DEFAULT_CRIT_CHANCE: u32 = 5;
    /// Critical damage as a percentage of the base result.
    pub const DEFAULT_CRIT_DAMAGE: u32 = 150;
    pub const DEFAULT_DODGE_CHANCE: u32 = 5;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_RETRY_CEILING: u32 = 16;
    pub const DEFAULT_RESOURCE_REGEN: u32 = 5;
    pub const DEFAULT_SHOP_HEAL_PRICE: u32 = 25;
    pub const DEFAULT_SHOP_HEAL_PERCENT: u32 = 40;
    pub const DEFAULT_EXPERIENCE_THRESHOLD: u32 = 100;
    pub const DEFAULT_EXPERIENCE_GROWTH: u32 = 150;

    pub fn new() -> Self {
        Self {
            resource_regen_per_round: Self::DEFAULT_RESOURCE_REGEN,
            shop_heal_price: Self::DEFAULT_SHOP_HEAL_PRICE,
            shop_heal_percent: Self::DEFAULT_SHOP_HEAL_PERCENT,
            base_experience_threshold: Self::DEFAULT_EXPERIENCE_THRESHOLD,
            experience_growth_percent: Self::DEFAULT_EXPERIENCE_GROWTH,
            generation: GeneratorConfig::default(),
        }
    }

    pub fn with_generation(mut self, generation: GeneratorConfig) -> Self {
        self.generation = generation;
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
