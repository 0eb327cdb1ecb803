//! Heat: the difficulty dial chosen before a run.
//!
//! Each heat level switches on the modifiers at or below it. Level 8 adds no
//! modifier of its own and only raises the stat multiplier.

bitflags::bitflags! {
    /// Difficulty modifiers active for a run.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct HeatModifiers: u16 {
        /// One extra enemy per encounter.
        const MORE_ENEMIES     = 1 << 0;
        /// Enemies spawn two levels higher.
        const STRONGER_ENEMIES = 1 << 1;
        /// The player starts with reduced max health.
        const LESS_HEALTH      = 1 << 2;
        /// Treasure rooms are rarer.
        const LESS_ITEMS       = 1 << 3;
        /// The first enemy of every encounter is an elite.
        const ELITE_ENEMIES    = 1 << 4;
        /// Shops refuse to heal.
        const NO_HEALING       = 1 << 5;
        /// Boss rooms hold a second boss.
        const DOUBLE_BOSSES    = 1 << 6;
        /// Enemies spawn three further levels higher.
        const EXTREME_MODE     = 1 << 7;
        /// Trap rooms are twice as common.
        const MORE_TRAPS       = 1 << 8;
    }
}

impl HeatModifiers {
    pub const MAX_HEAT: u32 = 10;

    /// Max health percentage kept under [`LESS_HEALTH`](Self::LESS_HEALTH).
    pub const REDUCED_HEALTH_PERCENT: u32 = 80;

    const THRESHOLDS: [(u32, HeatModifiers); 9] = [
        (1, HeatModifiers::MORE_ENEMIES),
        (2, HeatModifiers::STRONGER_ENEMIES),
        (3, HeatModifiers::LESS_HEALTH),
        (4, HeatModifiers::MORE_TRAPS),
        (5, HeatModifiers::LESS_ITEMS),
        (6, HeatModifiers::ELITE_ENEMIES),
        (7, HeatModifiers::NO_HEALING),
        (9, HeatModifiers::DOUBLE_BOSSES),
        (10, HeatModifiers::EXTREME_MODE),
    ];

    pub fn for_heat(heat: u32) -> Self {
        Self::THRESHOLDS
            .iter()
            .filter(|(threshold, _)| heat >= *threshold)
            .fold(Self::empty(), |acc, (_, modifier)| acc | *modifier)
    }

    /// Levels added to every spawned enemy.
    pub fn enemy_level_bonus(self) -> u32 {
        let mut bonus = 0;
        if self.contains(Self::STRONGER_ENEMIES) {
            bonus += 2;
        }
        if self.contains(Self::EXTREME_MODE) {
            bonus += 3;
        }
        bonus
    }

    pub fn player_health_percent(self) -> u32 {
        if self.contains(Self::LESS_HEALTH) {
            Self::REDUCED_HEALTH_PERCENT
        } else {
            100
        }
    }
}
