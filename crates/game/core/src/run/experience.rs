use crate::config::GameConfig;
use crate::state::Entity;

/// Experience progress of the player within a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Experience {
    pub level: u32,
    /// Experience accumulated toward the next level.
    pub current: u32,
    /// Experience required for the next level.
    pub threshold: u32,
}

impl Experience {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            level: 1,
            current: 0,
            threshold: config.base_experience_threshold.max(1),
        }
    }

    /// Adds experience and returns how many levels were gained.
    pub fn gain(&mut self, amount: u32, growth_percent: u32) -> u32 {
        self.current = self.current.saturating_add(amount);
        let mut gained = 0;
        while self.current >= self.threshold {
            self.current -= self.threshold;
            self.level += 1;
            gained += 1;
            let next = u64::from(self.threshold) * u64::from(growth_percent) / 100;
            self.threshold = (next as u32).max(self.threshold + 1);
        }
        gained
    }
}

/// Stats after a level-up, as shown to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelUp {
    pub level: u32,
    pub max_health: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
}

/// Raises the entity one level: +10% max health, +2 attack, +1 defense,
/// +1 speed, then a full heal.
pub fn apply_level_up(entity: &mut Entity) -> LevelUp {
    let max_health = entity.max_health();
    entity.stats.set_max_health(max_health + (max_health / 10).max(1));
    entity.stats.attack += 2;
    entity.stats.defense += 1;
    entity.stats.speed += 1;
    entity.stats.restore_full();
    entity.level += 1;

    LevelUp {
        level: entity.level,
        max_health: entity.max_health(),
        attack: entity.stats.attack,
        defense: entity.stats.defense,
        speed: entity.stats.speed,
    }
}
