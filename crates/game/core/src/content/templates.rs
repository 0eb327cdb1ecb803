//! Data-driven templates for enemies, classes and per-layer rosters.
//!
//! Templates deserialize straight from RON catalogs and are turned into
//! [`Entity`] instances at spawn time.

use crate::meta::StartingBonus;
use crate::state::{BaseStats, Entity, EntityId, EntityKind, Faction, ResourceMeter};

use super::{ContentError, ContentOracle};

/// Drop rarity, used only for presentation and run summaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

/// One possible drop, by item id, and its chance in percent.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LootEntry {
    pub item: String,
    pub rarity: Rarity,
    pub chance: u32,
}

/// Rewards carried by a spawned enemy, paid out when its side loses.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounty {
    pub experience: u32,
    pub currency: u32,
    pub loot: Vec<LootEntry>,
    /// Meta-progression unlock granted on defeat (bosses only).
    pub unlock: Option<String>,
}

/// Decision style used by the enemy AI provider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AiPattern {
    /// Strongest ready attack against the weakest opponent.
    Aggressive,
    /// Mixes abilities and basic attacks (70% ability when one is ready).
    #[default]
    Tactical,
    /// Basic attacks until wounded, then its strongest ability.
    Berserker,
}

/// Enemy template.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemyVariant {
    pub id: String,
    pub name: String,
    pub stats: BaseStats,
    #[cfg_attr(feature = "serde", serde(default))]
    pub abilities: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub resource: u32,
    /// Experience per enemy level.
    pub experience: u32,
    /// Currency per enemy level.
    pub currency: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub loot: Vec<LootEntry>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub boss: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub ai: AiPattern,
    #[cfg_attr(feature = "serde", serde(default))]
    pub unlock: Option<String>,
}

impl EnemyVariant {
    /// Percent growth of every stat per level above 1.
    pub const LEVEL_GROWTH_PERCENT: u32 = 20;
    /// Extra stat percentage granted to elite spawns.
    pub const ELITE_BONUS_PERCENT: u32 = 25;

    /// Spawns an enemy at `level` with stats scaled by `multiplier_percent`.
    pub fn spawn(
        &self,
        id: EntityId,
        level: u32,
        multiplier_percent: u32,
        elite: bool,
        content: &dyn ContentOracle,
    ) -> Result<Entity, ContentError> {
        let level = level.max(1);
        let mut percent = u64::from(multiplier_percent);
        if elite {
            percent = percent * u64::from(100 + Self::ELITE_BONUS_PERCENT) / 100;
        }
        let level_percent = 100 + u64::from(Self::LEVEL_GROWTH_PERCENT) * u64::from(level - 1);
        let scale = |value: u32| -> u32 {
            let leveled = u64::from(value).saturating_mul(level_percent) / 100;
            u32::try_from(leveled.saturating_mul(percent) / 100).unwrap_or(u32::MAX)
        };
        let stats = BaseStats {
            max_health: scale(self.stats.max_health).max(1),
            attack: scale(self.stats.attack),
            defense: scale(self.stats.defense),
            speed: scale(self.stats.speed),
        };

        let name = if elite {
            format!("Elite {}", self.name)
        } else {
            self.name.clone()
        };
        let reward_factor = if elite { 2 } else { 1 };
        let reward = |per_level: u32| per_level.saturating_mul(level).saturating_mul(reward_factor);
        let bounty = Bounty {
            experience: reward(self.experience),
            currency: reward(self.currency),
            loot: self.loot.clone(),
            unlock: self.unlock.clone(),
        };

        let mut entity = Entity::new(
            id,
            name,
            EntityKind::Enemy {
                variant: self.id.clone(),
                boss: self.boss,
                elite,
            },
            Faction::Enemy,
            stats,
        )
        .with_level(level)
        .with_resource(ResourceMeter::full(self.resource))
        .with_bounty(bounty);

        for ability_id in &self.abilities {
            let ability =
                content
                    .ability(ability_id)
                    .ok_or_else(|| ContentError::UnknownAbility {
                        owner: self.id.clone(),
                        ability: ability_id.clone(),
                    })?;
            entity.learn(ability);
        }
        Ok(entity)
    }
}

/// Playable class template.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerClass {
    pub id: String,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    pub stats: BaseStats,
    pub abilities: Vec<String>,
    pub resource: u32,
    /// Unlock id required before the class can be picked; `None` = always available.
    #[cfg_attr(feature = "serde", serde(default))]
    pub requires: Option<String>,
    /// Weapon equipped at spawn.
    #[cfg_attr(feature = "serde", serde(default))]
    pub weapon: Option<String>,
    /// Items placed in the inventory at spawn.
    #[cfg_attr(feature = "serde", serde(default))]
    pub items: Vec<String>,
}

impl PlayerClass {
    /// Spawns the player entity, applying the meta-progression bonus and
    /// the heat health penalty (percent of max health kept).
    pub fn spawn(
        &self,
        bonus: &StartingBonus,
        health_percent: u32,
        content: &dyn ContentOracle,
    ) -> Result<Entity, ContentError> {
        let percent = |value: u32, extra: u32| -> u32 {
            u32::try_from(u64::from(value) * (100 + u64::from(extra)) / 100)
                .unwrap_or(u32::MAX)
        };
        let max_health = percent(self.stats.max_health, bonus.health_percent);
        let kept = u64::from(max_health) * u64::from(health_percent) / 100;
        let stats = BaseStats {
            max_health: u32::try_from(kept.max(1)).unwrap_or(u32::MAX),
            attack: percent(self.stats.attack, bonus.attack_percent),
            defense: self.stats.defense.saturating_add(bonus.defense),
            speed: self.stats.speed,
        };

        let mut entity = Entity::new(
            EntityId::PLAYER,
            self.name.clone(),
            EntityKind::Player {
                class: self.id.clone(),
            },
            Faction::Ally,
            stats,
        )
        .with_resource(ResourceMeter::full(self.resource));

        for ability_id in &self.abilities {
            let ability =
                content
                    .ability(ability_id)
                    .ok_or_else(|| ContentError::UnknownAbility {
                        owner: self.id.clone(),
                        ability: ability_id.clone(),
                    })?;
            entity.learn(ability);
        }

        let item = |id: &String| {
            content.item(id).ok_or_else(|| ContentError::UnknownItem {
                owner: self.id.clone(),
                item: id.clone(),
            })
        };
        if let Some(weapon) = &self.weapon {
            entity
                .equipment
                .equip(item(weapon)?)
                .map_err(|_| ContentError::NotAWeapon {
                    owner: self.id.clone(),
                    item: weapon.clone(),
                })?;
        }
        for id in &self.items {
            entity.inventory.add(item(id)?);
        }
        Ok(entity)
    }
}

/// Enemy pool for one layer.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayerRoster {
    pub layer: u8,
    pub regulars: Vec<String>,
    pub boss: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::fixtures;

    #[test]
    fn extreme_levels_and_multipliers_saturate() {
        let catalog = fixtures::catalog();
        let imp = catalog.enemy_variant("imp").unwrap();

        let enemy = imp
            .spawn(EntityId(1), u32::MAX, u32::MAX, true, &catalog)
            .unwrap();
        assert_eq!(enemy.max_health(), u32::MAX);
        assert_eq!(enemy.stats.attack, u32::MAX);
        let bounty = enemy.bounty.unwrap();
        assert_eq!(bounty.experience, u32::MAX);
        assert_eq!(bounty.currency, u32::MAX);
    }

    #[test]
    fn huge_starting_bonus_saturates() {
        let catalog = fixtures::catalog();
        let bonus = StartingBonus {
            health_percent: u32::MAX,
            attack_percent: u32::MAX,
            defense: u32::MAX,
            ..StartingBonus::default()
        };
        let player = catalog
            .player_class("crusader")
            .unwrap()
            .spawn(&bonus, 100, &catalog)
            .unwrap();
        assert_eq!(player.max_health(), u32::MAX);
        assert_eq!(
            u64::from(player.stats.attack),
            15 * (100 + u64::from(u32::MAX)) / 100
        );
        assert_eq!(player.stats.defense, u32::MAX);
    }

    #[test]
    fn class_starts_with_its_items() {
        let catalog = fixtures::catalog();
        let player = catalog
            .player_class("crusader")
            .unwrap()
            .spawn(&StartingBonus::default(), 100, &catalog)
            .unwrap();
        assert_eq!(player.inventory.count("potion"), 1);
        assert!(player.equipment.weapon().is_none());
    }

    #[test]
    fn starting_weapon_is_equipped() {
        let mut catalog = fixtures::catalog();
        let mut class = catalog.player_class("crusader").unwrap().clone();
        class.weapon = Some("blade".into());
        catalog.insert_class(class);

        let player = catalog
            .player_class("crusader")
            .unwrap()
            .spawn(&StartingBonus::default(), 100, &catalog)
            .unwrap();
        assert_eq!(player.equipment.weapon().map(|w| w.id.as_str()), Some("blade"));
        assert_eq!(player.effective_attack(), player.stats.attack + 5);
    }
}
