use std::fmt;
use std::sync::Arc;

use arrayvec::ArrayVec;

use super::ability::{Ability, AbilitySlot};
use super::item::{Equipment, Inventory};
use super::status::{StatusEffects, StatusKind};
use crate::config::GameConfig;
use crate::content::Bounty;

/// Unique identifier for any combat participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl EntityId {
    /// Reserved identifier for the player character.
    pub const PLAYER: Self = Self(0);

    /// Returns true if this entity represents the player.
    #[inline]
    pub const fn is_player(self) -> bool {
        self.0 == Self::PLAYER.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::PLAYER
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Side of a battle. Offensive selectors target the opposing faction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Faction {
    Ally,
    Enemy,
}

impl Faction {
    pub const fn opposing(self) -> Self {
        match self {
            Self::Ally => Self::Enemy,
            Self::Enemy => Self::Ally,
        }
    }
}

/// What an entity was spawned from.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntityKind {
    Player { class: String },
    Enemy { variant: String, boss: bool, elite: bool },
}

impl EntityKind {
    pub fn is_boss(&self) -> bool {
        matches!(self, Self::Enemy { boss: true, .. })
    }
}

/// Template stats before level and multiplier scaling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaseStats {
    pub max_health: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
}

/// Concrete stats of a spawned entity.
///
/// `current_health` is private so that `0 <= current <= max` holds at all times.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stats {
    max_health: u32,
    current_health: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
}

impl Stats {
    pub fn from_base(base: BaseStats) -> Self {
        Self {
            max_health: base.max_health.max(1),
            current_health: base.max_health.max(1),
            attack: base.attack,
            defense: base.defense,
            speed: base.speed,
        }
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    pub fn current_health(&self) -> u32 {
        self.current_health
    }

    pub fn is_depleted(&self) -> bool {
        self.current_health == 0
    }

    /// Removes health, returning the amount actually lost.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let lost = amount.min(self.current_health);
        self.current_health -= lost;
        lost
    }

    /// Restores health up to the maximum, returning the amount actually gained.
    pub fn restore(&mut self, amount: u32) -> u32 {
        let gained = amount.min(self.max_health - self.current_health);
        self.current_health += gained;
        gained
    }

    pub fn restore_full(&mut self) {
        self.current_health = self.max_health;
    }

    /// Changes the maximum, clamping current health into range.
    pub fn set_max_health(&mut self, max_health: u32) {
        self.max_health = max_health.max(1);
        self.current_health = self.current_health.min(self.max_health);
    }
}

/// Roll-related traits. All values are percentages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatTraits {
    pub crit_chance: u32,
    pub crit_damage: u32,
    pub dodge_chance: u32,
}

impl Default for CombatTraits {
    fn default() -> Self {
        Self {
            crit_chance: GameConfig::DEFAULT_CRIT_CHANCE,
            crit_damage: GameConfig::DEFAULT_CRIT_DAMAGE,
            dodge_chance: GameConfig::DEFAULT_DODGE_CHANCE,
        }
    }
}

/// Current/maximum pair for the ability resource.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceMeter {
    pub current: u32,
    pub maximum: u32,
}

impl ResourceMeter {
    pub fn new(current: u32, maximum: u32) -> Self {
        Self {
            current: current.min(maximum),
            maximum,
        }
    }

    pub fn full(maximum: u32) -> Self {
        Self::new(maximum, maximum)
    }

    pub fn can_spend(&self, amount: u32) -> bool {
        self.current >= amount
    }

    pub fn spend(&mut self, amount: u32) -> bool {
        if !self.can_spend(amount) {
            return false;
        }
        self.current -= amount;
        true
    }

    pub fn restore(&mut self, amount: u32) {
        self.current = self.current.saturating_add(amount).min(self.maximum);
    }
}

/// A combat participant.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub kind: EntityKind,
    pub faction: Faction,
    pub level: u32,
    pub stats: Stats,
    pub traits: CombatTraits,
    pub resource: ResourceMeter,
    pub statuses: StatusEffects,
    abilities: ArrayVec<AbilitySlot, { GameConfig::MAX_ABILITIES }>,
    pub inventory: Inventory,
    /// Flat bonuses added to base stats before status modifiers.
    pub equipment: Equipment,
    /// Rewards granted when this entity is defeated.
    pub bounty: Option<Bounty>,
    /// Set by a stun tick; consumed by the next turn the entity would take.
    pub skip_next_action: bool,
}

impl Entity {
    pub fn new(
        id: EntityId,
        name: impl Into<String>,
        kind: EntityKind,
        faction: Faction,
        base: BaseStats,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            faction,
            level: 1,
            stats: Stats::from_base(base),
            traits: CombatTraits::default(),
            resource: ResourceMeter::default(),
            statuses: StatusEffects::empty(),
            abilities: ArrayVec::new(),
            inventory: Inventory::new(),
            equipment: Equipment::default(),
            bounty: None,
            skip_next_action: false,
        }
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level.max(1);
        self
    }

    pub fn with_traits(mut self, traits: CombatTraits) -> Self {
        self.traits = traits;
        self
    }

    pub fn with_resource(mut self, resource: ResourceMeter) -> Self {
        self.resource = resource;
        self
    }

    pub fn with_bounty(mut self, bounty: Bounty) -> Self {
        self.bounty = Some(bounty);
        self
    }

    /// Builder form of [`learn`](Self::learn). Abilities past capacity are dropped.
    pub fn with_ability(mut self, ability: Arc<Ability>) -> Self {
        self.learn(ability);
        self
    }

    /// Adds an ability slot. Returns false if the entity already knows the
    /// ability or has no free slot.
    pub fn learn(&mut self, ability: Arc<Ability>) -> bool {
        if self.ability(&ability.id).is_some() || self.abilities.is_full() {
            return false;
        }
        self.abilities.push(AbilitySlot::new(ability));
        true
    }

    pub fn abilities(&self) -> &[AbilitySlot] {
        &self.abilities
    }

    pub fn ability(&self, id: &str) -> Option<&AbilitySlot> {
        self.abilities.iter().find(|slot| slot.id() == id)
    }

    pub fn ability_mut(&mut self, id: &str) -> Option<&mut AbilitySlot> {
        self.abilities.iter_mut().find(|slot| slot.id() == id)
    }

    pub fn tick_cooldowns(&mut self) {
        for slot in &mut self.abilities {
            slot.tick_cooldown();
        }
    }

    pub fn reset_cooldowns(&mut self) {
        for slot in &mut self.abilities {
            slot.cooldown_remaining = 0;
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, EntityKind::Player { .. })
    }

    pub fn is_alive(&self) -> bool {
        !self.stats.is_depleted()
    }

    pub fn is_defeated(&self) -> bool {
        self.stats.is_depleted()
    }

    pub fn current_health(&self) -> u32 {
        self.stats.current_health()
    }

    pub fn max_health(&self) -> u32 {
        self.stats.max_health()
    }

    pub fn take_damage(&mut self, amount: u32) -> u32 {
        self.stats.take_damage(amount)
    }

    pub fn heal(&mut self, amount: u32) -> u32 {
        self.stats.restore(amount)
    }

    // ========================================================================
    // Effective stats (equipment, then status modifiers)
    // ========================================================================

    pub fn effective_attack(&self) -> u32 {
        let base = self.stats.attack.saturating_add(self.equipment.bonus().attack);
        self.modified(base, StatusKind::AttackUp, StatusKind::AttackDown)
    }

    pub fn effective_defense(&self) -> u32 {
        let base = self.stats.defense.saturating_add(self.equipment.bonus().defense);
        self.modified(base, StatusKind::DefenseUp, StatusKind::DefenseDown)
    }

    pub fn effective_speed(&self) -> u32 {
        let base = self.stats.speed.saturating_add(self.equipment.bonus().speed);
        self.modified(base, StatusKind::SpeedUp, StatusKind::SpeedDown)
    }

    fn modified(&self, base: u32, up: StatusKind, down: StatusKind) -> u32 {
        let percent = 100 + i64::from(self.statuses.total_magnitude(up))
            - i64::from(self.statuses.total_magnitude(down));
        u32::try_from(i64::from(base) * percent.max(0) / 100).unwrap_or(u32::MAX)
    }

    /// Drops battle-scoped state: statuses, cooldowns and a pending stun.
    pub fn clear_battle_state(&mut self) {
        self.statuses.clear();
        self.reset_cooldowns();
        self.skip_next_action = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{StackingPolicy, StatusEffectInstance};

    fn knight() -> Entity {
        Entity::new(
            EntityId::PLAYER,
            "Knight",
            EntityKind::Player {
                class: "crusader".into(),
            },
            Faction::Ally,
            BaseStats {
                max_health: 100,
                attack: 15,
                defense: 10,
                speed: 8,
            },
        )
    }

    #[test]
    fn health_is_clamped_both_ways() {
        let mut entity = knight();
        assert_eq!(entity.take_damage(130), 100);
        assert_eq!(entity.current_health(), 0);
        assert!(entity.is_defeated());
        assert_eq!(entity.heal(250), 100);
        assert_eq!(entity.current_health(), 100);
    }

    #[test]
    fn lowering_max_health_clamps_current() {
        let mut entity = knight();
        entity.stats.set_max_health(60);
        assert_eq!(entity.current_health(), 60);
    }

    #[test]
    fn effective_stats_apply_percent_modifiers() {
        let mut entity = knight();
        entity
            .statuses
            .push(StatusEffectInstance::new(
                StatusKind::DefenseUp,
                50,
                1,
                StackingPolicy::Refresh,
            ))
            .unwrap();
        entity
            .statuses
            .push(StatusEffectInstance::new(
                StatusKind::AttackDown,
                200,
                1,
                StackingPolicy::Refresh,
            ))
            .unwrap();
        assert_eq!(entity.effective_defense(), 15);
        assert_eq!(entity.effective_attack(), 0);
        assert_eq!(entity.effective_speed(), 8);
    }

    #[test]
    fn equipment_bonus_applies_before_status_percent() {
        use crate::content::Rarity;
        use crate::state::{EquipSlot, Item, ItemKind, StatBonus};

        let mut entity = knight();
        let sword = Item {
            id: "sword_of_faith".into(),
            name: "Sword of Faith".into(),
            rarity: Rarity::Common,
            kind: ItemKind::Equipment {
                slot: EquipSlot::Weapon,
                bonus: StatBonus {
                    attack: 5,
                    ..StatBonus::default()
                },
            },
        };
        entity.equipment.equip(Arc::new(sword)).unwrap();
        assert_eq!(entity.effective_attack(), 20);

        entity
            .statuses
            .push(StatusEffectInstance::new(
                StatusKind::AttackUp,
                50,
                1,
                StackingPolicy::Refresh,
            ))
            .unwrap();
        assert_eq!(entity.effective_attack(), 30);
        assert_eq!(entity.stats.attack, 15);
    }

    #[test]
    fn resource_meter_refuses_overspend() {
        let mut meter = ResourceMeter::full(10);
        assert!(meter.spend(7));
        assert!(!meter.spend(7));
        meter.restore(100);
        assert_eq!(meter.current, 10);
    }
}
