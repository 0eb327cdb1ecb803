//! Items: consumables used up in battle and equipment folded into stats.
//!
//! Item definitions are immutable content shared through `Arc`, like
//! abilities. The player carries them in an [`Inventory`] and wears them as
//! [`Equipment`]; both travel with the entity into and out of battles.

use std::sync::Arc;

use super::ability::{Ability, EffectSpec, TargetSelector};
use crate::content::Rarity;

/// Where a piece of equipment is worn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EquipSlot {
    /// One at a time; a new weapon displaces the old one.
    Weapon,
    /// Passive relics. Every artifact picked up stays worn.
    Artifact,
}

/// Flat stat contribution of a piece of equipment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct StatBonus {
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
}

impl StatBonus {
    pub fn combine(self, other: Self) -> Self {
        Self {
            attack: self.attack.saturating_add(other.attack),
            defense: self.defense.saturating_add(other.defense),
            speed: self.speed.saturating_add(other.speed),
        }
    }

    /// Sum of every component; used to rank weapons.
    pub fn total(&self) -> u32 {
        self.attack
            .saturating_add(self.defense)
            .saturating_add(self.speed)
    }
}

/// What an item does.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemKind {
    /// Used up when used in battle. Resolves like an ability with no cost,
    /// no cooldown and no rolls.
    Consumable {
        selector: TargetSelector,
        #[cfg_attr(feature = "serde", serde(default))]
        power: u32,
        effects: Vec<EffectSpec>,
    },
    Equipment { slot: EquipSlot, bonus: StatBonus },
}

/// Immutable item definition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Item {
    pub id: String,
    pub name: String,
    pub rarity: Rarity,
    pub kind: ItemKind,
}

impl Item {
    /// The ability a consumable resolves as; `None` for equipment.
    pub fn consumable_ability(&self) -> Option<Ability> {
        let ItemKind::Consumable {
            selector,
            power,
            effects,
        } = &self.kind
        else {
            return None;
        };
        Some(Ability {
            id: self.id.clone(),
            name: self.name.clone(),
            selector: *selector,
            power: *power,
            cost: 0,
            cooldown: 0,
            effects: effects.clone(),
            rolls: None,
        })
    }

    pub fn equip_slot(&self) -> Option<EquipSlot> {
        match self.kind {
            ItemKind::Equipment { slot, .. } => Some(slot),
            ItemKind::Consumable { .. } => None,
        }
    }

    pub fn bonus(&self) -> StatBonus {
        match self.kind {
            ItemKind::Equipment { bonus, .. } => bonus,
            ItemKind::Consumable { .. } => StatBonus::default(),
        }
    }

    pub fn is_healing(&self) -> bool {
        matches!(&self.kind, ItemKind::Consumable { effects, .. }
            if effects.iter().any(|effect| matches!(effect, EffectSpec::Heal(_))))
    }
}

/// Identical items held together.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemStack {
    pub item: Arc<Item>,
    pub count: u32,
}

/// Carried items, in pickup order of their first copy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Inventory {
    stacks: Vec<ItemStack>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item: Arc<Item>) {
        match self.stacks.iter_mut().find(|stack| stack.item.id == item.id) {
            Some(stack) => stack.count = stack.count.saturating_add(1),
            None => self.stacks.push(ItemStack { item, count: 1 }),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Item>> {
        self.stacks
            .iter()
            .find(|stack| stack.item.id == id)
            .map(|stack| &stack.item)
    }

    pub fn count(&self, id: &str) -> u32 {
        self.stacks
            .iter()
            .find(|stack| stack.item.id == id)
            .map_or(0, |stack| stack.count)
    }

    /// Removes one copy of `id`.
    pub fn take(&mut self, id: &str) -> Option<Arc<Item>> {
        let index = self.stacks.iter().position(|stack| stack.item.id == id)?;
        let stack = &mut self.stacks[index];
        stack.count -= 1;
        let item = stack.item.clone();
        if stack.count == 0 {
            self.stacks.remove(index);
        }
        Some(item)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemStack> {
        self.stacks.iter()
    }

    /// Number of distinct items.
    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }
}

/// Worn equipment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Equipment {
    weapon: Option<Arc<Item>>,
    artifacts: Vec<Arc<Item>>,
}

impl Equipment {
    pub fn weapon(&self) -> Option<&Arc<Item>> {
        self.weapon.as_ref()
    }

    pub fn artifacts(&self) -> &[Arc<Item>] {
        &self.artifacts
    }

    /// Combined bonus of everything worn.
    pub fn bonus(&self) -> StatBonus {
        self.weapon
            .iter()
            .chain(&self.artifacts)
            .fold(StatBonus::default(), |acc, item| acc.combine(item.bonus()))
    }

    /// Wears `item`, returning the weapon it displaced.
    ///
    /// Items that are not equipment are handed back as the error.
    pub fn equip(&mut self, item: Arc<Item>) -> Result<Option<Arc<Item>>, Arc<Item>> {
        match item.equip_slot() {
            Some(EquipSlot::Weapon) => Ok(self.weapon.replace(item)),
            Some(EquipSlot::Artifact) => {
                self.artifacts.push(item);
                Ok(None)
            }
            None => Err(item),
        }
    }

    /// True when `item` is a weapon that beats the one currently worn.
    pub fn is_upgrade(&self, item: &Item) -> bool {
        item.equip_slot() == Some(EquipSlot::Weapon)
            && self
                .weapon
                .as_ref()
                .is_none_or(|current| item.bonus().total() > current.bonus().total())
    }
}
