//! Entity data model shared by combat, battles and runs.
//!
//! Entities own their stats, statuses, ability slots and gear outright; battles
//! borrow them through a [`Roster`] and hand the player back when they end.
mod ability;
mod entity;
mod item;
mod roster;
mod status;

pub use ability::{
    Ability, AbilitySlot, EffectSpec, Formula, RollProfile, StatusSpec, TargetSelector,
};
pub use entity::{
    BaseStats, CombatTraits, Entity, EntityId, EntityKind, Faction, ResourceMeter, Stats,
};
pub use item::{EquipSlot, Equipment, Inventory, Item, ItemKind, ItemStack, StatBonus};
pub use roster::Roster;
pub use status::{
    StackingPolicy, StatusCategory, StatusEffectInstance, StatusEffects, StatusKind,
};
