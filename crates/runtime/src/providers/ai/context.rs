//! AI context for decision-making.
//!
//! Wraps a [`BattleView`] around the acting entity and answers the questions
//! every decision policy asks: which abilities can be used right now, who is
//! the weakest opponent, which ally needs healing, and how to turn an ability
//! into a legal [`ActionSelection`].

use demonbane_core::{
    Ability, ActionSelection, BattleView, EffectSpec, Entity, EntityId, RngStream,
    TargetSelector,
};

/// Read-only decision context for one actor's turn.
#[derive(Clone, Copy)]
pub struct AiContext<'a> {
    view: BattleView<'a>,
    actor: &'a Entity,
}

impl<'a> AiContext<'a> {
    /// Returns `None` if the actor is not part of the battle.
    pub fn new(view: &BattleView<'a>, actor: EntityId) -> Option<Self> {
        Some(Self {
            view: *view,
            actor: view.entity(actor)?,
        })
    }

    pub fn actor(&self) -> &'a Entity {
        self.actor
    }

    pub fn view(&self) -> &BattleView<'a> {
        &self.view
    }

    /// Current health as a percentage of max health.
    pub fn health_percent(&self) -> u32 {
        health_percent(self.actor)
    }

    // ========================================================================
    // Abilities
    // ========================================================================

    /// Known abilities that are off cooldown and affordable, in slot order.
    pub fn usable_abilities(&self) -> Vec<&'a Ability> {
        self.actor
            .abilities()
            .iter()
            .filter(|slot| slot.is_ready() && self.actor.resource.can_spend(slot.ability.cost))
            .map(|slot| slot.ability.as_ref())
            .collect()
    }

    /// Usable abilities that damage opponents.
    pub fn offensive_abilities(&self) -> Vec<&'a Ability> {
        self.usable_abilities()
            .into_iter()
            .filter(|ability| ability.is_offensive())
            .collect()
    }

    /// Usable abilities with a heal effect.
    pub fn healing_abilities(&self) -> Vec<&'a Ability> {
        self.usable_abilities()
            .into_iter()
            .filter(|ability| is_healing(ability))
            .collect()
    }

    /// Uses the first carried consumable that heals.
    pub fn healing_item(&self) -> Option<ActionSelection> {
        let stack = self
            .actor
            .inventory
            .iter()
            .find(|stack| stack.item.is_healing())?;
        let ability = stack.item.consumable_ability()?;
        let targets = self.select(&ability, None)?.targets;
        Some(ActionSelection::item(stack.item.id.clone(), targets))
    }

    /// The usable offensive ability with the highest power; earlier slots win ties.
    pub fn strongest_offensive(&self) -> Option<&'a Ability> {
        self.offensive_abilities()
            .into_iter()
            .rev()
            .max_by_key(|ability| ability.power)
    }

    // ========================================================================
    // Targets
    // ========================================================================

    /// Living opponents in registration order.
    pub fn opponents(&self) -> Vec<&'a Entity> {
        self.view.opponents_of(self.actor.id)
    }

    /// Opponent with the least current health; registration order breaks ties.
    pub fn weakest_opponent(&self) -> Option<EntityId> {
        self.opponents()
            .into_iter()
            .min_by_key(|entity| entity.current_health())
            .map(|entity| entity.id)
    }

    /// Ally (or self) with the lowest health percentage.
    pub fn most_wounded_ally(&self) -> Option<EntityId> {
        self.view
            .allies_of(self.actor.id)
            .into_iter()
            .min_by_key(|entity| health_percent(entity))
            .map(|entity| entity.id)
    }

    pub fn random_opponent(&self, rng: &mut RngStream) -> Option<EntityId> {
        let opponents = self.opponents();
        rng.pick(opponents.len()).map(|index| opponents[index].id)
    }

    /// Builds a legal selection for `ability`.
    ///
    /// `preferred` is used for single-enemy abilities; other selectors pick
    /// their own targets. Returns `None` when no legal target exists.
    pub fn select(&self, ability: &Ability, preferred: Option<EntityId>) -> Option<ActionSelection> {
        let targets = match ability.selector {
            TargetSelector::SelfOnly => vec![self.actor.id],
            TargetSelector::SingleEnemy => vec![preferred.or_else(|| self.weakest_opponent())?],
            TargetSelector::SingleAlly => vec![self.most_wounded_ally()?],
            TargetSelector::AllEnemies => {
                let opponents: Vec<EntityId> =
                    self.opponents().iter().map(|entity| entity.id).collect();
                if opponents.is_empty() {
                    return None;
                }
                opponents
            }
        };
        Some(ActionSelection::ability(ability.id.clone(), targets))
    }

    /// Basic attack against `target`, or against the weakest opponent.
    pub fn basic_attack(&self, target: Option<EntityId>) -> ActionSelection {
        let target = target
            .or_else(|| self.weakest_opponent())
            .unwrap_or(self.actor.id);
        ActionSelection::basic_attack(target)
    }
}

pub fn is_healing(ability: &Ability) -> bool {
    ability
        .effects
        .iter()
        .any(|effect| matches!(effect, EffectSpec::Heal(_)))
}

fn health_percent(entity: &Entity) -> u32 {
    let max = entity.max_health().max(1);
    (u64::from(entity.current_health()) * 100 / u64::from(max)) as u32
}
