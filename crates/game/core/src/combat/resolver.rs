//! Turns an action into outcomes.
//!
//! Resolution is split into a read-only validation pass and a commit pass.
//! Every [`UnavailableReason`] is detected before anything is mutated, and
//! status effects are rehearsed on scratch copies of the targets' statuses,
//! so a rejected action leaves the roster and the RNG stream untouched.

use std::sync::Arc;

use crate::rng::RngStream;
use crate::state::{Ability, EffectSpec, Entity, EntityId, Roster, TargetSelector};

use super::damage::{apply_critical, calculate_damage};
use super::error::{ActionError, StatusError, UnavailableReason};
use super::outcome::{ActionOutcome, StatusChange, TargetOutcome};
use super::status;

/// Which ability an action uses.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AbilityRef {
    /// The shared basic attack every entity can use.
    BasicAttack,
    /// An ability in the actor's slots, by id.
    Known(String),
    /// A consumable from the actor's inventory, by item id.
    Item(String),
}

impl AbilityRef {
    pub fn known(id: impl Into<String>) -> Self {
        Self::Known(id.into())
    }

    pub fn item(id: impl Into<String>) -> Self {
        Self::Item(id.into())
    }
}

/// A fully specified action ready for resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Action {
    pub actor: EntityId,
    pub ability: AbilityRef,
    pub targets: Vec<EntityId>,
}

/// Where the resolved ability came from; decides what is spent on commit.
enum Source {
    Basic,
    Slot(String),
    Item(String),
}

/// Per-target roll results.
struct Rolls {
    evaded: bool,
    critical: bool,
    status_lands: bool,
}

/// Resolves `action` against `roster`, drawing randomness from `rng`.
///
/// Abilities with a roll profile draw exactly three values per target, in the
/// order evasion, critical, status. Abilities without one draw nothing.
pub fn resolve(
    action: &Action,
    roster: &mut Roster,
    rng: &mut RngStream,
) -> Result<ActionOutcome, ActionError> {
    // ========================================================================
    // Validation (read-only)
    // ========================================================================
    let actor = roster
        .get(action.actor)
        .ok_or(UnavailableReason::ActorNotFound(action.actor))?;
    if actor.is_defeated() {
        return Err(UnavailableReason::ActorDefeated(action.actor).into());
    }
    let (ability, source) = lookup_ability(actor, &action.ability)?;
    if !actor.resource.can_spend(ability.cost) {
        return Err(UnavailableReason::InsufficientResource {
            ability: ability.id.clone(),
            required: ability.cost,
            available: actor.resource.current,
        }
        .into());
    }
    let targets = resolve_targets(actor, &ability, &action.targets, roster)?;
    rehearse_statuses(&ability, &targets, roster)?;

    let attack = actor.effective_attack();
    let traits = actor.traits;
    let faction = actor.faction;
    let offensive = ability.is_offensive();

    // ========================================================================
    // Commit
    // ========================================================================
    let mut consumed = None;
    if let Some(actor) = roster.get_mut(action.actor) {
        actor.resource.spend(ability.cost);
        match source {
            Source::Basic => {}
            Source::Slot(id) => {
                if let Some(slot) = actor.ability_mut(&id) {
                    slot.start_cooldown();
                }
            }
            Source::Item(id) => consumed = actor.inventory.take(&id).map(|item| item.id.clone()),
        }
    }

    let mut outcome = ActionOutcome {
        actor: action.actor,
        ability: ability.id.clone(),
        resource_spent: ability.cost,
        consumed,
        targets: Vec::with_capacity(targets.len()),
    };

    for target_id in targets {
        let Some(target) = roster.get_mut(target_id) else {
            continue;
        };
        let was_alive = target.is_alive();
        let hostile = target.faction != faction;

        let rolls = match ability.rolls {
            Some(profile) => {
                let evade_roll = rng.roll_d100();
                let crit_roll = rng.roll_d100();
                let status_roll = rng.roll_d100();
                let hit_chance = if hostile {
                    profile.accuracy.saturating_sub(target.traits.dodge_chance)
                } else {
                    100
                };
                let evaded = evade_roll > hit_chance;
                Rolls {
                    evaded,
                    critical: !evaded && crit_roll <= traits.crit_chance + profile.crit_bonus,
                    status_lands: !evaded && status_roll <= profile.status_chance,
                }
            }
            None => Rolls {
                evaded: false,
                critical: false,
                status_lands: true,
            },
        };

        let mut result = TargetOutcome::new(target_id);
        result.evaded = rolls.evaded;

        if !rolls.evaded {
            for effect in &ability.effects {
                match effect {
                    EffectSpec::Damage => {
                        let mut amount = calculate_damage(
                            attack,
                            ability.power,
                            target.effective_defense(),
                            offensive,
                        );
                        if rolls.critical {
                            amount = apply_critical(amount, traits.crit_damage);
                            result.critical = true;
                        }
                        result.damage += target.take_damage(amount);
                    }
                    EffectSpec::Heal(formula) => {
                        if target.is_alive() {
                            result.healing += target.heal(formula.evaluate(attack, ability.power));
                        }
                    }
                    EffectSpec::ApplyStatus(spec) => {
                        if rolls.status_lands && target.is_alive() {
                            let resolution = status::apply(target, spec.instance())?;
                            result.statuses_applied.push(StatusChange {
                                kind: spec.kind,
                                resolution,
                            });
                        }
                    }
                    EffectSpec::RemoveStatus(kind) => {
                        if status::remove(target, *kind) > 0 {
                            result.statuses_removed.push(*kind);
                        }
                    }
                }
            }
        }

        result.defeated = was_alive && target.is_defeated();
        outcome.targets.push(result);
    }

    Ok(outcome)
}

/// Finds the ability and where it came from.
fn lookup_ability(
    actor: &Entity,
    reference: &AbilityRef,
) -> Result<(Arc<Ability>, Source), UnavailableReason> {
    match reference {
        AbilityRef::BasicAttack => Ok((Ability::basic_attack(), Source::Basic)),
        AbilityRef::Known(id) if id == Ability::BASIC_ATTACK_ID => {
            Ok((Ability::basic_attack(), Source::Basic))
        }
        AbilityRef::Known(id) => {
            let slot = actor
                .ability(id)
                .ok_or_else(|| UnavailableReason::UnknownAbility(id.clone()))?;
            if !slot.is_ready() {
                return Err(UnavailableReason::OnCooldown {
                    ability: id.clone(),
                    remaining: slot.cooldown_remaining,
                });
            }
            Ok((slot.ability.clone(), Source::Slot(id.clone())))
        }
        AbilityRef::Item(id) => {
            let item = actor
                .inventory
                .get(id)
                .ok_or_else(|| UnavailableReason::ItemNotHeld(id.clone()))?;
            let ability = item
                .consumable_ability()
                .ok_or_else(|| UnavailableReason::NotConsumable(id.clone()))?;
            Ok((Arc::new(ability), Source::Item(id.clone())))
        }
    }
}

/// Plays the ability's status effects against copies of each target's
/// statuses, assuming every status lands.
fn rehearse_statuses(
    ability: &Ability,
    targets: &[EntityId],
    roster: &Roster,
) -> Result<(), StatusError> {
    let touches_statuses = ability.effects.iter().any(|effect| {
        matches!(effect, EffectSpec::ApplyStatus(_) | EffectSpec::RemoveStatus(_))
    });
    if !touches_statuses {
        return Ok(());
    }
    for target in targets.iter().filter_map(|id| roster.get(*id)) {
        let mut scratch = target.statuses.clone();
        for effect in &ability.effects {
            match effect {
                EffectSpec::ApplyStatus(spec) => {
                    status::apply_to(&mut scratch, spec.instance())?;
                }
                EffectSpec::RemoveStatus(kind) => {
                    status::remove_from(&mut scratch, *kind);
                }
                EffectSpec::Damage | EffectSpec::Heal(_) => {}
            }
        }
    }
    Ok(())
}

/// Validates the requested targets against the ability's selector.
///
/// `AllEnemies` ignores the request and targets every living opponent in
/// registration order.
fn resolve_targets(
    actor: &Entity,
    ability: &Ability,
    requested: &[EntityId],
    roster: &Roster,
) -> Result<Vec<EntityId>, UnavailableReason> {
    match ability.selector {
        TargetSelector::SelfOnly => match requested.iter().find(|id| **id != actor.id) {
            Some(other) => Err(UnavailableReason::SelfOnly(*other)),
            None => Ok(vec![actor.id]),
        },
        TargetSelector::SingleEnemy | TargetSelector::SingleAlly => {
            let [target_id] = requested else {
                return Err(UnavailableReason::WrongTargetCount(requested.len()));
            };
            let target = roster
                .get(*target_id)
                .ok_or(UnavailableReason::TargetNotFound(*target_id))?;
            if target.is_defeated() {
                return Err(UnavailableReason::TargetDefeated(*target_id));
            }
            let wanted = if ability.selector == TargetSelector::SingleEnemy {
                actor.faction.opposing()
            } else {
                actor.faction
            };
            if target.faction != wanted {
                return Err(UnavailableReason::WrongFaction(*target_id));
            }
            Ok(vec![*target_id])
        }
        TargetSelector::AllEnemies => {
            let targets: Vec<EntityId> = roster
                .living(actor.faction.opposing())
                .map(|entity| entity.id)
                .collect();
            if targets.is_empty() {
                return Err(UnavailableReason::NoTargets);
            }
            Ok(targets)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::content::{ContentOracle, fixtures};
    use crate::meta::StartingBonus;
    use crate::state::{
        RollProfile, StackingPolicy, StatusEffectInstance, StatusKind, StatusSpec,
    };

    fn battle_roster() -> Roster {
        let catalog = fixtures::catalog();
        let player = catalog
            .player_class("crusader")
            .unwrap()
            .spawn(&StartingBonus::default(), 100, &catalog)
            .unwrap();
        let imp = catalog.enemy_variant("imp").unwrap();
        let first = imp.spawn(EntityId(1), 1, 100, false, &catalog).unwrap();
        let second = imp.spawn(EntityId(2), 1, 100, false, &catalog).unwrap();
        Roster::new(vec![player, first, second])
    }

    fn action(actor: EntityId, ability: AbilityRef, targets: Vec<EntityId>) -> Action {
        Action {
            actor,
            ability,
            targets,
        }
    }

    #[test]
    fn deterministic_ability_hits_without_drawing() {
        let mut roster = battle_roster();
        let mut rng = RngStream::new(1);

        let outcome = resolve(
            &action(EntityId::PLAYER, AbilityRef::known("smite"), vec![EntityId(1)]),
            &mut roster,
            &mut rng,
        )
        .unwrap();

        // floor(15 × 150 / 100) − 2 = 20
        assert_eq!(outcome.targets[0].damage, 20);
        assert_eq!(outcome.resource_spent, 5);
        assert_eq!(rng.draws(), 0);
        let player = roster.get(EntityId::PLAYER).unwrap();
        assert_eq!(player.resource.current, 25);
        assert_eq!(player.ability("smite").unwrap().cooldown_remaining, 2);
    }

    #[test]
    fn rejected_action_mutates_nothing() {
        let mut roster = battle_roster();
        let before = roster.clone();
        let mut rng = RngStream::new(1);

        let err = resolve(
            &action(EntityId::PLAYER, AbilityRef::BasicAttack, vec![EntityId::PLAYER]),
            &mut roster,
            &mut rng,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ActionError::Unavailable(UnavailableReason::WrongFaction(EntityId::PLAYER))
        );
        assert_eq!(roster, before);
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn cooldown_blocks_second_use() {
        let mut roster = battle_roster();
        let mut rng = RngStream::new(1);
        let smite = action(EntityId::PLAYER, AbilityRef::known("smite"), vec![EntityId(1)]);
        resolve(&smite, &mut roster, &mut rng).unwrap();

        let err = resolve(&smite, &mut roster, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            ActionError::Unavailable(UnavailableReason::OnCooldown { remaining: 2, .. })
        ));
    }

    #[test]
    fn insufficient_resource_is_rejected() {
        let mut roster = battle_roster();
        roster.get_mut(EntityId::PLAYER).unwrap().resource.current = 2;
        let err = resolve(
            &action(EntityId::PLAYER, AbilityRef::known("smite"), vec![EntityId(1)]),
            &mut roster,
            &mut RngStream::new(1),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ActionError::Unavailable(UnavailableReason::InsufficientResource {
                required: 5,
                available: 2,
                ..
            })
        ));
    }

    #[test]
    fn rolled_ability_draws_three_values_per_target() {
        let mut roster = battle_roster();
        let mut rng = RngStream::new(99);
        resolve(
            &action(EntityId::PLAYER, AbilityRef::BasicAttack, vec![EntityId(2)]),
            &mut roster,
            &mut rng,
        )
        .unwrap();
        assert_eq!(rng.draws(), 3);
    }

    #[test]
    fn same_seed_same_outcome() {
        let run = |seed| {
            let mut roster = battle_roster();
            let mut rng = RngStream::new(seed);
            let outcome = resolve(
                &action(EntityId(1), AbilityRef::known("venom"), vec![EntityId::PLAYER]),
                &mut roster,
                &mut rng,
            )
            .unwrap();
            (outcome, roster)
        };
        assert_eq!(run(1234), run(1234));
    }

    #[test]
    fn sweep_hits_every_living_enemy_in_order() {
        let mut roster = battle_roster();
        roster.get_mut(EntityId(1)).unwrap().take_damage(1_000);

        let outcome = resolve(
            &action(EntityId::PLAYER, AbilityRef::known("sweep"), Vec::new()),
            &mut roster,
            &mut RngStream::new(5),
        )
        .unwrap();
        let hit: Vec<EntityId> = outcome.targets.iter().map(|t| t.target).collect();
        assert_eq!(hit, vec![EntityId(2)]);
    }

    #[test]
    fn lethal_hit_reports_defeat_and_clamps_health() {
        let mut roster = battle_roster();
        roster.get_mut(EntityId::PLAYER).unwrap().stats.attack = 500;

        let outcome = resolve(
            &action(EntityId::PLAYER, AbilityRef::known("smite"), vec![EntityId(1)]),
            &mut roster,
            &mut RngStream::new(5),
        )
        .unwrap();
        assert!(outcome.targets[0].defeated);
        assert_eq!(roster.get(EntityId(1)).unwrap().current_health(), 0);
        assert_eq!(outcome.defeated().collect::<Vec<_>>(), vec![EntityId(1)]);
    }

    #[test]
    fn potion_heals_and_is_used_up() {
        let mut roster = battle_roster();
        roster.get_mut(EntityId::PLAYER).unwrap().take_damage(50);
        let mut rng = RngStream::new(5);
        let drink = action(EntityId::PLAYER, AbilityRef::item("potion"), Vec::new());

        let outcome = resolve(&drink, &mut roster, &mut rng).unwrap();
        assert_eq!(outcome.consumed.as_deref(), Some("potion"));
        assert_eq!(outcome.resource_spent, 0);
        assert_eq!(outcome.targets[0].healing, 30);
        assert_eq!(rng.draws(), 0);
        let player = roster.get(EntityId::PLAYER).unwrap();
        assert_eq!(player.current_health(), 80);
        assert_eq!(player.inventory.count("potion"), 0);

        let err = resolve(&drink, &mut roster, &mut rng).unwrap_err();
        assert_eq!(
            err,
            ActionError::Unavailable(UnavailableReason::ItemNotHeld("potion".into()))
        );
    }

    #[test]
    fn equipment_cannot_be_used_in_battle() {
        let mut roster = battle_roster();
        let blade = fixtures::catalog().item("blade").unwrap();
        roster.get_mut(EntityId::PLAYER).unwrap().inventory.add(blade);
        let before = roster.clone();

        let err = resolve(
            &action(EntityId::PLAYER, AbilityRef::item("blade"), Vec::new()),
            &mut roster,
            &mut RngStream::new(5),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ActionError::Unavailable(UnavailableReason::NotConsumable("blade".into()))
        );
        assert_eq!(roster, before);
    }

    #[test]
    fn status_fault_is_caught_before_anything_changes() {
        let mut roster = battle_roster();
        let blight = Ability {
            cost: 5,
            cooldown: 3,
            effects: vec![
                EffectSpec::Damage,
                EffectSpec::ApplyStatus(StatusSpec {
                    kind: StatusKind::Poison,
                    magnitude: 2,
                    duration: 2,
                    stacking: StackingPolicy::Stack,
                }),
            ],
            rolls: Some(RollProfile {
                accuracy: 100,
                crit_bonus: 0,
                status_chance: 100,
            }),
            ..fixtures::ability("blight", TargetSelector::SingleEnemy, 100)
        };
        roster
            .get_mut(EntityId::PLAYER)
            .unwrap()
            .learn(Arc::new(blight));
        roster
            .get_mut(EntityId(1))
            .unwrap()
            .statuses
            .push(StatusEffectInstance::new(
                StatusKind::Poison,
                3,
                2,
                StackingPolicy::Refresh,
            ))
            .unwrap();
        let before = roster.clone();
        let mut rng = RngStream::new(5);

        let err = resolve(
            &action(EntityId::PLAYER, AbilityRef::known("blight"), vec![EntityId(1)]),
            &mut roster,
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ActionError::Status(StatusError::PolicyMismatch { .. })
        ));
        assert_eq!(roster, before);
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn full_status_set_is_caught_before_anything_changes() {
        let mut roster = battle_roster();
        let player = roster.get_mut(EntityId::PLAYER).unwrap();
        for _ in 0..GameConfig::MAX_STATUS_EFFECTS {
            player
                .statuses
                .push(StatusEffectInstance::new(
                    StatusKind::Burn,
                    1,
                    5,
                    StackingPolicy::Stack,
                ))
                .unwrap();
        }
        let before = roster.clone();
        let mut rng = RngStream::new(5);

        let err = resolve(
            &action(EntityId(1), AbilityRef::known("venom"), vec![EntityId::PLAYER]),
            &mut roster,
            &mut rng,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ActionError::Status(StatusError::Overflow {
                kind: StatusKind::Poison
            })
        );
        assert_eq!(roster, before);
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn self_heal_targets_actor_only() {
        let mut roster = battle_roster();
        roster.get_mut(EntityId::PLAYER).unwrap().take_damage(50);
        let outcome = resolve(
            &action(EntityId::PLAYER, AbilityRef::known("mend"), Vec::new()),
            &mut roster,
            &mut RngStream::new(5),
        )
        .unwrap();
        assert_eq!(outcome.targets[0].target, EntityId::PLAYER);
        assert_eq!(outcome.targets[0].healing, 20);
    }
}
