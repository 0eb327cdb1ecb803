//! Round-based battle state machine.
//!
//! ```text
//! Init → RoundStart → ActorTurn ⇄ ActionResolution → RoundEnd → RoundStart …
//!                          ↘ Won | Lost | Aborted
//! ```
//!
//! The controller is driven step by step: [`BattleController::advance`] moves
//! through AI turns and round boundaries, and stops with
//! [`BattleStep::AwaitingInput`] whenever the player-controlled entity acts.
//! The caller then answers with [`BattleController::submit`].

use crate::combat::{self, ActionOutcome, TickReport, status};
use crate::config::GameConfig;
use crate::rng::{RngStream, SeedDomain, derive_seed};
use crate::state::{Entity, EntityId, Faction, Roster};

use super::error::BattleError;
use super::result::{BattleOutcome, BattleResult, ItemDrop};
use super::scheduler::{Advance, TurnQueue};
use super::selection::{ActionSelection, BattleView, EnemyAi};

/// Battle lifecycle phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattlePhase {
    Init,
    RoundStart,
    ActorTurn,
    ActionResolution,
    RoundEnd,
    Won,
    Lost,
    Aborted,
}

impl BattlePhase {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost | Self::Aborted)
    }
}

/// Observable progress of a battle, one per controller call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BattleStep {
    Started {
        participants: Vec<EntityId>,
    },
    RoundStarted {
        round: u32,
        order: Vec<EntityId>,
        ticks: Vec<TickReport>,
    },
    AwaitingInput {
        actor: EntityId,
    },
    /// The actor was stunned and lost this turn.
    TurnSkipped {
        actor: EntityId,
    },
    ActionResolved(ActionOutcome),
    RoundEnded {
        round: u32,
        removed: Vec<EntityId>,
    },
    Finished(BattleResult),
}

/// Drives a single battle to completion.
#[derive(Clone, Debug)]
pub struct BattleController {
    seed: u64,
    rng: RngStream,
    phase: BattlePhase,
    roster: Roster,
    fallen: Vec<Entity>,
    queue: Option<TurnQueue>,
    awaiting: Option<EntityId>,
    round: u32,
    turns: u32,
    resource_regen: u32,
    result: Option<BattleResult>,
}

impl BattleController {
    /// Creates a battle with participants registered in the given order.
    pub fn new(seed: u64, participants: Vec<Entity>, config: &GameConfig) -> Self {
        Self {
            seed,
            rng: RngStream::new(seed),
            phase: BattlePhase::Init,
            roster: Roster::new(participants),
            fallen: Vec::new(),
            queue: None,
            awaiting: None,
            round: 0,
            turns: 0,
            resource_regen: config.resource_regen_per_round,
            result: None,
        }
    }

    /// Creates the `battle_index`-th battle of a run, seeding it from the run seed.
    pub fn for_run(
        run_seed: u64,
        battle_index: u32,
        participants: Vec<Entity>,
        config: &GameConfig,
    ) -> Self {
        let seed = derive_seed(run_seed, SeedDomain::Battle, u64::from(battle_index));
        Self::new(seed, participants, config)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn turns(&self) -> u32 {
        self.turns
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn awaiting_input(&self) -> Option<EntityId> {
        self.awaiting
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn result(&self) -> Option<&BattleResult> {
        self.result.as_ref()
    }

    pub fn view(&self) -> BattleView<'_> {
        BattleView::new(&self.roster, self.round, self.seed, self.turns)
    }

    // ========================================================================
    // Driving
    // ========================================================================

    /// Advances the battle by one observable step.
    ///
    /// Fails with [`BattleError::AwaitingInput`] while a player selection is
    /// pending. Once finished, keeps returning [`BattleStep::Finished`].
    pub fn advance(&mut self, ai: &dyn EnemyAi) -> Result<BattleStep, BattleError> {
        match self.phase {
            BattlePhase::Init => {
                self.phase = BattlePhase::RoundStart;
                tracing::debug!(seed = self.seed, participants = self.roster.len(), "battle started");
                Ok(BattleStep::Started {
                    participants: self.roster.iter().map(|entity| entity.id).collect(),
                })
            }
            BattlePhase::RoundStart => Ok(self.start_round()),
            BattlePhase::ActorTurn | BattlePhase::ActionResolution => self.next_turn(ai),
            BattlePhase::RoundEnd => Ok(self.end_round()),
            BattlePhase::Won | BattlePhase::Lost | BattlePhase::Aborted => {
                Ok(BattleStep::Finished(self.final_result()))
            }
        }
    }

    /// Submits the player's selection for the pending turn.
    ///
    /// An unavailable action is rejected without consuming the turn; the
    /// controller keeps awaiting input for the same actor.
    pub fn submit(&mut self, selection: ActionSelection) -> Result<BattleStep, BattleError> {
        let Some(actor) = self.awaiting else {
            return Err(BattleError::NotAwaitingInput { phase: self.phase });
        };

        self.phase = BattlePhase::ActionResolution;
        let action = selection.into_action(actor);
        match combat::resolve(&action, &mut self.roster, &mut self.rng) {
            Ok(outcome) => {
                self.awaiting = None;
                Ok(self.after_action(outcome))
            }
            Err(err) if err.is_unavailable() => {
                self.phase = BattlePhase::ActorTurn;
                tracing::debug!(%actor, error = %err, "player action rejected");
                Err(err.into())
            }
            Err(err) => {
                self.awaiting = None;
                tracing::error!(%actor, error = %err, "player action failed internally");
                self.finish(BattleOutcome::Aborted);
                Err(BattleError::aborting(actor, err))
            }
        }
    }

    /// Aborts the battle. No rewards are granted. Idempotent once finished.
    pub fn abort(&mut self) -> BattleResult {
        if !self.phase.is_terminal() {
            self.awaiting = None;
            self.finish(BattleOutcome::Aborted);
        }
        self.final_result()
    }

    /// Releases the player entity with battle-scoped state cleared.
    pub fn into_player(mut self) -> Option<Entity> {
        let mut player = self.roster.take_player()?;
        player.clear_battle_state();
        Some(player)
    }

    // ========================================================================
    // Phases
    // ========================================================================

    fn start_round(&mut self) -> BattleStep {
        self.round += 1;
        let regen = self.resource_regen;

        let mut ticks = Vec::new();
        for entity in self.roster.iter_mut().filter(|entity| entity.is_alive()) {
            let report = status::tick(entity);
            entity.tick_cooldowns();
            entity.resource.restore(regen);
            if !report.is_quiet() {
                ticks.push(report);
            }
        }

        let queue = TurnQueue::build(self.round, &self.roster);
        let order = queue.order().to_vec();
        self.queue = Some(queue);
        self.phase = BattlePhase::ActorTurn;
        self.check_terminal();

        tracing::trace!(round = self.round, ?order, "round started");
        BattleStep::RoundStarted {
            round: self.round,
            order,
            ticks,
        }
    }

    fn next_turn(&mut self, ai: &dyn EnemyAi) -> Result<BattleStep, BattleError> {
        if let Some(actor) = self.awaiting {
            return Err(BattleError::AwaitingInput { actor });
        }

        let roster = &self.roster;
        let next = match self.queue.as_mut() {
            Some(queue) => queue.advance(|id| roster.is_alive(id)),
            None => Advance::RoundComplete,
        };

        let actor = match next {
            Advance::RoundComplete => {
                self.phase = BattlePhase::RoundEnd;
                return Ok(self.end_round());
            }
            Advance::Next(actor) => actor,
        };

        let Some(entity) = self.roster.get_mut(actor) else {
            return Ok(BattleStep::TurnSkipped { actor });
        };
        if entity.skip_next_action {
            entity.skip_next_action = false;
            self.turns += 1;
            return Ok(BattleStep::TurnSkipped { actor });
        }
        if entity.is_player() {
            self.awaiting = Some(actor);
            return Ok(BattleStep::AwaitingInput { actor });
        }

        let selection = ai.select_action(&self.view(), actor);
        self.phase = BattlePhase::ActionResolution;
        let action = selection.into_action(actor);
        match combat::resolve(&action, &mut self.roster, &mut self.rng) {
            Ok(outcome) => Ok(self.after_action(outcome)),
            Err(err) => {
                tracing::error!(%actor, error = %err, "enemy action failed");
                self.finish(BattleOutcome::Aborted);
                Err(BattleError::aborting(actor, err))
            }
        }
    }

    fn after_action(&mut self, outcome: ActionOutcome) -> BattleStep {
        self.turns += 1;
        self.phase = BattlePhase::ActorTurn;
        self.check_terminal();
        BattleStep::ActionResolved(outcome)
    }

    fn end_round(&mut self) -> BattleStep {
        let removed = self.roster.prune_defeated_enemies();
        let ids = removed.iter().map(|entity| entity.id).collect();
        self.fallen.extend(removed);
        self.queue = None;
        self.phase = BattlePhase::RoundStart;
        BattleStep::RoundEnded {
            round: self.round,
            removed: ids,
        }
    }

    /// Player defeat is checked first, so a simultaneous wipe is a loss.
    fn check_terminal(&mut self) {
        let lost = match self.roster.player() {
            Some(player) => player.is_defeated(),
            None => !self.roster.any_living(Faction::Ally),
        };
        if lost {
            self.finish(BattleOutcome::Lost);
        } else if !self.roster.any_living(Faction::Enemy) {
            self.finish(BattleOutcome::Won);
        }
    }

    fn finish(&mut self, outcome: BattleOutcome) {
        let mut result = BattleResult::without_rewards(outcome, self.round, self.turns);

        if outcome == BattleOutcome::Won {
            let defeated = self.fallen.iter().chain(
                self.roster
                    .iter()
                    .filter(|entity| entity.faction == Faction::Enemy && entity.is_defeated()),
            );
            for enemy in defeated {
                result.enemies_defeated += 1;
                let Some(bounty) = &enemy.bounty else {
                    continue;
                };
                result.experience = result.experience.saturating_add(bounty.experience);
                if bounty.currency > 0 {
                    let variance = self.rng.range_i32(-5, 5);
                    let paid = (i64::from(bounty.currency) + i64::from(variance)).max(1);
                    result.currency = result
                        .currency
                        .saturating_add(u32::try_from(paid).unwrap_or(u32::MAX));
                }
                for entry in &bounty.loot {
                    if self.rng.chance(entry.chance) {
                        result.drops.push(ItemDrop {
                            item: entry.item.clone(),
                            rarity: entry.rarity,
                        });
                    }
                }
                if let Some(unlock) = &bounty.unlock {
                    result.unlocks.push(unlock.clone());
                }
            }
        }

        self.phase = match outcome {
            BattleOutcome::Won => BattlePhase::Won,
            BattleOutcome::Lost => BattlePhase::Lost,
            BattleOutcome::Aborted => BattlePhase::Aborted,
        };
        self.queue = None;
        tracing::debug!(
            %outcome,
            rounds = result.rounds,
            turns = result.turns,
            experience = result.experience,
            "battle finished"
        );
        self.result = Some(result);
    }

    fn final_result(&mut self) -> BattleResult {
        let (round, turns) = (self.round, self.turns);
        self.result
            .get_or_insert_with(|| BattleResult::without_rewards(BattleOutcome::Aborted, round, turns))
            .clone()
    }
}
