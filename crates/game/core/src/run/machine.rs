//! Run state machine.
//!
//! ```text
//! Exploring ⇄ InBattle ──→ RunEnded(Lost)
//!     │  │
//!     │  └──→ RunEnded(Lost)      (trap)
//!     ├──→ RunEnded(Rebirth)
//!     └──→ RunComplete          (any) ──→ RunEnded(Abandoned)
//! ```
//!
//! The machine owns the run-scoped [`RunState`] and at most one
//! [`BattleController`]. Battles are driven through the machine so it can
//! keep run statistics; [`RunStateMachine::conclude_battle`] folds a finished
//! battle back into the run.

use std::sync::Arc;

use crate::battle::{
    ActionSelection, BattleController, BattleOutcome, BattleResult, BattleStep, EnemyAi,
};
use crate::config::GameConfig;
use crate::content::{ContentError, ContentOracle};
use crate::layer::{
    Encounter, GenerationError, GeneratorConfig, Layer, LayerGenerator, RoomContent, RoomId, Trap,
};
use crate::meta::HeatModifiers;
use crate::rng::{RngStream, SeedDomain, derive_seed};
use crate::state::{Entity, EntityId, EquipSlot, Item};

use super::error::RunError;
use super::experience::{LevelUp, apply_level_up};
use super::state::{RunConfig, RunOutcome, RunState, RunSummary};

/// Why a run ended without a victory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RunEnd {
    Lost,
    /// Ended by choice; credited like a defeat.
    Rebirth,
    Abandoned,
}

/// Run lifecycle phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RunPhase {
    Exploring,
    InBattle,
    /// The final layer's boss is defeated.
    RunComplete,
    RunEnded(RunEnd),
}

impl RunPhase {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::RunComplete | Self::RunEnded(_))
    }

    pub const fn outcome(self) -> Option<RunOutcome> {
        match self {
            Self::Exploring | Self::InBattle => None,
            Self::RunComplete => Some(RunOutcome::Victory),
            Self::RunEnded(RunEnd::Lost) => Some(RunOutcome::Defeat),
            Self::RunEnded(RunEnd::Rebirth) => Some(RunOutcome::Rebirth),
            Self::RunEnded(RunEnd::Abandoned) => Some(RunOutcome::Abandoned),
        }
    }
}

/// What happened when the player entered a room.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoomEvent {
    Empty {
        room: RoomId,
    },
    Treasure {
        room: RoomId,
        currency: u32,
        unlock: Option<String>,
    },
    /// A shop visit. `healed` and `spent` are zero when healing was not bought.
    Shop {
        room: RoomId,
        healed: u32,
        spent: u32,
    },
    BattleStarted {
        room: RoomId,
        boss: bool,
        enemies: Vec<EntityId>,
    },
    /// A trap sprang. `defeated` means it ended the run.
    Trap {
        room: RoomId,
        damage: u32,
        defeated: bool,
    },
    /// The room was already cleared.
    Revisited {
        room: RoomId,
    },
}

/// Result of folding a finished battle into the run.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleConclusion {
    pub result: BattleResult,
    pub level_ups: Vec<LevelUp>,
    /// Looted equipment the player put on, by item id.
    pub equipped: Vec<String>,
    /// Set when a boss win moved the run to the next layer.
    pub descended_to: Option<u8>,
    pub run_complete: bool,
}

/// Drives one run from the first layer to victory, death or abandonment.
pub struct RunStateMachine {
    rules: GameConfig,
    content: Arc<dyn ContentOracle>,
    state: RunState,
    phase: RunPhase,
    battle: Option<BattleController>,
    boss_battle: bool,
}

impl RunStateMachine {
    /// Spawns the player and generates the first layer.
    pub fn start(
        config: RunConfig,
        content: Arc<dyn ContentOracle>,
        rules: GameConfig,
    ) -> Result<Self, RunError> {
        if config.heat > HeatModifiers::MAX_HEAT {
            return Err(RunError::InvalidHeat {
                heat: config.heat,
                max: HeatModifiers::MAX_HEAT,
            });
        }

        let modifiers = HeatModifiers::for_heat(config.heat);
        let class = content
            .player_class(&config.class)
            .ok_or_else(|| ContentError::UnknownClass(config.class.clone()))?;
        let player = class.spawn(
            &config.bonus,
            modifiers.player_health_percent(),
            content.as_ref(),
        )?;
        let layer = generate_layer(&rules, content.as_ref(), config.seed, 1, config.heat)?;

        tracing::info!(
            seed = config.seed,
            class = %config.class,
            heat = config.heat,
            "run started"
        );
        let state = RunState::new(config, player, layer, &rules);
        Ok(Self {
            rules,
            content,
            state,
            phase: RunPhase::Exploring,
            battle: None,
            boss_battle: false,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn layer(&self) -> &Layer {
        &self.state.layer
    }

    pub fn player(&self) -> &Entity {
        &self.state.player
    }

    pub fn battle(&self) -> Option<&BattleController> {
        self.battle.as_ref()
    }

    pub fn rules(&self) -> &GameConfig {
        &self.rules
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Forward exits from the current room. Empty outside of exploration.
    pub fn available_moves(&self) -> Vec<RoomId> {
        if self.phase != RunPhase::Exploring {
            return Vec::new();
        }
        self.state.layer.exits(self.state.room).to_vec()
    }

    /// A room is enterable through a forward exit or by backtracking.
    pub fn can_enter(&self, room: RoomId) -> bool {
        self.phase == RunPhase::Exploring
            && (self.state.layer.exits(self.state.room).contains(&room)
                || self.state.visited.contains(&room))
    }

    // ========================================================================
    // Exploration
    // ========================================================================

    /// Moves into `target` and resolves its content.
    pub fn enter_room(&mut self, target: RoomId) -> Result<RoomEvent, RunError> {
        self.expect_phase(RunPhase::Exploring, "move")?;
        let Some(room) = self.state.layer.room(target) else {
            return Err(RunError::UnknownRoom(target));
        };
        if !self.can_enter(target) {
            return Err(RunError::NoPath {
                from: self.state.room,
                to: target,
            });
        }

        let cleared = room.cleared;
        let content = room.content.clone();
        self.state.room = target;
        if self.state.visited.insert(target) {
            self.state.stats.rooms_visited += 1;
        }
        if cleared {
            return Ok(RoomEvent::Revisited { room: target });
        }

        tracing::debug!(room = %target, kind = content.label(), "entered room");
        let event = match content {
            RoomContent::Empty => {
                self.mark_cleared(target);
                RoomEvent::Empty { room: target }
            }
            RoomContent::Treasure(treasure) => {
                self.state.earn(treasure.currency);
                if let Some(unlock) = &treasure.unlock {
                    self.state.unlocks.insert(unlock.clone());
                }
                self.mark_cleared(target);
                RoomEvent::Treasure {
                    room: target,
                    currency: treasure.currency,
                    unlock: treasure.unlock,
                }
            }
            RoomContent::Shop => self.visit_shop(target),
            RoomContent::Trap(trap) => self.spring_trap(target, trap),
            RoomContent::Combat(encounter) => self.start_battle(target, &encounter, false)?,
            RoomContent::Boss(encounter) => self.start_battle(target, &encounter, true)?,
        };
        Ok(event)
    }

    fn visit_shop(&mut self, room: RoomId) -> RoomEvent {
        let price = self.rules.shop_heal_price;
        let no_healing =
            HeatModifiers::for_heat(self.state.config.heat).contains(HeatModifiers::NO_HEALING);
        let player = &mut self.state.player;
        let wounded = player.current_health() < player.max_health();

        if no_healing || !wounded || self.state.currency < price {
            return RoomEvent::Shop {
                room,
                healed: 0,
                spent: 0,
            };
        }

        let amount = (player.max_health() * self.rules.shop_heal_percent / 100).max(1);
        let healed = player.heal(amount);
        self.state.currency -= price;
        RoomEvent::Shop {
            room,
            healed,
            spent: price,
        }
    }

    /// Rolls trap damage on the room's own stream and applies it.
    fn spring_trap(&mut self, room: RoomId, trap: Trap) -> RoomEvent {
        let index = (u64::from(self.state.layer.index) << 16) | u64::from(room.0);
        let mut rng = RngStream::new(derive_seed(self.state.config.seed, SeedDomain::Trap, index));
        let rolled = rng.range(trap.damage_min, trap.damage_max);

        let damage = self.state.player.take_damage(rolled);
        self.state.stats.damage_taken += u64::from(damage);
        self.mark_cleared(room);
        let defeated = self.state.player.is_defeated();
        if defeated {
            self.phase = RunPhase::RunEnded(RunEnd::Lost);
            tracing::info!(
                seed = self.state.config.seed,
                layer = self.state.layer.index,
                %room,
                "player killed by a trap"
            );
        } else {
            tracing::debug!(%room, damage, "trap sprung");
        }
        RoomEvent::Trap {
            room,
            damage,
            defeated,
        }
    }

    fn start_battle(
        &mut self,
        room: RoomId,
        encounter: &Encounter,
        boss: bool,
    ) -> Result<RoomEvent, RunError> {
        let content = self.content.as_ref();
        let layer = self.state.layer.index;

        let mut participants = vec![self.state.player.clone()];
        for (slot, spawn) in encounter.spawns.iter().enumerate() {
            let variant =
                content
                    .enemy_variant(&spawn.variant)
                    .ok_or_else(|| ContentError::UnknownEnemy {
                        layer,
                        variant: spawn.variant.clone(),
                    })?;
            participants.push(variant.spawn(
                EntityId(slot as u32 + 1),
                spawn.level,
                encounter.stat_multiplier,
                spawn.elite,
                content,
            )?);
        }
        let enemies = participants[1..].iter().map(|entity| entity.id).collect();

        let battle = BattleController::for_run(
            self.state.config.seed,
            self.state.battles,
            participants,
            &self.rules,
        );
        tracing::debug!(%room, boss, battle = self.state.battles, "battle started");
        self.state.battles += 1;
        self.battle = Some(battle);
        self.boss_battle = boss;
        self.phase = RunPhase::InBattle;
        Ok(RoomEvent::BattleStarted {
            room,
            boss,
            enemies,
        })
    }

    // ========================================================================
    // Battle
    // ========================================================================

    /// Advances the active battle by one step.
    pub fn advance_battle(&mut self, ai: &dyn EnemyAi) -> Result<BattleStep, RunError> {
        let step = self.active_battle()?.advance(ai)?;
        self.record(&step);
        Ok(step)
    }

    /// Submits the player's selection to the active battle.
    pub fn submit_action(&mut self, selection: ActionSelection) -> Result<BattleStep, RunError> {
        let step = self.active_battle()?.submit(selection)?;
        self.record(&step);
        Ok(step)
    }

    /// Folds a finished battle into the run.
    ///
    /// A win grants rewards and may descend or complete the run; a loss ends
    /// the run. An aborted encounter ends the run as abandoned.
    ///
    /// The next layer and the looted items are resolved before anything is
    /// committed; on error the run is left exactly as it was.
    pub fn conclude_battle(&mut self) -> Result<BattleConclusion, RunError> {
        self.expect_phase(RunPhase::InBattle, "conclude a battle")?;
        let result = match self.battle.as_ref().and_then(BattleController::result) {
            Some(result) => result.clone(),
            None => return Err(RunError::BattleInProgress),
        };

        let won = result.outcome == BattleOutcome::Won;
        let descent = if won && self.boss_battle && self.state.layer.index < GameConfig::MAX_LAYERS
        {
            Some(generate_layer(
                &self.rules,
                self.content.as_ref(),
                self.state.config.seed,
                self.state.layer.index + 1,
                self.state.config.heat,
            )?)
        } else {
            None
        };
        let loot = if won {
            self.resolve_loot(&result)?
        } else {
            Vec::new()
        };

        let player = self.battle.take().and_then(BattleController::into_player);
        if let Some(player) = player {
            self.state.player = player;
        }
        self.state.stats.turns += result.turns;
        let boss = std::mem::take(&mut self.boss_battle);

        let mut conclusion = BattleConclusion {
            result,
            level_ups: Vec::new(),
            equipped: Vec::new(),
            descended_to: None,
            run_complete: false,
        };

        match conclusion.result.outcome {
            BattleOutcome::Won => {
                conclusion.equipped = self.stow(loot);
                conclusion.level_ups = self.grant_rewards(&conclusion.result);
                self.mark_cleared(self.state.room);
                self.phase = RunPhase::Exploring;
                if boss {
                    self.state.layers_cleared += 1;
                    match descent {
                        Some(layer) => {
                            let next = layer.index;
                            self.state.enter_layer(layer);
                            conclusion.descended_to = Some(next);
                            tracing::info!(layer = next, "descended");
                        }
                        None => {
                            self.phase = RunPhase::RunComplete;
                            conclusion.run_complete = true;
                            tracing::info!(seed = self.state.config.seed, "run complete");
                        }
                    }
                }
            }
            BattleOutcome::Lost => {
                self.phase = RunPhase::RunEnded(RunEnd::Lost);
                tracing::info!(
                    seed = self.state.config.seed,
                    layer = self.state.layer.index,
                    "player defeated"
                );
            }
            BattleOutcome::Aborted => {
                self.phase = RunPhase::RunEnded(RunEnd::Abandoned);
                tracing::warn!(seed = self.state.config.seed, "encounter aborted; run abandoned");
            }
        }
        Ok(conclusion)
    }

    fn grant_rewards(&mut self, result: &BattleResult) -> Vec<LevelUp> {
        let growth = self.rules.experience_growth_percent;
        let state = &mut self.state;
        state.earn(result.currency);
        state.drops.extend(result.drops.iter().cloned());
        state.unlocks.extend(result.unlocks.iter().cloned());
        state.stats.battles_won += 1;
        state.stats.enemies_defeated += result.enemies_defeated;

        let gained = state.experience.gain(result.experience, growth);
        state.stats.level_ups += gained;
        (0..gained)
            .map(|_| apply_level_up(&mut state.player))
            .collect()
    }

    fn resolve_loot(&self, result: &BattleResult) -> Result<Vec<Arc<Item>>, RunError> {
        result
            .drops
            .iter()
            .map(|drop| {
                self.content.item(&drop.item).ok_or_else(|| {
                    RunError::Content(ContentError::UnknownItem {
                        owner: "battle loot".into(),
                        item: drop.item.clone(),
                    })
                })
            })
            .collect()
    }

    /// Artifacts are always worn, weapons only when they beat the current
    /// one; everything else goes into the inventory.
    fn stow(&mut self, loot: Vec<Arc<Item>>) -> Vec<String> {
        let player = &mut self.state.player;
        let mut equipped = Vec::new();
        for item in loot {
            let wear = match item.equip_slot() {
                Some(EquipSlot::Artifact) => true,
                Some(EquipSlot::Weapon) => player.equipment.is_upgrade(&item),
                None => false,
            };
            if !wear {
                player.inventory.add(item);
                continue;
            }
            equipped.push(item.id.clone());
            match player.equipment.equip(item) {
                Ok(Some(displaced)) => player.inventory.add(displaced),
                Ok(None) => {}
                Err(item) => player.inventory.add(item),
            }
        }
        equipped
    }

    fn record(&mut self, step: &BattleStep) {
        let stats = &mut self.state.stats;
        match step {
            BattleStep::ActionResolved(outcome) => {
                if outcome.actor == EntityId::PLAYER {
                    stats.damage_dealt += u64::from(outcome.total_damage());
                }
                stats.damage_taken += outcome
                    .targets
                    .iter()
                    .filter(|target| target.target == EntityId::PLAYER)
                    .map(|target| u64::from(target.damage))
                    .sum::<u64>();
            }
            BattleStep::RoundStarted { ticks, .. } => {
                stats.damage_taken += ticks
                    .iter()
                    .filter(|tick| tick.entity == EntityId::PLAYER)
                    .map(|tick| u64::from(tick.damage))
                    .sum::<u64>();
            }
            _ => {}
        }
    }

    // ========================================================================
    // Inventory
    // ========================================================================

    /// Puts on a carried weapon or artifact between rooms.
    ///
    /// Returns the id of the weapon it displaced, which goes back into the
    /// inventory.
    pub fn equip(&mut self, id: &str) -> Result<Option<String>, RunError> {
        self.expect_phase(RunPhase::Exploring, "equip an item")?;
        let player = &mut self.state.player;
        match player.inventory.get(id).map(|item| item.equip_slot()) {
            None => return Err(RunError::ItemNotHeld(id.to_owned())),
            Some(None) => return Err(RunError::NotEquipment(id.to_owned())),
            Some(Some(_)) => {}
        }
        let item = player
            .inventory
            .take(id)
            .ok_or_else(|| RunError::ItemNotHeld(id.to_owned()))?;
        match player.equipment.equip(item) {
            Ok(displaced) => Ok(displaced.map(|displaced| {
                let id = displaced.id.clone();
                player.inventory.add(displaced);
                id
            })),
            Err(item) => {
                player.inventory.add(item);
                Err(RunError::NotEquipment(id.to_owned()))
            }
        }
    }

    // ========================================================================
    // Ending
    // ========================================================================

    /// Ends the run by choice between rooms.
    ///
    /// Unlike [`abandon`](Self::abandon) the run is credited: currency and
    /// unlocks earned so far carry over into meta-progression.
    pub fn rebirth(&mut self) -> Result<(), RunError> {
        self.expect_phase(RunPhase::Exploring, "rebirth")?;
        self.phase = RunPhase::RunEnded(RunEnd::Rebirth);
        tracing::info!(
            seed = self.state.config.seed,
            layer = self.state.layer.index,
            "run ended by rebirth"
        );
        Ok(())
    }

    /// Quits the run. Any active battle is aborted and nothing is credited.
    pub fn abandon(&mut self) {
        if self.phase.is_terminal() {
            return;
        }
        if let Some(battle) = self.battle.as_mut() {
            battle.abort();
        }
        self.battle = None;
        self.phase = RunPhase::RunEnded(RunEnd::Abandoned);
        tracing::info!(seed = self.state.config.seed, "run abandoned");
    }

    /// Summary of a finished run; `None` while the run is in progress.
    pub fn summary(&self) -> Option<RunSummary> {
        self.phase
            .outcome()
            .map(|outcome| RunSummary::from_state(&self.state, outcome))
    }

    /// Consumes a finished run and returns its summary.
    pub fn finish(self) -> Result<RunSummary, RunError> {
        self.summary().ok_or(RunError::InvalidPhase {
            action: "finish",
            phase: self.phase,
        })
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn expect_phase(&self, expected: RunPhase, action: &'static str) -> Result<(), RunError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(RunError::InvalidPhase {
                action,
                phase: self.phase,
            })
        }
    }

    fn active_battle(&mut self) -> Result<&mut BattleController, RunError> {
        let phase = self.phase;
        self.battle.as_mut().ok_or(RunError::InvalidPhase {
            action: "drive a battle",
            phase,
        })
    }

    fn mark_cleared(&mut self, room: RoomId) {
        if let Some(room) = self.state.layer.room_mut(room) {
            room.cleared = true;
        }
    }
}

/// Generates a layer on its own derived stream, falling back to the
/// simplified layout when the configured generator runs out of retries.
pub fn generate_layer(
    rules: &GameConfig,
    content: &dyn ContentOracle,
    seed: u64,
    index: u8,
    heat: u32,
) -> Result<Layer, RunError> {
    let mut rng = RngStream::new(derive_seed(seed, SeedDomain::Layer, u64::from(index)));
    match LayerGenerator::new(&rules.generation, content).generate(index, heat, &mut rng) {
        Ok(layer) => Ok(layer),
        Err(GenerationError::Exhausted { attempts, last, .. }) => {
            tracing::warn!(
                layer = index,
                attempts,
                %last,
                "layer generation exhausted; using simplified layout"
            );
            let fallback = GeneratorConfig {
                treasure_currency_min: rules.generation.treasure_currency_min,
                treasure_currency_max: rules.generation.treasure_currency_max,
                trap_damage_min: rules.generation.trap_damage_min,
                trap_damage_max: rules.generation.trap_damage_max,
                ..GeneratorConfig::simplified()
            };
            let mut rng = RngStream::new(derive_seed(seed, SeedDomain::Fallback, u64::from(index)));
            let mut layer = LayerGenerator::new(&fallback, content).generate(index, heat, &mut rng)?;
            layer.fallback = true;
            Ok(layer)
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::BattleView;
    use crate::content::{ContentCatalog, LayerRoster, LootEntry, Rarity, fixtures};
    use crate::error::GameError;
    use crate::layer::Treasure;

    struct FirstTarget;

    impl EnemyAi for FirstTarget {
        fn select_action(&self, view: &BattleView<'_>, actor: EntityId) -> ActionSelection {
            let target = view
                .opponents_of(actor)
                .first()
                .map(|entity| entity.id)
                .unwrap_or(actor);
            ActionSelection::basic_attack(target)
        }
    }

    fn start(seed: u64, heat: u32, rules: GameConfig) -> Result<RunStateMachine, RunError> {
        RunStateMachine::start(
            RunConfig::new(seed, "crusader", heat),
            Arc::new(fixtures::catalog()),
            rules,
        )
    }

    fn start_with(catalog: ContentCatalog, seed: u64) -> RunStateMachine {
        RunStateMachine::start(
            RunConfig::new(seed, "crusader", 0),
            Arc::new(catalog),
            linear_rules(),
        )
        .unwrap()
    }

    /// Makes the player act first, hit hard and evade every rolled attack.
    fn overpower(machine: &mut RunStateMachine) {
        let player = &mut machine.state.player;
        player.stats.attack = 10_000;
        player.stats.speed = 100;
        player.traits.dodge_chance = 100;
    }

    /// Basic-attacks until the active battle is over.
    fn finish_battle(machine: &mut RunStateMachine) {
        for _ in 0..1_000 {
            if machine.battle().is_some_and(BattleController::is_finished) {
                return;
            }
            if let BattleStep::AwaitingInput { actor } =
                machine.advance_battle(&FirstTarget).unwrap()
            {
                let target = machine.battle().unwrap().view().opponents_of(actor)[0].id;
                machine
                    .submit_action(ActionSelection::basic_attack(target))
                    .unwrap();
            }
        }
        panic!("battle did not finish");
    }

    fn linear_rules() -> GameConfig {
        GameConfig::default().with_generation(GeneratorConfig::simplified())
    }

    /// Plays a run on linear layers, always taking the first exit.
    fn play(machine: &mut RunStateMachine) {
        for _ in 0..200_000 {
            match machine.phase() {
                RunPhase::Exploring => {
                    let next = machine.available_moves()[0];
                    machine.enter_room(next).unwrap();
                }
                RunPhase::InBattle => {
                    if machine.battle().is_some_and(BattleController::is_finished) {
                        machine.conclude_battle().unwrap();
                        continue;
                    }
                    if let BattleStep::AwaitingInput { actor } =
                        machine.advance_battle(&FirstTarget).unwrap()
                    {
                        let target = machine.battle().unwrap().view().opponents_of(actor)[0].id;
                        machine
                            .submit_action(ActionSelection::basic_attack(target))
                            .unwrap();
                    }
                }
                RunPhase::RunComplete | RunPhase::RunEnded(_) => return,
            }
        }
        panic!("run did not finish");
    }

    #[test]
    fn run_starts_at_the_first_layer_entrance() {
        let machine = start(3, 0, GameConfig::default()).unwrap();
        assert_eq!(machine.phase(), RunPhase::Exploring);
        assert_eq!(machine.layer().index, 1);
        assert_eq!(machine.state().room, machine.layer().entrance);
        assert_eq!(machine.player().current_health(), 100);
        assert_eq!(machine.state().stats.layer_digests.len(), 1);
        assert!(!machine.available_moves().is_empty());
        assert!(machine.summary().is_none());
    }

    #[test]
    fn invalid_start_parameters_are_rejected() {
        let err = RunStateMachine::start(
            RunConfig::new(1, "jester", 0),
            Arc::new(fixtures::catalog()),
            GameConfig::default(),
        )
        .err()
        .unwrap();
        assert_eq!(err, RunError::Content(ContentError::UnknownClass("jester".into())));

        let err = start(1, 11, GameConfig::default()).err().unwrap();
        assert!(matches!(err, RunError::InvalidHeat { heat: 11, .. }));
    }

    #[test]
    fn heat_reduces_starting_health() {
        let machine = start(3, 3, GameConfig::default()).unwrap();
        assert_eq!(machine.player().max_health(), 80);
    }

    #[test]
    fn moves_follow_exits_or_backtrack() {
        let mut machine = start(5, 0, GameConfig::default()).unwrap();
        let boss = machine.layer().boss;
        let err = machine.enter_room(boss).unwrap_err();
        assert!(matches!(err, RunError::NoPath { .. }));
        assert_eq!(err.severity(), crate::error::ErrorSeverity::Validation);

        let entrance = machine.layer().entrance;
        assert_eq!(
            machine.enter_room(entrance).unwrap(),
            RoomEvent::Revisited { room: entrance }
        );
        assert!(matches!(
            machine.enter_room(RoomId(999)),
            Err(RunError::UnknownRoom(RoomId(999)))
        ));
    }

    #[test]
    fn treasure_is_collected_once() {
        let mut machine = start(5, 0, GameConfig::default()).unwrap();
        let target = machine.available_moves()[0];
        machine.state.layer.room_mut(target).unwrap().content = RoomContent::Treasure(Treasure {
            currency: 40,
            unlock: Some("relic:layer-1".into()),
        });

        let event = machine.enter_room(target).unwrap();
        assert_eq!(
            event,
            RoomEvent::Treasure {
                room: target,
                currency: 40,
                unlock: Some("relic:layer-1".into()),
            }
        );
        assert_eq!(machine.state().currency_earned, 40);
        assert!(machine.state().unlocks.contains("relic:layer-1"));
        assert_eq!(
            machine.enter_room(target).unwrap(),
            RoomEvent::Revisited { room: target }
        );
        assert_eq!(machine.state().currency, 40);
    }

    #[test]
    fn shop_trades_currency_for_healing() {
        let mut machine = start(5, 0, GameConfig::default()).unwrap();
        let target = machine.available_moves()[0];
        machine.state.layer.room_mut(target).unwrap().content = RoomContent::Shop;
        machine.state.player.take_damage(70);
        machine.state.currency = 30;

        let event = machine.enter_room(target).unwrap();
        assert_eq!(
            event,
            RoomEvent::Shop {
                room: target,
                healed: 40,
                spent: 25,
            }
        );
        assert_eq!(machine.state().currency, 5);
        assert_eq!(machine.player().current_health(), 70);
        assert_eq!(machine.state().currency_earned, 0);
    }

    #[test]
    fn no_healing_heat_closes_the_shop() {
        let mut machine = start(5, 7, GameConfig::default()).unwrap();
        let target = machine.available_moves()[0];
        machine.state.layer.room_mut(target).unwrap().content = RoomContent::Shop;
        machine.state.player.take_damage(30);
        machine.state.currency = 100;

        assert_eq!(
            machine.enter_room(target).unwrap(),
            RoomEvent::Shop {
                room: target,
                healed: 0,
                spent: 0,
            }
        );
    }

    #[test]
    fn exhausted_generation_falls_back_to_linear_layout() {
        let mut rules = GameConfig::default();
        rules.generation.dead_end_chance = 100;
        rules.generation.retry_ceiling = 2;
        let machine = start(9, 0, rules).unwrap();
        assert!(machine.layer().fallback);
        assert!(machine.layer().rooms.iter().all(|room| room.exits.len() <= 1));
    }

    #[test]
    fn battles_cannot_be_concluded_early() {
        let mut machine = start(5, 0, linear_rules()).unwrap();
        let target = machine.available_moves()[0];
        assert!(matches!(
            machine.enter_room(target).unwrap(),
            RoomEvent::BattleStarted { boss: false, .. }
        ));
        assert_eq!(machine.phase(), RunPhase::InBattle);
        assert!(machine.enter_room(target).is_err());
        assert_eq!(machine.conclude_battle(), Err(RunError::BattleInProgress));
    }

    #[test]
    fn full_runs_replay_identically() {
        let mut first = start(2024, 0, linear_rules()).unwrap();
        let mut second = start(2024, 0, linear_rules()).unwrap();
        play(&mut first);
        play(&mut second);

        let summary = first.finish().unwrap();
        assert_eq!(Ok(summary.clone()), second.finish());
        assert_ne!(summary.outcome, RunOutcome::Abandoned);
        assert!(summary.stats.damage_dealt > 0);
        assert!(summary.stats.battles_won >= 1 || summary.outcome == RunOutcome::Defeat);
        if summary.layers_cleared > 0 {
            assert!(summary.unlocks.contains("boss:brute"));
        }
        if summary.outcome == RunOutcome::Victory {
            assert_eq!(summary.layers_cleared, GameConfig::MAX_LAYERS);
        }
        assert_eq!(
            summary.stats.layer_digests.len(),
            usize::from(summary.layers_cleared.min(GameConfig::MAX_LAYERS - 1)) + 1
        );
    }

    #[test]
    fn abandoning_mid_battle_credits_nothing() {
        let mut machine = start(5, 0, linear_rules()).unwrap();
        let target = machine.available_moves()[0];
        machine.enter_room(target).unwrap();
        machine.advance_battle(&FirstTarget).unwrap();

        machine.abandon();
        assert_eq!(machine.phase(), RunPhase::RunEnded(RunEnd::Abandoned));
        assert!(machine.battle().is_none());
        machine.abandon();

        let summary = machine.finish().unwrap();
        assert_eq!(summary.outcome, RunOutcome::Abandoned);
        assert_eq!(summary.currency_earned, 0);
    }

    #[test]
    fn potion_used_in_battle_stays_used() {
        let mut machine = start(5, 0, linear_rules()).unwrap();
        overpower(&mut machine);
        machine.state.player.take_damage(50);
        let target = machine.available_moves()[0];
        machine.enter_room(target).unwrap();

        let step = loop {
            if let BattleStep::AwaitingInput { .. } = machine.advance_battle(&FirstTarget).unwrap() {
                break machine
                    .submit_action(ActionSelection::item("potion", Vec::new()))
                    .unwrap();
            }
        };
        let BattleStep::ActionResolved(outcome) = step else {
            panic!("expected the potion to resolve");
        };
        assert_eq!(outcome.consumed.as_deref(), Some("potion"));
        assert_eq!(outcome.targets[0].healing, 30);

        finish_battle(&mut machine);
        machine.conclude_battle().unwrap();
        assert_eq!(machine.player().inventory.count("potion"), 0);
        assert_eq!(machine.player().current_health(), 80);
    }

    #[test]
    fn loot_is_worn_or_stowed() {
        let mut catalog = fixtures::catalog();
        let mut imp = catalog.enemy_variant("imp").unwrap().clone();
        imp.loot = ["essence", "blade", "potion"]
            .into_iter()
            .map(|item| LootEntry {
                item: item.into(),
                rarity: Rarity::Common,
                chance: 100,
            })
            .collect();
        catalog.insert_enemy(imp);

        let mut machine = start_with(catalog, 5);
        overpower(&mut machine);
        let target = machine.available_moves()[0];
        machine.enter_room(target).unwrap();
        finish_battle(&mut machine);

        let conclusion = machine.conclude_battle().unwrap();
        assert_eq!(conclusion.equipped, vec!["essence".to_owned(), "blade".to_owned()]);
        assert_eq!(machine.state().drops.len(), 3);
        let player = machine.player();
        assert_eq!(player.equipment.weapon().map(|item| item.id.as_str()), Some("blade"));
        assert_eq!(player.equipment.artifacts().len(), 1);
        assert_eq!(player.equipment.bonus().attack, 6);
        assert_eq!(player.inventory.count("potion"), 2);
    }

    #[test]
    fn carried_gear_is_equipped_between_rooms() {
        let mut machine = start(5, 0, linear_rules()).unwrap();
        let catalog = fixtures::catalog();
        machine
            .state
            .player
            .inventory
            .add(catalog.item("blade").unwrap());

        assert_eq!(
            machine.equip("potion"),
            Err(RunError::NotEquipment("potion".into()))
        );
        assert_eq!(machine.equip("blade"), Ok(None));
        assert_eq!(machine.player().inventory.count("blade"), 0);
        assert_eq!(
            machine.equip("blade"),
            Err(RunError::ItemNotHeld("blade".into()))
        );
        assert_eq!(machine.player().effective_attack(), 20);
    }

    #[test]
    fn trap_damage_is_seeded_and_clears_the_room() {
        let roll = |seed| {
            let mut machine = start(seed, 0, GameConfig::default()).unwrap();
            let target = machine.available_moves()[0];
            machine.state.layer.room_mut(target).unwrap().content = RoomContent::Trap(Trap {
                damage_min: 3,
                damage_max: 9,
            });
            let event = machine.enter_room(target).unwrap();
            (machine, target, event)
        };

        let (mut machine, target, event) = roll(11);
        let RoomEvent::Trap { room, damage, defeated } = event else {
            panic!("expected a trap, got {event:?}");
        };
        assert_eq!(room, target);
        assert!((3..=9).contains(&damage));
        assert!(!defeated);
        assert_eq!(machine.player().current_health(), 100 - damage);
        assert_eq!(machine.state().stats.damage_taken, u64::from(damage));
        assert_eq!(roll(11).2, RoomEvent::Trap { room, damage, defeated });

        assert_eq!(
            machine.enter_room(target).unwrap(),
            RoomEvent::Revisited { room: target }
        );
        assert_eq!(machine.player().current_health(), 100 - damage);
    }

    #[test]
    fn lethal_trap_ends_the_run() {
        let mut machine = start(5, 0, GameConfig::default()).unwrap();
        let target = machine.available_moves()[0];
        machine.state.layer.room_mut(target).unwrap().content = RoomContent::Trap(Trap {
            damage_min: 500,
            damage_max: 500,
        });

        assert_eq!(
            machine.enter_room(target).unwrap(),
            RoomEvent::Trap {
                room: target,
                damage: 100,
                defeated: true,
            }
        );
        assert_eq!(machine.phase(), RunPhase::RunEnded(RunEnd::Lost));
        assert_eq!(machine.finish().unwrap().outcome, RunOutcome::Defeat);
    }

    #[test]
    fn failed_descent_commits_nothing() {
        let mut catalog = fixtures::catalog();
        catalog.insert_roster(LayerRoster {
            layer: 2,
            regulars: Vec::new(),
            boss: "brute".into(),
        });
        let mut machine = start_with(catalog, 5);
        overpower(&mut machine);
        let boss = machine.layer().boss;
        let before_boss = machine
            .layer()
            .rooms
            .iter()
            .find(|room| room.exits.contains(&boss))
            .map(|room| room.id)
            .unwrap();
        machine.state.room = before_boss;
        machine.state.visited.insert(before_boss);

        assert!(matches!(
            machine.enter_room(boss).unwrap(),
            RoomEvent::BattleStarted { boss: true, .. }
        ));
        finish_battle(&mut machine);
        assert!(machine.battle().unwrap().result().unwrap().is_victory());
        let snapshot = machine.state().clone();

        let expected = RunError::Generation(GenerationError::Content(ContentError::EmptyRoster(2)));
        assert_eq!(machine.conclude_battle(), Err(expected.clone()));
        assert_eq!(machine.state(), &snapshot);
        assert_eq!(machine.state().currency_earned, 0);
        assert_eq!(machine.state().stats.battles_won, 0);
        assert_eq!(machine.state().layers_cleared, 0);
        assert_eq!(machine.phase(), RunPhase::InBattle);
        assert!(machine.battle().is_some());
        assert_eq!(machine.conclude_battle(), Err(expected));
    }

    #[test]
    fn rebirth_banks_what_the_run_earned() {
        let mut machine = start(5, 0, GameConfig::default()).unwrap();
        let target = machine.available_moves()[0];
        machine.state.layer.room_mut(target).unwrap().content = RoomContent::Treasure(Treasure {
            currency: 40,
            unlock: Some("relic:layer-1".into()),
        });
        machine.enter_room(target).unwrap();

        machine.rebirth().unwrap();
        assert_eq!(machine.phase(), RunPhase::RunEnded(RunEnd::Rebirth));
        assert!(matches!(
            machine.rebirth(),
            Err(RunError::InvalidPhase { action: "rebirth", .. })
        ));
        let summary = machine.finish().unwrap();
        assert_eq!(summary.outcome, RunOutcome::Rebirth);
        assert_eq!(summary.currency_earned, 40);

        let meta = crate::meta::finalize_run(&Default::default(), &summary);
        assert_eq!(meta.currency, 40);
        assert!(meta.unlocks.contains("relic:layer-1"));
        assert_eq!(meta.runs_finished, 1);
    }

    #[test]
    fn rebirth_is_refused_mid_battle() {
        let mut machine = start(5, 0, linear_rules()).unwrap();
        let target = machine.available_moves()[0];
        machine.enter_room(target).unwrap();
        assert_eq!(
            machine.rebirth(),
            Err(RunError::InvalidPhase {
                action: "rebirth",
                phase: RunPhase::InBattle,
            })
        );
        assert_eq!(machine.phase(), RunPhase::InBattle);
    }

    #[test]
    fn finish_requires_a_terminal_phase() {
        let machine = start(5, 0, GameConfig::default()).unwrap();
        assert!(matches!(
            machine.finish(),
            Err(RunError::InvalidPhase { action: "finish", .. })
        ));
    }
}
