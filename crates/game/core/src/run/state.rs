use std::collections::BTreeSet;

use crate::battle::ItemDrop;
use crate::config::GameConfig;
use crate::layer::{Layer, RoomId};
use crate::meta::StartingBonus;
use crate::state::Entity;

use super::experience::Experience;

/// Parameters fixed for the whole run.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunConfig {
    pub seed: u64,
    /// Player class id.
    pub class: String,
    pub heat: u32,
    /// Bonus derived from meta-progression before the run started.
    pub bonus: StartingBonus,
}

impl RunConfig {
    pub fn new(seed: u64, class: impl Into<String>, heat: u32) -> Self {
        Self {
            seed,
            class: class.into(),
            heat,
            bonus: StartingBonus::default(),
        }
    }

    pub fn with_bonus(mut self, bonus: StartingBonus) -> Self {
        self.bonus = bonus;
        self
    }
}

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RunOutcome {
    /// The final layer's boss was defeated.
    Victory,
    /// The player died.
    Defeat,
    /// The player ended the run by choice. Credited like a defeat.
    Rebirth,
    /// The player quit. Nothing carries over.
    Abandoned,
}

/// Counters accumulated during a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunStats {
    pub rooms_visited: u32,
    pub battles_won: u32,
    pub enemies_defeated: u32,
    pub damage_dealt: u64,
    pub damage_taken: u64,
    pub turns: u32,
    pub level_ups: u32,
    /// Digest of every layer entered, in order.
    pub layer_digests: Vec<[u8; 32]>,
}

/// Everything scoped to the current run.
///
/// While a battle is in progress `player` holds the pre-battle snapshot; the
/// live entity is owned by the battle and written back when it concludes.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunState {
    pub config: RunConfig,
    pub layer: Layer,
    pub room: RoomId,
    pub visited: BTreeSet<RoomId>,
    pub player: Entity,
    /// Spendable balance, including the starting bonus.
    pub currency: u32,
    /// Currency gained from battles and treasure; banked at run end.
    pub currency_earned: u32,
    pub experience: Experience,
    pub layers_cleared: u8,
    pub unlocks: BTreeSet<String>,
    pub drops: Vec<ItemDrop>,
    /// Battles started so far; seeds the next battle's stream.
    pub battles: u32,
    pub stats: RunStats,
}

impl RunState {
    pub(crate) fn new(config: RunConfig, player: Entity, layer: Layer, rules: &GameConfig) -> Self {
        let currency = config.bonus.currency;
        let mut state = Self {
            config,
            room: layer.entrance,
            layer,
            visited: BTreeSet::new(),
            player,
            currency,
            currency_earned: 0,
            experience: Experience::new(rules),
            layers_cleared: 0,
            unlocks: BTreeSet::new(),
            drops: Vec::new(),
            battles: 0,
            stats: RunStats::default(),
        };
        state.arrive();
        state
    }

    /// Replaces the current layer and places the player at its entrance.
    pub(crate) fn enter_layer(&mut self, layer: Layer) {
        self.layer = layer;
        self.arrive();
    }

    fn arrive(&mut self) {
        self.stats.layer_digests.push(self.layer.digest());
        self.room = self.layer.entrance;
        self.visited = BTreeSet::from([self.room]);
        if let Some(entrance) = self.layer.room_mut(self.room) {
            entrance.cleared = true;
        }
        self.stats.rooms_visited += 1;
    }

    pub fn layer_index(&self) -> u8 {
        self.layer.index
    }

    pub(crate) fn earn(&mut self, amount: u32) {
        self.currency = self.currency.saturating_add(amount);
        self.currency_earned = self.currency_earned.saturating_add(amount);
    }
}

/// Run data handed to meta-progression once the run is over.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunSummary {
    pub seed: u64,
    pub class: String,
    pub heat: u32,
    pub outcome: RunOutcome,
    pub layers_cleared: u8,
    pub level: u32,
    pub currency_earned: u32,
    pub unlocks: BTreeSet<String>,
    pub drops: Vec<ItemDrop>,
    pub stats: RunStats,
}

impl RunSummary {
    pub(crate) fn from_state(state: &RunState, outcome: RunOutcome) -> Self {
        Self {
            seed: state.config.seed,
            class: state.config.class.clone(),
            heat: state.config.heat,
            outcome,
            layers_cleared: state.layers_cleared,
            level: state.experience.level,
            currency_earned: state.currency_earned,
            unlocks: state.unlocks.clone(),
            drops: state.drops.clone(),
            stats: state.stats.clone(),
        }
    }
}
