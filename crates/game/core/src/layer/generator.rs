//! Procedural layer generation.
//!
//! A layer is grown by random walkers that start at the entrance and step
//! one depth at a time toward the boss depth. At every step a walker may
//! branch, merge into a room another walker already created, or stop and
//! leave a dead end behind. Surviving walkers all connect to the boss room.
//!
//! Each attempt is validated; failures are regenerated from the same stream
//! until the retry ceiling, after which [`GenerationError::Exhausted`] is
//! returned so the caller can fall back to [`GeneratorConfig::simplified`].

use crate::config::GameConfig;
use crate::content::{ContentError, ContentOracle, LayerRoster};
use crate::error::{ErrorSeverity, GameError};
use crate::meta::HeatModifiers;
use crate::rng::RngStream;

use super::room::{Encounter, EnemySpawn, Layer, Room, RoomContent, RoomId, Trap, Treasure};
use super::theme::Biome;

/// Relative weights for non-entrance, non-boss room contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct RoomWeights {
    pub combat: u32,
    pub treasure: u32,
    pub shop: u32,
    pub empty: u32,
    /// Doubled under [`HeatModifiers::MORE_TRAPS`].
    pub trap: u32,
    /// Added to the combat weight per heat level.
    pub combat_per_heat: u32,
}

impl Default for RoomWeights {
    fn default() -> Self {
        Self {
            combat: 45,
            treasure: 20,
            shop: 10,
            empty: 25,
            trap: 8,
            combat_per_heat: 5,
        }
    }
}

/// Generator parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct GeneratorConfig {
    /// Boss depth is `base_depth + layer index`.
    pub base_depth: u32,
    /// Rooms per depth are capped at `base_width + layer index / 2`.
    pub base_width: u32,
    pub branch_chance: u32,
    pub merge_chance: u32,
    pub dead_end_chance: u32,
    pub retry_ceiling: u32,
    pub treasure_currency_min: u32,
    pub treasure_currency_max: u32,
    /// Trap damage range on layer 1; multiplied by the layer index.
    pub trap_damage_min: u32,
    pub trap_damage_max: u32,
    pub weights: RoomWeights,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_depth: 3,
            base_width: 2,
            branch_chance: 40,
            merge_chance: 30,
            dead_end_chance: 15,
            retry_ceiling: GameConfig::DEFAULT_RETRY_CEILING,
            treasure_currency_min: 10,
            treasure_currency_max: 30,
            trap_damage_min: 4,
            trap_damage_max: 8,
            weights: RoomWeights::default(),
        }
    }
}

impl GeneratorConfig {
    /// A linear, all-combat configuration whose first attempt always validates.
    pub fn simplified() -> Self {
        Self {
            base_depth: 2,
            base_width: 1,
            branch_chance: 0,
            merge_chance: 0,
            dead_end_chance: 0,
            retry_ceiling: 1,
            weights: RoomWeights {
                combat: 1,
                treasure: 0,
                shop: 0,
                empty: 0,
                trap: 0,
                combat_per_heat: 0,
            },
            ..Self::default()
        }
    }
}

/// Structural problem found while validating a generated layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LayerDefect {
    #[error("{0} has no inbound edge")]
    NoInbound(RoomId),
    #[error("{0} is unreachable from the entrance")]
    Unreachable(RoomId),
    #[error("boss room is unreachable")]
    BossUnreachable,
    #[error("boss room has exits")]
    BossHasExits,
    #[error("layer has no combat room")]
    NoCombatRoom,
}

/// Errors raised by the layer generator.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("layer {layer} failed validation {attempts} times (last: {last})")]
    Exhausted {
        layer: u8,
        attempts: u32,
        last: LayerDefect,
    },

    #[error("layer index {0} is out of range")]
    InvalidLayer(u8),

    #[error(transparent)]
    Content(#[from] ContentError),
}

impl GameError for GenerationError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Exhausted { .. } => ErrorSeverity::Recoverable,
            Self::InvalidLayer(_) => ErrorSeverity::Validation,
            Self::Content(inner) => inner.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Exhausted { .. } => "GENERATION_EXHAUSTED",
            Self::InvalidLayer(_) => "GENERATION_INVALID_LAYER",
            Self::Content(inner) => inner.error_code(),
        }
    }
}

/// Percent applied to enemy stats for a layer and heat.
pub fn stat_multiplier(layer_index: u8, heat: u32) -> u32 {
    100 + 15 * u32::from(layer_index.saturating_sub(1)) + 10 * heat
}

/// Draft node used while growing the graph.
struct Draft {
    depth: u32,
    exits: Vec<usize>,
}

/// Room content chosen before payloads are rolled.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Slot {
    Combat,
    Treasure,
    Shop,
    Empty,
    Trap,
}

/// Generates layers from a configuration and a content oracle.
pub struct LayerGenerator<'a> {
    config: &'a GeneratorConfig,
    content: &'a dyn ContentOracle,
}

impl<'a> LayerGenerator<'a> {
    pub fn new(config: &'a GeneratorConfig, content: &'a dyn ContentOracle) -> Self {
        Self { config, content }
    }

    /// Generates a valid layer, retrying on validation failure.
    pub fn generate(
        &self,
        layer_index: u8,
        heat: u32,
        rng: &mut RngStream,
    ) -> Result<Layer, GenerationError> {
        if layer_index == 0 || layer_index > GameConfig::MAX_LAYERS {
            return Err(GenerationError::InvalidLayer(layer_index));
        }
        let roster = self.checked_roster(layer_index)?;
        let modifiers = HeatModifiers::for_heat(heat);

        let attempts = self.config.retry_ceiling.max(1);
        let mut last = LayerDefect::NoCombatRoom;
        for attempt in 1..=attempts {
            let mut layer = self.attempt(layer_index, heat, modifiers, roster, rng);
            match validate(&layer) {
                Ok(()) => {
                    layer.attempts = attempt;
                    tracing::debug!(
                        layer = layer_index,
                        heat,
                        attempt,
                        rooms = layer.rooms.len(),
                        "layer generated"
                    );
                    return Ok(layer);
                }
                Err(defect) => {
                    tracing::trace!(layer = layer_index, attempt, %defect, "layer rejected");
                    last = defect;
                }
            }
        }

        Err(GenerationError::Exhausted {
            layer: layer_index,
            attempts,
            last,
        })
    }

    fn checked_roster(&self, layer_index: u8) -> Result<&'a LayerRoster, ContentError> {
        let roster = self
            .content
            .layer_roster(layer_index)
            .ok_or(ContentError::MissingRoster(layer_index))?;
        if roster.regulars.is_empty() {
            return Err(ContentError::EmptyRoster(layer_index));
        }
        for id in roster.regulars.iter().chain(std::iter::once(&roster.boss)) {
            if self.content.enemy_variant(id).is_none() {
                return Err(ContentError::UnknownEnemy {
                    layer: layer_index,
                    variant: id.clone(),
                });
            }
        }
        Ok(roster)
    }

    fn attempt(
        &self,
        layer_index: u8,
        heat: u32,
        modifiers: HeatModifiers,
        roster: &LayerRoster,
        rng: &mut RngStream,
    ) -> Layer {
        let drafts = self.grow(layer_index, rng);
        let boss_index = drafts.len() - 1;

        let mut treasure_unlocked = false;
        let rooms = drafts
            .iter()
            .enumerate()
            .map(|(index, draft)| {
                let content = if index == 0 {
                    RoomContent::Empty
                } else if index == boss_index {
                    RoomContent::Boss(self.boss_encounter(layer_index, heat, modifiers, roster))
                } else {
                    match self.pick_slot(heat, modifiers, rng) {
                        Slot::Combat => RoomContent::Combat(
                            self.encounter(layer_index, heat, modifiers, roster, rng),
                        ),
                        Slot::Treasure => {
                            let unlock = (!treasure_unlocked)
                                .then(|| format!("relic:layer-{layer_index}"));
                            treasure_unlocked = true;
                            RoomContent::Treasure(self.treasure(layer_index, unlock, rng))
                        }
                        Slot::Shop => RoomContent::Shop,
                        Slot::Empty => RoomContent::Empty,
                        Slot::Trap => RoomContent::Trap(self.trap(layer_index)),
                    }
                };
                Room {
                    id: RoomId(index as u16),
                    depth: draft.depth,
                    content,
                    cleared: false,
                    exits: draft
                        .exits
                        .iter()
                        .map(|exit| RoomId(*exit as u16))
                        .collect(),
                }
            })
            .collect();

        Layer {
            index: layer_index,
            biome: Biome::for_layer(layer_index),
            heat,
            rooms,
            entrance: RoomId(0),
            boss: RoomId(boss_index as u16),
            attempts: 0,
            fallback: false,
        }
    }

    /// Grows the room graph. The entrance is index 0 and the boss is last.
    fn grow(&self, layer_index: u8, rng: &mut RngStream) -> Vec<Draft> {
        let layer = u32::from(layer_index);
        let boss_depth = self.config.base_depth + layer;
        let width_cap = (self.config.base_width + layer / 2).max(1) as usize;
        let max_branches = 2 + (layer - 1) / 3;

        let mut drafts = vec![Draft {
            depth: 0,
            exits: Vec::new(),
        }];
        let mut walkers = vec![0usize];

        for depth in 1..boss_depth {
            let mut next: Vec<usize> = Vec::new();
            for &walker in &walkers {
                if depth > 1 && rng.chance(self.config.dead_end_chance) {
                    continue;
                }
                let branches = if rng.chance(self.config.branch_chance) {
                    rng.range(2, max_branches)
                } else {
                    1
                };
                for _ in 0..branches {
                    let merge = !next.is_empty()
                        && (next.len() >= width_cap || rng.chance(self.config.merge_chance));
                    let target = if merge {
                        next[rng.range(0, (next.len() - 1) as u32) as usize]
                    } else {
                        drafts.push(Draft {
                            depth,
                            exits: Vec::new(),
                        });
                        next.push(drafts.len() - 1);
                        drafts.len() - 1
                    };
                    if !drafts[walker].exits.contains(&target) {
                        drafts[walker].exits.push(target);
                    }
                }
            }
            walkers = next;
        }

        let boss = drafts.len();
        drafts.push(Draft {
            depth: boss_depth,
            exits: Vec::new(),
        });
        for walker in walkers {
            drafts[walker].exits.push(boss);
        }
        drafts
    }

    fn pick_slot(&self, heat: u32, modifiers: HeatModifiers, rng: &mut RngStream) -> Slot {
        let table = self.slot_weights(heat, modifiers);
        let choice = rng.pick_weighted(&table.map(|(_, weight)| weight));
        choice.map_or(Slot::Combat, |index| table[index].0)
    }

    fn slot_weights(&self, heat: u32, modifiers: HeatModifiers) -> [(Slot, u32); 5] {
        let weights = self.config.weights;
        let treasure = if modifiers.contains(HeatModifiers::LESS_ITEMS) {
            weights.treasure / 2
        } else {
            weights.treasure
        };
        let trap = if modifiers.contains(HeatModifiers::MORE_TRAPS) {
            weights.trap.saturating_mul(2)
        } else {
            weights.trap
        };
        [
            (Slot::Combat, weights.combat + weights.combat_per_heat * heat),
            (Slot::Treasure, treasure),
            (Slot::Shop, weights.shop),
            (Slot::Empty, weights.empty),
            (Slot::Trap, trap),
        ]
    }

    fn encounter(
        &self,
        layer_index: u8,
        heat: u32,
        modifiers: HeatModifiers,
        roster: &LayerRoster,
        rng: &mut RngStream,
    ) -> Encounter {
        let layer = u32::from(layer_index);
        let base_level = layer + modifiers.enemy_level_bonus();

        let mut count = 1 + rng.range(0, ((layer - 1) / 2).min(2)) as usize;
        if modifiers.contains(HeatModifiers::MORE_ENEMIES) {
            count += 1;
        }
        let count = count.min(GameConfig::MAX_ENEMIES_PER_ENCOUNTER);

        let spawns = (0..count)
            .map(|slot| {
                let variant = roster.regulars
                    [rng.range(0, (roster.regulars.len() - 1) as u32) as usize]
                    .clone();
                let elite = slot == 0 && modifiers.contains(HeatModifiers::ELITE_ENEMIES);
                let drift = rng.range_i32(-1, 1);
                let mut level = base_level.saturating_add_signed(drift).max(1);
                if elite {
                    level += 3;
                }
                EnemySpawn {
                    variant,
                    level,
                    elite,
                }
            })
            .collect();

        Encounter {
            spawns,
            stat_multiplier: stat_multiplier(layer_index, heat),
        }
    }

    fn boss_encounter(
        &self,
        layer_index: u8,
        heat: u32,
        modifiers: HeatModifiers,
        roster: &LayerRoster,
    ) -> Encounter {
        let level = u32::from(layer_index) + 2 + modifiers.enemy_level_bonus();
        let mut spawns = vec![EnemySpawn {
            variant: roster.boss.clone(),
            level,
            elite: false,
        }];
        if modifiers.contains(HeatModifiers::DOUBLE_BOSSES) {
            spawns.push(EnemySpawn {
                variant: roster.boss.clone(),
                level: level.saturating_sub(1).max(1),
                elite: false,
            });
        }
        Encounter {
            spawns,
            stat_multiplier: stat_multiplier(layer_index, heat),
        }
    }

    fn treasure(&self, layer_index: u8, unlock: Option<String>, rng: &mut RngStream) -> Treasure {
        let layer = u32::from(layer_index);
        let currency = rng.range(
            self.config.treasure_currency_min * layer,
            self.config.treasure_currency_max * layer,
        );
        Treasure { currency, unlock }
    }

    fn trap(&self, layer_index: u8) -> Trap {
        let layer = u32::from(layer_index);
        let damage_min = self.config.trap_damage_min.saturating_mul(layer);
        Trap {
            damage_min,
            damage_max: self.config.trap_damage_max.saturating_mul(layer).max(damage_min),
        }
    }
}

/// Checks the structural invariants of a layer.
pub fn validate(layer: &Layer) -> Result<(), LayerDefect> {
    for room in &layer.rooms {
        if room.id != layer.entrance && layer.inbound_count(room.id) == 0 {
            return Err(if room.id == layer.boss {
                LayerDefect::BossUnreachable
            } else {
                LayerDefect::NoInbound(room.id)
            });
        }
    }

    let reachable = layer.reachable_from(layer.entrance);
    if !reachable.contains(&layer.boss) {
        return Err(LayerDefect::BossUnreachable);
    }
    if let Some(room) = layer.rooms.iter().find(|room| !reachable.contains(&room.id)) {
        return Err(LayerDefect::Unreachable(room.id));
    }
    if !layer.exits(layer.boss).is_empty() {
        return Err(LayerDefect::BossHasExits);
    }
    if layer.combat_room_count() == 0 {
        return Err(LayerDefect::NoCombatRoom);
    }
    Ok(())
}
