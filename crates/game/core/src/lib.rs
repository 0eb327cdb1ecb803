//! Deterministic rules for the Demonbane roguelite.
//!
//! `demonbane-core` owns everything that decides an outcome: the seeded RNG
//! streams, the combat resolver and status engine, the round-based battle
//! controller, the procedural layer generator, the run state machine and the
//! pure meta-progression functions. It performs no I/O; the runtime crate
//! supplies persistence, player input and logging sinks.
//!
//! Static data (abilities, items, enemy variants, rosters, classes) reaches the rules
//! through the [`ContentOracle`] trait so the same logic runs against bundled
//! catalogs and hand-built test fixtures alike.
pub mod battle;
pub mod combat;
pub mod config;
pub mod content;
pub mod error;
pub mod layer;
pub mod meta;
pub mod rng;
pub mod run;
pub mod state;

pub use battle::{
    ActionSelection, BattleController, BattleError, BattleOutcome, BattlePhase, BattleResult,
    BattleStep, BattleView, EnemyAi, ItemDrop, PlayerActionSelection, TurnQueue,
};
pub use combat::{
    AbilityRef, Action, ActionError, ActionOutcome, StackResolution, StatusChange, StatusError,
    TargetOutcome, TickReport, UnavailableReason,
};
pub use config::GameConfig;
pub use content::{
    AiPattern, Bounty, ContentCatalog, ContentError, ContentOracle, EnemyVariant, LayerRoster,
    LootEntry, PlayerClass, Rarity,
};
pub use error::{ErrorSeverity, GameError};
pub use layer::{
    Biome, Encounter, EnemySpawn, GenerationError, GeneratorConfig, Layer, LayerDefect,
    LayerGenerator, Room, RoomContent, RoomId, RoomWeights, Trap, Treasure,
};
pub use meta::{
    HeatModifiers, MetaProgressionState, RunRecord, StartingBonus, finalize_run, starting_bonus,
};
pub use rng::{RngStream, SeedDomain, derive_seed};
pub use run::{
    BattleConclusion, Experience, LevelUp, RoomEvent, RunConfig, RunEnd, RunError, RunOutcome,
    RunPhase, RunState, RunStateMachine, RunStats, RunSummary, generate_layer,
};
pub use state::{
    Ability, AbilitySlot, BaseStats, CombatTraits, EffectSpec, Entity, EntityId, EntityKind,
    EquipSlot, Equipment, Faction, Formula, Inventory, Item, ItemKind, ItemStack, ResourceMeter,
    RollProfile, Roster, StackingPolicy, StatBonus, StatusEffectInstance, StatusEffects,
    StatusKind, StatusSpec, Stats, TargetSelector,
};
