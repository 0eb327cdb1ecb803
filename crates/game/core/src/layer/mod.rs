//! Procedurally generated dungeon layers.
//!
//! A [`Layer`] is a directed acyclic graph of [`Room`]s from a single
//! entrance down to one boss room. [`LayerGenerator`] grows it from an
//! [`RngStream`](crate::rng::RngStream) so a `(layer, heat, seed)` triple
//! always yields the same graph.
mod generator;
mod room;
mod theme;

pub use generator::{
    GenerationError, GeneratorConfig, LayerDefect, LayerGenerator, RoomWeights, stat_multiplier,
    validate,
};
pub use room::{Encounter, EnemySpawn, Layer, Room, RoomContent, RoomId, Trap, Treasure};
pub use theme::Biome;
