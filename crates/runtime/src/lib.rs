//! Runtime orchestration for Demonbane runs.
//!
//! This crate drives the pure core state machines: it sources player
//! decisions, plays enemy turns, and persists meta-progression between runs.
//!
//! Modules are organized by responsibility:
//! - [`session`] hosts the async run driver
//! - [`progression`] owns the loaded meta-progression and its lifecycle
//! - [`providers`] supplies player input and enemy AI implementations
//! - [`repository`] persists meta-progression snapshots
//! - [`events`] broadcasts session progress to presentation layers
pub mod config;
pub mod error;
pub mod events;
pub mod progression;
pub mod providers;
pub mod repository;
pub mod session;

pub use config::RuntimeConfig;
pub use error::{Result, RuntimeError};
pub use events::{EventBus, SessionEvent};
pub use progression::MetaProgressionManager;
pub use providers::{
    AiContext, AutoPilot, PatternAi, PlayerInput, RouteChoice, RouteOptions, ScriptedInput,
};
pub use repository::{
    FileMetaRepository, InMemoryMetaRepository, MetaRepository, RepositoryError,
};
pub use session::Session;
