//! A single descent through the seven layers.
//!
//! [`RunStateMachine`] moves the player between rooms, creates battles for
//! combat and boss rooms, and hands a [`RunSummary`] to meta-progression when
//! the run ends.
mod error;
mod experience;
mod machine;
mod state;

pub use error::RunError;
pub use experience::{Experience, LevelUp, apply_level_up};
pub use machine::{
    BattleConclusion, RoomEvent, RunEnd, RunPhase, RunStateMachine, generate_layer,
};
pub use state::{RunConfig, RunOutcome, RunState, RunStats, RunSummary};
