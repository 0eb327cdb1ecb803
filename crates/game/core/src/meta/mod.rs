//! Persistent meta-progression and difficulty modifiers.
mod heat;
mod progression;

pub use heat::HeatModifiers;
pub use progression::{
    MetaProgressionState, RunRecord, StartingBonus, finalize_run, starting_bonus,
};
