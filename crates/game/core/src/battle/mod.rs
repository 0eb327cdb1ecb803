//! Battles: turn scheduling, the phase machine, and decision interfaces.
mod controller;
mod error;
mod result;
mod scheduler;
mod selection;

pub use controller::{BattleController, BattlePhase, BattleStep};
pub use error::BattleError;
pub use result::{BattleOutcome, BattleResult, ItemDrop};
pub use scheduler::{Advance, TurnQueue};
pub use selection::{ActionSelection, BattleView, EnemyAi, PlayerActionSelection};
