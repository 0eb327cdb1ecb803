//! Enemy decision making.
//!
//! [`PatternAi`] implements the core [`EnemyAi`](demonbane_core::EnemyAi)
//! trait. The shared [`AiContext`] helpers are also used by the autopilot
//! player input.

mod context;
mod provider;

pub use context::{AiContext, is_healing};
pub use provider::PatternAi;
