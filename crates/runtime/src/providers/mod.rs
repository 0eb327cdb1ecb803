//! Decision providers for the player and enemy sides of a battle.

pub mod ai;
pub mod input;

pub use ai::{AiContext, PatternAi};
pub use input::{AutoPilot, PlayerInput, RouteChoice, RouteOptions, ScriptedInput};
