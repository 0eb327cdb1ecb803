//! Combat resolution.
//!
//! - [`resolver`]: validates and applies a single action
//! - [`status`]: stacking rules and round-start ticks for status effects
//! - [`damage`]: pure damage arithmetic
pub mod damage;
mod error;
mod outcome;
pub mod resolver;
pub mod status;

pub use damage::{apply_critical, calculate_damage};
pub use error::{ActionError, StatusError, UnavailableReason};
pub use outcome::{ActionOutcome, StatusChange, TargetOutcome};
pub use resolver::{AbilityRef, Action, resolve};
pub use status::{StackResolution, TickReport};
