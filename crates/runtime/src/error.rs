//! Unified error type surfaced by the runtime API.
//!
//! Wraps failures from the run state machine, repositories, and input
//! providers so clients can bubble them up with consistent context.
use demonbane_core::{ErrorSeverity, GameError, RunError};
use thiserror::Error;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Run(#[from] RunError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("class `{class}` is locked until `{requires}` is unlocked")]
    ClassLocked { class: String, requires: String },

    #[error("heat {heat} is locked; the highest selectable heat is {max}")]
    HeatLocked { heat: u32, max: u32 },

    #[error("player input closed")]
    InputClosed,

    #[error("player input was rejected {attempts} times in a row")]
    TooManyRejections { attempts: u32 },

    #[error("blocking worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),
}

impl RuntimeError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Run(inner) => inner.severity(),
            Self::ClassLocked { .. } | Self::HeatLocked { .. } => ErrorSeverity::Validation,
            Self::TooManyRejections { .. } => ErrorSeverity::Recoverable,
            Self::Repository(_) | Self::InputClosed | Self::WorkerJoin(_) => ErrorSeverity::Fatal,
        }
    }
}
