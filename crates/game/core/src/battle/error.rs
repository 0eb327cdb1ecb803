use crate::combat::{ActionError, StatusError, UnavailableReason};
use crate::error::{ErrorSeverity, GameError};
use crate::state::EntityId;

use super::BattlePhase;

/// Errors raised by the battle controller.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BattleError {
    /// The player's selection was rejected; the controller still awaits input.
    #[error(transparent)]
    Action(#[from] ActionError),

    /// The enemy AI chose an action the resolver rejected. The battle is aborted.
    #[error("enemy AI for {actor} chose an illegal action: {source}")]
    IllegalAiAction {
        actor: EntityId,
        source: UnavailableReason,
    },

    /// An action by `actor` broke a status stacking rule. The battle is aborted.
    #[error("action by {actor} hit a status fault: {source}")]
    StatusFault { actor: EntityId, source: StatusError },

    #[error("battle is not awaiting player input (phase {phase:?})")]
    NotAwaitingInput { phase: BattlePhase },

    #[error("battle is awaiting input for {actor}; submit a selection first")]
    AwaitingInput { actor: EntityId },
}

impl GameError for BattleError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Action(inner) => inner.severity(),
            Self::IllegalAiAction { .. } => ErrorSeverity::Internal,
            Self::StatusFault { .. } => ErrorSeverity::Fatal,
            Self::NotAwaitingInput { .. } | Self::AwaitingInput { .. } => {
                ErrorSeverity::Validation
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Action(inner) => inner.error_code(),
            Self::IllegalAiAction { .. } => "BATTLE_ILLEGAL_AI_ACTION",
            Self::StatusFault { .. } => "BATTLE_STATUS_FAULT",
            Self::NotAwaitingInput { .. } => "BATTLE_NOT_AWAITING_INPUT",
            Self::AwaitingInput { .. } => "BATTLE_AWAITING_INPUT",
        }
    }
}

impl BattleError {
    /// Classifies a resolver failure for an action `actor` was not allowed to retry.
    pub(crate) fn aborting(actor: EntityId, err: ActionError) -> Self {
        match err {
            ActionError::Unavailable(source) => Self::IllegalAiAction { actor, source },
            ActionError::Status(source) => Self::StatusFault { actor, source },
        }
    }
}
