use crate::battle::BattleError;
use crate::combat::ActionError;
use crate::content::ContentError;
use crate::error::{ErrorSeverity, GameError};
use crate::layer::{GenerationError, RoomId};

use super::machine::RunPhase;

/// Errors raised by the run state machine.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RunError {
    #[error("cannot {action} while the run is {phase:?}")]
    InvalidPhase {
        action: &'static str,
        phase: RunPhase,
    },

    #[error("no path from {from} to {to}")]
    NoPath { from: RoomId, to: RoomId },

    #[error("{0} does not exist on this layer")]
    UnknownRoom(RoomId),

    #[error("the current battle has not finished")]
    BattleInProgress,

    #[error("heat {heat} exceeds the maximum of {max}")]
    InvalidHeat { heat: u32, max: u32 },

    #[error("item `{0}` is not in the inventory")]
    ItemNotHeld(String),

    #[error("item `{0}` cannot be equipped")]
    NotEquipment(String),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Battle(#[from] BattleError),
}

impl RunError {
    /// True when a player selection was rejected and the battle still
    /// awaits input for the same actor.
    pub fn is_action_unavailable(&self) -> bool {
        matches!(self, Self::Battle(BattleError::Action(ActionError::Unavailable(_))))
    }
}

impl GameError for RunError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InvalidPhase { .. }
            | Self::NoPath { .. }
            | Self::UnknownRoom(_)
            | Self::BattleInProgress
            | Self::InvalidHeat { .. }
            | Self::ItemNotHeld(_)
            | Self::NotEquipment(_) => ErrorSeverity::Validation,
            Self::Content(inner) => inner.severity(),
            Self::Generation(inner) => inner.severity(),
            Self::Battle(inner) => inner.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidPhase { .. } => "RUN_INVALID_PHASE",
            Self::NoPath { .. } => "RUN_NO_PATH",
            Self::UnknownRoom(_) => "RUN_UNKNOWN_ROOM",
            Self::BattleInProgress => "RUN_BATTLE_IN_PROGRESS",
            Self::InvalidHeat { .. } => "RUN_INVALID_HEAT",
            Self::ItemNotHeld(_) => "RUN_ITEM_NOT_HELD",
            Self::NotEquipment(_) => "RUN_NOT_EQUIPMENT",
            Self::Content(inner) => inner.error_code(),
            Self::Generation(inner) => inner.error_code(),
            Self::Battle(inner) => inner.error_code(),
        }
    }
}
