use crate::error::{ErrorSeverity, GameError};
use crate::state::{EntityId, StackingPolicy, StatusKind};

/// Why an action could not be used. Nothing is mutated when this is returned.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum UnavailableReason {
    #[error("actor {0} is not in the battle")]
    ActorNotFound(EntityId),

    #[error("actor {0} is defeated")]
    ActorDefeated(EntityId),

    #[error("ability `{0}` is not known by the actor")]
    UnknownAbility(String),

    #[error("ability `{ability}` is on cooldown for {remaining} more round(s)")]
    OnCooldown { ability: String, remaining: u32 },

    #[error("ability `{ability}` costs {required} but only {available} is available")]
    InsufficientResource {
        ability: String,
        required: u32,
        available: u32,
    },

    #[error("ability needs exactly one target, got {0}")]
    WrongTargetCount(usize),

    #[error("target {0} is not in the battle")]
    TargetNotFound(EntityId),

    #[error("target {0} is already defeated")]
    TargetDefeated(EntityId),

    #[error("target {0} belongs to the wrong faction for this ability")]
    WrongFaction(EntityId),

    #[error("self-only ability cannot target {0}")]
    SelfOnly(EntityId),

    #[error("no living targets")]
    NoTargets,

    #[error("item `{0}` is not in the inventory")]
    ItemNotHeld(String),

    #[error("item `{0}` cannot be used in battle")]
    NotConsumable(String),
}

/// Status engine faults. These indicate content or logic bugs.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StatusError {
    #[error("{kind} applied with zero duration")]
    ZeroDuration { kind: StatusKind },

    #[error("{kind} applied with stacking {incoming} over an existing {existing} instance")]
    PolicyMismatch {
        kind: StatusKind,
        existing: StackingPolicy,
        incoming: StackingPolicy,
    },

    #[error("status capacity exceeded while applying {kind}")]
    Overflow { kind: StatusKind },
}

impl GameError for StatusError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ZeroDuration { .. } => "STATUS_ZERO_DURATION",
            Self::PolicyMismatch { .. } => "STATUS_POLICY_MISMATCH",
            Self::Overflow { .. } => "STATUS_OVERFLOW",
        }
    }
}

/// Errors raised by the combat resolver.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("action unavailable: {0}")]
    Unavailable(#[from] UnavailableReason),

    #[error(transparent)]
    Status(#[from] StatusError),
}

impl ActionError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl GameError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Unavailable(_) => ErrorSeverity::Recoverable,
            Self::Status(inner) => inner.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "ACTION_UNAVAILABLE",
            Self::Status(inner) => inner.error_code(),
        }
    }
}
