//! Common error infrastructure for demonbane-core.
//!
//! Domain-specific errors (`ActionError`, `BattleError`, `GenerationError`,
//! `RunError`) live next to the operations that raise them. This module only
//! provides the shared severity classification every one of them reports.
//!
//! # Design Principles
//!
//! - **Type Safety**: Each subsystem has its own error enum with specific variants
//! - **Severity Classification**: Errors are categorized for recovery strategies
//! - **Local Recovery**: Recoverable errors never leave the subsystem in a
//!   partially applied state, so callers may simply retry with new input

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: Rejected input; the caller may retry with a different choice
/// - **Validation**: Invalid request that should not be retried unchanged
/// - **Internal**: Inconsistent state that indicates a bug
/// - **Fatal**: The run cannot continue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - can retry with same or alternative action.
    ///
    /// Examples: ability on cooldown, not enough resource
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: room not connected, unknown class
    Validation,

    /// Internal error - unexpected state inconsistency.
    ///
    /// Examples: enemy AI returned an illegal action, status capacity exceeded
    Internal,

    /// Fatal error - the run cannot continue.
    ///
    /// Examples: missing content for the current layer
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all demonbane-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
