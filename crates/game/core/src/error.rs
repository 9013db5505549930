//! Common error infrastructure for battle-core.
//!
//! Domain-specific errors (`ActionError`, `SwapError`, `SessionError`) live next
//! to the code that produces them. They all implement [`BattleError`] so the
//! runtime can classify failures uniformly.
//!
//! # Design Principles
//!
//! - **Never fatal in the loop**: engine failures are returned, not panicked,
//!   so a single bad action cannot stop the scheduler tick.
//! - **Severity Classification**: errors are categorized for recovery strategies.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the same unit may try again (e.g. not enough chakra)
/// - **Validation**: invalid input that should be rejected without retry
/// - **Internal**: unexpected state inconsistencies that require investigation
/// - **Fatal**: unrecoverable errors, the encounter cannot continue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - can retry with same or alternative action.
    ///
    /// Examples: insufficient chakra, skill locked
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: unknown unit, defeated target
    Validation,

    /// Internal error - unexpected state inconsistency.
    Internal,

    /// Fatal error - the encounter cannot be built or continued.
    ///
    /// Examples: unknown mission, empty team
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

/// Common trait for all battle-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait BattleError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
