//! Error types for strategy chain construction and registration.
//!
//! Errors only arise at the two construction seams: wrapping a method that
//! does not exist, and building an entry with required pieces missing.
//! Invocation never produces a chain-level error — anything raised by an
//! interceptor or the target propagates to the caller untouched.
//!
//! ```rust
//! use stratagem::StrategyError;
//!
//! let err = StrategyError::invalid_target("do_stuff");
//! assert!(err.is_invalid_target());
//! assert!(err.to_string().contains("do_stuff"));
//! ```

use smol_str::SmolStr;
use thiserror::Error;

/// Result type for strategy operations.
pub type StrategyResult<T> = Result<T, StrategyError>;

/// Errors produced while constructing a strategy chain or an entry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrategyError {
    /// The owner has no method under the requested property name.
    ///
    /// Strategies can only target methods; construction fails and no chain
    /// is produced.
    #[error("strategies can only target methods: owner has no method `{prop}`")]
    InvalidTarget {
        /// The property name that failed to resolve.
        prop: SmolStr,
    },

    /// An entry was built without a required field.
    #[error("invalid strategy entry: {reason}")]
    InvalidEntry {
        /// What was missing or malformed.
        reason: String,
    },
}

impl StrategyError {
    /// Create an invalid target error for the given property name.
    pub fn invalid_target(prop: impl Into<SmolStr>) -> Self {
        Self::InvalidTarget { prop: prop.into() }
    }

    /// Create an invalid entry error.
    pub fn invalid_entry(reason: impl Into<String>) -> Self {
        Self::InvalidEntry {
            reason: reason.into(),
        }
    }

    /// Check if this is a construction-time target error.
    pub fn is_invalid_target(&self) -> bool {
        matches!(self, Self::InvalidTarget { .. })
    }

    /// Check if this is an entry validation error.
    pub fn is_invalid_entry(&self) -> bool {
        matches!(self, Self::InvalidEntry { .. })
    }
}
