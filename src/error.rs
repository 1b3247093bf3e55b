//! Error types for the time tracking engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur across the clock, rate, holiday
//! and wage components.

use thiserror::Error;

/// The main error type for the time tracking engine.
///
/// All fallible operations in the engine return this error type, making it
/// easy to handle errors consistently throughout the application. Mutation
/// failures roll back their whole transaction; none of these conditions is
/// retried by the engine itself.
///
/// # Example
///
/// ```
/// use timeclock_engine::error::EngineError;
///
/// let error = EngineError::conflict("user already has an open session");
/// assert_eq!(error.to_string(), "conflict: user already has an open session");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// A uniqueness or state-machine rule was violated: duplicate open
    /// session, duplicate base rate, overlapping interval, duplicate
    /// absence for a kind and date, pause toggled twice.
    #[error("conflict: {message}")]
    Conflict {
        /// A description of the violated rule.
        message: String,
    },

    /// A referenced entity does not exist, including the "no open session
    /// to check out or pause" case.
    #[error("not found: {message}")]
    NotFound {
        /// A description of what was missing.
        message: String,
    },

    /// Input data failed validation.
    #[error("invalid {field}: {message}")]
    Validation {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// The engine configuration is incomplete or unreadable: no base rate,
    /// no fixed rate for an absence kind, missing or malformed config file.
    #[error("configuration error: {message}")]
    Configuration {
        /// A description of the configuration problem.
        message: String,
    },

    /// The acting user lacks permission for the target user or entity.
    #[error("not authorized: {message}")]
    Authorization {
        /// A description of the denied action.
        message: String,
    },
}

impl EngineError {
    /// Creates a [`EngineError::Conflict`] from any displayable message.
    pub fn conflict(message: impl Into<String>) -> Self {
        EngineError::Conflict {
            message: message.into(),
        }
    }

    /// Creates a [`EngineError::NotFound`] from any displayable message.
    pub fn not_found(message: impl Into<String>) -> Self {
        EngineError::NotFound {
            message: message.into(),
        }
    }

    /// Creates a [`EngineError::Validation`] for a named field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a [`EngineError::Configuration`] from any displayable message.
    pub fn configuration(message: impl Into<String>) -> Self {
        EngineError::Configuration {
            message: message.into(),
        }
    }

    /// Creates a [`EngineError::Authorization`] from any displayable message.
    pub fn authorization(message: impl Into<String>) -> Self {
        EngineError::Authorization {
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
