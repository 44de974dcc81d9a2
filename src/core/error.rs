//! Error types for task execution and configuration.

use std::time::Duration;

use thiserror::Error;

/// Failure outcome of a task run through one of the execution primitives.
///
/// `E` is the caller's own error type. It is carried verbatim so whoever
/// submitted a task can inspect exactly what the task reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError<E> {
    /// The task itself failed.
    #[error("task failed: {0}")]
    Failed(E),
    /// The deadline elapsed before the task produced an outcome.
    #[error("deadline of {0:?} elapsed")]
    TimedOut(Duration),
    /// Every attempt failed; carries the error of the final attempt.
    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetryExhausted {
        /// Attempts made, including the first one.
        attempts: u32,
        /// Error returned by the last attempt.
        last: E,
    },
    /// The pool was closed before the task was submitted.
    #[error("pool is not accepting new tasks")]
    NotAccepting,
    /// The task panicked while running.
    #[error("task panicked: {0}")]
    Panicked(String),
    /// The completion source was dropped without being settled.
    #[error("task was abandoned before settling")]
    Abandoned,
}

impl<E> TaskError<E> {
    /// Borrow the task's own error, if this failure carries one.
    pub const fn failure(&self) -> Option<&E> {
        match self {
            Self::Failed(error) | Self::RetryExhausted { last: error, .. } => Some(error),
            _ => None,
        }
    }

    /// Take the task's own error, if this failure carries one.
    pub fn into_failure(self) -> Option<E> {
        match self {
            Self::Failed(error) | Self::RetryExhausted { last: error, .. } => Some(error),
            _ => None,
        }
    }

    /// True when a deadline decided the outcome.
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut(_))
    }
}

/// Errors raised while validating or loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field holds a value outside its allowed range.
    #[error("invalid `{field}`: {reason}")]
    Invalid {
        /// Name of the offending field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },
    /// The JSON document could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
