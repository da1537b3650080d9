//! Error types and failure classification for property checks.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised while drawing a value from a generator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// A filtering combinator rejected every draw within its retry budget
    #[error("generator exhausted after {attempts} rejected draws")]
    Exhausted { attempts: usize },

    /// A user-defined generator could not produce a value
    #[error("generation failed: {message}")]
    Custom { message: String },
}

impl GenerationError {
    /// Create a custom generation error
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom {
            message: message.into(),
        }
    }
}

/// Comprehensive error type for property checking
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropertyError {
    /// The predicate evaluated to false on a generated value
    #[error("Property failed: {}", .message.as_deref().unwrap_or("predicate returned false"))]
    PredicateFalse { message: Option<String> },

    /// The predicate panicked or returned an error while being evaluated
    #[error("Property failed: predicate raised: {cause}")]
    PredicateException { cause: String },

    /// A filtering generator ran out of retries during the trial loop
    #[error(
        "Generator exhausted for property '{property}' after {attempts} attempts (iteration {iteration})"
    )]
    GeneratorExhausted {
        property: String,
        attempts: usize,
        iteration: usize,
    },

    /// A user-defined generator reported a failure during the trial loop
    #[error("Generation failed for property '{property}': {message}")]
    GenerationFailed { property: String, message: String },

    /// A tally worker thread panicked outside of predicate evaluation
    #[error("Worker {worker} panicked: {message}")]
    WorkerPanicked { worker: usize, message: String },

    /// The run configuration was rejected
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl PropertyError {
    /// Create a plain predicate failure
    pub fn predicate_false() -> Self {
        Self::PredicateFalse { message: None }
    }

    /// Create a predicate failure carrying a description of what went wrong
    pub fn predicate_failed(message: impl Into<String>) -> Self {
        Self::PredicateFalse {
            message: Some(message.into()),
        }
    }

    /// Create a predicate exception with the captured cause
    pub fn predicate_exception(cause: impl Into<String>) -> Self {
        Self::PredicateException {
            cause: cause.into(),
        }
    }

    /// Attach the property name and iteration to a generation error
    pub fn from_generation(error: GenerationError, property: &str, iteration: usize) -> Self {
        match error {
            GenerationError::Exhausted { attempts } => Self::GeneratorExhausted {
                property: property.to_string(),
                attempts,
                iteration,
            },
            GenerationError::Custom { message } => Self::GenerationFailed {
                property: property.to_string(),
                message,
            },
        }
    }

    /// Classify this error as a trial failure.
    ///
    /// Errors that are not predicate outcomes are folded into
    /// [`FailureKind::PredicateException`] with their rendered message as cause.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            PropertyError::PredicateFalse { message } => FailureKind::PredicateFalse {
                message: message.clone(),
            },
            PropertyError::PredicateException { cause } => FailureKind::PredicateException {
                cause: cause.clone(),
            },
            other => FailureKind::PredicateException {
                cause: other.to_string(),
            },
        }
    }

    /// Whether this error is a plain predicate failure (as opposed to a panic)
    pub fn is_predicate_false(&self) -> bool {
        matches!(self, PropertyError::PredicateFalse { .. })
    }
}

/// How a failing trial failed
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FailureKind {
    /// The predicate returned false
    PredicateFalse { message: Option<String> },
    /// The predicate panicked or a fallible predicate returned `Err`; the panic
    /// payload or error message is kept as the cause
    PredicateException { cause: String },
}

impl FailureKind {
    /// The captured cause for exceptions, if any
    pub fn cause(&self) -> Option<&str> {
        match self {
            FailureKind::PredicateFalse { .. } => None,
            FailureKind::PredicateException { cause } => Some(cause),
        }
    }
}
