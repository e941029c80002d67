//! Error types for promptgraph.

use thiserror::Error;

use crate::codec::CodecError;

/// Primary error type for all graph, session, and codec operations.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Graph construction error: {0}")]
    Construction(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Token source error: {message}")]
    TokenSource {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Iteration limit of {limit} node executions exceeded")]
    IterationLimit { limit: usize },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Broad error category, mirroring how each failure is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Construction,
    Invariant,
    Source,
    Decode,
    Limit,
    Configuration,
    Io,
}

impl GraphError {
    /// Create a token source error from a message.
    pub fn token_source(message: impl Into<String>) -> Self {
        Self::TokenSource {
            message: message.into(),
            source: None,
        }
    }

    /// Create a token source error wrapping an underlying cause.
    pub fn token_source_with(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::TokenSource {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Construction(_) => ErrorCategory::Construction,
            Self::InvariantViolation(_) => ErrorCategory::Invariant,
            Self::TokenSource { .. } => ErrorCategory::Source,
            Self::Codec(_) | Self::Serialization(_) => ErrorCategory::Decode,
            Self::IterationLimit { .. } => ErrorCategory::Limit,
            Self::Configuration(_) | Self::Toml(_) => ErrorCategory::Configuration,
            Self::Io(_) => ErrorCategory::Io,
        }
    }

    /// Whether this error indicates a programming or wiring bug rather than a
    /// per-request failure.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Construction | ErrorCategory::Invariant
        )
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, GraphError>;
