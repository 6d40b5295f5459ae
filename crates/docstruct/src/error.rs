//! Error types for splitting and chunk orchestration

use thiserror::Error;

/// Result type alias for docstruct operations
pub type Result<T> = std::result::Result<T, Error>;

/// Docstruct errors
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid splitter configuration (rejected at construction)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required capability (tokenizer) could not be constructed
    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),

    /// Encode/decode failure reported by a tokenizer
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// A single unit could not be split
    #[error("Failed to split unit {index}: {source}")]
    Split {
        index: usize,
        #[source]
        source: Box<Error>,
    },

    /// Orchestration stopped by a cancellation request
    #[error("Splitting cancelled after {completed} units")]
    Cancelled { completed: usize },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a dependency-unavailable error
    pub fn dependency(message: impl Into<String>) -> Self {
        Self::DependencyUnavailable(message.into())
    }

    /// Create a tokenizer error
    pub fn tokenizer(message: impl Into<String>) -> Self {
        Self::Tokenizer(message.into())
    }

    /// Wrap an error raised while splitting the unit at `index`
    pub fn split(index: usize, source: Error) -> Self {
        Self::Split {
            index,
            source: Box::new(source),
        }
    }

    /// True for errors that reject a splitter before any input is processed.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_) | Self::DependencyUnavailable(_))
    }
}
