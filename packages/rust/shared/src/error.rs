//! Error types for tabby record loading.
//!
//! Library crates use [`TabbyError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all tabby operations.
#[derive(Debug, thiserror::Error)]
pub enum TabbyError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A context, override, or sidecar file is not valid JSON.
    #[error("malformed JSON in {path:?}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The row reader could not tokenize a sheet.
    #[error("sheet error in {path:?}: {message}")]
    Sheet { path: PathBuf, message: String },

    /// A sheet is (indirectly) importing itself.
    #[error("circular import: {path:?} is (indirectly) referencing itself (trace: {trace:?})")]
    CircularReference { path: PathBuf, trace: Vec<PathBuf> },

    /// Data shape error (e.g. an override file whose top level is not an object).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, TabbyError>;

impl TabbyError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a JSON parse failure with the offending file path.
    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }

    /// Create a sheet tokenizer error.
    pub fn sheet(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Sheet {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Whether this error aborts a session because of a circular import.
    pub fn is_circular(&self) -> bool {
        matches!(self, Self::CircularReference { .. })
    }
}
