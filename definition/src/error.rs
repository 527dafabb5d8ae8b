//! Error types for grammar definition loading.
//!
//! Covers reading the definition file, decoding it, and compiling it into a
//! grammar.

use command_grammar_core::GrammarError;
use thiserror::Error;

/// Errors that can occur while loading or compiling a definition.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON decoding failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML decoding failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// File extension is neither JSON nor YAML.
    #[error("unsupported definition format: {0}")]
    UnsupportedFormat(String),

    /// Definition format version this crate cannot read.
    #[error("unsupported definition version: {0}")]
    UnsupportedVersion(String),

    /// The described grammar violates a structural invariant.
    #[error("invalid grammar at '{path}': {source}")]
    Grammar {
        /// Space-separated command path where the error was found.
        path: String,
        source: GrammarError,
    },
}

/// Convenience alias for results with [`DefinitionError`].
pub type Result<T> = std::result::Result<T, DefinitionError>;
