//! Parse diagnostics.
//!
//! Diagnostics are values, not failures: the parser records them in order
//! and always runs to the end of the token stream.

use serde::Serialize;
use thiserror::Error;

/// Kind of a recorded parse diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorKind {
    /// Token matched no command or option and no rule accepted it as a value.
    UnmatchedToken,
    /// Input ended (or the option was left) before the rule's minimum was met.
    ArgumentCountBelowMinimum,
    /// Token offered to an owner whose rule is already saturated.
    ArgumentCountAboveMaximum,
    /// Value outside a constrained rule's allowed-value set.
    ValueNotInAllowedSet,
}

/// A diagnostic recorded while parsing.
///
/// `token` and `token_index` are `None` for diagnostics raised at end of
/// input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub token: Option<String>,
    pub token_index: Option<usize>,
    pub message: String,
}

impl ParseError {
    pub(crate) fn at(kind: ParseErrorKind, index: usize, token: &str, message: String) -> Self {
        Self {
            kind,
            token: Some(token.to_string()),
            token_index: Some(index),
            message,
        }
    }

    pub(crate) fn at_end(kind: ParseErrorKind, message: String) -> Self {
        Self {
            kind,
            token: None,
            token_index: None,
            message,
        }
    }
}
