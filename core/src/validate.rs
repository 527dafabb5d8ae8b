//! Build-time grammar validation.
//!
//! Enforces the structural invariants of a command scope before the
//! command is frozen: names are non-empty single words, options declare at
//! least one alias, and every token that can select a child (subcommand
//! names and aliases, option aliases) is unique within the scope.
//!
//! # Examples
//!
//! ```
//! use command_grammar_core::*;
//!
//! let err = Command::builder("tool")
//!     .option(CommandOption::new(["--out", "-o"], "Output"))
//!     .option(CommandOption::new(["--other", "-o"], "Other"))
//!     .build()
//!     .unwrap_err();
//! assert!(matches!(err, GrammarError::DuplicateAlias { .. }));
//! ```

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::Command;

/// Grammar construction errors.
///
/// Returned by the `build()` methods of the grammar builders. These are the
/// only failures the engine reports; parse problems are recorded as
/// [`ParseError`](crate::ParseError) diagnostics instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// Command name is empty or whitespace-only.
    #[error("command name cannot be empty")]
    EmptyCommandName,
    /// A name or alias is empty or contains whitespace, so no token could
    /// ever match it.
    #[error("invalid name or alias: {0:?}")]
    InvalidName(String),
    /// An option has no aliases.
    #[error("option must define at least one alias")]
    MissingOptionAlias,
    /// Two symbols of the same command scope share an alias.
    #[error("duplicate alias in scope of '{command}': {alias}")]
    DuplicateAlias { command: String, alias: String },
    /// Two subcommands of the same command share a name.
    #[error("duplicate subcommand in scope of '{command}': {name}")]
    DuplicateSubcommand { command: String, name: String },
    /// `from_among` was given no values.
    #[error("allowed-value set cannot be empty")]
    EmptyAllowedValues,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Owner {
    Subcommand,
    Option,
}

/// Validates a single command scope.
pub(crate) fn validate_command(command: &Command) -> Result<(), GrammarError> {
    if command.name().trim().is_empty() {
        return Err(GrammarError::EmptyCommandName);
    }

    let scope = command.name().to_string();
    let mut seen: HashMap<&str, Owner> = HashMap::new();
    let mut own: HashSet<&str> = HashSet::new();

    for name in command.aliases() {
        check_word(name)?;
        if !own.insert(name) {
            return Err(GrammarError::DuplicateAlias {
                command: scope,
                alias: name.clone(),
            });
        }
    }

    for sub in command.subcommands() {
        for name in sub.aliases() {
            if let Some(previous) = seen.insert(name, Owner::Subcommand) {
                return Err(duplicate(&scope, name, previous, Owner::Subcommand));
            }
        }
    }

    for option in command.options() {
        if option.aliases().is_empty() {
            return Err(GrammarError::MissingOptionAlias);
        }
        for alias in option.aliases() {
            check_word(alias)?;
            if let Some(previous) = seen.insert(alias, Owner::Option) {
                return Err(duplicate(&scope, alias, previous, Owner::Option));
            }
        }
    }

    Ok(())
}

fn duplicate(scope: &str, alias: &str, previous: Owner, current: Owner) -> GrammarError {
    if previous == Owner::Subcommand && current == Owner::Subcommand {
        GrammarError::DuplicateSubcommand {
            command: scope.to_string(),
            name: alias.to_string(),
        }
    } else {
        GrammarError::DuplicateAlias {
            command: scope.to_string(),
            alias: alias.to_string(),
        }
    }
}

fn check_word(name: &str) -> Result<(), GrammarError> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(GrammarError::InvalidName(name.to_string()));
    }
    Ok(())
}
