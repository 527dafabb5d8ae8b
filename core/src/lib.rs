//! Command-line grammar engine: parsing, validation and completion.
//!
//! This crate resolves command lines against a declared grammar:
//!
//! - [`Command`]: a command with options, subcommands and an optional
//!   argument rule, built through [`Command::builder`].
//! - [`CommandOption`]: an option with one or more aliases and an optional
//!   argument rule.
//! - [`ArgumentRule`]: arity, allowed values and suggestion sources for the
//!   values a command or option accepts.
//! - [`Parser`]: tokenizes input and walks it against the grammar,
//!   producing a [`ParseResult`].
//!
//! A [`ParseResult`] exposes the recorded diagnostics ([`ParseError`]), the
//! text under a cursor ([`ParseResult::text_to_match`]) and completion
//! candidates at any cursor position ([`ParseResult::suggestions`]).
//!
//! Grammars are immutable once built and can be shared across threads.
//!
//! # Example
//!
//! ```
//! use command_grammar_core::*;
//!
//! let root = Command::builder("command")
//!     .option(CommandOption::new(["--one"], "First"))
//!     .option(CommandOption::new(["--two"], "Second"))
//!     .option(CommandOption::new(["--three"], "Third"))
//!     .build()
//!     .unwrap();
//!
//! let result = root.parse("command ");
//! assert!(result.errors().is_empty());
//!
//! let suggestions = result.suggestions(None);
//! assert_eq!(suggestions.len(), 3);
//! assert!(suggestions.contains("--two"));
//! ```

mod error;
mod parser;
mod result;
mod suggest;
mod token;
mod types;
mod validate;

pub use error::{ParseError, ParseErrorKind};
pub use parser::Parser;
pub use result::{ParseResult, SymbolResult};
pub use suggest::filter_candidates;
pub use token::{Input, Token, tokenize, tokens_from_args};
pub use types::*;
pub use validate::GrammarError;
