//! Declarative grammar definitions for `command-grammar`.
//!
//! This crate loads a grammar described as YAML or JSON and compiles it into
//! a frozen [`Command`](command_grammar_core::Command). Suggestion sources
//! that would be closures in code are selected by name (see [`SourceKind`]).
//!
//! # Quick start
//!
//! ```no_run
//! use command_grammar_def::GrammarDefinition;
//!
//! let grammar = GrammarDefinition::load("grammar.yaml")
//!     .and_then(|definition| definition.build())
//!     .unwrap();
//!
//! let result = grammar.parse("git checkout ");
//! for candidate in result.suggestions(None) {
//!     println!("{candidate}");
//! }
//! ```

mod config;
mod error;
mod sources;

pub use config::{
    ArgumentDefinition, CommandDefinition, DEFINITION_VERSION, GrammarDefinition,
    OptionDefinition,
};
pub use error::{DefinitionError, Result};
pub use sources::SourceKind;
