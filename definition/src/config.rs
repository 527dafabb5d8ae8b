//! Declarative grammar definitions.
//!
//! A definition describes a grammar as data so tools can load it from a
//! file instead of building it in code. Definitions are read-only input;
//! a built grammar is never written back.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! root:
//!   name: git
//!   help: The stupid content tracker
//!   options:
//!     - aliases: [--verbose, -v]
//!       help: Be verbose
//!   subcommands:
//!     - name: checkout
//!       aliases: [co]
//!       help: Switch branches
//!       argument:
//!         suggestions: [main, develop]
//!     - name: add
//!       help: Add file contents to the index
//!       argument:
//!         arity: one_or_more
//!         source: paths
//! ```

use std::io::BufReader;
use std::path::Path;

use command_grammar_core::{ArgumentRule, Arity, Command, CommandOption, GrammarError};
use serde::Deserialize;

use crate::error::{DefinitionError, Result};
use crate::sources::SourceKind;

/// Definition format version written by current tooling.
pub const DEFINITION_VERSION: &str = "1.0";

/// Top-level definition file.
///
/// # Examples
///
/// ```
/// use command_grammar_def::GrammarDefinition;
///
/// let yaml = r#"
/// version: "1.0"
/// root:
///   name: tool
///   subcommands:
///     - name: build
///       help: Compile the project
/// "#;
///
/// let definition = GrammarDefinition::from_yaml_str(yaml).unwrap();
/// let grammar = definition.build().unwrap();
/// assert!(grammar.find_subcommand("build").is_some());
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct GrammarDefinition {
    /// Definition format version (e.g., `"1.0"`).
    pub version: String,
    /// The root command.
    pub root: CommandDefinition,
}

/// A command and everything below it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandDefinition {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Empty help hides the command from suggestions.
    #[serde(default)]
    pub help: String,
    #[serde(default)]
    pub options: Vec<OptionDefinition>,
    #[serde(default)]
    pub subcommands: Vec<CommandDefinition>,
    #[serde(default)]
    pub argument: Option<ArgumentDefinition>,
}

/// An option of a command.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptionDefinition {
    pub aliases: Vec<String>,
    #[serde(default)]
    pub help: String,
    #[serde(default)]
    pub argument: Option<ArgumentDefinition>,
}

/// An argument rule.
///
/// `arity` defaults the same way the rule builder does: exactly one value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArgumentDefinition {
    #[serde(default)]
    pub arity: Option<Arity>,
    /// Allowed-value set; values outside it are reported as errors.
    #[serde(default)]
    pub from_among: Option<Vec<String>>,
    /// Static suggestions that do not constrain values.
    #[serde(default)]
    pub suggestions: Vec<String>,
    /// Built-in dynamic suggestion source.
    #[serde(default)]
    pub source: Option<SourceKind>,
}

impl GrammarDefinition {
    /// Loads a definition, choosing the decoder by file extension
    /// (`.json`, `.yaml`, `.yml`).
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedFormat`](DefinitionError::UnsupportedFormat) for
    /// other extensions, [`IoError`](DefinitionError::IoError) if the file
    /// cannot be read, or a decoding error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let definition: Self = match extension.as_str() {
            "json" => {
                let reader = BufReader::new(std::fs::File::open(path)?);
                serde_json::from_reader(reader)?
            }
            "yaml" | "yml" => {
                let reader = BufReader::new(std::fs::File::open(path)?);
                serde_yaml::from_reader(reader)?
            }
            _ => return Err(DefinitionError::UnsupportedFormat(path.display().to_string())),
        };

        definition.check_version()?;
        Ok(definition)
    }

    /// Decodes a YAML definition.
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let definition: Self = serde_yaml::from_str(raw)?;
        definition.check_version()?;
        Ok(definition)
    }

    /// Decodes a JSON definition.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let definition: Self = serde_json::from_str(raw)?;
        definition.check_version()?;
        Ok(definition)
    }

    /// Compiles the definition into a frozen grammar.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::Grammar`] naming the command path of the
    /// first structural violation.
    pub fn build(&self) -> Result<Command> {
        let mut path = Vec::new();
        build_command(&self.root, &mut path)
    }

    fn check_version(&self) -> Result<()> {
        let major = |v: &str| v.split('.').next().unwrap_or_default().to_string();
        if major(&self.version) != major(DEFINITION_VERSION) {
            return Err(DefinitionError::UnsupportedVersion(self.version.clone()));
        }
        Ok(())
    }
}

fn build_command(definition: &CommandDefinition, path: &mut Vec<String>) -> Result<Command> {
    path.push(definition.name.clone());

    let mut builder = Command::builder(&definition.name).help(&definition.help);
    for alias in &definition.aliases {
        builder = builder.alias(alias);
    }

    for option in &definition.options {
        let mut built = CommandOption::new(option.aliases.iter().cloned(), &option.help);
        if let Some(argument) = &option.argument {
            built = built.with_argument(
                build_argument(argument).map_err(|e| grammar_error(path, e))?,
            );
        }
        builder = builder.option(built);
    }

    if let Some(argument) = &definition.argument {
        builder = builder.argument(build_argument(argument).map_err(|e| grammar_error(path, e))?);
    }

    for sub in &definition.subcommands {
        builder = builder.subcommand(build_command(sub, path)?);
    }

    let command = builder.build().map_err(|e| grammar_error(path, e))?;
    path.pop();
    Ok(command)
}

fn grammar_error(path: &[String], source: GrammarError) -> DefinitionError {
    DefinitionError::Grammar {
        path: path.join(" "),
        source,
    }
}

fn build_argument(
    definition: &ArgumentDefinition,
) -> std::result::Result<ArgumentRule, GrammarError> {
    let mut builder = ArgumentRule::builder();
    if let Some(values) = &definition.from_among {
        builder = builder.from_among(values.iter().cloned());
    }
    if !definition.suggestions.is_empty() {
        builder = builder.add_suggestions(definition.suggestions.iter().cloned());
    }
    if let Some(arity) = definition.arity {
        builder = builder.arity(arity);
    }
    if let Some(source) = definition.source {
        builder = builder.add_suggestion_source(move |result, position| {
            source.candidates(result, position)
        });
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use command_grammar_core::ParseErrorKind;

    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
version: "1.0"
root:
  name: tool
  help: A tool
  options:
    - aliases: [--format, -f]
      help: Output format
      argument:
        from_among: [json, yaml]
    - aliases: [--verbose, -v]
      help: Verbose
  subcommands:
    - name: run
      aliases: [r]
      help: Run a script
      argument:
        arity: zero_or_more
        suggestions: [build.sh, test.sh]
    - name: internal
"#
    }

    #[test]
    fn test_yaml_definition_builds_grammar() {
        let grammar = GrammarDefinition::from_yaml_str(sample_yaml())
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(grammar.name(), "tool");
        assert_eq!(grammar.options().len(), 2);
        let run = grammar.find_subcommand("r").unwrap();
        assert_eq!(run.argument().unwrap().arity(), Arity::ZeroOrMore);
        assert!(grammar.find_subcommand("internal").unwrap().is_hidden());
    }

    #[test]
    fn test_constrained_option_from_definition() {
        let grammar = GrammarDefinition::from_yaml_str(sample_yaml())
            .unwrap()
            .build()
            .unwrap();

        let result = grammar.parse("tool -f toml");
        let kinds: Vec<_> = result.errors().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ParseErrorKind::ValueNotInAllowedSet]);

        let suggestions = grammar.parse("tool run ").suggestions(None);
        assert!(suggestions.contains("build.sh"));
        assert!(suggestions.contains("test.sh"));
    }

    #[test]
    fn test_json_definition() {
        let json = r#"{
            "version": "1.0",
            "root": {
                "name": "cli",
                "options": [{ "aliases": ["--dry-run"], "help": "Dry run" }]
            }
        }"#;
        let grammar = GrammarDefinition::from_json_str(json)
            .unwrap()
            .build()
            .unwrap();
        assert!(grammar.find_option("--dry-run").is_some());
    }

    #[test]
    fn test_grammar_error_carries_command_path() {
        let yaml = r#"
version: "1.0"
root:
  name: git
  subcommands:
    - name: remote
      options:
        - aliases: [-v]
        - aliases: [-v]
"#;
        let err = GrammarDefinition::from_yaml_str(yaml)
            .unwrap()
            .build()
            .unwrap_err();

        match err {
            DefinitionError::Grammar { path, source } => {
                assert_eq!(path, "git remote");
                assert!(matches!(source, GrammarError::DuplicateAlias { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_from_among_is_rejected() {
        let yaml = r#"
version: "1.0"
root:
  name: tool
  argument:
    from_among: []
"#;
        let err = GrammarDefinition::from_yaml_str(yaml)
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            DefinitionError::Grammar {
                source: GrammarError::EmptyAllowedValues,
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_unknown_major_version() {
        let err = GrammarDefinition::from_yaml_str("version: \"2.0\"\nroot: { name: x }\n")
            .unwrap_err();
        assert!(matches!(err, DefinitionError::UnsupportedVersion(v) if v == "2.0"));
    }
}
