//! Grammar model: commands, options and argument rules.
//!
//! A grammar is an owned tree. A [`Command`] owns its child commands, its
//! [`CommandOption`]s and at most one [`ArgumentRule`]; an option owns at
//! most one rule of its own. Every node is produced by a builder whose
//! `build()` validates the node and freezes it, so a built grammar can be
//! shared read-only across threads and parsed any number of times.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::parser::Parser;
use crate::result::ParseResult;
use crate::validate::{GrammarError, validate_command};

/// Dynamic suggestion callback attached to an [`ArgumentRule`].
///
/// Receives the parse result the suggestions are requested on and the
/// cursor position (if any). It is invoked lazily, once per suggestion
/// request, on the calling thread.
pub type SuggestionSource =
    Box<dyn Fn(&ParseResult<'_>, Option<usize>) -> Vec<String> + Send + Sync>;

/// Number of argument tokens an [`ArgumentRule`] accepts.
///
/// # Examples
///
/// ```
/// use command_grammar_core::Arity;
///
/// assert_eq!(Arity::ZeroOrOne.min(), 0);
/// assert_eq!(Arity::ZeroOrOne.max(), Some(1));
/// assert_eq!(Arity::OneOrMore.max(), None);
/// assert!(Arity::ZeroOrMore.accepts_more(1_000));
/// assert!(!Arity::ExactlyOne.accepts_more(1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arity {
    /// No values (`[0, 0]`).
    None,
    /// A single required value (`[1, 1]`, the default).
    #[default]
    ExactlyOne,
    /// At most one value (`[0, 1]`).
    ZeroOrOne,
    /// Any number of values (`[0, ∞)`).
    ZeroOrMore,
    /// At least one value (`[1, ∞)`).
    OneOrMore,
}

impl Arity {
    /// Minimum number of values.
    pub const fn min(self) -> usize {
        match self {
            Self::None | Self::ZeroOrOne | Self::ZeroOrMore => 0,
            Self::ExactlyOne | Self::OneOrMore => 1,
        }
    }

    /// Maximum number of values, `None` when unbounded.
    pub const fn max(self) -> Option<usize> {
        match self {
            Self::None => Some(0),
            Self::ExactlyOne | Self::ZeroOrOne => Some(1),
            Self::ZeroOrMore | Self::OneOrMore => None,
        }
    }

    /// Returns `true` if a rule that already consumed `consumed` values can
    /// take another one.
    pub fn accepts_more(self, consumed: usize) -> bool {
        self.max().is_none_or(|max| consumed < max)
    }
}

/// Argument acceptance and suggestion rule owned by a command or option.
///
/// A rule is *constrained* when it carries an allowed-value set (values
/// outside it are reported as errors). Independently it may carry a static
/// suggestion list and a dynamic [`SuggestionSource`]; both are consulted
/// and unioned when suggestions are requested.
///
/// # Examples
///
/// ```
/// use command_grammar_core::{ArgumentRule, Arity};
///
/// let format = ArgumentRule::builder()
///     .from_among(["json", "yaml"])
///     .build()
///     .unwrap();
/// assert_eq!(format.arity(), Arity::ExactlyOne);
/// assert!(format.allows("json"));
/// assert!(!format.allows("toml"));
/// assert_eq!(format.static_suggestions(), ["json", "yaml"]);
///
/// let branch = ArgumentRule::builder()
///     .zero_or_more()
///     .add_suggestions(["main", "develop"])
///     .build()
///     .unwrap();
/// assert!(!branch.is_constrained());
/// assert!(branch.allows("anything"));
/// ```
pub struct ArgumentRule {
    arity: Arity,
    allowed: Option<Vec<String>>,
    suggestions: Vec<String>,
    source: Option<SuggestionSource>,
}

impl ArgumentRule {
    /// Starts building a rule.
    pub fn builder() -> ArgumentRuleBuilder {
        ArgumentRuleBuilder::default()
    }

    /// Arity of this rule.
    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// The allowed-value set, if the rule is constrained.
    pub fn allowed_values(&self) -> Option<&[String]> {
        self.allowed.as_deref()
    }

    /// Returns `true` if values are validated against an allowed-value set.
    pub fn is_constrained(&self) -> bool {
        self.allowed.is_some()
    }

    /// Returns `true` if `value` passes validation for this rule.
    pub fn allows(&self, value: &str) -> bool {
        self.allowed
            .as_ref()
            .is_none_or(|allowed| allowed.iter().any(|v| v == value))
    }

    /// The static suggestion list.
    pub fn static_suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// Returns `true` if a dynamic suggestion source is installed.
    pub fn has_suggestion_source(&self) -> bool {
        self.source.is_some()
    }

    /// Returns `true` if the rule can take another value after `consumed`.
    pub fn accepts_more(&self, consumed: usize) -> bool {
        self.arity.accepts_more(consumed)
    }

    /// Static list followed by the dynamic source output, unfiltered.
    pub(crate) fn suggestions(
        &self,
        result: &ParseResult<'_>,
        position: Option<usize>,
    ) -> Vec<String> {
        let mut out = self.suggestions.clone();
        if let Some(source) = &self.source {
            out.extend(source(result, position));
        }
        out
    }
}

impl fmt::Debug for ArgumentRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentRule")
            .field("arity", &self.arity)
            .field("allowed", &self.allowed)
            .field("suggestions", &self.suggestions)
            .field("source", &self.source.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Builder for [`ArgumentRule`]. Consumed by [`build`](Self::build).
#[derive(Default)]
pub struct ArgumentRuleBuilder {
    arity: Option<Arity>,
    allowed: Option<Vec<String>>,
    suggestions: Vec<String>,
    source: Option<SuggestionSource>,
}

impl ArgumentRuleBuilder {
    /// Sets the arity explicitly.
    pub fn arity(mut self, arity: Arity) -> Self {
        self.arity = Some(arity);
        self
    }

    /// Accept no values.
    pub fn none(self) -> Self {
        self.arity(Arity::None)
    }

    /// Accept exactly one value.
    pub fn exactly_one(self) -> Self {
        self.arity(Arity::ExactlyOne)
    }

    /// Accept zero or one value.
    pub fn zero_or_one(self) -> Self {
        self.arity(Arity::ZeroOrOne)
    }

    /// Accept any number of values.
    pub fn zero_or_more(self) -> Self {
        self.arity(Arity::ZeroOrMore)
    }

    /// Accept at least one value.
    pub fn one_or_more(self) -> Self {
        self.arity(Arity::OneOrMore)
    }

    /// Constrains values to `values`.
    ///
    /// The arity becomes [`Arity::ExactlyOne`] unless set explicitly, and the
    /// values double as the suggestion list unless a static list or a
    /// dynamic source is supplied as well.
    pub fn from_among<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed
            .get_or_insert_with(Vec::new)
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// Extends the static suggestion list without constraining values.
    pub fn add_suggestions<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggestions.extend(values.into_iter().map(Into::into));
        self
    }

    /// Installs a dynamic suggestion source.
    pub fn add_suggestion_source<F>(mut self, source: F) -> Self
    where
        F: Fn(&ParseResult<'_>, Option<usize>) -> Vec<String> + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Freezes the rule.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::EmptyAllowedValues`] if `from_among` was
    /// called with no values.
    pub fn build(self) -> Result<ArgumentRule, GrammarError> {
        if self.allowed.as_ref().is_some_and(Vec::is_empty) {
            return Err(GrammarError::EmptyAllowedValues);
        }

        let arity = self.arity.unwrap_or_default();
        let suggestions = if self.suggestions.is_empty() && self.source.is_none() {
            self.allowed.clone().unwrap_or_default()
        } else {
            self.suggestions
        };

        Ok(ArgumentRule {
            arity,
            allowed: self.allowed,
            suggestions,
            source: self.source,
        })
    }
}

/// An option (flag) of a command, e.g. `-o, --output <FILE>`.
///
/// # Examples
///
/// ```
/// use command_grammar_core::{ArgumentRule, CommandOption};
///
/// let output = CommandOption::new(["--output", "-o"], "Output file")
///     .with_argument(ArgumentRule::builder().exactly_one().build().unwrap());
/// assert_eq!(output.name(), "--output");
/// assert!(output.matches("-o"));
/// assert!(output.argument().is_some());
///
/// let hidden = CommandOption::new(["--debug-internals"], "");
/// assert!(hidden.is_hidden());
/// ```
#[derive(Debug)]
pub struct CommandOption {
    aliases: Vec<String>,
    help: String,
    argument: Option<ArgumentRule>,
}

impl CommandOption {
    /// Creates an option with the given aliases and help text.
    ///
    /// Alias validity is checked when the owning command is built.
    pub fn new<I, S>(aliases: I, help: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            aliases: aliases.into_iter().map(Into::into).collect(),
            help: help.to_string(),
            argument: None,
        }
    }

    /// Attaches an argument rule.
    pub fn with_argument(mut self, rule: ArgumentRule) -> Self {
        self.argument = Some(rule);
        self
    }

    /// All aliases, in declaration order.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// The first declared alias.
    pub fn name(&self) -> &str {
        self.aliases.first().map_or("", String::as_str)
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    /// Options with empty help are never suggested.
    pub fn is_hidden(&self) -> bool {
        self.help.is_empty()
    }

    pub fn argument(&self) -> Option<&ArgumentRule> {
        self.argument.as_ref()
    }

    /// Checks if `token` is one of the aliases (exact match).
    pub fn matches(&self, token: &str) -> bool {
        self.aliases.iter().any(|a| a == token)
    }
}

/// A command node: a name, options, subcommands and an optional argument
/// rule.
///
/// # Examples
///
/// ```
/// use command_grammar_core::{ArgumentRule, Command, CommandOption};
///
/// let git = Command::builder("git")
///     .help("The stupid content tracker")
///     .option(CommandOption::new(["--verbose", "-v"], "Be verbose"))
///     .subcommand(
///         Command::builder("checkout")
///             .help("Switch branches")
///             .argument(
///                 ArgumentRule::builder()
///                     .add_suggestions(["main", "develop"])
///                     .build()
///                     .unwrap(),
///             )
///             .build()
///             .unwrap(),
///     )
///     .build()
///     .unwrap();
///
/// assert!(git.find_subcommand("checkout").is_some());
/// assert!(git.find_option("-v").is_some());
///
/// let result = git.parse("git checkout ");
/// assert!(result.suggestions(None).contains("main"));
/// ```
#[derive(Debug)]
pub struct Command {
    names: Vec<String>,
    help: String,
    options: Vec<CommandOption>,
    subcommands: Vec<Command>,
    argument: Option<ArgumentRule>,
}

impl Command {
    /// Starts building a command named `name`.
    pub fn builder(name: &str) -> CommandBuilder {
        CommandBuilder {
            names: vec![name.to_string()],
            help: String::new(),
            options: Vec::new(),
            subcommands: Vec::new(),
            argument: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.names[0]
    }

    /// Name followed by any aliases.
    pub fn aliases(&self) -> &[String] {
        &self.names
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    /// Commands with empty help are never suggested.
    pub fn is_hidden(&self) -> bool {
        self.help.is_empty()
    }

    pub fn options(&self) -> &[CommandOption] {
        &self.options
    }

    pub fn subcommands(&self) -> &[Command] {
        &self.subcommands
    }

    pub fn argument(&self) -> Option<&ArgumentRule> {
        self.argument.as_ref()
    }

    /// Checks if `token` is the name or one of the aliases.
    pub fn matches(&self, token: &str) -> bool {
        self.names.iter().any(|n| n == token)
    }

    /// Finds a direct subcommand by name or alias.
    pub fn find_subcommand(&self, token: &str) -> Option<&Command> {
        self.subcommands.iter().find(|c| c.matches(token))
    }

    /// Finds a direct option by alias.
    pub fn find_option(&self, token: &str) -> Option<&CommandOption> {
        self.options.iter().find(|o| o.matches(token))
    }

    /// Subcommands with non-empty help.
    pub fn visible_subcommands(&self) -> impl Iterator<Item = &Command> {
        self.subcommands.iter().filter(|c| !c.is_hidden())
    }

    /// Options with non-empty help.
    pub fn visible_options(&self) -> impl Iterator<Item = &CommandOption> {
        self.options.iter().filter(|o| !o.is_hidden())
    }

    /// Parses a raw input line against this command as the root.
    pub fn parse(&self, line: &str) -> ParseResult<'_> {
        Parser::new(self).parse(line)
    }

    /// Parses pre-split tokens against this command as the root.
    pub fn parse_args<I, S>(&self, args: I) -> ParseResult<'_>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Parser::new(self).parse_args(args)
    }
}

/// Builder for [`Command`]. Consumed by [`build`](Self::build).
#[derive(Debug)]
pub struct CommandBuilder {
    names: Vec<String>,
    help: String,
    options: Vec<CommandOption>,
    subcommands: Vec<Command>,
    argument: Option<ArgumentRule>,
}

impl CommandBuilder {
    /// Sets the help text. Empty help hides the command from suggestions.
    pub fn help(mut self, help: &str) -> Self {
        self.help = help.to_string();
        self
    }

    /// Adds an alias matched in addition to the name.
    pub fn alias(mut self, alias: &str) -> Self {
        self.names.push(alias.to_string());
        self
    }

    /// Adds an option.
    pub fn option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }

    /// Adds a nested subcommand.
    pub fn subcommand(mut self, command: Command) -> Self {
        self.subcommands.push(command);
        self
    }

    /// Sets the command's own argument rule.
    pub fn argument(mut self, rule: ArgumentRule) -> Self {
        self.argument = Some(rule);
        self
    }

    /// Validates and freezes the command.
    ///
    /// Subcommands were validated when they were built, so only this
    /// command's own scope is checked here.
    ///
    /// # Errors
    ///
    /// Returns the first [`GrammarError`] found in this command's scope.
    pub fn build(self) -> Result<Command, GrammarError> {
        let command = Command {
            names: self.names,
            help: self.help,
            options: self.options,
            subcommands: self.subcommands,
            argument: self.argument,
        };
        validate_command(&command)?;
        Ok(command)
    }
}

/// A node of the resolution path: either a command or an option.
///
/// Argument rules are never path entries of their own; they are reached
/// through the symbol that owns them.
#[derive(Debug, Clone, Copy)]
pub enum Symbol<'g> {
    Command(&'g Command),
    Option(&'g CommandOption),
}

impl<'g> Symbol<'g> {
    /// Primary name (command name or first option alias).
    pub fn name(&self) -> &'g str {
        match self {
            Self::Command(c) => c.name(),
            Self::Option(o) => o.name(),
        }
    }

    pub fn aliases(&self) -> &'g [String] {
        match self {
            Self::Command(c) => c.aliases(),
            Self::Option(o) => o.aliases(),
        }
    }

    pub fn help(&self) -> &'g str {
        match self {
            Self::Command(c) => c.help(),
            Self::Option(o) => o.help(),
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.help().is_empty()
    }

    pub fn argument(&self) -> Option<&'g ArgumentRule> {
        match self {
            Self::Command(c) => c.argument(),
            Self::Option(o) => o.argument(),
        }
    }

    pub fn as_command(&self) -> Option<&'g Command> {
        match self {
            Self::Command(c) => Some(c),
            Self::Option(_) => None,
        }
    }

    pub fn as_option(&self) -> Option<&'g CommandOption> {
        match self {
            Self::Option(o) => Some(o),
            Self::Command(_) => None,
        }
    }
}

impl fmt::Display for Symbol<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command(c) => write!(f, "command '{}'", c.name()),
            Self::Option(o) => write!(f, "option '{}'", o.name()),
        }
    }
}
