//! Token-to-grammar resolution.
//!
//! The parser is a two-state machine walked once over the token stream:
//!
//! - `AwaitingSymbol`: the next token may select a subcommand or option of
//!   the current command, or become a value of the command's own rule.
//! - `ConsumingArgumentsFor { owner }`: an option is collecting values; it
//!   keeps doing so until its rule is saturated or a token names a sibling
//!   symbol of the enclosing command.
//!
//! Every problem is recorded as a [`ParseError`] and parsing continues, so a
//! [`ParseResult`] always covers the whole input and suggestions stay
//! available over invalid or partial lines.

use tracing::{debug, trace};

use crate::error::{ParseError, ParseErrorKind};
use crate::result::{ParseResult, SymbolResult};
use crate::token::{Input, Token, tokenize, tokens_from_args};
use crate::{Command, Symbol};

/// Parses input lines against a root [`Command`].
///
/// The parser only borrows the grammar; any number of parsers (on any
/// number of threads) can share one grammar.
///
/// # Examples
///
/// ```
/// use command_grammar_core::*;
///
/// let root = Command::builder("tool")
///     .option(
///         CommandOption::new(["--level"], "Log level").with_argument(
///             ArgumentRule::builder()
///                 .from_among(["info", "debug"])
///                 .build()
///                 .unwrap(),
///         ),
///     )
///     .build()
///     .unwrap();
///
/// let parser = Parser::new(&root);
/// let result = parser.parse("tool --level trace");
/// assert_eq!(result.errors().len(), 1);
/// assert_eq!(result.errors()[0].kind, ParseErrorKind::ValueNotInAllowedSet);
/// assert_eq!(result.values_for("--level"), ["trace"]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Parser<'g> {
    root: &'g Command,
}

impl<'g> Parser<'g> {
    pub fn new(root: &'g Command) -> Self {
        Self { root }
    }

    /// Tokenizes and parses a raw line.
    pub fn parse(&self, line: &str) -> ParseResult<'g> {
        let tokens = tokenize(line);
        let outcome = self.run(&tokens);
        ParseResult::new(self.root, Input::Line(line.to_string()), tokens, outcome)
    }

    /// Parses pre-split tokens (e.g. an `argv`-style array).
    pub fn parse_args<I, S>(&self, args: I) -> ParseResult<'g>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens = tokens_from_args(args);
        let outcome = self.run(&tokens);
        ParseResult::new(self.root, Input::Args, tokens, outcome)
    }

    /// Runs the state machine over `tokens`.
    pub(crate) fn run(&self, tokens: &[Token]) -> Outcome<'g> {
        let mut machine = Machine::new(self.root);
        let mut rest = tokens.iter().enumerate().peekable();

        if let Some((index, token)) = rest.next_if(|(_, t)| self.root.matches(&t.text)) {
            trace!(token = %token.text, "matched root command");
            machine.path[0].token = Some(index);
        }

        for (index, token) in rest {
            machine.step(index, token);
        }

        machine.finish()
    }
}

/// Final state of a run, before it is wrapped into a [`ParseResult`].
#[derive(Debug)]
pub(crate) struct Outcome<'g> {
    pub(crate) path: Vec<SymbolResult<'g>>,
    pub(crate) errors: Vec<ParseError>,
    /// Path index of the innermost command.
    pub(crate) command: usize,
    /// Path index of the proximate symbol.
    pub(crate) proximate: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingSymbol,
    ConsumingArgumentsFor { owner: usize },
}

struct Machine<'g> {
    path: Vec<SymbolResult<'g>>,
    errors: Vec<ParseError>,
    command: usize,
    state: State,
    /// Owner that consumed the previous token as a value.
    last_value_owner: Option<usize>,
}

impl<'g> Machine<'g> {
    fn new(root: &'g Command) -> Self {
        Self {
            path: vec![SymbolResult::new(Symbol::Command(root), None)],
            errors: Vec::new(),
            command: 0,
            state: State::AwaitingSymbol,
            last_value_owner: None,
        }
    }

    fn current_command(&self) -> &'g Command {
        match self.path[self.command].symbol {
            Symbol::Command(command) => command,
            Symbol::Option(_) => unreachable!("command index always points at a command"),
        }
    }

    fn step(&mut self, index: usize, token: &Token) {
        let previous_owner = self.last_value_owner.take();
        let command = self.current_command();

        if let State::ConsumingArgumentsFor { owner } = self.state {
            let names_sibling = command.find_subcommand(&token.text).is_some()
                || command.find_option(&token.text).is_some();
            if names_sibling {
                self.leave_option(owner);
            } else {
                self.consume(owner, index, token);
                return;
            }
        }

        if let Some(sub) = command.find_subcommand(&token.text) {
            trace!(token = %token.text, "descending into subcommand {}", sub.name());
            self.path
                .push(SymbolResult::new(Symbol::Command(sub), Some(index)));
            self.command = self.path.len() - 1;
            return;
        }

        if let Some(option) = command.find_option(&token.text) {
            self.path
                .push(SymbolResult::new(Symbol::Option(option), Some(index)));
            if option.argument().is_some_and(|rule| rule.accepts_more(0)) {
                trace!(token = %token.text, "consuming arguments for option");
                self.state = State::ConsumingArgumentsFor {
                    owner: self.path.len() - 1,
                };
            }
            return;
        }

        if self.accepts_more(self.command) {
            self.consume(self.command, index, token);
            return;
        }

        self.reject(index, token, previous_owner);
    }

    fn accepts_more(&self, owner: usize) -> bool {
        let entry = &self.path[owner];
        entry
            .symbol
            .argument()
            .is_some_and(|rule| rule.accepts_more(entry.values.len()))
    }

    fn consume(&mut self, owner: usize, index: usize, token: &Token) {
        let symbol = self.path[owner].symbol;
        if let Some(rule) = symbol.argument() {
            if !rule.allows(&token.text) {
                let allowed = rule.allowed_values().unwrap_or_default().join(", ");
                self.record(ParseError::at(
                    ParseErrorKind::ValueNotInAllowedSet,
                    index,
                    &token.text,
                    format!(
                        "argument '{}' not recognized for {symbol}; must be one of: {allowed}",
                        token.text
                    ),
                ));
            }
        }

        trace!(token = %token.text, "consumed value for {symbol}");
        self.path[owner].values.push(token.text.clone());
        self.last_value_owner = Some(owner);

        if self.state == (State::ConsumingArgumentsFor { owner }) && !self.accepts_more(owner) {
            self.state = State::AwaitingSymbol;
        }
    }

    fn leave_option(&mut self, owner: usize) {
        self.check_minimum(owner);
        self.state = State::AwaitingSymbol;
    }

    fn reject(&mut self, index: usize, token: &Token, previous_owner: Option<usize>) {
        let saturated = previous_owner
            .filter(|&owner| !self.accepts_more(owner))
            .or_else(|| {
                let command = &self.path[self.command];
                command
                    .symbol
                    .argument()
                    .is_some_and(|rule| rule.arity().max() != Some(0))
                    .then_some(self.command)
            });

        let error = match saturated {
            Some(owner) => {
                let symbol = self.path[owner].symbol;
                let max = symbol
                    .argument()
                    .and_then(|rule| rule.arity().max())
                    .unwrap_or_default();
                ParseError::at(
                    ParseErrorKind::ArgumentCountAboveMaximum,
                    index,
                    &token.text,
                    format!(
                        "{symbol} accepts at most {max} argument(s); unexpected '{}'",
                        token.text
                    ),
                )
            }
            None => ParseError::at(
                ParseErrorKind::UnmatchedToken,
                index,
                &token.text,
                format!("unrecognized command or argument '{}'", token.text),
            ),
        };
        self.record(error);
    }

    fn check_minimum(&mut self, owner: usize) {
        let entry = &self.path[owner];
        let Some(rule) = entry.symbol.argument() else {
            return;
        };
        let min = rule.arity().min();
        let got = entry.values.len();
        if got < min {
            let symbol = entry.symbol;
            self.record(ParseError::at_end(
                ParseErrorKind::ArgumentCountBelowMinimum,
                format!("{symbol} requires at least {min} argument(s), got {got}"),
            ));
        }
    }

    fn record(&mut self, error: ParseError) {
        debug!(kind = ?error.kind, token = ?error.token, "{}", error.message);
        self.errors.push(error);
    }

    fn finish(mut self) -> Outcome<'g> {
        let proximate = match self.state {
            State::ConsumingArgumentsFor { owner } => {
                self.check_minimum(owner);
                owner
            }
            State::AwaitingSymbol => self.command,
        };
        self.check_minimum(self.command);

        Outcome {
            path: self.path,
            errors: self.errors,
            command: self.command,
            proximate,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{ArgumentRule, CommandOption};

    use super::*;

    fn kinds(result: &ParseResult<'_>) -> Vec<ParseErrorKind> {
        result.errors().iter().map(|e| e.kind).collect()
    }

    fn grammar() -> Command {
        let run = Command::builder("run")
            .help("Run a script")
            .argument(ArgumentRule::builder().exactly_one().build().unwrap())
            .option(CommandOption::new(["--release", "-r"], "Release mode"))
            .build()
            .unwrap();

        Command::builder("tool")
            .help("A tool")
            .option(
                CommandOption::new(["--format", "-f"], "Output format").with_argument(
                    ArgumentRule::builder()
                        .from_among(["json", "yaml"])
                        .build()
                        .unwrap(),
                ),
            )
            .option(
                CommandOption::new(["--tag"], "Tags").with_argument(
                    ArgumentRule::builder().zero_or_more().build().unwrap(),
                ),
            )
            .option(CommandOption::new(["--verbose", "-v"], "Verbose"))
            .subcommand(run)
            .build()
            .unwrap()
    }

    #[test]
    fn test_root_token_is_optional() {
        let root = grammar();
        let with_root = root.parse("tool -v");
        let without_root = root.parse("-v");

        assert!(with_root.is_valid());
        assert!(without_root.is_valid());
        assert_eq!(with_root.path()[0].token_index(), Some(0));
        assert_eq!(without_root.path()[0].token_index(), None);
    }

    #[test]
    fn test_descends_into_subcommand() {
        let root = grammar();
        let result = root.parse("tool run script.sh -r");

        assert!(result.is_valid(), "{:?}", result.errors());
        assert_eq!(result.command().name(), "run");
        assert_eq!(result.path()[1].values(), ["script.sh"]);
        assert!(result.has_option("--release"));
    }

    #[test]
    fn test_option_value_outside_allowed_set() {
        let root = grammar();
        let result = root.parse("tool --format toml");

        assert_eq!(kinds(&result), vec![ParseErrorKind::ValueNotInAllowedSet]);
        assert_eq!(result.errors()[0].token.as_deref(), Some("toml"));
        assert_eq!(result.errors()[0].token_index, Some(2));
    }

    #[test]
    fn test_unmatched_token_does_not_stop_parsing() {
        let root = grammar();
        let result = root.parse("tool bogus -v --format json");

        assert_eq!(kinds(&result), vec![ParseErrorKind::UnmatchedToken]);
        assert!(result.has_option("-v"));
        assert_eq!(result.values_for("--format"), ["json"]);
    }

    #[test]
    fn test_missing_option_value_at_end() {
        let root = grammar();
        let result = root.parse("tool --format");

        assert_eq!(
            kinds(&result),
            vec![ParseErrorKind::ArgumentCountBelowMinimum]
        );
        assert_eq!(result.errors()[0].token, None);
        assert_eq!(result.proximate().name(), "--format");
    }

    #[test]
    fn test_sibling_option_ends_value_collection() {
        let root = grammar();
        let result = root.parse("tool --format -v");

        assert_eq!(
            kinds(&result),
            vec![ParseErrorKind::ArgumentCountBelowMinimum]
        );
        assert!(result.has_option("--verbose"));
        assert!(result.values_for("--format").is_empty());
    }

    #[test]
    fn test_sibling_subcommand_ends_value_collection() {
        let root = grammar();
        let result = root.parse("tool --tag a run x");

        assert!(result.is_valid(), "{:?}", result.errors());
        assert_eq!(result.values_for("--tag"), ["a"]);
        assert_eq!(result.command().name(), "run");
        assert_eq!(result.command_values(), ["x"]);
    }

    #[test]
    fn test_zero_or_more_collects_until_sibling() {
        let root = grammar();
        let result = root.parse("tool --tag a b c -v");

        assert!(result.is_valid());
        assert_eq!(result.values_for("--tag"), ["a", "b", "c"]);
        assert_eq!(result.proximate().name(), "tool");
    }

    #[test]
    fn test_excess_value_is_above_maximum() {
        let root = grammar();
        let result = root.parse("tool --format json yaml");

        assert_eq!(
            kinds(&result),
            vec![ParseErrorKind::ArgumentCountAboveMaximum]
        );
        assert_eq!(result.errors()[0].token.as_deref(), Some("yaml"));
    }

    #[test]
    fn test_excess_command_value_is_above_maximum() {
        let root = grammar();
        let result = root.parse("tool run a -r b");

        assert_eq!(
            kinds(&result),
            vec![ParseErrorKind::ArgumentCountAboveMaximum]
        );
    }

    #[test]
    fn test_command_argument_below_minimum() {
        let root = grammar();
        let result = root.parse("tool run");

        assert_eq!(
            kinds(&result),
            vec![ParseErrorKind::ArgumentCountBelowMinimum]
        );
        assert_eq!(result.proximate().name(), "run");
    }

    #[test]
    fn test_flag_does_not_become_proximate() {
        let root = grammar();
        let result = root.parse("tool -v");
        assert_eq!(result.proximate().name(), "tool");
    }

    #[test]
    fn test_parse_args_matches_line_parse() {
        let root = grammar();
        let from_line = root.parse("tool run x");
        let from_args = root.parse_args(["tool", "run", "x"]);

        assert_eq!(from_line.errors(), from_args.errors());
        assert_eq!(from_args.command().name(), "run");
        assert!(from_args.tokens().iter().all(|t| t.start == 0 && t.end == 0));
    }
}
