//! Parse results.
//!
//! A [`ParseResult`] is produced fresh by every parse call and never
//! changes afterwards. It borrows the grammar it was parsed against.

use std::collections::BTreeSet;

use crate::error::{ParseError, ParseErrorKind};
use crate::parser::Outcome;
use crate::suggest;
use crate::token::{Cursor, Input, Token};
use crate::{Command, Symbol};

/// A matched symbol together with the values it consumed.
#[derive(Debug, Clone)]
pub struct SymbolResult<'g> {
    pub(crate) symbol: Symbol<'g>,
    pub(crate) token: Option<usize>,
    pub(crate) values: Vec<String>,
}

impl<'g> SymbolResult<'g> {
    pub(crate) fn new(symbol: Symbol<'g>, token: Option<usize>) -> Self {
        Self {
            symbol,
            token,
            values: Vec::new(),
        }
    }

    pub fn symbol(&self) -> Symbol<'g> {
        self.symbol
    }

    /// Index of the token that selected this symbol; `None` for a root
    /// command that was not named in the input.
    pub fn token_index(&self) -> Option<usize> {
        self.token
    }

    /// Argument values consumed by this symbol's rule, in input order.
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// Outcome of parsing one input against a grammar.
///
/// # Examples
///
/// ```
/// use command_grammar_core::*;
///
/// let root = Command::builder("outer")
///     .subcommand(Command::builder("one").help("First").build().unwrap())
///     .subcommand(Command::builder("two").help("Second").build().unwrap())
///     .subcommand(Command::builder("three").help("Third").build().unwrap())
///     .build()
///     .unwrap();
///
/// let result = root.parse("outer o");
/// assert_eq!(result.text_to_match(None), "o");
/// let suggestions: Vec<_> = result.suggestions(None).into_iter().collect();
/// assert_eq!(suggestions, ["one", "two"]);
/// ```
#[derive(Debug)]
pub struct ParseResult<'g> {
    root: &'g Command,
    input: Input,
    tokens: Vec<Token>,
    path: Vec<SymbolResult<'g>>,
    errors: Vec<ParseError>,
    command: usize,
    proximate: usize,
}

impl<'g> ParseResult<'g> {
    pub(crate) fn new(
        root: &'g Command,
        input: Input,
        tokens: Vec<Token>,
        outcome: Outcome<'g>,
    ) -> Self {
        Self {
            root,
            input,
            tokens,
            path: outcome.path,
            errors: outcome.errors,
            command: outcome.command,
            proximate: outcome.proximate,
        }
    }

    /// The grammar root this result was parsed against.
    pub fn root(&self) -> &'g Command {
        self.root
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    /// The raw line, if the input was not pre-split.
    pub fn line(&self) -> Option<&str> {
        match &self.input {
            Input::Line(line) => Some(line),
            Input::Args => None,
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Recorded diagnostics, in the order they were found.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Returns `true` if no diagnostics were recorded.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Matched symbols from the root onward, in input order.
    pub fn path(&self) -> &[SymbolResult<'g>] {
        &self.path
    }

    /// The innermost matched command.
    pub fn command(&self) -> &'g Command {
        self.path[self.command]
            .symbol
            .as_command()
            .unwrap_or(self.root)
    }

    /// An option still accepting values, otherwise the innermost command.
    pub fn proximate(&self) -> Symbol<'g> {
        self.path[self.proximate].symbol
    }

    /// Returns `true` if an option matching `alias` (any of its aliases)
    /// appears in the input.
    pub fn has_option(&self, alias: &str) -> bool {
        self.options_matching(alias).next().is_some()
    }

    /// All values given to the option matching `alias`, across repeated
    /// occurrences.
    pub fn values_for(&self, alias: &str) -> Vec<&str> {
        self.options_matching(alias)
            .flat_map(|entry| entry.values.iter().map(String::as_str))
            .collect()
    }

    /// Values consumed by the innermost command's own rule.
    pub fn command_values(&self) -> &[String] {
        &self.path[self.command].values
    }

    /// Tokens reported as unmatched or in excess of a rule's maximum.
    pub fn unmatched_tokens(&self) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| {
                matches!(
                    e.kind,
                    ParseErrorKind::UnmatchedToken | ParseErrorKind::ArgumentCountAboveMaximum
                )
            })
            .filter_map(|e| e.token.as_deref())
            .collect()
    }

    /// Partial token text at the cursor, used to filter suggestions.
    ///
    /// Without a position the cursor sits at the end of the input. A cursor
    /// inside (or touching) a token yields the whole token; a cursor in a
    /// whitespace gap yields `""`.
    pub fn text_to_match(&self, position: Option<usize>) -> &str {
        Cursor::locate(&self.input, &self.tokens, position).text(&self.tokens)
    }

    /// Completion candidates at the cursor (end of input when `None`).
    pub fn suggestions(&self, position: Option<usize>) -> BTreeSet<String> {
        suggest::resolve(self, position)
    }

    fn options_matching<'a, 'b>(
        &'a self,
        alias: &'b str,
    ) -> impl Iterator<Item = &'a SymbolResult<'g>> {
        self.path
            .iter()
            .filter(move |entry| entry.symbol.as_option().is_some_and(|o| o.matches(alias)))
    }
}

#[cfg(test)]
mod tests {
    use crate::{ArgumentRule, CommandOption};

    use super::*;

    fn grammar() -> Command {
        Command::builder("cp")
            .help("Copy files")
            .argument(ArgumentRule::builder().one_or_more().build().unwrap())
            .option(
                CommandOption::new(["--exclude", "-x"], "Exclude pattern")
                    .with_argument(ArgumentRule::builder().exactly_one().build().unwrap()),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_text_to_match_defaults_to_end() {
        let root = grammar();
        assert_eq!(root.parse("the-command t").text_to_match(None), "t");
        assert_eq!(root.parse("the-command t ").text_to_match(None), "");
        assert_eq!(root.parse("").text_to_match(None), "");
    }

    #[test]
    fn test_text_to_match_mid_token() {
        let root = grammar();
        let result = root.parse("the-command one --two");
        for position in 12..=15 {
            assert_eq!(result.text_to_match(Some(position)), "one");
        }
        assert_eq!(result.text_to_match(Some(11)), "the-command");
        assert_eq!(result.text_to_match(Some(16)), "--two");
    }

    #[test]
    fn test_text_to_match_in_gap() {
        let root = grammar();
        let result = root.parse("cp a    b");
        assert_eq!(result.text_to_match(Some(6)), "");
    }

    #[test]
    fn test_values_for_repeated_option() {
        let root = grammar();
        let result = root.parse("cp -x '*.o' src --exclude target dst");

        assert!(result.is_valid(), "{:?}", result.errors());
        assert_eq!(result.values_for("--exclude"), ["'*.o'", "target"]);
        assert_eq!(result.values_for("-x"), ["'*.o'", "target"]);
        assert_eq!(result.command_values(), ["src", "dst"]);
    }

    #[test]
    fn test_values_outlive_the_alias_argument() {
        let root = grammar();
        let result = root.parse("cp -x build src");

        let values = {
            let alias = String::from("--exclude");
            result.values_for(&alias)
        };
        assert_eq!(values, ["build"]);
    }

    #[test]
    fn test_unmatched_tokens() {
        let root = Command::builder("tool").build().unwrap();
        let result = root.parse("tool a b");
        assert_eq!(result.unmatched_tokens(), ["a", "b"]);
        assert!(!result.is_valid());
    }

    #[test]
    fn test_line_accessor() {
        let root = grammar();
        assert_eq!(root.parse("cp a").line(), Some("cp a"));
        assert_eq!(root.parse_args(["cp", "a"]).line(), None);
    }
}
