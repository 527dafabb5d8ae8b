//! Cursor-aware suggestion resolution.
//!
//! Suggestions are computed against the *proximate symbol as of the
//! cursor*: the tokens strictly before the cursor are parsed again, so
//! anything typed after the cursor has no influence. The candidate pool is
//! then filtered by containment of the text under the cursor.

use std::collections::BTreeSet;

use tracing::debug;

use crate::parser::Parser;
use crate::result::ParseResult;
use crate::token::Cursor;
use crate::Symbol;

/// Resolves suggestions for `result` at `position`.
pub(crate) fn resolve(result: &ParseResult<'_>, position: Option<usize>) -> BTreeSet<String> {
    let cursor = Cursor::locate(result.input(), result.tokens(), position);
    let text_to_match = cursor.text(result.tokens());

    let outcome = Parser::new(result.root()).run(&result.tokens()[..cursor.preceding]);
    let proximate = &outcome.path[outcome.proximate];

    let mut candidates = Vec::new();
    match proximate.symbol {
        Symbol::Command(command) => {
            for sub in command.visible_subcommands() {
                candidates.extend(sub.aliases().iter().cloned());
            }
            for option in command.visible_options() {
                candidates.extend(option.aliases().iter().cloned());
            }
            if let Some(rule) = command.argument() {
                if rule.accepts_more(proximate.values.len()) {
                    candidates.extend(rule.suggestions(result, position));
                }
            }
        }
        Symbol::Option(option) => {
            if let Some(rule) = option.argument() {
                candidates.extend(rule.suggestions(result, position));
            }
        }
    }

    let suggestions = filter_candidates(candidates, text_to_match);
    debug!(
        proximate = proximate.symbol.name(),
        text_to_match,
        count = suggestions.len(),
        "resolved suggestions"
    );
    suggestions
}

/// Keeps the candidates containing `text_to_match` (case-sensitive) and
/// removes duplicates. An empty `text_to_match` keeps everything.
///
/// # Examples
///
/// ```
/// use command_grammar_core::filter_candidates;
///
/// let kept = filter_candidates(["vegetable", "mineral", "animal", "animal"], "m");
/// assert_eq!(kept.into_iter().collect::<Vec<_>>(), ["animal", "mineral"]);
/// ```
pub fn filter_candidates<I, S>(candidates: I, text_to_match: &str) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    candidates
        .into_iter()
        .map(Into::into)
        .filter(|candidate| candidate.contains(text_to_match))
        .collect()
}
