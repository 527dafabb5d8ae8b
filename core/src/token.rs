//! Tokenization and cursor location.
//!
//! A raw line is split into maximal runs of non-whitespace characters.
//! Offsets are character offsets (not bytes) so they line up with cursor
//! positions reported by line editors. Pre-split input carries no usable
//! offsets; every cursor query on it resolves to the last token.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+").expect("static regex must compile"));

/// A token of the input with its character span `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Where the tokens of a parse came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A raw line; the payload is the line itself.
    Line(String),
    /// Caller-supplied pre-split tokens.
    Args,
}

/// Splits a raw line into tokens.
///
/// # Examples
///
/// ```
/// use command_grammar_core::tokenize;
///
/// let tokens = tokenize("  git   commit -m ");
/// let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
/// assert_eq!(texts, ["git", "commit", "-m"]);
/// assert_eq!((tokens[1].start, tokens[1].end), (8, 14));
/// ```
pub fn tokenize(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars_seen = 0;
    let mut bytes_seen = 0;

    for m in WORD.find_iter(line) {
        chars_seen += line[bytes_seen..m.start()].chars().count();
        let start = chars_seen;
        chars_seen += m.as_str().chars().count();
        bytes_seen = m.end();
        tokens.push(Token {
            text: m.as_str().to_string(),
            start,
            end: chars_seen,
        });
    }

    tokens
}

/// Wraps pre-split arguments as tokens with 0-length offsets.
pub fn tokens_from_args<I, S>(args: I) -> Vec<Token>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    args.into_iter()
        .map(|arg| Token {
            text: arg.into(),
            start: 0,
            end: 0,
        })
        .collect()
}

/// Cursor resolved against a token sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cursor {
    /// Index of the token the cursor touches, if any.
    pub(crate) touching: Option<usize>,
    /// Number of tokens lying strictly before the cursor.
    pub(crate) preceding: usize,
}

impl Cursor {
    pub(crate) fn locate(input: &Input, tokens: &[Token], position: Option<usize>) -> Self {
        match input {
            Input::Args => Self {
                touching: tokens.len().checked_sub(1),
                preceding: tokens.len().saturating_sub(1),
            },
            Input::Line(line) => {
                let len = line.chars().count();
                let pos = position.map_or(len, |p| p.min(len));
                let touching = tokens.iter().position(|t| t.start <= pos && pos <= t.end);
                let preceding = match touching {
                    Some(index) => index,
                    None => tokens.iter().take_while(|t| t.end < pos).count(),
                };
                Self {
                    touching,
                    preceding,
                }
            }
        }
    }

    pub(crate) fn text<'t>(&self, tokens: &'t [Token]) -> &'t str {
        self.touching.map_or("", |i| tokens[i].text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(s: &str) -> (Input, Vec<Token>) {
        (Input::Line(s.to_string()), tokenize(s))
    }

    #[test]
    fn test_tokenize_collapses_whitespace() {
        let tokens = tokenize("\tone  two\n three ");
        let spans: Vec<_> = tokens.iter().map(|t| (t.start, t.end)).collect();
        assert_eq!(spans, vec![(1, 4), (6, 9), (11, 16)]);
    }

    #[test]
    fn test_tokenize_counts_characters_not_bytes() {
        let tokens = tokenize("café naïve");
        assert_eq!((tokens[0].start, tokens[0].end), (0, 4));
        assert_eq!((tokens[1].start, tokens[1].end), (5, 10));
    }

    #[test]
    fn test_tokenize_blank_line() {
        assert!(tokenize("   ").is_empty());
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_cursor_at_end_touches_last_token() {
        let (input, tokens) = line("the-command t");
        let cursor = Cursor::locate(&input, &tokens, None);
        assert_eq!(cursor.text(&tokens), "t");
        assert_eq!(cursor.preceding, 1);
    }

    #[test]
    fn test_cursor_after_trailing_space_is_empty() {
        let (input, tokens) = line("the-command t ");
        let cursor = Cursor::locate(&input, &tokens, None);
        assert_eq!(cursor.text(&tokens), "");
        assert_eq!(cursor.preceding, 2);
    }

    #[test]
    fn test_cursor_inside_gap() {
        let (input, tokens) = line("a   b");
        let cursor = Cursor::locate(&input, &tokens, Some(2));
        assert_eq!(cursor.touching, None);
        assert_eq!(cursor.preceding, 1);
    }

    #[test]
    fn test_cursor_position_is_clamped() {
        let (input, tokens) = line("abc");
        let cursor = Cursor::locate(&input, &tokens, Some(99));
        assert_eq!(cursor.text(&tokens), "abc");
    }

    #[test]
    fn test_args_cursor_uses_last_token() {
        let tokens = tokens_from_args(["tool", "--fo"]);
        let cursor = Cursor::locate(&Input::Args, &tokens, Some(0));
        assert_eq!(cursor.text(&tokens), "--fo");
        assert_eq!(cursor.preceding, 1);

        let cursor = Cursor::locate(&Input::Args, &[], None);
        assert_eq!(cursor.touching, None);
        assert_eq!(cursor.preceding, 0);
    }
}
