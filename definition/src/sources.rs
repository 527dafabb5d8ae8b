//! Built-in dynamic suggestion sources.
//!
//! Definitions cannot carry code, so they select one of these sources by
//! name. Each source is evaluated lazily when suggestions are requested and
//! sees the same `(result, position)` pair as any other suggestion source.

use std::path::Path;

use command_grammar_core::ParseResult;
use serde::Deserialize;
use tracing::debug;

/// A named dynamic source usable from a definition file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Entries of the directory named by the text under the cursor (the
    /// working directory when it names none). Directories get a trailing `/`.
    Paths,
    /// Names of the process environment variables.
    Env,
}

impl SourceKind {
    /// Produces candidates for the cursor position in `result`.
    pub fn candidates(self, result: &ParseResult<'_>, position: Option<usize>) -> Vec<String> {
        match self {
            Self::Paths => path_candidates(result.text_to_match(position)),
            Self::Env => std::env::vars_os()
                .filter_map(|(key, _)| key.into_string().ok())
                .collect(),
        }
    }
}

fn path_candidates(text_to_match: &str) -> Vec<String> {
    let prefix = text_to_match
        .rfind('/')
        .map_or("", |i| &text_to_match[..=i]);
    let dir = if prefix.is_empty() {
        Path::new(".")
    } else {
        Path::new(prefix)
    };

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(dir = %dir.display(), "path suggestions unavailable: {err}");
            return Vec::new();
        }
    };

    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| {
            let mut candidate = format!("{prefix}{}", entry.file_name().to_string_lossy());
            if entry.path().is_dir() {
                candidate.push('/');
            }
            candidate
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_candidates_list_named_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let prefix = format!("{}/", dir.path().display());
        let mut candidates = path_candidates(&format!("{prefix}no"));
        candidates.sort();

        assert_eq!(
            candidates,
            vec![format!("{prefix}nested/"), format!("{prefix}notes.txt")]
        );
    }

    #[test]
    fn test_path_candidates_missing_directory_is_empty() {
        assert!(path_candidates("/definitely/not/here/x").is_empty());
    }

    #[test]
    fn test_source_kind_from_yaml() {
        let kind: SourceKind = serde_yaml::from_str("env").unwrap();
        assert_eq!(kind, SourceKind::Env);
    }
}
