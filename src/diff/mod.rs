//! Decoding of name-status listings and per-file unified diffs.

pub mod hunk;
pub mod status;

pub use hunk::{DiffLine, Hunk, LineRange};
pub use status::StatusEntry;

use crate::options::DecodeOptions;
use crate::remote::redact_credentials;
use error_set::error_set;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

error_set! {
    /// Errors from decoding a change listing
    DiffError := {
        /// Listing line without the expected tab-separated fields
        #[display("Malformed status line '{line}' for commit '{commit}'")]
        MalformedStatusLine { line: String, commit: String },
        /// The diff provider failed for one file. `message` is the
        /// provider's error text with `user[:password]@` removed from any
        /// https URL in it, otherwise unchanged.
        #[display("Unable to compute diff on file {filename} for commit '{commit}': {message}")]
        DiffFetchFailure {
            filename: String,
            commit: String,
            message: String,
        },
    }
}

/// One file touched by a commit, a diff between refs, or the work tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    pub filename: String,
    /// Status code as listed (`M`, `A`, `D`, `R100`, ...)
    pub status: String,
    /// Original path of a rename or copy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub raw_diff: String,
    /// Empty when diff detail is disabled or the diff has no text hunks
    pub hunks: Vec<Hunk>,
}

/// Hunks of a file change containing a line that matches a pattern
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct HunkMatches<'a> {
    pub hunks: Vec<&'a Hunk>,
    /// Some added line matched
    pub added: bool,
    /// Some removed line matched
    pub removed: bool,
}

impl FileChange {
    /// Build a change from the raw diff of one file, scanning hunks unless
    /// `options.disable_diff_detail` is set.
    pub fn new(
        filename: impl Into<String>,
        status: impl Into<String>,
        raw_diff: String,
        options: &DecodeOptions,
    ) -> Self {
        let hunks = if options.disable_diff_detail {
            Vec::new()
        } else {
            Hunk::scan(&raw_diff)
        };

        FileChange {
            filename: filename.into(),
            status: status.into(),
            source: None,
            raw_diff,
            hunks,
        }
    }

    /// Find the hunks with an added or removed line matching `pattern`.
    ///
    /// Context lines are not searched.
    pub fn matches(&self, pattern: &Regex) -> HunkMatches<'_> {
        let mut found = HunkMatches::default();

        for hunk in &self.hunks {
            let removed = hunk.removed_lines.iter().any(|line| pattern.is_match(line));
            let added = hunk.added_lines.iter().any(|line| pattern.is_match(line));

            if removed || added {
                found.hunks.push(hunk);
            }
            found.removed |= removed;
            found.added |= added;
        }

        found
    }
}

/// Decode a name-status listing into one [`FileChange`] per listed file.
///
/// `fetch_diff` is called with `(commit, filename)` once per file, after the
/// whole listing has been validated. `commit` is passed through untouched; an
/// empty string conventionally means the work tree.
///
/// ```
/// use repo_decode::{DecodeOptions, diff::decode_changes};
///
/// let changes = decode_changes("abc1234", "M\tREADME.md", &DecodeOptions::default(), |_, _| {
///     Ok::<_, std::io::Error>("@@ -1 +1 @@\n-Hello\n+Hello, world".to_string())
/// })
/// .unwrap();
///
/// let readme = &changes["README.md"];
/// assert_eq!(readme.status, "M");
/// assert_eq!(readme.hunks[0].added_lines, vec!["Hello, world"]);
/// ```
///
/// # Errors
///
/// - [`DiffError::MalformedStatusLine`] if a listing line cannot be split
/// - [`DiffError::DiffFetchFailure`] if the provider fails for a file
///
/// No partial result is returned on error.
pub fn decode_changes<F, E>(
    commit: &str,
    listing: &str,
    options: &DecodeOptions,
    mut fetch_diff: F,
) -> Result<BTreeMap<String, FileChange>, DiffError>
where
    F: FnMut(&str, &str) -> Result<String, E>,
    E: fmt::Display,
{
    let mut changes = BTreeMap::new();

    for entry in status::parse_listing(listing, commit)? {
        let raw_diff =
            fetch_diff(commit, entry.filename).map_err(|e| DiffError::DiffFetchFailure {
                filename: entry.filename.to_string(),
                commit: commit.to_string(),
                message: redact_credentials(&e.to_string()),
            })?;

        let mut change = FileChange::new(entry.filename, entry.status, raw_diff, options);
        change.source = entry.source.map(str::to_string);
        changes.insert(change.filename.clone(), change);
    }

    Ok(changes)
}

/// Format a file change for display with explicit line numbers
///
/// Example output:
/// ```text
/// flake.nix (M):
///   +137:       debug = true;
///
///   -15:        enableAutosuggestions = true;
/// ```
pub fn format_change(change: &FileChange) -> String {
    let mut result = format!("{} ({}):\n", change.filename, change.status);

    for hunk in &change.hunks {
        for line in hunk.numbered_lines() {
            match line {
                DiffLine::Delete { old_line, content } => {
                    result.push_str(&format!("  -{}:\t{}\n", old_line, content));
                }
                DiffLine::Add { new_line, content } => {
                    result.push_str(&format!("  +{}:\t{}\n", new_line, content));
                }
            }
        }

        // Blank line between hunks
        result.push('\n');
    }

    if result.ends_with("\n\n") {
        result.pop();
    }

    result
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    /// One body line: ' ' context, '-' removed or '+' added, then content
    fn arb_body_line() -> impl Strategy<Value = (char, String)> {
        (
            prop::sample::select(vec![' ', '-', '+']),
            prop::collection::vec(prop::char::range(' ', '~'), 0..20)
                .prop_map(|chars| chars.into_iter().collect()),
        )
    }

    fn arb_hunks() -> impl Strategy<Value = Vec<Vec<(char, String)>>> {
        prop::collection::vec(prop::collection::vec(arb_body_line(), 0..8), 0..5)
    }

    fn render(hunks: &[Vec<(char, String)>]) -> String {
        let mut raw = String::from("--- a/f\n+++ b/f\n");
        for (i, body) in hunks.iter().enumerate() {
            raw.push_str(&format!("@@ -{i},{} +{i},{} @@\n", body.len(), body.len()));
            for (kind, content) in body {
                raw.push(*kind);
                raw.push_str(content);
                raw.push('\n');
            }
        }
        raw
    }

    proptest! {
        /// Every header opens exactly one hunk, in order
        #[test]
        fn one_hunk_per_header(hunks in arb_hunks()) {
            let scanned = Hunk::scan(&render(&hunks));

            prop_assert_eq!(scanned.len(), hunks.len());
            for (i, (hunk, body)) in scanned.iter().zip(&hunks).enumerate() {
                prop_assert_eq!(&hunk.header, &format!("-{i},{} +{i},{}", body.len(), body.len()));
            }
        }

        /// Removed and added lines never outnumber the body, and fill it
        /// exactly when there is no context line
        #[test]
        fn line_sets_bounded_by_body(hunks in arb_hunks()) {
            for (hunk, body) in Hunk::scan(&render(&hunks)).iter().zip(&hunks) {
                let changed = hunk.removed_lines.len() + hunk.added_lines.len();
                let body_lines = hunk.body().count();
                let has_context = body.iter().any(|(kind, _)| *kind == ' ');

                prop_assert!(changed <= body_lines);
                prop_assert_eq!(changed == body_lines, !has_context);

                let removed: Vec<&str> = body
                    .iter()
                    .filter(|(kind, _)| *kind == '-')
                    .map(|(_, content)| content.as_str())
                    .collect();
                prop_assert_eq!(&hunk.removed_lines, &removed);
            }
        }

        /// One entry per listed file, and decoding is deterministic
        #[test]
        fn one_change_per_listed_file(
            names in prop::collection::btree_set("[a-z]{1,8}(/[a-z]{1,8})?", 0..10),
            hunks in arb_hunks(),
        ) {
            let listing = names
                .iter()
                .map(|name| format!("M\t{name}\n\n"))
                .collect::<String>();
            let raw = render(&hunks);
            let decode = || {
                decode_changes("abc1234", &listing, &DecodeOptions::default(), |_, _| {
                    Ok::<_, String>(raw.clone())
                })
            };

            let first = decode();
            prop_assert!(first.is_ok());
            let first = first.unwrap_or_default();

            prop_assert_eq!(first.len(), names.len());
            prop_assert_eq!(
                first.keys().cloned().collect::<BTreeSet<_>>(),
                names.clone()
            );
            prop_assert_eq!(decode().unwrap_or_default(), first);
        }
    }
}
