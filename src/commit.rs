//! Decoding of commit metadata and tag ref listings.
//!
//! A commit is read from the output of
//! `git show <hash> --pretty=%at||%an||%ae||%s||%b|| --name-status`: one
//! `||`-separated metadata record followed by the name-status listing of the
//! files it touches.

use crate::diff::{DiffError, FileChange, decode_changes};
use crate::options::DecodeOptions;
use chrono::{DateTime, Utc};
use error_set::error_set;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Pretty format the commit decoders expect from `git show`
pub const PRETTY_FORMAT: &str = "%at||%an||%ae||%s||%b||";

const HEADER_FIELDS: usize = 6;

error_set! {
    /// Errors from decoding commits and tag refs
    CommitError := {
        /// Fewer `||`-separated fields than the pretty format produces
        #[display("Malformed header for commit '{commit}': expected 6 fields, found {fields}")]
        MalformedCommitHeader { commit: String, fields: usize },
        /// Author timestamp is not a unix timestamp
        #[display("Invalid timestamp '{value}' for commit '{commit}'")]
        InvalidTimestamp { commit: String, value: String },
        /// `show-ref` line without a space between hash and ref
        #[display("Malformed ref line '{line}'")]
        MalformedRefLine { line: String },
        DiffError(DiffError),
    }
}

/// A decoded commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commit {
    pub long_hash: String,
    /// First 7 characters of `long_hash`
    pub hash: String,
    pub author: String,
    pub author_email: String,
    pub subject: String,
    pub body: String,
    pub date: DateTime<Utc>,
    /// Empty when decoded without files
    pub files: BTreeMap<String, FileChange>,
}

/// One `<hash> <ref>` line of `git show-ref --tags`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagRef {
    pub hash: String,
    /// Full ref, e.g. `refs/tags/v1.0.0`
    pub reference: String,
}

impl TagRef {
    /// Tag name without `refs/tags/` and the `^{}` peel marker
    pub fn name(&self) -> &str {
        let name = self
            .reference
            .strip_prefix("refs/tags/")
            .unwrap_or(&self.reference);
        name.strip_suffix("^{}").unwrap_or(name)
    }
}

/// Decode commit metadata, ignoring the file listing.
///
/// # Errors
///
/// - [`CommitError::MalformedCommitHeader`] if the record has too few fields
/// - [`CommitError::InvalidTimestamp`] if the author date is not a timestamp
pub fn decode_commit_header(long_hash: &str, show_output: &str) -> Result<Commit, CommitError> {
    split_header(long_hash, show_output).map(|(commit, _)| commit)
}

/// Decode commit metadata and every listed file, calling `fetch_diff` once
/// per file with `(long_hash, filename)`.
///
/// # Errors
///
/// Errors of [`decode_commit_header`], plus [`CommitError::DiffError`] when
/// the listing is malformed or the provider fails.
pub fn decode_commit<F, E>(
    long_hash: &str,
    show_output: &str,
    options: &DecodeOptions,
    fetch_diff: F,
) -> Result<Commit, CommitError>
where
    F: FnMut(&str, &str) -> Result<String, E>,
    E: fmt::Display,
{
    let (mut commit, listing) = split_header(long_hash, show_output)?;
    commit.files = decode_changes(&commit.long_hash, listing, options, fetch_diff)?;
    Ok(commit)
}

fn split_header<'a>(long_hash: &str, show_output: &'a str) -> Result<(Commit, &'a str), CommitError> {
    let long_hash = long_hash.trim();

    let fields: Vec<&str> = show_output.splitn(HEADER_FIELDS, "||").collect();
    let [timestamp, author, author_email, subject, body, listing] = fields[..] else {
        return Err(CommitError::MalformedCommitHeader {
            commit: long_hash.to_string(),
            fields: fields.len(),
        });
    };

    let timestamp = timestamp.trim();
    let date = timestamp
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| CommitError::InvalidTimestamp {
            commit: long_hash.to_string(),
            value: timestamp.to_string(),
        })?;

    let commit = Commit {
        long_hash: long_hash.to_string(),
        hash: long_hash.get(..7).unwrap_or(long_hash).to_string(),
        author: author.to_string(),
        author_email: author_email.to_string(),
        subject: subject.to_string(),
        body: body.trim_end().to_string(),
        date,
        files: BTreeMap::new(),
    };

    Ok((commit, listing.trim()))
}

/// Decode `git show-ref --tags` output.
///
/// # Errors
///
/// Returns [`CommitError::MalformedRefLine`] for a non-blank line without a
/// `<hash> <ref>` pair.
pub fn decode_tag_refs(show_ref: &str) -> Result<Vec<TagRef>, CommitError> {
    show_ref
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match line.split_once(' ') {
            Some((hash, reference)) if !hash.is_empty() && !reference.trim().is_empty() => {
                Ok(TagRef {
                    hash: hash.to_string(),
                    reference: reference.trim().to_string(),
                })
            }
            _ => Err(CommitError::MalformedRefLine {
                line: line.to_string(),
            }),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    const LONG_HASH: &str = "3f2a9c1d7e8b6a5f4c3d2e1f0a9b8c7d6e5f4a3b";

    const SHOW_OUTPUT: &str = "1700000000||Jane Doe||jane@example.com||Add greeting||Longer explanation\nof the change.\n||

M\tsrc/main.rs
A\tdocs/greeting.md
";

    const MAIN_DIFF: &str = "diff --git a/src/main.rs b/src/main.rs
--- a/src/main.rs
+++ b/src/main.rs
@@ -1,3 +1,3 @@ fn main() {
 fn main() {
-    println!(\"hi\");
+    println!(\"hello\");
 }
";

    #[test]
    fn header_fields() {
        let commit = decode_commit_header(&format!("{LONG_HASH}\n"), SHOW_OUTPUT).unwrap();

        assert_eq!(commit.long_hash, LONG_HASH);
        assert_eq!(commit.hash, "3f2a9c1");
        assert_eq!(commit.author, "Jane Doe");
        assert_eq!(commit.author_email, "jane@example.com");
        assert_eq!(commit.subject, "Add greeting");
        assert_eq!(commit.body, "Longer explanation\nof the change.");
        assert_eq!(commit.date.timestamp(), 1_700_000_000);
        assert!(commit.files.is_empty());
    }

    #[test]
    fn commit_with_files() {
        let commit = decode_commit(LONG_HASH, SHOW_OUTPUT, &DecodeOptions::default(), |hash, file| {
            assert_eq!(hash, LONG_HASH);
            match file {
                "src/main.rs" => Ok(MAIN_DIFF.to_string()),
                "docs/greeting.md" => Ok("@@ -0,0 +1 @@\n+# Hello".to_string()),
                other => Err(format!("unexpected file {other}")),
            }
        })
        .unwrap();

        assert_eq!(commit.files.len(), 2);

        let main = &commit.files["src/main.rs"];
        assert_eq!(main.status, "M");
        assert_eq!(main.hunks[0].context, "fn main() {");
        assert_eq!(main.hunks[0].removed_lines, vec!["    println!(\"hi\");"]);
        assert_eq!(main.hunks[0].added_lines, vec!["    println!(\"hello\");"]);

        let docs = &commit.files["docs/greeting.md"];
        assert_eq!(docs.status, "A");
        assert_eq!(docs.hunks[0].added_lines, vec!["# Hello"]);
    }

    #[test]
    fn empty_body_and_no_files() {
        let commit = decode_commit(
            "abc",
            "1700000000||A||a@b||Subject||||\n",
            &DecodeOptions::default(),
            |_, _| Err::<String, _>("never called"),
        )
        .unwrap();

        assert_eq!(commit.hash, "abc");
        assert_eq!(commit.body, "");
        assert!(commit.files.is_empty());
    }

    #[test]
    fn too_few_fields() {
        let result = decode_commit_header(LONG_HASH, "1700000000||Jane||jane@example.com");
        assert!(matches!(
            result,
            Err(CommitError::MalformedCommitHeader { fields: 3, .. })
        ));
    }

    #[test]
    fn invalid_timestamp() {
        let result = decode_commit_header(LONG_HASH, "yesterday||A||a@b||S||B||");
        assert!(matches!(
            result,
            Err(CommitError::InvalidTimestamp { ref value, .. }) if value == "yesterday"
        ));
    }

    #[test]
    fn malformed_listing_is_a_diff_error() {
        let result = decode_commit(
            LONG_HASH,
            "1700000000||A||a@b||S||B||\n\nM\n",
            &DecodeOptions::default(),
            |_, _| Ok::<_, String>(String::new()),
        );
        assert!(matches!(
            result,
            Err(CommitError::DiffError(DiffError::MalformedStatusLine { .. }))
        ));
    }

    #[test]
    fn tag_refs() {
        let output = "\
3f2a9c1d7e8b6a5f4c3d2e1f0a9b8c7d6e5f4a3b refs/tags/v1.0.0
8a7b6c5d4e3f2a1b0c9d8e7f6a5b4c3d2e1f0a9b refs/tags/v1.1.0^{}
";
        let tags = decode_tag_refs(output).unwrap();

        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].hash, "3f2a9c1d7e8b6a5f4c3d2e1f0a9b8c7d6e5f4a3b");
        assert_eq!(tags[0].reference, "refs/tags/v1.0.0");
        assert_eq!(tags[0].name(), "v1.0.0");
        assert_eq!(tags[1].name(), "v1.1.0");
    }

    #[test]
    fn malformed_tag_ref() {
        assert!(matches!(
            decode_tag_refs("deadbeef\n"),
            Err(CommitError::MalformedRefLine { .. })
        ));
        assert!(decode_tag_refs("").unwrap().is_empty());
    }
}
