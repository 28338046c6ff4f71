//! Decode the text output of `git` into structured values.
//!
//! The decoders never run `git` themselves: callers pass in the command
//! output, and per-file diffs are pulled through a callback.

use error_set::error_set;
use std::collections::BTreeMap;
use std::fmt;

pub mod commit;
pub mod describe;
pub mod diff;
pub mod options;
pub mod remote;
pub mod tree;

pub use commit::{Commit, CommitError, TagRef};
pub use describe::{DescribeError, Description, Version};
pub use diff::{DiffError, FileChange, Hunk, format_change};
pub use options::DecodeOptions;
pub use remote::RemoteError;
pub use tree::{TreeEntry, TreeError};

error_set! {
    /// Any error produced by the decoders
    DecodeError := {
        DiffError(DiffError),
        DescribeError(DescribeError),
        CommitError(CommitError),
        RemoteError(RemoteError),
        TreeError(TreeError),
    }
}

/// Decoders sharing one set of options
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    options: DecodeOptions,
}

impl Decoder {
    /// Create a decoder with the given options
    pub fn new(options: DecodeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decode a name-status listing, fetching each file's diff through
    /// `fetch_diff(commit, filename)`.
    ///
    /// # Examples
    /// ```
    /// # use repo_decode::Decoder;
    /// let decoder = Decoder::default();
    /// let changes = decoder
    ///     .changes("", "A\tnotes.txt", |_, _| {
    ///         Ok::<_, String>("@@ -0,0 +1,2 @@\n+first\n+second".to_string())
    ///     })
    ///     .unwrap();
    /// assert_eq!(changes["notes.txt"].hunks[0].added_lines, vec!["first", "second"]);
    /// ```
    pub fn changes<F, E>(
        &self,
        commit: &str,
        listing: &str,
        fetch_diff: F,
    ) -> Result<BTreeMap<String, FileChange>, DecodeError>
    where
        F: FnMut(&str, &str) -> Result<String, E>,
        E: fmt::Display,
    {
        Ok(diff::decode_changes(
            commit,
            listing,
            &self.options,
            fetch_diff,
        )?)
    }

    /// Decode a `git describe` string
    ///
    /// # Examples
    /// ```
    /// # use repo_decode::Decoder;
    /// let description = Decoder::default().describe("v1.2.3-4-gabc1234").unwrap();
    /// assert_eq!(description.tag, "v1.2.3");
    /// assert_eq!(description.distance, 4);
    /// assert_eq!(description.semver_string, "1.2.3+4.abc1234");
    /// ```
    pub fn describe(&self, raw: &str) -> Result<Description, DecodeError> {
        Ok(describe::describe(raw, &self.options)?)
    }

    /// Decode one commit from its `git show` output, including its files
    pub fn commit<F, E>(
        &self,
        long_hash: &str,
        show_output: &str,
        fetch_diff: F,
    ) -> Result<Commit, DecodeError>
    where
        F: FnMut(&str, &str) -> Result<String, E>,
        E: fmt::Display,
    {
        Ok(commit::decode_commit(
            long_hash,
            show_output,
            &self.options,
            fetch_diff,
        )?)
    }
}
