//! Decoding of `git ls-tree` listings.

use error_set::error_set;
use regex::Regex;
use serde::Serialize;

error_set! {
    /// Errors from decoding a tree listing
    TreeError := {
        /// Line without `mode type hash size<TAB>path`
        #[display("Malformed tree line '{line}'")]
        MalformedTreeLine { line: String },
    }
}

/// One entry of `git ls-tree --long` output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    pub mode: String,
    /// Object type: `blob`, `tree` or `commit`
    pub kind: String,
    pub hash: String,
    /// `None` for trees and submodules, listed as `-`
    pub size: Option<u64>,
    pub path: String,
}

/// Decode `git ls-tree --long [-r]` output.
///
/// The size column is space-padded by git; runs of whitespace between the
/// metadata fields are collapsed. The path after the tab is kept verbatim.
///
/// ```
/// use repo_decode::tree::decode_tree_listing;
///
/// let entries = decode_tree_listing(
///     "100644 blob 3b18e512dba79e4c8300dd08aeb37f8e728b8dad      12\thello.txt",
/// )
/// .unwrap();
/// assert_eq!(entries[0].size, Some(12));
/// assert_eq!(entries[0].path, "hello.txt");
/// ```
///
/// # Errors
///
/// Returns [`TreeError::MalformedTreeLine`] for a non-blank line that does
/// not hold the five fields, or whose size is neither a number nor `-`.
pub fn decode_tree_listing(listing: &str) -> Result<Vec<TreeEntry>, TreeError> {
    let Ok(whitespace) = Regex::new(r"\s+") else {
        return Ok(Vec::new());
    };

    listing
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let malformed = || TreeError::MalformedTreeLine {
                line: line.to_string(),
            };

            let (meta, path) = line.split_once('\t').ok_or_else(malformed)?;
            let meta = whitespace.replace_all(meta.trim(), " ");
            let fields: Vec<&str> = meta.split(' ').collect();

            let [mode, kind, hash, size] = fields[..] else {
                return Err(malformed());
            };
            let size = match size {
                "-" => None,
                size => Some(size.parse::<u64>().map_err(|_| malformed())?),
            };
            if path.is_empty() {
                return Err(malformed());
            }

            Ok(TreeEntry {
                mode: mode.to_string(),
                kind: kind.to_string(),
                hash: hash.to_string(),
                size,
                path: path.to_string(),
            })
        })
        .collect()
}

/// Paths of `git ls-tree --name-only` output, in listing order
pub fn decode_name_only(listing: &str) -> Vec<String> {
    listing
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}
