//! Tokenization of name-status listings.
//!
//! Each non-blank line is `<status>\t<path>`, or `<status>\t<source>\t<dest>`
//! for renames and copies. Fields are trimmed; the destination path is the
//! one a change is keyed by.

use super::DiffError;

/// One line of a name-status listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry<'a> {
    pub status: &'a str,
    /// Path the change is keyed by (the destination for renames)
    pub filename: &'a str,
    /// Original path of a rename or copy
    pub source: Option<&'a str>,
}

impl<'a> StatusEntry<'a> {
    /// Split one listing line into its fields.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::MalformedStatusLine`] when the line does not hold
    /// two or three tab-separated, non-empty fields.
    pub fn parse(line: &'a str, commit: &str) -> Result<Self, DiffError> {
        let malformed = || DiffError::MalformedStatusLine {
            line: line.to_string(),
            commit: commit.to_string(),
        };

        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
        if fields.iter().any(|field| field.is_empty()) {
            return Err(malformed());
        }

        match fields[..] {
            [status, filename] => Ok(StatusEntry {
                status,
                filename,
                source: None,
            }),
            [status, source, filename] => Ok(StatusEntry {
                status,
                filename,
                source: Some(source),
            }),
            _ => Err(malformed()),
        }
    }
}

/// Parse every non-blank line of a listing, failing on the first bad one.
///
/// # Errors
///
/// Returns [`DiffError::MalformedStatusLine`] for the first line that cannot
/// be split; no entries are returned in that case.
pub fn parse_listing<'a>(listing: &'a str, commit: &str) -> Result<Vec<StatusEntry<'a>>, DiffError> {
    listing
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| StatusEntry::parse(line, commit))
        .collect()
}
