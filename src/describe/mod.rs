//! Decoding of `git describe` output into a [`Description`].
//!
//! A descriptor has one of the shapes
//!
//! - `<tag>-<distance>-g<hash>[<dirty-mark>]` (long form, tag may contain `-`)
//! - `<tag>[<dirty-mark>]` (exact tag, short form)
//! - `<hash>[<dirty-mark>]` (no reachable tag, `--always`)
//!
//! The tag is further decoded as a semantic version when it is one, and a
//! semver string carrying `distance.hash[.dirty]` build metadata is derived
//! from it.

mod semver;

pub use semver::Version;

use crate::options::DecodeOptions;
use error_set::error_set;
use serde::Serialize;

error_set! {
    /// Errors from decoding a describe string
    DescribeError := {
        /// The token before the hash is not a commit count
        #[display("Invalid distance '{token}' in descriptor '{raw}'")]
        InvalidDistanceToken { token: String, raw: String },
    }
}

/// Decoded version descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Description {
    /// Display form: the bare tag for an exact clean short match, otherwise
    /// `tag` followed by `suffix`
    pub raw: String,
    pub dirty: bool,
    /// Nearest tag, empty when the descriptor is a bare commit reference
    pub tag: String,
    /// Commits since `tag`
    pub distance: u32,
    /// Abbreviated commit hash without its prefix, empty for an exact short tag
    pub hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semver: Option<Version>,
    /// Canonical version with build metadata, empty when `semver` is absent
    pub semver_string: String,
    /// Distance, hash and dirty mark as they follow the tag in `raw`
    pub suffix: String,
}

/// Decode a describe string.
///
/// ```
/// use repo_decode::{DecodeOptions, describe::describe};
///
/// let description = describe("v1.2.3-4-gabc1234", &DecodeOptions::default()).unwrap();
/// assert_eq!(description.tag, "v1.2.3");
/// assert_eq!(description.distance, 4);
/// assert_eq!(description.hash, "abc1234");
/// assert_eq!(description.semver_string, "1.2.3+4.abc1234");
/// ```
///
/// # Errors
///
/// Returns [`DescribeError::InvalidDistanceToken`] when a tag-distance-hash
/// descriptor has a distance that is not a non-negative integer. Descriptors
/// without a tag, or whose tag is not a semantic version, are not errors.
pub fn describe(raw: &str, options: &DecodeOptions) -> Result<Description, DescribeError> {
    let input = raw.trim();
    let dirty_mark = options.dirty_mark.as_str();

    let (working, dirty) = match input.strip_suffix(dirty_mark) {
        Some(rest) if !dirty_mark.is_empty() => (rest, true),
        _ => (input, false),
    };

    let (tag, distance, hash) = split_descriptor(working, &options.hash_prefix, raw)?;

    let semver = if tag.is_empty() {
        None
    } else {
        Version::parse(tag)
    };

    let semver_string = match (&semver, build_metadata(distance, hash, dirty, options)) {
        (Some(version), Some(metadata)) => version.clone().with_build(&metadata).to_string(),
        (Some(version), None) => version.to_string(),
        (None, _) => String::new(),
    };

    let mark = if dirty { dirty_mark } else { "" };
    let suffix = if tag.is_empty() {
        // The commit token as written, prefix included
        let token = working.rsplit('-').next().unwrap_or_default();
        format!("{token}{mark}")
    } else if (!options.long && distance == 0) || hash.is_empty() {
        mark.to_string()
    } else {
        format!("-{distance}-{}{hash}{mark}", options.hash_prefix)
    };

    Ok(Description {
        raw: format!("{tag}{suffix}"),
        dirty,
        tag: tag.to_string(),
        distance,
        hash: hash.to_string(),
        semver,
        semver_string,
        suffix,
    })
}

/// Split a descriptor (dirty mark already removed) into tag, distance and hash.
///
/// After a distance the hash token must carry `hash_prefix`. When it does
/// not, the text is intentionally not read as tag-distance-hash and is kept
/// whole as an exact tag: with the default `g` prefix, `v1.2.3-4-abc1234` is
/// a tag with distance 0 and no hash, and `v1-x-abc1234` is not an invalid
/// distance. Set `hash_prefix` to `""` to read unprefixed hashes.
fn split_descriptor<'a>(
    working: &'a str,
    hash_prefix: &str,
    raw: &str,
) -> Result<(&'a str, u32, &'a str), DescribeError> {
    // rsplitn keeps any '-' inside the tag
    let mut tokens = working.rsplitn(3, '-');
    let last = tokens.next().unwrap_or_default();
    let distance_token = tokens.next();
    let tag = tokens.next();

    if distance_token.is_none() {
        return Ok(match abbrev_hash(last, hash_prefix, false) {
            Some(hash) => ("", 0, hash),
            None => (last, 0, ""),
        });
    }

    let Some(hash) = abbrev_hash(last, hash_prefix, true) else {
        // No commit reference at the end: the whole text is the tag
        return Ok((working, 0, ""));
    };

    match (tag, distance_token) {
        (Some(tag), Some(token)) => {
            let distance = token
                .parse::<u32>()
                .map_err(|_| DescribeError::InvalidDistanceToken {
                    token: token.to_string(),
                    raw: raw.to_string(),
                })?;
            Ok((tag, distance, hash))
        }
        // Too few segments for tag-distance-hash, keep the hash only
        _ => Ok(("", 0, hash)),
    }
}

/// Abbreviated hex hash in `token`, with `prefix` stripped.
///
/// The prefix is mandatory when `require_prefix` is set, as it is for the
/// hash following a distance.
fn abbrev_hash<'a>(token: &'a str, prefix: &str, require_prefix: bool) -> Option<&'a str> {
    let hash = match token.strip_prefix(prefix) {
        Some(hash) => hash,
        None if require_prefix => return None,
        None => token,
    };

    (hash.len() >= 4 && hash.chars().all(|c| c.is_ascii_hexdigit())).then_some(hash)
}

/// `distance.hash[.dirty]` when any of distance, `long_semver` or a counted
/// dirty state asks for it
fn build_metadata(
    distance: u32,
    hash: &str,
    dirty: bool,
    options: &DecodeOptions,
) -> Option<String> {
    let dirty_counts = dirty && options.dirty_semver;
    if distance == 0 && !options.long_semver && !dirty_counts {
        return None;
    }

    let mut ids = vec![distance.to_string()];
    if !hash.is_empty() {
        ids.push(hash.to_string());
    }
    if dirty_counts {
        let mark: String = options
            .dirty_mark
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect();
        if !mark.is_empty() {
            ids.push(mark);
        }
    }

    Some(ids.join("."))
}
