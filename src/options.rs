use serde::{Deserialize, Serialize};

/// Options shared by the diff and describe decoders.
///
/// Field names deserialize from camelCase (`disableDiffDetail`, `dirtyMark`,
/// ...) and every field falls back to its default when missing.
///
/// ```
/// use repo_decode::DecodeOptions;
///
/// let opts: DecodeOptions = serde_json::from_str(r#"{"long": true}"#).unwrap();
/// assert!(opts.long);
/// assert_eq!(opts.dirty_mark, "-dirty");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DecodeOptions {
    /// Keep only status and raw diff for each file, skip the hunk scan
    pub disable_diff_detail: bool,
    /// Suffix marking a descriptor taken from a modified work tree
    pub dirty_mark: String,
    /// Keep the distance and hash in the display form even on an exact tag
    pub long: bool,
    /// Always attach build metadata to the semver string
    pub long_semver: bool,
    /// Attach the dirty mark to the build metadata of a dirty descriptor
    pub dirty_semver: bool,
    /// Prefix stripped from the abbreviated hash token (`g` for git)
    pub hash_prefix: String,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            disable_diff_detail: false,
            dirty_mark: "-dirty".to_string(),
            long: false,
            long_semver: false,
            dirty_semver: false,
            hash_prefix: "g".to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn empty_object_uses_defaults() {
        let opts: DecodeOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, DecodeOptions::default());
    }

    #[test]
    fn camel_case_keys() {
        let opts: DecodeOptions = serde_json::from_str(
            r#"{"disableDiffDetail": true, "dirtyMark": "+wip", "longSemver": true, "dirtySemver": true, "hashPrefix": ""}"#,
        )
        .unwrap();
        assert!(opts.disable_diff_detail);
        assert_eq!(opts.dirty_mark, "+wip");
        assert!(!opts.long);
        assert!(opts.long_semver);
        assert!(opts.dirty_semver);
        assert_eq!(opts.hash_prefix, "");
    }
}
