use nom::{
    IResult, Parser,
    bytes::complete::take_while1,
    character::complete::{char, digit1, one_of},
    combinator::{all_consuming, map_res, opt},
    multi::separated_list1,
    sequence::preceded,
};
use serde::Serialize;
use std::fmt;

/// A semantic version decoded from a tag name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// Pre-release identifiers (`rc.1` in `1.0.0-rc.1`)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pre: Vec<String>,
    /// Build metadata identifiers (`linux.x86` in `1.0.0+linux.x86`)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub build: Vec<String>,
}

impl Version {
    /// Parse `[v]MAJOR.MINOR.PATCH[-PRE][+BUILD]`, the whole input must match.
    ///
    /// ```
    /// use repo_decode::describe::Version;
    ///
    /// let version = Version::parse("v1.2.3-rc.1").unwrap();
    /// assert_eq!((version.major, version.minor, version.patch), (1, 2, 3));
    /// assert_eq!(version.pre, vec!["rc", "1"]);
    /// assert!(Version::parse("release-1").is_none());
    /// ```
    pub fn parse(text: &str) -> Option<Self> {
        all_consuming(version)
            .parse(text)
            .ok()
            .map(|(_, version)| version)
    }

    /// Append dot-separated build identifiers
    pub fn with_build(mut self, metadata: &str) -> Self {
        self.build.extend(
            metadata
                .split('.')
                .filter(|id| !id.is_empty())
                .map(str::to_string),
        );
        self
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.pre.is_empty() {
            write!(f, "-{}", self.pre.join("."))?;
        }
        if !self.build.is_empty() {
            write!(f, "+{}", self.build.join("."))?;
        }
        Ok(())
    }
}

fn number(input: &str) -> IResult<&str, u64> {
    map_res(digit1, |digits: &str| digits.parse::<u64>()).parse(input)
}

fn identifiers(input: &str) -> IResult<&str, Vec<String>> {
    separated_list1(
        char('.'),
        take_while1(|c: char| c.is_ascii_alphanumeric() || c == '-'),
    )
    .map(|ids: Vec<&str>| ids.into_iter().map(str::to_string).collect())
    .parse(input)
}

fn version(input: &str) -> IResult<&str, Version> {
    (
        opt(one_of("vV")),
        number,
        preceded(char('.'), number),
        preceded(char('.'), number),
        opt(preceded(char('-'), identifiers)),
        opt(preceded(char('+'), identifiers)),
    )
        .map(|(_, major, minor, patch, pre, build)| Version {
            major,
            minor,
            patch,
            pre: pre.unwrap_or_default(),
            build: build.unwrap_or_default(),
        })
        .parse(input)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn plain_version() {
        let version = Version::parse("1.2.3").unwrap();
        assert_eq!(
            version,
            Version {
                major: 1,
                minor: 2,
                patch: 3,
                pre: vec![],
                build: vec![],
            }
        );
        assert_eq!(version.to_string(), "1.2.3");
    }

    #[test]
    fn v_prefix_is_dropped() {
        assert_eq!(Version::parse("v10.0.1").unwrap().to_string(), "10.0.1");
        assert_eq!(Version::parse("V0.1.0").unwrap().to_string(), "0.1.0");
    }

    #[test]
    fn pre_release_and_build() {
        let version = Version::parse("v2.0.0-beta.2+exp.sha.5114f85").unwrap();
        assert_eq!(version.pre, vec!["beta", "2"]);
        assert_eq!(version.build, vec!["exp", "sha", "5114f85"]);
        assert_eq!(version.to_string(), "2.0.0-beta.2+exp.sha.5114f85");
    }

    #[test]
    fn hyphen_inside_pre_release() {
        let version = Version::parse("1.0.0-x-y-z.1").unwrap();
        assert_eq!(version.pre, vec!["x-y-z", "1"]);
    }

    #[test]
    fn rejects_non_versions() {
        assert_eq!(Version::parse(""), None);
        assert_eq!(Version::parse("release"), None);
        assert_eq!(Version::parse("v1.2"), None);
        assert_eq!(Version::parse("1.2.3.4"), None);
        assert_eq!(Version::parse("1.2.3-"), None);
        assert_eq!(Version::parse("1.2.3+"), None);
        assert_eq!(Version::parse("1.2.3-rc..1"), None);
    }

    #[test]
    fn build_is_appended() {
        let version = Version::parse("1.0.0+linux").unwrap().with_build("4.abc1234");
        assert_eq!(version.to_string(), "1.0.0+linux.4.abc1234");
    }
}
