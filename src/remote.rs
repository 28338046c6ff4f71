//! Helpers for remote URLs and `git remote show` output.
//!
//! Everything here is a plain string function; patterns are compiled where
//! they are used.

use error_set::error_set;
use regex::Regex;

error_set! {
    /// Errors from decoding remote URLs
    RemoteError := {
        /// URL is neither https, ssh:// nor scp-like
        #[display("Invalid remote url '{url}'")]
        InvalidUrl { url: String },
    }
}

/// Repository name (`owner/project`) deduced from a fetch URL.
///
/// ```
/// use repo_decode::remote::repo_name;
///
/// assert_eq!(repo_name("git@github.com:ovh/cds.git").unwrap(), "ovh/cds");
/// assert_eq!(repo_name("https://github.com/ovh/cds").unwrap(), "ovh/cds");
/// ```
///
/// # Errors
///
/// Returns [`RemoteError::InvalidUrl`] when the URL has no path part.
pub fn repo_name(fetch_url: &str) -> Result<String, RemoteError> {
    let invalid = || RemoteError::InvalidUrl {
        url: fetch_url.to_string(),
    };

    let url = fetch_url.trim();
    let url = url.strip_suffix(".git").unwrap_or(url);

    if let Some(mut rest) = url.strip_prefix("https://") {
        // host[/prefix...]/owner/project: keep the last two segments
        while rest.matches('/').count() > 1 {
            match rest.split_once('/') {
                Some((_, tail)) => rest = tail,
                None => return Err(invalid()),
            }
        }
        return Ok(rest.to_string());
    }

    let name = if let Some(rest) = url.strip_prefix("ssh://") {
        // ssh://[user@]server[:port]/project
        rest.split_once('/').map(|(_, path)| path)
    } else {
        // [user@]server:project
        url.split_once(':').map(|(_, path)| path)
    };

    name.filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(invalid)
}

/// Remove `user[:password]@` from every https URL found in `text`
pub fn redact_credentials(text: &str) -> String {
    let Ok(userinfo) = Regex::new(r"https://[^\s/@'\x22]+@") else {
        return text.to_string();
    };
    userinfo.replace_all(text, "https://").into_owned()
}

/// Value of the `Fetch URL:` line of `git remote show <remote>` output
pub fn fetch_url(remote_show: &str) -> Option<String> {
    field_value(remote_show, "Fetch URL:")
}

/// Value of the `HEAD branch:` line of `git remote show <remote>` output
pub fn default_branch(remote_show: &str) -> Option<String> {
    field_value(remote_show, "HEAD branch:")
}

fn field_value(output: &str, label: &str) -> Option<String> {
    output
        .lines()
        .find_map(|line| line.split_once(label).map(|(_, value)| value.trim()))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Replace CRLF and lone CR line endings with LF
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}
