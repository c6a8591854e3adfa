//! Remote URL classification.
//!
//! Decides how a remote URL can be probed: over HTTP, on the local
//! filesystem, or not at all (ssh, git protocol).

use std::path::PathBuf;

use url::Url;

/// Where a remote URL points, as far as probing is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteLocation {
    /// `http://` or `https://` (including `git+https://`).
    Http(Url),
    /// A local path or `file://` URL.
    Local(PathBuf),
    /// Any other transport, by scheme (`ssh`, `git`, ...).
    Other(String),
}

/// Classify a remote URL as printed by `git remote -v`.
pub fn classify(raw_url: &str) -> RemoteLocation {
    if is_filesystem_path(raw_url) {
        return RemoteLocation::Local(PathBuf::from(raw_url));
    }

    match parse_url(raw_url) {
        Ok(u) if matches!(u.scheme(), "http" | "https") => RemoteLocation::Http(u),
        Ok(u) if u.scheme() == "file" => u.to_file_path().map_or_else(
            |()| RemoteLocation::Other("file".to_string()),
            RemoteLocation::Local,
        ),
        Ok(u) => RemoteLocation::Other(u.scheme().to_string()),
        Err(_) => RemoteLocation::Other(String::new()),
    }
}

/// Parse a git remote URL and normalize it.
///
/// Handles scp-like SSH syntax (`git@host:owner/repo`) and `git+` scheme
/// aliases.
///
/// # Errors
///
/// Returns an error if the URL cannot be parsed.
pub fn parse_url(raw_url: &str) -> Result<Url, url::ParseError> {
    // The `url` crate refuses `set_scheme` between special and non-special
    // schemes, so aliases are rewritten as strings.
    let pre_normalized = if raw_url.starts_with("git+https:") {
        raw_url.replacen("git+https:", "https:", 1)
    } else if raw_url.starts_with("git+ssh:") {
        raw_url.replacen("git+ssh:", "ssh:", 1)
    } else {
        raw_url.to_string()
    };

    let normalized = if !is_possible_protocol(&pre_normalized)
        && pre_normalized.contains(':')
        && !pre_normalized.contains('\\')
    {
        // scp-like syntax
        format!("ssh://{}", pre_normalized.replacen(':', "/", 1))
    } else {
        pre_normalized
    };

    Url::parse(&normalized)
}

fn is_filesystem_path(p: &str) -> bool {
    p == "." || p == ".." || p.starts_with('/') || p.starts_with("./") || p.starts_with("../")
}

fn is_possible_protocol(u: &str) -> bool {
    ["ssh:", "git:", "http:", "https:", "ftp:", "ftps:", "file:"]
        .iter()
        .any(|p| u.starts_with(p))
}
