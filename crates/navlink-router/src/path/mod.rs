//! Path utilities: URL splitting, normalization and base-URL handling
//!
//! Inputs are untrusted. Nothing in this module fails: malformed URLs
//! degrade to an empty path.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use url::Url;

static SCHEME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z\d+\-.]*:").unwrap());

// Relative inputs are resolved against this origin; it never leaves the module.
static PHONY_ORIGIN: Lazy<Url> = Lazy::new(|| Url::parse("https://phony.example").unwrap());

/// A URL split into the parts the resolver uses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlParts {
    /// Canonical pathname: leading `/`, no duplicate or trailing slashes
    pub pathname: String,
    /// Raw query without the `?`
    pub query: Option<String>,
    /// Raw fragment without the `#`
    pub hash: Option<String>,
}

/// Splits `pathname[?query][#hash]`, optionally with a scheme and authority
///
/// Backslashes count as slashes and duplicate slashes collapse. Only the
/// pathname, query and hash of absolute URLs are kept.
///
/// # Examples
///
/// ```
/// use navlink_router::path::split_url;
///
/// let parts = split_url("//user//42/?sort=new#top");
/// assert_eq!(parts.pathname, "/user/42");
/// assert_eq!(parts.query.as_deref(), Some("sort=new"));
/// assert_eq!(parts.hash.as_deref(), Some("top"));
///
/// let parts = split_url("https://example.com/a/b?x=1");
/// assert_eq!(parts.pathname, "/a/b");
/// ```
pub fn split_url(input: &str) -> UrlParts {
    let parsed = if SCHEME_REGEX.is_match(input) {
        Url::parse(input)
    } else {
        PHONY_ORIGIN.join(&collapse_pathname(input))
    };

    match parsed {
        Ok(url) => UrlParts {
            pathname: normalize_path(url.path()).into_owned(),
            query: url.query().filter(|q| !q.is_empty()).map(str::to_string),
            hash: url.fragment().filter(|h| !h.is_empty()).map(str::to_string),
        },
        Err(err) => {
            debug!(input, error = %err, "malformed URL, resolving as empty path");
            UrlParts {
                pathname: "/".to_string(),
                ..UrlParts::default()
            }
        }
    }
}

/// Collapses slashes in the pathname part only; `?` and `#` end it
fn collapse_pathname(input: &str) -> Cow<'_, str> {
    let end = input.find(|c: char| c == '?' || c == '#').unwrap_or(input.len());
    let (pathname, rest) = input.split_at(end);

    if is_valid_path(pathname) {
        return Cow::Borrowed(input);
    }

    Cow::Owned(format!("{}{}", normalize_path(pathname), rest))
}

/// Validates if a path is in canonical form
///
/// # Rules
///
/// - Must start with `/`
/// - Must not contain `//` or `\`
/// - Must not end with `/` (except root `/`)
///
/// # Examples
///
/// ```
/// use navlink_router::path::is_valid_path;
///
/// assert!(is_valid_path("/"));
/// assert!(is_valid_path("/user/42"));
///
/// assert!(!is_valid_path(""));
/// assert!(!is_valid_path("user"));
/// assert!(!is_valid_path("/user/"));
/// assert!(!is_valid_path("/user//42"));
/// assert!(!is_valid_path("/user\\42"));
/// ```
pub fn is_valid_path(path: &str) -> bool {
    if path.is_empty() || !path.starts_with('/') {
        return false;
    }

    if path.contains("//") || path.contains('\\') {
        return false;
    }

    path == "/" || !path.ends_with('/')
}

/// Normalizes a path to canonical form
///
/// Returns `Cow::Borrowed` when the input is already canonical.
///
/// ```
/// use navlink_router::path::normalize_path;
///
/// assert_eq!(normalize_path("user/42/"), "/user/42");
/// assert_eq!(normalize_path("\\user\\\\42"), "/user/42");
/// assert_eq!(normalize_path(""), "/");
/// ```
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if is_valid_path(path) {
        return Cow::Borrowed(path);
    }

    let normalized = path
        .replace('\\', "/")
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if normalized.is_empty() {
        Cow::Borrowed("/")
    } else {
        Cow::Owned(format!("/{}", normalized))
    }
}

/// Strips `prefix` from `path` on a segment boundary
///
/// Both arguments are canonical paths. Returns `None` if `path` does not
/// start with `prefix`.
///
/// ```
/// use navlink_router::path::strip_path_prefix;
///
/// assert_eq!(strip_path_prefix("/app/user/42", "/app"), Some("/user/42"));
/// assert_eq!(strip_path_prefix("/app", "/app"), Some("/"));
/// assert_eq!(strip_path_prefix("/apple", "/app"), None);
/// assert_eq!(strip_path_prefix("/user", "/"), Some("/user"));
/// ```
pub fn strip_path_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix == "/" {
        return Some(path);
    }

    let rest = path.strip_prefix(prefix)?;
    if rest.is_empty() {
        Some("/")
    } else if rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}

/// Prepends a base URL to a canonical path
///
/// ```
/// use navlink_router::path::join_base_url;
///
/// assert_eq!(join_base_url("/app-prefix/", "/bar"), "/app-prefix/bar");
/// assert_eq!(join_base_url("/app-prefix", "/"), "/app-prefix");
/// assert_eq!(join_base_url("", "/bar"), "/bar");
/// ```
pub fn join_base_url(base_url: &str, path: &str) -> String {
    normalize_path(&format!("{}/{}", base_url, path)).into_owned()
}

/// Converts a canonical path into the form route regexes match against
///
/// `/a/b` becomes `a/b/` and the root becomes the empty string.
pub fn to_remaining(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}/", trimmed)
    }
}
