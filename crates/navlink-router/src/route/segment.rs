//! Pattern segments and the naming conventions around them
//!
//! Patterns are slash-separated lists of segments:
//!
//! - `about` static text
//! - `(group)` group segment, invisible in generated paths by default
//! - `:id` / `:id?` parameter, required or optional
//! - `*rest` / `*rest?` / `*` catch-all, greedy remainder of the path

use std::fmt;

/// One segment of a route pattern
///
/// # Examples
///
/// ```
/// use navlink_router::route::segment::{classify_segment, RouteSegment};
///
/// assert_eq!(classify_segment("about"), RouteSegment::Static("about".into()));
/// assert_eq!(classify_segment("(tabs)"), RouteSegment::Group("tabs".into()));
/// assert_eq!(
///     classify_segment(":id?"),
///     RouteSegment::Param { name: "id".into(), optional: true }
/// );
/// assert_eq!(
///     classify_segment("*"),
///     RouteSegment::CatchAll { name: String::new(), optional: false }
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteSegment {
    Static(String),
    Group(String),
    Param { name: String, optional: bool },
    /// An empty name is the unnamed `*` wildcard
    CatchAll { name: String, optional: bool },
}

impl RouteSegment {
    /// Parameter name carried by the segment, if any
    pub fn param_name(&self) -> Option<&str> {
        match self {
            RouteSegment::Param { name, .. } => Some(name),
            RouteSegment::CatchAll { name, .. } if !name.is_empty() => Some(name),
            _ => None,
        }
    }

    /// Parameters and catch-alls produce a capture group
    pub fn is_dynamic(&self) -> bool {
        matches!(self, RouteSegment::Param { .. } | RouteSegment::CatchAll { .. })
    }

    pub fn is_group(&self) -> bool {
        matches!(self, RouteSegment::Group(_))
    }

    /// Regex fragment matching this segment and its trailing slash
    pub(crate) fn to_regex(&self) -> String {
        match self {
            RouteSegment::Static(text) => format!("{}/", regex::escape(text)),
            RouteSegment::Group(name) => format!("(?:{}/)?", regex::escape(&format!("({name})"))),
            RouteSegment::Param { optional, .. } => {
                format!("([^/]+/){}", if *optional { "?" } else { "" })
            }
            RouteSegment::CatchAll { optional, .. } => {
                format!("(.*/){}", if *optional { "?" } else { "" })
            }
        }
    }
}

/// Writes the segment back in pattern syntax
impl fmt::Display for RouteSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteSegment::Static(text) => f.write_str(text),
            RouteSegment::Group(name) => write!(f, "({name})"),
            RouteSegment::Param { name, optional } => {
                write!(f, ":{}{}", name, if *optional { "?" } else { "" })
            }
            RouteSegment::CatchAll { name, optional } => {
                write!(f, "*{}{}", name, if *optional { "?" } else { "" })
            }
        }
    }
}

/// Classifies one pattern segment
pub fn classify_segment(segment: &str) -> RouteSegment {
    if is_group_segment(segment) {
        return RouteSegment::Group(segment[1..segment.len() - 1].to_string());
    }

    if let Some(rest) = segment.strip_prefix(':') {
        let (name, optional) = split_optional(rest);
        return RouteSegment::Param { name, optional };
    }

    if let Some(rest) = segment.strip_prefix('*') {
        let (name, optional) = split_optional(rest);
        return RouteSegment::CatchAll { name, optional };
    }

    RouteSegment::Static(segment.to_string())
}

fn split_optional(rest: &str) -> (String, bool) {
    match rest.strip_suffix('?') {
        Some(name) => (name.to_string(), true),
        None => (rest.to_string(), false),
    }
}

/// Splits a pattern into typed segments, ignoring empty segments
///
/// ```
/// use navlink_router::route::segment::split_pattern;
///
/// let segments = split_pattern("/user//:id/");
/// assert_eq!(segments.len(), 2);
/// ```
pub fn split_pattern(pattern: &str) -> Vec<RouteSegment> {
    pattern
        .split('/')
        .filter(|s| !s.is_empty())
        .map(classify_segment)
        .collect()
}

/// Joins pattern pieces, dropping empty segments and duplicate slashes
///
/// ```
/// use navlink_router::route::segment::join_paths;
///
/// assert_eq!(join_paths(&["/bar/:id/", "", "baz"]), "bar/:id/baz");
/// assert_eq!(join_paths(&["", ""]), "");
/// ```
pub fn join_paths(parts: &[&str]) -> String {
    parts
        .iter()
        .flat_map(|part| part.split('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// `(name)`
pub fn is_group_segment(segment: &str) -> bool {
    segment.len() > 2 && segment.starts_with('(') && segment.ends_with(')')
}

/// `*`, `*name` or `*name?`
pub fn is_catch_all_segment(segment: &str) -> bool {
    segment.starts_with('*')
}

/// `:name` or `:name?`
pub fn is_param_segment(segment: &str) -> bool {
    segment.starts_with(':')
}

/// The catch-all used for not-found screens
pub fn is_not_found_segment(segment: &str) -> bool {
    segment == "*not-found"
}

/// `index` or any name ending in `/index`
pub fn is_index_name(name: &str) -> bool {
    name == "index" || name.ends_with("/index")
}

/// File-style dynamic screen names such as `[user]` or `[...rest]`
pub fn is_dynamic_name(name: &str) -> bool {
    name.starts_with('[') && name.ends_with(']')
}

/// Screen names that never appear literally in a URL
pub fn is_conventional_name(name: &str) -> bool {
    is_index_name(name) || is_group_segment(name) || is_dynamic_name(name)
}
