//! Parameter codec: segment percent-coding and per-field hooks

use std::borrow::Cow;

use crate::params::{Hooks, ParamValue, Params};

/// Percent-decodes a single path segment
///
/// Invalid sequences never fail: if the decoded bytes are not UTF-8 the
/// segment is returned unchanged.
///
/// # Examples
///
/// ```
/// use navlink_router::codec::decode_segment;
///
/// assert_eq!(decode_segment("baz%20qux"), "baz qux");
/// assert_eq!(decode_segment("bar_%2F_foo"), "bar_/_foo");
/// assert_eq!(decode_segment("%E0%A4%A"), "%E0%A4%A");
/// ```
pub fn decode_segment(segment: &str) -> Cow<'_, str> {
    if !segment.contains('%') {
        return Cow::Borrowed(segment);
    }

    urlencoding::decode(segment).unwrap_or(Cow::Borrowed(segment))
}

/// RFC 3986 `pchar` characters outside the unreserved set
fn is_preserved_pchar(c: char) -> bool {
    matches!(
        c,
        '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | ';' | '=' | ':' | '@'
    )
}

/// Percent-encodes a rendered path segment
///
/// Unreserved characters, sub-delimiters, `:` and `@` are kept as they are.
/// With `preserve_brackets`, `[` and `]` are kept too; that form is only used
/// for developer-facing patterns such as `[user]`, never for resolvable URLs.
///
/// # Examples
///
/// ```
/// use navlink_router::codec::encode_segment;
///
/// assert_eq!(encode_segment("User09-A_Z~!$&'()*+,;=:@", false), "User09-A_Z~!$&'()*+,;=:@");
/// assert_eq!(encode_segment("a/b#c", false), "a%2Fb%23c");
/// assert_eq!(encode_segment("[id]", false), "%5Bid%5D");
/// assert_eq!(encode_segment("[id]", true), "[id]");
/// ```
pub fn encode_segment(segment: &str, preserve_brackets: bool) -> String {
    let mut encoded = String::with_capacity(segment.len());
    let mut buf = [0u8; 4];

    for c in segment.chars() {
        if c.is_ascii_alphanumeric()
            || matches!(c, '-' | '.' | '_' | '~')
            || is_preserved_pchar(c)
            || (preserve_brackets && matches!(c, '[' | ']'))
        {
            encoded.push(c);
        } else {
            encoded.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }

    encoded
}

/// Applies the `parse` hook for `key`, if any
pub fn parse_value(key: &str, value: ParamValue, hooks: &Hooks) -> ParamValue {
    match hooks.get(key) {
        Some(hook) => value.map(|v| hook(v)),
        None => value,
    }
}

/// Applies the `stringify` hook for `key`, if any
///
/// Without a hook, scalars keep their string form and lists pass through.
pub fn stringify_value(key: &str, value: &ParamValue, hooks: &Hooks) -> ParamValue {
    match hooks.get(key) {
        Some(hook) => value.map(|v| hook(v)),
        None => value.clone(),
    }
}

/// Stringifies every parameter of a route with its node's hooks
pub fn stringify_params(params: &Params, hooks: &Hooks) -> Params {
    params
        .iter()
        .map(|(key, value)| (key.to_string(), stringify_value(key, value, hooks)))
        .collect()
}
