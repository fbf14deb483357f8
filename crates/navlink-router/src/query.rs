//! Query-string codec
//!
//! `parse` decodes `application/x-www-form-urlencoded` pairs in order,
//! collecting repeated keys into lists. `stringify` writes keys in insertion
//! order (no sorting) and repeats the key for every list item.

use url::form_urlencoded;

use crate::params::{ParamValue, Params};

/// Parses a query string (without the leading `?`)
///
/// # Examples
///
/// ```
/// use navlink_router::query;
/// use navlink_router::ParamValue;
///
/// let params = query::parse("author=jane%20%26%20co&tag=a&tag=b");
/// assert_eq!(params.get("author"), Some(&ParamValue::from("jane & co")));
/// assert_eq!(params.get("tag"), Some(&ParamValue::from(vec!["a", "b"])));
/// ```
pub fn parse(query: &str) -> Params {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut params = Params::new();

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let value = value.into_owned();
        let merged = match params.get(&key) {
            Some(ParamValue::Single(first)) => ParamValue::List(vec![first.clone(), value]),
            Some(ParamValue::List(items)) => {
                let mut items = items.clone();
                items.push(value);
                ParamValue::List(items)
            }
            None => ParamValue::Single(value),
        };
        params.insert(key.into_owned(), merged);
    }

    params
}

/// Serializes parameters into a query string (without the leading `?`)
///
/// # Examples
///
/// ```
/// use navlink_router::query;
/// use navlink_router::Params;
///
/// let params = Params::new().with("b", "x y").with("a", vec!["1", "2"]);
/// assert_eq!(query::stringify(&params), "b=x%20y&a=1&a=2");
/// ```
pub fn stringify(params: &Params) -> String {
    let mut pairs = Vec::with_capacity(params.len());

    for (key, value) in params.iter() {
        let key = urlencoding::encode(key);
        match value {
            ParamValue::Single(value) => {
                pairs.push(format!("{}={}", key, urlencoding::encode(value)));
            }
            ParamValue::List(items) => {
                pairs.extend(
                    items
                        .iter()
                        .map(|item| format!("{}={}", key, urlencoding::encode(item))),
                );
            }
        }
    }

    pairs.join("&")
}
