//! Route parameter values and ordered parameter maps
//!
//! Parameters are either a single string or a list of strings (catch-all
//! captures and repeated query keys). `Params` keeps insertion order so that
//! generated query strings are stable.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

/// A single parameter value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Single(String),
    List(Vec<String>),
}

impl ParamValue {
    /// Returns the value if it is a single string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Single(value) => Some(value),
            ParamValue::List(_) => None,
        }
    }

    /// Returns the items if it is a list
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ParamValue::Single(_) => None,
            ParamValue::List(items) => Some(items),
        }
    }

    /// Converts a JSON value; objects and `null` have no URL form
    pub fn from_json(value: serde_json::Value) -> Option<ParamValue> {
        use serde_json::Value;

        fn scalar(value: Value) -> Option<String> {
            match value {
                Value::String(s) => Some(s),
                Value::Bool(b) => Some(b.to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            }
        }

        match value {
            Value::Array(items) => Some(ParamValue::List(items.into_iter().filter_map(scalar).collect())),
            other => scalar(other).map(ParamValue::Single),
        }
    }

    /// Applies `f` to every string in the value, keeping its shape
    pub fn map(&self, f: impl Fn(&str) -> String) -> ParamValue {
        match self {
            ParamValue::Single(value) => ParamValue::Single(f(value)),
            ParamValue::List(items) => ParamValue::List(items.iter().map(|s| f(s)).collect()),
        }
    }
}

/// Scalar rendering: lists are joined with `,`
impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Single(value) => f.write_str(value),
            ParamValue::List(items) => f.write_str(&items.join(",")),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Single(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Single(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(items: Vec<String>) -> Self {
        ParamValue::List(items)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(items: Vec<&str>) -> Self {
        ParamValue::List(items.into_iter().map(str::to_string).collect())
    }
}

// Navigation state written by hand often carries numbers and booleans;
// they are accepted and kept in their string form.
impl<'de> Deserialize<'de> for ParamValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = ParamValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string, number, boolean or a list of them")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ParamValue, E> {
                Ok(ParamValue::Single(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<ParamValue, E> {
                Ok(ParamValue::Single(v))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<ParamValue, E> {
                Ok(ParamValue::Single(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<ParamValue, E> {
                Ok(ParamValue::Single(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<ParamValue, E> {
                Ok(ParamValue::Single(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<ParamValue, E> {
                Ok(ParamValue::Single(v.to_string()))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<ParamValue, A::Error> {
                let mut items = Vec::new();
                while let Some(item) = seq.next_element::<ParamValue>()? {
                    items.push(item.to_string());
                }
                Ok(ParamValue::List(items))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

/// Insertion-ordered parameter map
///
/// Equality ignores key order: two maps are equal when they hold the same
/// keys with the same values.
///
/// # Examples
///
/// ```
/// use navlink_router::{Params, ParamValue};
///
/// let mut params = Params::new();
/// params.insert("sort", "new");
/// params.insert("id", "42");
///
/// assert_eq!(params.get("id"), Some(&ParamValue::from("42")));
/// assert_eq!(params.keys().collect::<Vec<_>>(), vec!["sort", "id"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Inserts a value, replacing an existing one in place
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Option<ParamValue> {
        let key = key.into();
        let value = value.into();

        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        let position = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(position).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Builder form of [`Params::insert`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts a JSON value; structured values have no URL form and are skipped
    pub(crate) fn insert_json(&mut self, key: String, value: serde_json::Value) {
        match ParamValue::from_json(value) {
            Some(value) => {
                self.insert(key, value);
            }
            None => debug!(key = %key, "skipping structured route param"),
        }
    }
}

impl PartialEq for Params {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl Eq for Params {}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        params.extend(iter);
        params
    }
}

impl<K: Into<String>, V: Into<ParamValue>> Extend<(K, V)> for Params {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl IntoIterator for Params {
    type Item = (String, ParamValue);
    type IntoIter = std::vec::IntoIter<(String, ParamValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Params {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ParamsVisitor;

        impl<'de> Visitor<'de> for ParamsVisitor {
            type Value = Params;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of route parameters")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Params, A::Error> {
                let mut params = Params::new();
                while let Some((key, value)) = access.next_entry::<String, serde_json::Value>()? {
                    params.insert_json(key, value);
                }
                Ok(params)
            }
        }

        deserializer.deserialize_map(ParamsVisitor)
    }
}

/// A per-field `parse` or `stringify` function
pub type HookFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Per-field hooks keyed by parameter name
#[derive(Clone, Default)]
pub struct Hooks {
    hooks: HashMap<String, HookFn>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<F>(&mut self, key: impl Into<String>, hook: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.hooks.insert(key.into(), Arc::new(hook));
    }

    pub fn get(&self, key: &str) -> Option<&HookFn> {
        self.hooks.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Layers `other` on top of `self`; hooks in `other` win
    pub fn merged(&self, other: &Hooks) -> Hooks {
        let mut hooks = self.hooks.clone();
        hooks.extend(other.hooks.iter().map(|(k, v)| (k.clone(), Arc::clone(v))));
        Hooks { hooks }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.hooks.keys().collect();
        keys.sort();
        f.debug_set().entries(keys).finish()
    }
}
