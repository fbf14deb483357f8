//! Linking configuration: the nested screen tree supplied by the application
//!
//! A screen is either a bare path string or an options object. Screen maps
//! keep declaration order, which matters for initial routes and for
//! conflict reporting.
//!
//! Configurations can be built in code or loaded from JSON/TOML. Unknown keys
//! are rejected. `parse`/`stringify` hooks can only be attached in code.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::error::{LinkingError, Result};
use crate::params::Hooks;

/// Maximum nesting depth accepted by the compiler
pub const MAX_CONFIG_DEPTH: usize = 32;

/// Root of a linking configuration
///
/// # Examples
///
/// ```
/// use navlink_router::{LinkingConfig, ScreenOptions};
///
/// let config = LinkingConfig::new().with_screen(
///     "Profile",
///     ScreenOptions::new()
///         .with_screen("Details", "user/:id")
///         .with_screen("Edit", "user/:id/edit"),
/// );
/// assert_eq!(config.screens.len(), 1);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct LinkingConfig {
    /// Static prefix in front of every pattern (no params allowed)
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub initial_route_name: Option<String>,
    #[serde(default)]
    pub screens: Screens,
    /// Render `(group)` segments in generated paths
    #[serde(default)]
    pub preserve_groups: bool,
    /// Render `:name`/`*name` segments as `[name]`/`[...name]`
    #[serde(default)]
    pub preserve_dynamic_routes: bool,
}

impl LinkingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration from JSON text
    ///
    /// ```
    /// use navlink_router::LinkingConfig;
    ///
    /// let config = LinkingConfig::from_json(r#"{
    ///     "screens": { "Home": "", "Profile": { "path": "user/:id" } }
    /// }"#).unwrap();
    /// assert_eq!(config.screens.names().collect::<Vec<_>>(), vec!["Home", "Profile"]);
    /// ```
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Loads a configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_initial_route(mut self, name: impl Into<String>) -> Self {
        self.initial_route_name = Some(name.into());
        self
    }

    pub fn with_screen(mut self, name: impl Into<String>, screen: impl Into<ScreenConfig>) -> Self {
        self.screens.insert(name, screen);
        self
    }

    pub fn with_preserve_groups(mut self, preserve: bool) -> Self {
        self.preserve_groups = preserve;
        self
    }

    pub fn with_preserve_dynamic_routes(mut self, preserve: bool) -> Self {
        self.preserve_dynamic_routes = preserve;
        self
    }

    /// Checks the structural invariants the compiler relies on
    pub fn validate(&self) -> Result<()> {
        if let Some(path) = &self.path {
            let has_params = path
                .split('/')
                .any(|segment| segment.starts_with(':') || segment.starts_with('*'));
            if has_params {
                return Err(LinkingError::InvalidConfigShape(format!(
                    "Found invalid path '{}'. The 'path' in the top-level configuration cannot contain patterns for params.",
                    path
                )));
            }
        }

        validate_screens(&self.screens, 1)
    }
}

fn validate_screens(screens: &Screens, depth: usize) -> Result<()> {
    if depth > MAX_CONFIG_DEPTH {
        return Err(LinkingError::InvalidConfigShape(format!(
            "Screens are nested deeper than {} levels.",
            MAX_CONFIG_DEPTH
        )));
    }

    for (name, screen) in screens.iter() {
        if let ScreenConfig::Options(options) = screen {
            if options.exact && options.path.is_none() {
                return Err(LinkingError::InvalidConfigShape(format!(
                    "A 'path' needs to be specified when specifying 'exact: true' for screen '{}'. If you don't want this screen in the URL, specify it as empty string, e.g. `path: ''`.",
                    name
                )));
            }
            if let Some(children) = &options.screens {
                validate_screens(children, depth + 1)?;
            }
        }
    }

    Ok(())
}

/// A single screen entry
#[derive(Debug, Clone)]
pub enum ScreenConfig {
    /// Shorthand: the screen's path pattern
    Path(String),
    Options(ScreenOptions),
}

impl ScreenConfig {
    pub fn path(&self) -> Option<&str> {
        match self {
            ScreenConfig::Path(path) => Some(path),
            ScreenConfig::Options(options) => options.path.as_deref(),
        }
    }

    pub fn screens(&self) -> Option<&Screens> {
        match self {
            ScreenConfig::Path(_) => None,
            ScreenConfig::Options(options) => options.screens.as_ref(),
        }
    }
}

impl From<&str> for ScreenConfig {
    fn from(path: &str) -> Self {
        ScreenConfig::Path(path.to_string())
    }
}

impl From<String> for ScreenConfig {
    fn from(path: String) -> Self {
        ScreenConfig::Path(path)
    }
}

impl From<ScreenOptions> for ScreenConfig {
    fn from(options: ScreenOptions) -> Self {
        ScreenConfig::Options(options)
    }
}

impl<'de> Deserialize<'de> for ScreenConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ScreenVisitor;

        impl<'de> Visitor<'de> for ScreenVisitor {
            type Value = ScreenConfig;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a path string or a screen options object")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<ScreenConfig, E> {
                Ok(ScreenConfig::Path(v.to_string()))
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> std::result::Result<ScreenConfig, A::Error> {
                let options = ScreenOptions::deserialize(de::value::MapAccessDeserializer::new(map))?;
                Ok(ScreenConfig::Options(options))
            }
        }

        deserializer.deserialize_any(ScreenVisitor)
    }
}

/// Options form of a screen entry
#[derive(Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ScreenOptions {
    #[serde(default)]
    pub path: Option<String>,
    /// Use `path` as-is instead of joining it onto the parent pattern
    #[serde(default)]
    pub exact: bool,
    #[serde(default)]
    pub screens: Option<Screens>,
    #[serde(default)]
    pub initial_route_name: Option<String>,
    #[serde(skip)]
    pub parse: Hooks,
    #[serde(skip)]
    pub stringify: Hooks,
}

impl ScreenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn exact(mut self) -> Self {
        self.exact = true;
        self
    }

    pub fn with_initial_route(mut self, name: impl Into<String>) -> Self {
        self.initial_route_name = Some(name.into());
        self
    }

    pub fn with_screen(mut self, name: impl Into<String>, screen: impl Into<ScreenConfig>) -> Self {
        self.screens.get_or_insert_with(Screens::default).insert(name, screen);
        self
    }

    /// Registers a `parse` hook applied to the raw value of `key`
    pub fn with_parse<F>(mut self, key: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.parse.insert(key, hook);
        self
    }

    /// Registers a `stringify` hook applied before `key` is written to a URL
    pub fn with_stringify<F>(mut self, key: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.stringify.insert(key, hook);
        self
    }
}

impl fmt::Debug for ScreenOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScreenOptions")
            .field("path", &self.path)
            .field("exact", &self.exact)
            .field("initial_route_name", &self.initial_route_name)
            .field("screens", &self.screens)
            .field("parse", &self.parse)
            .field("stringify", &self.stringify)
            .finish()
    }
}

/// Declaration-ordered map of screen name → screen entry
#[derive(Debug, Clone, Default)]
pub struct Screens {
    entries: Vec<(String, ScreenConfig)>,
}

impl Screens {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ScreenConfig> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    /// Inserts a screen; a repeated name replaces the earlier entry in place
    pub fn insert(&mut self, name: impl Into<String>, screen: impl Into<ScreenConfig>) {
        let name = name.into();
        let screen = screen.into();

        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = screen,
            None => self.entries.push((name, screen)),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScreenConfig)> {
        self.entries.iter().map(|(n, s)| (n.as_str(), s))
    }
}

impl<'de> Deserialize<'de> for Screens {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ScreensVisitor;

        impl<'de> Visitor<'de> for ScreensVisitor {
            type Value = Screens;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of screen names to screen configs")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Screens, A::Error> {
                let mut screens = Screens::default();
                while let Some((name, screen)) = access.next_entry::<String, ScreenConfig>()? {
                    if screens.get(&name).is_some() {
                        return Err(de::Error::custom(format!("duplicate screen `{}`", name)));
                    }
                    screens.insert(name, screen);
                }
                Ok(screens)
            }
        }

        deserializer.deserialize_map(ScreensVisitor)
    }
}
