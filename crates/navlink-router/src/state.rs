//! Navigation state produced by the resolver and consumed by the serializer

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::params::{ParamValue, Params};

/// Params used to navigate into a nested screen; never rendered in a query
pub const NESTED_SCREEN_PARAMS: [&str; 4] = ["screen", "params", "initial", "path"];

/// One level of navigation: a list of routes and the active one
///
/// Extra keys in serialized states (`key`, `stale`, `type`, ...) are ignored
/// when deserializing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    /// Active route; the last route when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub routes: Vec<ParsedRoute>,
}

impl NavigationState {
    /// A state with a single route
    pub fn single(route: ParsedRoute) -> Self {
        Self {
            index: None,
            routes: vec![route],
        }
    }

    pub fn new(routes: Vec<ParsedRoute>) -> Self {
        Self { index: None, routes }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// The route at `index`, or the last route
    pub fn active_route(&self) -> Option<&ParsedRoute> {
        match self.index {
            Some(index) => self.routes.get(index),
            None => self.routes.last(),
        }
    }

    /// The deepest active route
    ///
    /// ```
    /// use navlink_router::{NavigationState, ParsedRoute};
    ///
    /// let state = NavigationState::single(
    ///     ParsedRoute::new("Profile").with_state(NavigationState::single(ParsedRoute::new("Edit"))),
    /// );
    /// assert_eq!(state.focused_route().map(|r| r.name.as_str()), Some("Edit"));
    /// ```
    pub fn focused_route(&self) -> Option<&ParsedRoute> {
        let mut route = self.active_route()?;
        while let Some(nested) = route.state.as_deref().and_then(NavigationState::active_route) {
            route = nested;
        }
        Some(route)
    }

    /// Names of the active routes from the root down
    pub fn screen_chain(&self) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut current = Some(self);
        while let Some(route) = current.and_then(NavigationState::active_route) {
            chain.push(route.name.as_str());
            current = route.state.as_deref();
        }
        chain
    }
}

/// A route inside a [`NavigationState`]
///
/// A deserialized route without `state` whose params name a nested `screen`
/// gets that screen as its nested state, with the nested `params` and `path`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawRoute")]
pub struct ParsedRoute {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,
    /// The path this route was resolved from (focused route only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Box<NavigationState>>,
}

impl ParsedRoute {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the params; an empty map is stored as `None`
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = if params.is_empty() { None } else { Some(params) };
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.get_or_insert_with(Params::new).insert(key, value);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_state(mut self, state: NavigationState) -> Self {
        self.state = Some(Box::new(state));
        self
    }

    pub fn param(&self, key: &str) -> Option<&ParamValue> {
        self.params.as_ref().and_then(|params| params.get(key))
    }
}

/// A route as it appears in JSON, before nested-screen params are resolved
#[derive(Deserialize)]
struct RawRoute {
    name: String,
    #[serde(default)]
    params: Option<RawParams>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    state: Option<Box<NavigationState>>,
}

/// Params in document order, structured values included
struct RawParams(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for RawParams {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RawParamsVisitor;

        impl<'de> Visitor<'de> for RawParamsVisitor {
            type Value = RawParams;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of route parameters")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<RawParams, A::Error> {
                let mut entries = Vec::new();
                while let Some(entry) = access.next_entry::<String, Value>()? {
                    entries.push(entry);
                }
                Ok(RawParams(entries))
            }
        }

        deserializer.deserialize_map(RawParamsVisitor)
    }
}

impl From<RawRoute> for ParsedRoute {
    fn from(raw: RawRoute) -> Self {
        let mut params = Params::new();
        let mut screen = None;
        let mut nested_params = None;
        let mut nested_path = None;

        for (key, value) in raw.params.map(|p| p.0).unwrap_or_default() {
            match (key.as_str(), &value) {
                ("screen", Value::String(name)) => screen = Some(name.clone()),
                ("params", Value::Object(map)) => nested_params = Some(map.clone()),
                ("path", Value::String(path)) => nested_path = Some(path.clone()),
                _ => {}
            }
            params.insert_json(key, value);
        }

        let state = raw.state.or_else(|| {
            let nested = RawRoute {
                name: screen?,
                params: nested_params.map(|map| RawParams(map.into_iter().collect())),
                path: nested_path,
                state: None,
            };
            Some(Box::new(NavigationState::single(nested.into())))
        });

        ParsedRoute {
            name: raw.name,
            params: None,
            path: raw.path,
            state,
        }
        .with_params(params)
    }
}
