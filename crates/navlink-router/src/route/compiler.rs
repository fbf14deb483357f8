//! Pattern compiler
//!
//! Flattens a nested [`LinkingConfig`] into [`RouteRecord`]s used for
//! path → state resolution, and into a tree of [`ConfigNode`]s used for
//! state → path serialization.

use std::collections::HashMap;
use std::fmt;

use regex::Regex;
use tracing::debug;

use crate::config::{LinkingConfig, ScreenConfig, Screens};
use crate::error::{LinkingError, Result};
use crate::params::Hooks;

use super::ordering::sort_routes;
use super::segment::{is_index_name, join_paths, split_pattern, RouteSegment};

/// Specificity class of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Static,
    Dynamic,
    /// A route with nested screens
    Layout,
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RouteKind::Static => "static",
            RouteKind::Dynamic => "dynamic",
            RouteKind::Layout => "layout",
        })
    }
}

/// One flattened, compiled route
#[derive(Debug, Clone)]
pub struct RouteRecord {
    /// Screen names from the root down to this screen
    pub screens: Vec<String>,
    /// Normalized pattern, e.g. `user/:id/edit`
    pub pattern: String,
    pub segments: Vec<RouteSegment>,
    /// Segments without groups, used for specificity
    pub parts: Vec<RouteSegment>,
    /// Screen names split on `/`
    pub expanded_route_names: Vec<String>,
    pub kind: RouteKind,
    pub has_children: bool,
    pub is_index: bool,
    pub is_initial: bool,
    pub initial_route_name: Option<String>,
    /// `None` for the empty pattern
    pub(crate) regex: Option<Regex>,
    /// Parse hooks of the whole chain, leaf first
    pub(crate) parse: Hooks,
}

impl RouteRecord {
    fn new(
        screens: Vec<String>,
        pattern: String,
        has_children: bool,
        initial_route_name: Option<String>,
        parse: Hooks,
    ) -> Result<Self> {
        let segments = split_pattern(&pattern);
        let parts: Vec<RouteSegment> = segments.iter().filter(|s| !s.is_group()).cloned().collect();

        let kind = if has_children {
            RouteKind::Layout
        } else if segments.iter().any(RouteSegment::is_dynamic) {
            RouteKind::Dynamic
        } else {
            RouteKind::Static
        };

        let regex = if segments.is_empty() {
            None
        } else {
            let source: String = segments.iter().map(RouteSegment::to_regex).collect();
            let regex = Regex::new(&format!("^{source}$")).map_err(|err| {
                LinkingError::InvalidConfigShape(format!("pattern '{}' does not compile: {}", pattern, err))
            })?;
            Some(regex)
        };

        let expanded_route_names = screens
            .iter()
            .flat_map(|name| name.split('/'))
            .map(str::to_string)
            .collect();

        let is_index = screens.last().map_or(false, |name| is_index_name(name));

        Ok(Self {
            screens,
            pattern,
            segments,
            parts,
            expanded_route_names,
            kind,
            has_children,
            is_index,
            is_initial: false,
            initial_route_name,
            regex,
            parse,
        })
    }

    /// The leaf screen name
    pub fn name(&self) -> &str {
        self.screens.last().map(String::as_str).unwrap_or_default()
    }

    /// `true` if the record matches the whole of `remaining`
    ///
    /// `remaining` is a relative path with a single trailing slash, or empty.
    pub fn matches(&self, remaining: &str) -> bool {
        match &self.regex {
            Some(regex) => regex.is_match(remaining),
            None => remaining.is_empty(),
        }
    }

    /// `true` if every segment is a group, i.e. the route renders as `/`
    pub(crate) fn is_root_leaf(&self) -> bool {
        !self.has_children && self.segments.iter().all(RouteSegment::is_group)
    }
}

/// An `initialRouteName` declaration and the chain that declares it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialRouteRecord {
    pub initial_route_name: String,
    /// Empty for the root configuration
    pub parent_screens: Vec<String>,
}

/// Serializer view of one configured screen
#[derive(Debug, Clone, Default)]
pub struct ConfigNode {
    /// Cumulative pattern; `None` when no screen on the chain declares a path
    pub pattern: Option<String>,
    pub stringify: Hooks,
    pub initial_route_name: Option<String>,
    pub screens: Option<HashMap<String, ConfigNode>>,
}

/// Serializer view of a whole configuration
#[derive(Debug, Clone, Default)]
pub struct NormalizedConfig {
    /// Root `path`, normalized
    pub prefix: String,
    pub screens: HashMap<String, ConfigNode>,
    pub initial_route_name: Option<String>,
    pub preserve_groups: bool,
    pub preserve_dynamic_routes: bool,
}

/// Output of [`compile`]
#[derive(Debug, Clone, Default)]
pub struct CompiledRoutes {
    records: Vec<RouteRecord>,
    initial_routes: Vec<InitialRouteRecord>,
    normalized: NormalizedConfig,
}

impl CompiledRoutes {
    /// Route records in match order
    pub fn records(&self) -> &[RouteRecord] {
        &self.records
    }

    pub fn initial_routes(&self) -> &[InitialRouteRecord] {
        &self.initial_routes
    }

    pub fn normalized(&self) -> &NormalizedConfig {
        &self.normalized
    }

    /// Initial route declared by the screen chain `parent`, if any
    pub fn initial_route_for(&self, parent: &[String]) -> Option<&str> {
        self.initial_routes
            .iter()
            .find(|initial| initial.parent_screens.as_slice() == parent)
            .map(|initial| initial.initial_route_name.as_str())
    }
}

/// Accumulator threaded through the depth-first walk
#[derive(Default)]
struct CompileState {
    records: Vec<RouteRecord>,
    initial_routes: Vec<InitialRouteRecord>,
}

impl CompileState {
    fn with_record(mut self, record: RouteRecord) -> Self {
        self.records.push(record);
        self
    }

    fn with_initial_route(mut self, name: &str, parent_screens: &[String]) -> Self {
        self.initial_routes.push(InitialRouteRecord {
            initial_route_name: name.to_string(),
            parent_screens: parent_screens.to_vec(),
        });
        self
    }
}

/// What a screen inherits from its parent
struct Parent<'a> {
    pattern: Option<&'a str>,
    chain: &'a [String],
    parse: &'a Hooks,
}

impl Parent<'_> {
    fn chain_with(&self, name: &str) -> Vec<String> {
        let mut chain = self.chain.to_vec();
        chain.push(name.to_string());
        chain
    }

    fn join(&self, path: &str) -> String {
        join_paths(&[self.pattern.unwrap_or_default(), path])
    }
}

/// Compiles a configuration into ordered route records
///
/// `previous_segments` are the segments of the currently displayed route;
/// they only influence how group routes are ordered.
///
/// # Errors
///
/// [`LinkingError::InvalidConfigShape`] for structural problems and
/// [`LinkingError::ConfigConflict`] when two unrelated screens share a
/// pattern.
///
/// # Examples
///
/// ```
/// use navlink_router::{compile, LinkingConfig, ScreenOptions};
///
/// let config = LinkingConfig::new().with_screen(
///     "Profile",
///     ScreenOptions::new()
///         .with_screen("Details", "user/:id")
///         .with_screen("Edit", "user/:id/edit"),
/// );
///
/// let routes = compile(&config, &[]).unwrap();
/// let patterns: Vec<_> = routes.records().iter().map(|r| r.pattern.as_str()).collect();
/// assert_eq!(patterns, vec!["user/:id/edit", "user/:id"]);
/// ```
pub fn compile(config: &LinkingConfig, previous_segments: &[String]) -> Result<CompiledRoutes> {
    config.validate()?;

    let no_hooks = Hooks::default();
    let root = Parent {
        pattern: None,
        chain: &[],
        parse: &no_hooks,
    };

    let state = match &config.initial_route_name {
        Some(name) => CompileState::default().with_initial_route(name, &[]),
        None => CompileState::default(),
    };

    let (state, screens) = compile_screens(state, &config.screens, &root)?;
    let CompileState {
        mut records,
        initial_routes,
    } = state;

    for record in records.iter_mut() {
        record.is_initial = initial_routes.iter().any(|initial| {
            matches!(
                record.screens.split_last(),
                Some((last, parent)) if *last == initial.initial_route_name
                    && parent == initial.parent_screens.as_slice()
            )
        });
    }

    sort_routes(&mut records, previous_segments);
    check_conflicts(&records)?;

    debug!(routes = records.len(), "compiled linking configuration");

    Ok(CompiledRoutes {
        records,
        initial_routes,
        normalized: NormalizedConfig {
            prefix: join_paths(&[config.path.as_deref().unwrap_or_default()]),
            screens,
            initial_route_name: config.initial_route_name.clone(),
            preserve_groups: config.preserve_groups,
            preserve_dynamic_routes: config.preserve_dynamic_routes,
        },
    })
}

fn compile_screens(
    state: CompileState,
    screens: &Screens,
    parent: &Parent<'_>,
) -> Result<(CompileState, HashMap<String, ConfigNode>)> {
    screens
        .iter()
        .try_fold((state, HashMap::new()), |(state, mut nodes), (name, screen)| {
            let (state, node) = compile_screen(state, name, screen, parent)?;
            nodes.insert(name.to_string(), node);
            Ok((state, nodes))
        })
}

fn compile_screen(
    state: CompileState,
    name: &str,
    screen: &ScreenConfig,
    parent: &Parent<'_>,
) -> Result<(CompileState, ConfigNode)> {
    let chain = parent.chain_with(name);

    let options = match screen {
        ScreenConfig::Path(path) => {
            let pattern = parent.join(path);
            let record = RouteRecord::new(chain, pattern.clone(), false, None, parent.parse.clone())?;
            let node = ConfigNode {
                pattern: Some(pattern),
                ..ConfigNode::default()
            };
            return Ok((state.with_record(record), node));
        }
        ScreenConfig::Options(options) => options,
    };

    let pattern = match &options.path {
        Some(path) if options.exact => Some(join_paths(&[path])),
        Some(path) => Some(parent.join(path)),
        None => parent.pattern.map(str::to_string),
    };
    let parse = parent.parse.merged(&options.parse);
    let has_children = options.screens.as_ref().map_or(false, |s| !s.is_empty());

    let mut state = state;
    if let Some(initial) = &options.initial_route_name {
        state = state.with_initial_route(initial, &chain);
    }
    if options.path.is_some() {
        let record = RouteRecord::new(
            chain.clone(),
            pattern.clone().unwrap_or_default(),
            has_children,
            options.initial_route_name.clone(),
            parse.clone(),
        )?;
        state = state.with_record(record);
    }

    let (state, screens) = match &options.screens {
        Some(children) => {
            let scope = Parent {
                pattern: pattern.as_deref(),
                chain: &chain,
                parse: &parse,
            };
            let (state, nodes) = compile_screens(state, children, &scope)?;
            (state, Some(nodes))
        }
        None => (state, None),
    };

    let node = ConfigNode {
        pattern,
        stringify: options.stringify.clone(),
        initial_route_name: options.initial_route_name.clone(),
        screens,
    };

    Ok((state, node))
}

/// Two chains are compatible when one is a prefix of the other
fn chains_intersect(a: &[String], b: &[String]) -> bool {
    if a.len() > b.len() {
        a.starts_with(b)
    } else {
        b.starts_with(a)
    }
}

fn check_conflicts(records: &[RouteRecord]) -> Result<()> {
    let mut seen: HashMap<&str, &RouteRecord> = HashMap::new();

    for record in records {
        if let Some(existing) = seen.get(record.pattern.as_str()) {
            if !chains_intersect(&existing.screens, &record.screens) {
                return Err(LinkingError::ConfigConflict {
                    pattern: record.pattern.clone(),
                    first: existing.screens.join(" > "),
                    second: record.screens.join(" > "),
                });
            }
        }
        seen.insert(&record.pattern, record);
    }

    Ok(())
}
