//! State → path serialization
//!
//! Walks the active routes of a [`NavigationState`] through the nested
//! configuration and renders the pattern of the deepest configured screen.
//! Parameters of the focused route that the path does not consume end up in
//! the query string.

use std::borrow::Cow;
use std::ptr;

use tracing::warn;

use crate::codec::{encode_segment, stringify_params};
use crate::params::{ParamValue, Params};
use crate::path::{join_base_url, normalize_path};
use crate::query;
use crate::resolve::HASH_PARAM;
use crate::route::compiler::{CompiledRoutes, ConfigNode, NormalizedConfig};
use crate::route::segment::{is_conventional_name, is_dynamic_name, is_group_segment, is_index_name, split_pattern, RouteSegment};
use crate::state::{NavigationState, ParsedRoute, NESTED_SCREEN_PARAMS};

/// Serializes `state` into a canonical path
pub(crate) fn serialize_state(state: &NavigationState, routes: &CompiledRoutes, base_url: Option<&str>) -> String {
    let state = expand_nested_screens(state);
    let state = state.as_ref();
    let config = routes.normalized();
    let focused = state.focused_route();

    let mut raw = String::from("/");
    let mut all_params = Params::new();
    let mut leftover = Params::new();
    let mut current = Some(state);

    while let Some(level) = current {
        let mut route = match level.active_route() {
            Some(route) => route,
            None => break,
        };

        let mut nodes = &config.screens;
        let mut node: Option<&ConfigNode> = None;
        let mut names: Vec<&str> = Vec::new();
        let mut focused_params: Option<Params> = None;

        while let Some(found) = nodes.get(&route.name) {
            node = Some(found);
            names.push(&route.name);

            if let Some(params) = &route.params {
                let stringified = stringify_params(params, &found.stringify);
                if found.pattern.as_deref().map_or(false, |p| !p.is_empty()) {
                    all_params.extend(stringified.iter().map(|(k, v)| (k.to_string(), v.clone())));
                }
                if focused.map_or(false, |f| ptr::eq(f, route)) {
                    focused_params = Some(stringified);
                }
            }

            let child = route.state.as_deref().and_then(NavigationState::active_route);
            match (&found.screens, child) {
                (Some(children), Some(child)) if children.contains_key(&child.name) => {
                    nodes = children;
                    route = child;
                }
                _ => break,
            }
        }

        let mut consumed: Vec<String> = Vec::new();
        match node {
            Some(found) => {
                let pattern = level_pattern(found, route).unwrap_or_else(|| names.join("/"));
                let initial = found.initial_route_name.as_deref();
                let rendered = render_pattern(&pattern, route, &all_params, initial, config);
                raw.push_str(&rendered);

                if !config.preserve_dynamic_routes {
                    consumed = split_pattern(&pattern)
                        .iter()
                        .filter_map(|s| s.param_name().map(str::to_string))
                        .collect();
                }
            }
            None => raw.push_str(&render_name(&route.name, config)),
        }

        if let Some(nested) = route.state.as_deref() {
            raw.push('/');
            current = Some(nested);
            continue;
        }

        leftover = focused_params
            .or_else(|| focused.and_then(|f| f.params.clone()))
            .unwrap_or_default();
        for name in consumed.iter().map(String::as_str).chain(NESTED_SCREEN_PARAMS) {
            leftover.remove(name);
        }
        break;
    }

    let hash = leftover.remove(HASH_PARAM);

    let mut path = normalize_path(&raw).into_owned();
    if !config.prefix.is_empty() {
        path = join_base_url(&config.prefix, &path);
    }
    if let Some(base_url) = base_url {
        path = join_base_url(base_url, &path);
    }

    let query = query::stringify(&leftover);
    if !query.is_empty() {
        path.push('?');
        path.push_str(&query);
    }
    if let Some(hash) = hash {
        path.push('#');
        path.push_str(&encode_segment(&hash.to_string(), false));
    }

    path
}

/// Pattern for the deepest configured route of a level
///
/// A layout shown without nested state renders the pattern of its initial
/// route.
fn level_pattern(node: &ConfigNode, route: &ParsedRoute) -> Option<String> {
    if route.state.is_none() {
        let initial = node
            .initial_route_name
            .as_deref()
            .and_then(|name| node.screens.as_ref()?.get(name));
        if let Some(pattern) = initial.and_then(|initial| initial.pattern.as_ref()) {
            return Some(pattern.clone());
        }
    }

    node.pattern.clone()
}

/// Turns `screen`/`params` navigation params into nested state
///
/// A route navigated to with `{ screen, params }` but not yet rendered has
/// no state of its own. The target screen is then taken from its params.
fn expand_nested_screens(state: &NavigationState) -> Cow<'_, NavigationState> {
    if !state.routes.iter().any(needs_expansion) {
        return Cow::Borrowed(state);
    }

    let routes = state
        .routes
        .iter()
        .map(|route| {
            let mut route = route.clone();
            match route.state.take() {
                Some(nested) => route.state = Some(Box::new(expand_nested_screens(&nested).into_owned())),
                None => {
                    if let Some(nested) = nested_screen(&route) {
                        route.state = Some(Box::new(NavigationState::single(nested)));
                    }
                }
            }
            route
        })
        .collect();

    Cow::Owned(NavigationState {
        index: state.index,
        routes,
    })
}

fn needs_expansion(route: &ParsedRoute) -> bool {
    match route.state.as_deref() {
        Some(nested) => nested.routes.iter().any(needs_expansion),
        None => nested_screen(route).is_some(),
    }
}

fn nested_screen(route: &ParsedRoute) -> Option<ParsedRoute> {
    let screen = route.param("screen")?.as_str()?;
    let nested = ParsedRoute::new(screen);
    Some(match route.param("path").and_then(ParamValue::as_str) {
        Some(path) => nested.with_path(path),
        None => nested,
    })
}

/// Renders an unconfigured route name
fn render_name(name: &str, config: &NormalizedConfig) -> String {
    if is_index_name(name) || (is_group_segment(name) && !config.preserve_groups) {
        return String::new();
    }
    encode_segment(name, true)
}

fn render_pattern(
    pattern: &str,
    route: &ParsedRoute,
    params: &Params,
    initial_route_name: Option<&str>,
    config: &NormalizedConfig,
) -> String {
    let segments = split_pattern(pattern);
    let last = segments.len().saturating_sub(1);

    segments
        .iter()
        .enumerate()
        .map(|(i, segment)| match segment {
            RouteSegment::Static(text) => encode_segment(text, true),
            RouteSegment::Group(_) if config.preserve_groups => encode_segment(&segment.to_string(), true),
            RouteSegment::Group(_) => match initial_route_name {
                Some(initial) if i == last && !is_conventional_name(initial) => encode_segment(initial, true),
                _ => String::new(),
            },
            RouteSegment::Param { name, .. } if config.preserve_dynamic_routes => format!("[{name}]"),
            RouteSegment::Param { name, optional } => match params.get(name) {
                Some(value) => encode_segment(&value.to_string(), false),
                None if *optional => String::new(),
                None => {
                    warn!(param = %name, pattern, "missing value for required path parameter");
                    String::new()
                }
            },
            RouteSegment::CatchAll { name, .. } if config.preserve_dynamic_routes && !name.is_empty() => {
                format!("[...{name}]")
            }
            RouteSegment::CatchAll { name, optional } => match params.get(name) {
                Some(value) => render_rest(value),
                None if *optional => String::new(),
                None if is_dynamic_name(&route.name) || name == "not-found" => String::new(),
                None => encode_segment(&route.name, true),
            },
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Catch-all values keep their `/` separators; each piece is encoded
fn render_rest(value: &ParamValue) -> String {
    match value {
        ParamValue::List(items) => items
            .iter()
            .map(|item| encode_segment(item, false))
            .collect::<Vec<_>>()
            .join("/"),
        ParamValue::Single(value) => value
            .split('/')
            .map(|item| encode_segment(item, false))
            .collect::<Vec<_>>()
            .join("/"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LinkingConfig, ScreenOptions};
    use crate::route::compiler::compile;
    use pretty_assertions::assert_eq;

    fn serialize(state: &NavigationState, config: &LinkingConfig) -> String {
        let routes = compile(config, &[]).unwrap();
        serialize_state(state, &routes, None)
    }

    #[test]
    fn test_without_config_uses_names() {
        let state = NavigationState::single(
            ParsedRoute::new("foo").with_state(NavigationState::single(
                ParsedRoute::new("baz qux").with_param("author", "jane & co"),
            )),
        );

        assert_eq!(serialize(&state, &LinkingConfig::new()), "/foo/baz%20qux?author=jane%20%26%20co");
    }

    #[test]
    fn test_unnamed_wildcard_renders_route_name() {
        let config = LinkingConfig::new().with_screen("404", "*");
        let state = NavigationState::single(ParsedRoute::new("404").with_path("/test/bar"));

        assert_eq!(serialize(&state, &config), "/404");
    }

    #[test]
    fn test_catch_all_joins_list() {
        let config = LinkingConfig::new()
            .with_screen("[...blog]", "*blog")
            .with_screen("index", "");
        let state = NavigationState::single(ParsedRoute::new("[...blog]").with_param("blog", vec!["1", "2"]));

        assert_eq!(serialize(&state, &config), "/1/2");
    }

    #[test]
    fn test_preserve_groups_and_dynamic_routes() {
        let config = LinkingConfig::new()
            .with_preserve_groups(true)
            .with_preserve_dynamic_routes(true)
            .with_screen(
                "(app)",
                ScreenOptions::new().with_path("(app)").with_screen(
                    "[user]",
                    ScreenOptions::new()
                        .with_path(":user")
                        .with_screen("index", "")
                        .with_screen("related", "related"),
                ),
            );

        let state = NavigationState::single(
            ParsedRoute::new("(app)").with_param("user", "bacon").with_state(NavigationState::single(
                ParsedRoute::new("[user]").with_param("user", "bacon").with_state(
                    NavigationState::new(vec![
                        ParsedRoute::new("index"),
                        ParsedRoute::new("related").with_param("user", "bacon"),
                    ])
                    .with_index(1),
                ),
            )),
        );

        assert_eq!(serialize(&state, &config), "/(app)/[user]/related?user=bacon");
    }

    #[test]
    fn test_unknown_nested_state_restarts_at_root() {
        let config = LinkingConfig::new()
            .with_screen("Foo", ScreenOptions::new().with_path("").with_screen("Foe", "foe"))
            .with_screen("Bar", "bar");
        let state = NavigationState::single(
            ParsedRoute::new("Foo").with_state(NavigationState::single(ParsedRoute::new("Bar"))),
        );

        assert_eq!(serialize(&state, &config), "/bar");

        let routes = compile(&config, &[]).unwrap();
        assert_eq!(serialize_state(&state, &routes, Some("/deploy/prefix/")), "/deploy/prefix/bar");
    }

    #[test]
    fn test_unconfigured_index_collapses() {
        let config = LinkingConfig::new().with_screen(
            "(root)",
            ScreenOptions::new()
                .with_path("(root)")
                .with_initial_route("(tabs)")
                .with_screen(
                    "(tabs)",
                    ScreenOptions::new()
                        .with_path("(tabs)")
                        .with_screen("index", "")
                        .with_screen("two", "two"),
                )
                .with_screen("modal", "modal"),
        );

        let state = NavigationState::single(
            ParsedRoute::new("(root)").with_state(NavigationState::single(
                ParsedRoute::new("modal")
                    .with_path("/modal")
                    .with_state(NavigationState::single(ParsedRoute::new("index"))),
            )),
        );

        assert_eq!(serialize(&state, &config), "/modal");
    }

    #[test]
    fn test_layout_without_state_uses_initial_route() {
        let config = LinkingConfig::new().with_screen(
            "Tabs",
            ScreenOptions::new()
                .with_path("tabs")
                .with_initial_route("Feed")
                .with_screen("Feed", "feed")
                .with_screen("Search", "search"),
        );
        let state = NavigationState::single(ParsedRoute::new("Tabs"));

        assert_eq!(serialize(&state, &config), "/tabs/feed");
    }

    #[test]
    fn test_last_group_renders_initial_route_name() {
        let config = LinkingConfig::new().with_screen(
            "(app)",
            ScreenOptions::new().with_path("(app)").with_screen(
                "(explore)",
                ScreenOptions::new()
                    .with_path("(explore)")
                    .with_initial_route("explore")
                    .with_screen("explore", "explore"),
            ),
        );
        let state = NavigationState::single(
            ParsedRoute::new("(app)").with_state(NavigationState::single(ParsedRoute::new("(explore)"))),
        );

        assert_eq!(serialize(&state, &config), "/explore");
    }

    #[test]
    fn test_last_group_of_inherited_pattern_renders_initial_route_name() {
        let config = LinkingConfig::new().with_screen(
            "(app)",
            ScreenOptions::new().with_path("(app)").with_screen(
                "(explore)",
                ScreenOptions::new()
                    .with_path("(explore)")
                    .with_initial_route("explore")
                    .with_screen("explore", ScreenOptions::new().with_screen("x", "x")),
            ),
        );
        let state = NavigationState::single(
            ParsedRoute::new("(app)").with_state(NavigationState::single(ParsedRoute::new("(explore)"))),
        );

        assert_eq!(serialize(&state, &config), "/explore");
    }

    #[test]
    fn test_conventional_initial_route_keeps_group_hidden() {
        let config = LinkingConfig::new().with_screen(
            "(app)",
            ScreenOptions::new()
                .with_path("(app)")
                .with_initial_route("index")
                .with_screen("index", ScreenOptions::new().with_screen("x", "x")),
        );
        let state = NavigationState::single(ParsedRoute::new("(app)"));

        assert_eq!(serialize(&state, &config), "/");
    }

    #[test]
    fn test_hash_is_encoded() {
        let config = LinkingConfig::new().with_screen("Article", "article/:id");
        let state = NavigationState::single(
            ParsedRoute::new("Article")
                .with_param("id", "7")
                .with_param(HASH_PARAM, "a b"),
        );

        assert_eq!(serialize(&state, &config), "/article/7#a%20b");
    }

    #[test]
    fn test_hash_and_stringify_hooks() {
        let config = LinkingConfig::new().with_screen(
            "Author",
            ScreenOptions::new()
                .with_path("author/:name")
                .with_stringify("name", |v: &str| v.to_lowercase()),
        );
        let state = NavigationState::single(
            ParsedRoute::new("Author")
                .with_param("name", "Jane")
                .with_param("sort", "new")
                .with_param(HASH_PARAM, "bio"),
        );

        assert_eq!(serialize(&state, &config), "/author/jane?sort=new#bio");
    }

    #[test]
    fn test_root_prefix_is_prepended() {
        let config = LinkingConfig::new()
            .with_path("foo")
            .with_screen("Foo", ScreenOptions::new().with_screen("Fruits", "fruits/:fruit"));
        let state = NavigationState::single(
            ParsedRoute::new("Foo").with_state(NavigationState::single(
                ParsedRoute::new("Fruits").with_param("fruit", "apple"),
            )),
        );

        assert_eq!(serialize(&state, &config), "/foo/fruits/apple");
    }
}
