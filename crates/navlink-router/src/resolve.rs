//! Path → state resolution
//!
//! A path is matched against the ordered route records; the first record
//! whose pattern consumes the whole remaining path wins. The matched screen
//! chain becomes a nested [`NavigationState`].

use tracing::{debug, warn};

use crate::codec::{decode_segment, parse_value};
use crate::params::{Hooks, ParamValue, Params};
use crate::path::{normalize_path, split_url, strip_path_prefix, to_remaining};
use crate::query;
use crate::route::compiler::{CompiledRoutes, RouteKind, RouteRecord};
use crate::route::segment::RouteSegment;
use crate::state::{NavigationState, ParsedRoute};

/// Reserved parameter key holding the URL fragment
pub const HASH_PARAM: &str = "#";

/// Resolves `input` against compiled routes
///
/// Returns `None` when nothing matches.
pub(crate) fn resolve_path(
    input: &str,
    routes: &CompiledRoutes,
    base_url: Option<&str>,
) -> Option<NavigationState> {
    let parts = split_url(input);

    let mut pathname = parts.pathname.as_str();
    if let Some(base_url) = base_url {
        let base_url = normalize_path(base_url);
        pathname = strip_path_prefix(pathname, &base_url).unwrap_or(pathname);
    }

    let prefix = &routes.normalized().prefix;
    if !prefix.is_empty() {
        match strip_path_prefix(pathname, &format!("/{prefix}")) {
            Some(rest) => pathname = rest,
            None => {
                debug!(input, prefix = %prefix, "path is outside the configured prefix");
                return None;
            }
        }
    }

    let remaining = to_remaining(pathname);
    let query_params = parts.query.as_deref().map(query::parse).unwrap_or_default();

    let leaf = Leaf {
        input,
        query: query_params,
        hash: parts.hash,
    };

    if routes.records().is_empty() {
        let names: Vec<String> = remaining
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| decode_segment(s).into_owned())
            .collect();
        if names.is_empty() {
            return None;
        }
        return Some(build_state(&names, Params::new(), leaf, &Hooks::default(), routes));
    }

    let matched = if remaining.is_empty() {
        match_root(routes.records())
    } else {
        routes
            .records()
            .iter()
            .find(|record| record.matches(&remaining))
            .map(|record| (record, remaining.as_str()))
    };

    let Some((record, matched_path)) = matched else {
        debug!(input, "no route matches path");
        return None;
    };

    debug!(pattern = %record.pattern, screens = ?record.screens, "matched route");

    let path_params = extract_params(record, matched_path);
    Some(build_state(&record.screens, path_params, leaf, &record.parse, routes))
}

/// Picks the record for the empty path
///
/// Preference: a leaf rendering as `/`, then a dynamic leaf accepting the
/// empty string, then a catch-all leaf accepting `/`, then any record with
/// an empty pattern.
fn match_root(records: &[RouteRecord]) -> Option<(&RouteRecord, &'static str)> {
    records
        .iter()
        .find(|r| r.is_root_leaf())
        .map(|r| (r, ""))
        .or_else(|| {
            records
                .iter()
                .find(|r| !r.has_children && r.kind == RouteKind::Dynamic && r.matches(""))
                .map(|r| (r, ""))
        })
        .or_else(|| {
            records
                .iter()
                .find(|r| !r.has_children && has_catch_all(r) && r.matches("/"))
                .map(|r| (r, "/"))
        })
        .or_else(|| records.iter().find(|r| r.matches("")).map(|r| (r, "")))
}

fn has_catch_all(record: &RouteRecord) -> bool {
    record
        .segments
        .iter()
        .any(|s| matches!(s, RouteSegment::CatchAll { .. }))
}

/// Extracts positional captures into decoded, hook-parsed params
fn extract_params(record: &RouteRecord, matched_path: &str) -> Params {
    let mut params = Params::new();

    let captures = match record.regex.as_ref().and_then(|regex| regex.captures(matched_path)) {
        Some(captures) => captures,
        None => return params,
    };

    let dynamic = record.segments.iter().filter(|s| s.is_dynamic());
    for (index, segment) in dynamic.enumerate() {
        let raw = match captures.get(index + 1) {
            Some(m) => m.as_str(),
            None => continue,
        };

        let (name, value) = match segment {
            RouteSegment::Param { name, .. } => {
                let raw = raw.strip_suffix('/').unwrap_or(raw);
                (name, ParamValue::Single(decode_segment(raw).into_owned()))
            }
            RouteSegment::CatchAll { name, .. } if !name.is_empty() => {
                let items: Vec<String> = raw
                    .split('/')
                    .filter(|s| !s.is_empty())
                    .map(|s| decode_segment(s).into_owned())
                    .collect();
                if items.is_empty() {
                    continue;
                }
                (name, ParamValue::List(items))
            }
            _ => continue,
        };

        let value = parse_value(name, value, &record.parse);
        params.insert(name.clone(), value);
    }

    params
}

/// What only the focused route receives
struct Leaf<'a> {
    input: &'a str,
    query: Params,
    hash: Option<String>,
}

fn build_state(
    names: &[String],
    path_params: Params,
    leaf: Leaf<'_>,
    hooks: &Hooks,
    routes: &CompiledRoutes,
) -> NavigationState {
    let mut leaf_params = path_params.clone();
    for (key, value) in leaf.query {
        if leaf_params.contains_key(&key) {
            warn!(param = %key, "query parameter shadows a path parameter, keeping the path value");
            continue;
        }
        let value = parse_value(&key, value, hooks);
        leaf_params.insert(key, value);
    }
    if let Some(hash) = leaf.hash {
        leaf_params.insert(HASH_PARAM, decode_segment(&hash).into_owned());
    }

    let mut current: Option<NavigationState> = None;
    for (depth, name) in names.iter().enumerate().rev() {
        let mut route = if depth + 1 == names.len() {
            ParsedRoute::new(name.as_str())
                .with_params(leaf_params.clone())
                .with_path(leaf.input)
        } else {
            ParsedRoute::new(name.as_str()).with_params(path_params.clone())
        };

        if let Some(nested) = current.take() {
            route = route.with_state(nested);
        }

        current = Some(level_state(route, routes.initial_route_for(&names[..depth]), &path_params));
    }

    current.unwrap_or_default()
}

/// Places the initial route of a level in front of the matched route
fn level_state(route: ParsedRoute, initial: Option<&str>, path_params: &Params) -> NavigationState {
    match initial {
        Some(initial) if initial != route.name => NavigationState::new(vec![
            ParsedRoute::new(initial).with_params(path_params.clone()),
            route,
        ])
        .with_index(1),
        _ => NavigationState::single(route),
    }
}
