//! Integration tests for path → state resolution
//!
//! Covers:
//! - Static, dynamic and catch-all matching and their ordering
//! - Group segments
//! - Initial routes and parameter propagation
//! - Root prefix, absolute URLs and percent-decoding
//! - Configuration errors

use std::sync::Arc;

use navlink_router::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn resolve(path: &str, config: &LinkingConfig) -> Option<NavigationState> {
    get_state_from_path(path, config).unwrap()
}

fn profile_config() -> LinkingConfig {
    LinkingConfig::new().with_screen(
        "Profile",
        ScreenOptions::new()
            .with_screen("Details", "user/:id")
            .with_screen("Edit", "user/:id/edit"),
    )
}

#[rstest]
#[case("/user/42/edit", vec!["Profile", "Edit"])]
#[case("/user/42", vec!["Profile", "Details"])]
#[case("user/42/", vec!["Profile", "Details"])]
#[case("//user///42", vec!["Profile", "Details"])]
fn test_profile_scenario(#[case] path: &str, #[case] chain: Vec<&str>) {
    let state = resolve(path, &profile_config()).unwrap();

    assert_eq!(state.screen_chain(), chain);
    assert_eq!(
        state.focused_route().unwrap().params,
        Some(Params::new().with("id", "42"))
    );
}

#[test]
fn test_profile_scenario_full_shape() {
    let state = resolve("/user/42/edit", &profile_config()).unwrap();

    let expected = NavigationState::single(
        ParsedRoute::new("Profile")
            .with_param("id", "42")
            .with_state(NavigationState::single(
                ParsedRoute::new("Edit")
                    .with_param("id", "42")
                    .with_path("/user/42/edit"),
            )),
    );
    assert_eq!(state, expected);
}

#[test]
fn test_unmatched_path_is_none() {
    assert_eq!(resolve("/user", &profile_config()), None);
    assert_eq!(resolve("/user/42/edit/extra", &profile_config()), None);
}

#[test]
fn test_static_beats_dynamic_regardless_of_declaration_order() {
    let config = LinkingConfig::new()
        .with_screen("User", "user/:id")
        .with_screen("NewUser", "user/new");

    assert_eq!(resolve("/user/new", &config).unwrap().screen_chain(), vec!["NewUser"]);
    assert_eq!(resolve("/user/7", &config).unwrap().screen_chain(), vec!["User"]);
}

#[test]
fn test_wildcard_loses_to_everything_else() {
    let config = LinkingConfig::new().with_screen(
        "Foo",
        ScreenOptions::new().with_screen(
            "Bar",
            ScreenOptions::new()
                .with_path("/bar/:id/")
                .with_screen("404", "*")
                .with_screen("UserProfile", ":userSlug")
                .with_screen("Test", "test"),
        ),
    );

    let state = resolve("/bar/42/test", &config).unwrap();
    assert_eq!(state.screen_chain(), vec!["Foo", "Bar", "Test"]);

    let state = resolve("/bar/42/jane", &config).unwrap();
    assert_eq!(state.screen_chain(), vec!["Foo", "Bar", "UserProfile"]);
    assert_eq!(
        state.focused_route().unwrap().param("userSlug"),
        Some(&ParamValue::from("jane"))
    );

    let state = resolve("/bar/42/jane/posts", &config).unwrap();
    assert_eq!(state.screen_chain(), vec!["Foo", "Bar", "404"]);
    assert_eq!(state.focused_route().unwrap().params, Some(Params::new().with("id", "42")));
}

#[test]
fn test_not_found_is_the_last_resort() {
    let config = LinkingConfig::new()
        .with_screen("+not-found", "*not-found")
        .with_screen("[...rest]", "docs/*rest");

    let state = resolve("/docs/a/b", &config).unwrap();
    assert_eq!(state.screen_chain(), vec!["[...rest]"]);
    assert_eq!(
        state.focused_route().unwrap().param("rest"),
        Some(&ParamValue::from(vec!["a", "b"]))
    );

    let state = resolve("/elsewhere", &config).unwrap();
    assert_eq!(state.screen_chain(), vec!["+not-found"]);
    assert_eq!(
        state.focused_route().unwrap().param("not-found"),
        Some(&ParamValue::from(vec!["elsewhere"]))
    );
}

#[test]
fn test_nearest_parent_wildcard_for_unmatched_paths() {
    let config = LinkingConfig::new().with_screen(
        "Foo",
        ScreenOptions::new()
            .with_screen(
                "Bar",
                ScreenOptions::new().with_path("/bar/:id/").with_screen("Baz", "baz"),
            )
            .with_screen("404", "*"),
    );

    let state = resolve("/bar/42/baz/test", &config).unwrap();
    let expected = NavigationState::single(ParsedRoute::new("Foo").with_state(NavigationState::single(
        ParsedRoute::new("404").with_path("/bar/42/baz/test"),
    )));
    assert_eq!(state, expected);
}

#[test]
fn test_groups_are_optional_in_urls() {
    let config = LinkingConfig::new().with_screen(
        "(tabs)",
        ScreenOptions::new()
            .with_path("(tabs)")
            .with_screen("index", "")
            .with_screen("settings", "settings"),
    );

    assert_eq!(
        resolve("/settings", &config).unwrap().screen_chain(),
        vec!["(tabs)", "settings"]
    );
    assert_eq!(
        resolve("/(tabs)/settings", &config).unwrap().screen_chain(),
        vec!["(tabs)", "settings"]
    );
    assert_eq!(resolve("/", &config).unwrap().screen_chain(), vec!["(tabs)", "index"]);
}

#[rstest]
#[case("")]
#[case("/")]
#[case("?foo=42")]
fn test_empty_path_matches_empty_pattern(#[case] path: &str) {
    let config = LinkingConfig::new().with_screen(
        "Foo",
        ScreenOptions::new().with_screen("Foe", "foe").with_screen(
            "Bar",
            ScreenOptions::new().with_screen("Qux", "").with_screen("Baz", "baz"),
        ),
    );

    let state = resolve(path, &config).unwrap();
    assert_eq!(state.screen_chain(), vec!["Foo", "Bar", "Qux"]);
    assert_eq!(state.focused_route().unwrap().path.as_deref(), Some(path));
}

#[test]
fn test_empty_path_without_empty_pattern_is_none() {
    let config = LinkingConfig::new().with_screen(
        "Foo",
        ScreenOptions::new().with_screen("Foe", "foe").with_screen(
            "Bar",
            ScreenOptions::new()
                .with_path("bar")
                .with_screen("Qux", ""),
        ),
    );

    assert_eq!(resolve("", &config), None);
}

#[test]
fn test_empty_path_prefers_optional_param_over_wildcard() {
    let config = LinkingConfig::new()
        .with_screen("Missing", "*")
        .with_screen("Page", ":page?");

    assert_eq!(resolve("/", &config).unwrap().screen_chain(), vec!["Page"]);
}

#[test]
fn test_initial_route_at_top_level() {
    let config = LinkingConfig::new().with_initial_route("Boo").with_screen(
        "Foo",
        ScreenOptions::new().with_screen("Foe", "foe").with_screen(
            "Bar",
            ScreenOptions::new().with_screen("Baz", "baz"),
        ),
    );

    let state = resolve("/baz", &config).unwrap();
    let expected = NavigationState::new(vec![
        ParsedRoute::new("Boo"),
        ParsedRoute::new("Foo").with_state(NavigationState::single(ParsedRoute::new("Bar").with_state(
            NavigationState::single(ParsedRoute::new("Baz").with_path("/baz")),
        ))),
    ])
    .with_index(1);

    assert_eq!(state, expected);
}

#[test]
fn test_initial_route_is_not_duplicated_when_matched() {
    let config = LinkingConfig::new().with_screen(
        "Foo",
        ScreenOptions::new()
            .with_initial_route("Foe")
            .with_screen("Foe", ScreenOptions::new().with_screen("Baz", "baz"))
            .with_screen("Bar", "bar"),
    );

    let state = resolve("/baz", &config).unwrap();
    assert_eq!(state.screen_chain(), vec!["Foo", "Foe", "Baz"]);
    assert_eq!(state.routes[0].state.as_ref().unwrap().index, None);
}

#[test]
fn test_initial_route_receives_path_params_only() {
    let config = LinkingConfig::new().with_screen(
        "Bar",
        ScreenOptions::new().with_path("bar/:type/:fruit").with_screen(
            "Baz",
            ScreenOptions::new()
                .with_initial_route("Bos")
                .with_screen("Bos", ScreenOptions::new().with_path("bos").exact())
                .with_screen(
                    "Bis",
                    ScreenOptions::new()
                        .with_path("bis/:author")
                        .with_parse("author", |v: &str| {
                            let mut chars = v.chars();
                            match chars.next() {
                                Some(first) => first.to_uppercase().chain(chars).collect(),
                                None => String::new(),
                            }
                        }),
                ),
        ),
    );

    let state = resolve("/bar/sweet/apple/bis/jane?answer=42", &config).unwrap();

    let path_params = Params::new()
        .with("type", "sweet")
        .with("fruit", "apple")
        .with("author", "Jane");
    assert_eq!(state.routes[0].params, Some(path_params.clone()));

    let baz = state.routes[0].state.as_ref().unwrap();
    let baz_state = baz.routes[0].state.as_ref().unwrap();
    assert_eq!(baz_state.index, Some(1));
    assert_eq!(baz_state.routes[0].name, "Bos");
    assert_eq!(baz_state.routes[0].params, Some(path_params.clone()));
    assert_eq!(
        baz_state.routes[1].params,
        Some(path_params.with("answer", "42"))
    );
}

#[test]
fn test_parse_hooks_merge_along_the_chain() {
    let config = LinkingConfig::new().with_screen(
        "Foo",
        ScreenOptions::new()
            .with_path("foo/:id")
            .with_parse("id", |v: &str| format!("foo-{v}"))
            .with_parse("page", |v: &str| format!("page-{v}"))
            .with_screen(
                "Bar",
                ScreenOptions::new()
                    .with_path("bar")
                    .with_parse("id", |v: &str| format!("bar-{v}")),
            ),
    );

    let state = resolve("/foo/1/bar?page=2", &config).unwrap();
    let focused = state.focused_route().unwrap();
    assert_eq!(focused.param("id"), Some(&ParamValue::from("bar-1")));
    assert_eq!(focused.param("page"), Some(&ParamValue::from("page-2")));
}

#[rstest]
#[case("/foo/bar/bar_%23_foo", "bar_#_foo")]
#[case("/foo/bar/bar_%2F_foo", "bar_/_foo")]
#[case("/foo/bar/%E0%A4%A", "%E0%A4%A")]
fn test_params_are_decoded(#[case] path: &str, #[case] id: &str) {
    let config = LinkingConfig::new().with_screen(
        "Foo",
        ScreenOptions::new().with_path("foo").with_screen("Bar", "/bar/:id"),
    );

    let state = resolve(path, &config).unwrap();
    assert_eq!(state.focused_route().unwrap().param("id"), Some(&ParamValue::from(id)));
}

#[rstest]
#[case("/foos/5", vec!["Foe", "Bis"])]
#[case("/foos/5/6", vec!["Foe", "Bas"])]
#[case("/foo", vec!["Foe", "Foo"])]
fn test_more_exhaustive_patterns(#[case] path: &str, #[case] chain: Vec<&str>) {
    let config = LinkingConfig::new().with_screen(
        "Foe",
        ScreenOptions::new()
            .with_path("/")
            .with_initial_route("Foo")
            .with_screen("Foo", "foo")
            .with_screen("Bis", "foos/:id")
            .with_screen("Bas", "foos/:id/:nip"),
    );

    assert_eq!(resolve(path, &config).unwrap().screen_chain(), chain);
}

#[rstest]
#[case("/foos/5/res/20", Some("5"), Some("20"))]
#[case("/foos/res/20", None, Some("20"))]
#[case("/foos/res", None, None)]
fn test_optional_params_in_the_middle(
    #[case] path: &str,
    #[case] id: Option<&str>,
    #[case] nip: Option<&str>,
) {
    let config = LinkingConfig::new().with_screen("Bas", "foos/:id?/res/:nip?");

    let state = resolve(path, &config).unwrap();
    let focused = state.focused_route().unwrap();
    assert_eq!(focused.param("id"), id.map(ParamValue::from).as_ref());
    assert_eq!(focused.param("nip"), nip.map(ParamValue::from).as_ref());
}

#[test]
fn test_root_prefix() {
    let config = LinkingConfig::new()
        .with_path("foo")
        .with_screen("Foo", ScreenOptions::new().with_screen("Fruits", "fruits/:fruit"));

    let state = resolve("foo/fruits/apple", &config).unwrap();
    assert_eq!(state.screen_chain(), vec!["Foo", "Fruits"]);
    assert_eq!(state.focused_route().unwrap().path.as_deref(), Some("foo/fruits/apple"));

    assert_eq!(resolve("/bar/fruits/apple", &config), None);
}

#[test]
fn test_absolute_urls_use_pathname_only() {
    let state = resolve("https://example.com/user/42/edit?tab=posts", &profile_config()).unwrap();

    assert_eq!(state.screen_chain(), vec!["Profile", "Edit"]);
    assert_eq!(
        state.focused_route().unwrap().param("tab"),
        Some(&ParamValue::from("posts"))
    );
}

#[test]
fn test_repeated_query_keys_become_lists() {
    let state = resolve("/user/42?tag=a&tag=b", &profile_config()).unwrap();

    assert_eq!(
        state.focused_route().unwrap().param("tag"),
        Some(&ParamValue::from(vec!["a", "b"]))
    );
}

#[test]
fn test_conflicting_patterns_are_rejected() {
    let config = LinkingConfig::new().with_screen(
        "Foo",
        ScreenOptions::new()
            .with_screen(
                "Bar",
                ScreenOptions::new().with_path("/bar/:id/").with_screen("Baz", "baz"),
            )
            .with_screen("Bax", "/bar/:id/baz"),
    );

    let err = get_state_from_path("/bar/42/baz", &config).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Found conflicting screens with the same pattern. The pattern 'bar/:id/baz' resolves to both 'Foo > Bax' and 'Foo > Bar > Baz'. Patterns must be unique and cannot resolve to more than one screen."
    );
}

#[test]
fn test_invalid_config_shapes_are_rejected() {
    let err = LinkingConfig::from_json(r#"{ "path": 42 }"#).unwrap_err();
    assert!(matches!(err, LinkingError::InvalidConfigShape(_)));

    let config = LinkingConfig::new().with_screen("Foo", ScreenOptions::new().exact());
    assert!(matches!(
        get_state_from_path("/", &config),
        Err(LinkingError::InvalidConfigShape(_))
    ));
}

#[test]
fn test_config_loaded_from_json_resolves() {
    let config = LinkingConfig::from_json(
        r#"{
            "screens": {
                "Profile": {
                    "screens": {
                        "Details": "user/:id",
                        "Edit": { "path": "user/:id/edit" }
                    }
                }
            }
        }"#,
    )
    .unwrap();

    assert_eq!(
        resolve("/user/42/edit", &config).unwrap().screen_chain(),
        vec!["Profile", "Edit"]
    );
}

#[test]
fn test_previous_segments_break_group_ties() {
    let config = Arc::new(
        LinkingConfig::new()
            .with_screen(
                "(feed)",
                ScreenOptions::new().with_path("(feed)").with_screen("[user]", ":user"),
            )
            .with_screen(
                "(explore)",
                ScreenOptions::new().with_path("(explore)").with_screen("[user]", ":user"),
            ),
    );
    let resolver = Resolver::new();

    let state = resolver
        .get_state_from_path_with_segments("/bacon", &config, &["(explore)".to_string()])
        .unwrap()
        .unwrap();
    assert_eq!(state.screen_chain(), vec!["(explore)", "[user]"]);

    let state = resolver
        .get_state_from_path_with_segments("/bacon", &config, &["(feed)".to_string()])
        .unwrap()
        .unwrap();
    assert_eq!(state.screen_chain(), vec!["(feed)", "[user]"]);
}

#[test]
fn test_malformed_url_resolves_as_empty_path() {
    let config = LinkingConfig::new()
        .with_screen("Home", "")
        .with_screen("Other", "other");

    let state = resolve("http://[::1/other", &config).unwrap();
    assert_eq!(state.screen_chain(), vec!["Home"]);
    assert_eq!(state.focused_route().unwrap().params, None);
}
