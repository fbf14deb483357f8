//! # navlink router
//!
//! Bidirectional resolution between URLs and nested navigation state.
//!
//! An application describes its screens as a nested [`LinkingConfig`]. Given
//! a path such as `/user/42/edit?tab=posts`, the resolver finds the chain of
//! nested screens that should be active and the parameters for each of them.
//! Given a [`NavigationState`], the serializer produces the canonical URL.
//!
//! Supported pattern segments:
//! - Static text (`about`)
//! - Parameters (`:id`, optional `:id?`)
//! - Catch-alls (`*rest`, optional `*rest?`, unnamed `*`)
//! - Groups (`(tabs)`), invisible in generated paths by default
//!
//! ## Example
//!
//! ```
//! use navlink_router::{get_path_from_state, get_state_from_path, LinkingConfig, ScreenOptions};
//!
//! let config = LinkingConfig::new().with_screen(
//!     "Profile",
//!     ScreenOptions::new()
//!         .with_screen("Details", "user/:id")
//!         .with_screen("Edit", "user/:id/edit"),
//! );
//!
//! let state = get_state_from_path("/user/42/edit", &config).unwrap().unwrap();
//! assert_eq!(state.screen_chain(), vec!["Profile", "Edit"]);
//!
//! let path = get_path_from_state(&state, &config).unwrap();
//! assert_eq!(path, "/user/42/edit");
//! ```

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tracing::debug;

// ============================================================================
// Module Declarations
// ============================================================================

pub mod codec;
pub mod config;
pub mod error;
pub mod params;
pub mod path;
pub mod query;
mod resolve;
pub mod route;
mod serialize;
pub mod state;

pub use config::{LinkingConfig, ScreenConfig, ScreenOptions, Screens, MAX_CONFIG_DEPTH};
pub use error::{LinkingError, Result};
pub use params::{Hooks, ParamValue, Params};
pub use resolve::HASH_PARAM;
pub use route::{compile, CompiledRoutes, RouteKind, RouteRecord, RouteSegment};
pub use state::{NavigationState, ParsedRoute};

// ============================================================================
// Resolver
// ============================================================================

/// The last compiled configuration
#[derive(Debug)]
struct CacheEntry {
    config: Arc<LinkingConfig>,
    previous_segments: Vec<String>,
    routes: Arc<CompiledRoutes>,
}

/// Resolves paths and states against a configuration, caching the compiled
/// route table
///
/// The cache holds one entry keyed by configuration identity (the `Arc`
/// pointer) and the previous segments. Any change to either key replaces the
/// entry as a whole.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use navlink_router::{LinkingConfig, Resolver};
///
/// let config = Arc::new(LinkingConfig::new().with_screen("Settings", "settings"));
/// let resolver = Resolver::new().with_base_url("/app");
///
/// let state = resolver.get_state_from_path("/app/settings", &config).unwrap().unwrap();
/// assert_eq!(state.screen_chain(), vec!["Settings"]);
/// assert_eq!(resolver.get_path_from_state(&state, &config).unwrap(), "/app/settings");
/// ```
#[derive(Debug, Default)]
pub struct Resolver {
    base_url: Option<String>,
    cache: ArcSwapOption<CacheEntry>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the deployment base URL stripped from inputs and prepended to outputs
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Compiles `config`, reusing the cached table when possible
    pub fn compile(&self, config: &Arc<LinkingConfig>) -> Result<Arc<CompiledRoutes>> {
        self.compile_with_segments(config, &[])
    }

    /// Compiles `config` with ordering hints from the displayed segments
    pub fn compile_with_segments(
        &self,
        config: &Arc<LinkingConfig>,
        previous_segments: &[String],
    ) -> Result<Arc<CompiledRoutes>> {
        if let Some(entry) = self.cache.load_full() {
            if Arc::ptr_eq(&entry.config, config) && entry.previous_segments == previous_segments {
                debug!("route table cache hit");
                return Ok(Arc::clone(&entry.routes));
            }
        }

        debug!(?previous_segments, "route table cache miss, compiling");
        let routes = Arc::new(compile(config, previous_segments)?);
        self.store(config, previous_segments, &routes);
        Ok(routes)
    }

    fn store(&self, config: &Arc<LinkingConfig>, previous_segments: &[String], routes: &Arc<CompiledRoutes>) {
        self.cache.store(Some(Arc::new(CacheEntry {
            config: Arc::clone(config),
            previous_segments: previous_segments.to_vec(),
            routes: Arc::clone(routes),
        })));
    }

    /// Resolves a path into navigation state
    ///
    /// `Ok(None)` means no route matches. `Err` is reserved for invalid
    /// configurations.
    pub fn get_state_from_path(
        &self,
        path: &str,
        config: &Arc<LinkingConfig>,
    ) -> Result<Option<NavigationState>> {
        self.get_state_from_path_with_segments(path, config, &[])
    }

    pub fn get_state_from_path_with_segments(
        &self,
        path: &str,
        config: &Arc<LinkingConfig>,
        previous_segments: &[String],
    ) -> Result<Option<NavigationState>> {
        let routes = self.compile_with_segments(config, previous_segments)?;
        Ok(resolve::resolve_path(path, &routes, self.base_url()))
    }

    /// Serializes navigation state into a canonical path
    pub fn get_path_from_state(&self, state: &NavigationState, config: &Arc<LinkingConfig>) -> Result<String> {
        // Ordering hints do not affect serialization; any entry for this config will do
        let routes = match self.cache.load_full() {
            Some(entry) if Arc::ptr_eq(&entry.config, config) => Arc::clone(&entry.routes),
            _ => self.compile(config)?,
        };

        Ok(serialize::serialize_state(state, &routes, self.base_url()))
    }
}

/// Resolves a path without caching
pub fn get_state_from_path(path: &str, config: &LinkingConfig) -> Result<Option<NavigationState>> {
    let routes = compile(config, &[])?;
    Ok(resolve::resolve_path(path, &routes, None))
}

/// Serializes a state without caching
pub fn get_path_from_state(state: &NavigationState, config: &LinkingConfig) -> Result<String> {
    let routes = compile(config, &[])?;
    Ok(serialize::serialize_state(state, &routes, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    fn profile_config() -> Arc<LinkingConfig> {
        Arc::new(
            LinkingConfig::new().with_screen(
                "Profile",
                ScreenOptions::new()
                    .with_screen("Details", "user/:id")
                    .with_screen("Edit", "user/:id/edit"),
            ),
        )
    }

    #[test]
    #[traced_test]
    fn test_cache_reuses_compiled_routes() {
        let resolver = Resolver::new();
        let config = profile_config();

        let first = resolver.compile(&config).unwrap();
        let second = resolver.compile(&config).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(logs_contain("route table cache hit"));
    }

    #[test]
    fn test_cache_invalidated_by_new_config() {
        let resolver = Resolver::new();
        let first = resolver.compile(&profile_config()).unwrap();
        let second = resolver.compile(&profile_config()).unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_cache_invalidated_by_segments() {
        let resolver = Resolver::new();
        let config = profile_config();

        let first = resolver.compile(&config).unwrap();
        let second = resolver
            .compile_with_segments(&config, &["(tabs)".to_string()])
            .unwrap();
        let third = resolver
            .compile_with_segments(&config, &["(tabs)".to_string()])
            .unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&second, &third));
    }

    #[test]
    fn test_failed_compile_keeps_previous_entry() {
        let resolver = Resolver::new();
        let good = profile_config();
        let bad = Arc::new(LinkingConfig::new().with_path(":id"));

        let first = resolver.compile(&good).unwrap();
        assert!(resolver.compile(&bad).is_err());
        let again = resolver.compile(&good).unwrap();

        assert!(Arc::ptr_eq(&first, &again));
    }

    #[test]
    fn test_resolver_round_trip_with_base_url() {
        let resolver = Resolver::new().with_base_url("/app-prefix/");
        let config = profile_config();

        let state = resolver
            .get_state_from_path("/app-prefix/user/42", &config)
            .unwrap()
            .unwrap();
        assert_eq!(state.screen_chain(), vec!["Profile", "Details"]);
        assert_eq!(
            resolver.get_path_from_state(&state, &config).unwrap(),
            "/app-prefix/user/42"
        );
    }
}
