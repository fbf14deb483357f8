use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use navlink_router::{LinkingConfig, Resolver};

/// Prints the resolved state as JSON. Returns `false` when nothing matched.
pub fn execute(path: &str, config: LinkingConfig, base_url: Option<String>) -> Result<bool> {
    let resolver = match base_url {
        Some(base_url) => Resolver::new().with_base_url(base_url),
        None => Resolver::new(),
    };

    let state = resolver
        .get_state_from_path(path, &Arc::new(config))
        .context("Failed to compile linking configuration")?;

    match state {
        Some(state) => {
            println!("{}", serde_json::to_string_pretty(&state)?);
            Ok(true)
        }
        None => {
            eprintln!("{} No route matches {}", "✗".red(), path.bold());
            Ok(false)
        }
    }
}
