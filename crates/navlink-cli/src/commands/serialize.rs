use std::io::Read;
use std::sync::Arc;

use anyhow::{Context, Result};
use navlink_router::{LinkingConfig, NavigationState, Resolver};
use tracing::debug;

pub fn execute(source: &str, config: LinkingConfig, base_url: Option<String>) -> Result<()> {
    let content = read_source(source)?;
    let state: NavigationState =
        serde_json::from_str(&content).context("State is not a valid navigation state")?;
    debug!(screens = ?state.screen_chain(), "read navigation state");

    let resolver = match base_url {
        Some(base_url) => Resolver::new().with_base_url(base_url),
        None => Resolver::new(),
    };

    let path = resolver
        .get_path_from_state(&state, &Arc::new(config))
        .context("Failed to compile linking configuration")?;
    println!("{}", path);

    Ok(())
}

fn read_source(source: &str) -> Result<String> {
    if source == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read state from stdin")?;
        return Ok(content);
    }

    std::fs::read_to_string(source).with_context(|| format!("Failed to read {}", source))
}
