use std::path::Path;

use anyhow::{Context, Result};
use navlink_router::LinkingConfig;
use serde::Deserialize;
use tracing::debug;

/// Project configuration (navlink.toml or navlink.json)
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    #[serde(default, alias = "baseUrl")]
    pub base_url: Option<String>,
    #[serde(default)]
    pub linking: LinkingConfig,
}

impl ProjectConfig {
    /// Parse project config from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Parse project config from JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load project config from file, picking the format by extension
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_toml(&content),
        };

        let config = config.with_context(|| format!("Invalid configuration in {}", path.display()))?;
        debug!(
            path = %path.display(),
            screens = config.linking.screens.len(),
            "loaded project configuration"
        );
        Ok(config)
    }
}
