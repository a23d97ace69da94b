use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ErrorCode;
use crate::error_handler::DEFAULT_NAMESPACE;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShelfConfig {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub page: PageConfig,
    #[serde(default)]
    pub errors: ErrorsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default = "default_client_app")]
    pub client_app: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            lang: default_lang(),
            client_app: default_client_app(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageConfig {
    /// Placeholders shown while loading when no earlier page sets the count.
    #[serde(default = "default_placeholder_count")]
    pub placeholder_count: usize,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            placeholder_count: default_placeholder_count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorsConfig {
    /// Prefix of every error handler id.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for ErrorsConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
        }
    }
}

/// Path of the project config relative to `project_root`.
#[must_use]
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".shelf/config.toml")
}

pub fn load_config_file(path: &Path) -> Result<ShelfConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))
        .context(ErrorCode::ConfigReadFailed)?;

    toml::from_str::<ShelfConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
        .context(ErrorCode::ConfigParseError)
}

pub fn load_project_config(project_root: &Path) -> Result<Option<ShelfConfig>> {
    let path = project_config_path(project_root);
    if !path.exists() {
        return Ok(None);
    }
    load_config_file(&path).map(Some)
}

pub fn load_user_config() -> Result<Option<ShelfConfig>> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(None);
    };

    let path = config_dir.join("shelf/config.toml");
    if !path.exists() {
        return Ok(None);
    }
    load_config_file(&path).map(Some)
}

/// Project config if present, else the user config, else defaults.
///
/// Files are not merged; the first one found wins whole.
pub fn resolve_config(project_root: &Path) -> Result<ShelfConfig> {
    if let Some(config) = load_project_config(project_root)? {
        tracing::debug!(root = %project_root.display(), "using project config");
        return Ok(config);
    }
    if let Some(config) = load_user_config()? {
        tracing::debug!("using user config");
        return Ok(config);
    }
    Ok(ShelfConfig::default())
}

fn default_lang() -> String {
    "en-US".to_string()
}

fn default_client_app() -> String {
    "firefox".to_string()
}

const fn default_placeholder_count() -> usize {
    3
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}
