use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, UpError};

pub const DEFAULT_BASE_URL: &str = "https://api.up.com.au/api/v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Upper bound on pages followed in a single listing.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    #[serde(default)]
    pub page_size: Option<u32>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_max_pages() -> usize {
    1000
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            max_pages: default_max_pages(),
            page_size: None,
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("upbank")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Result<Settings> {
    load_settings_from(&settings_path())
}

pub fn load_settings_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = std::fs::read_to_string(path)?;
    let settings: Settings = serde_json::from_str(&content)
        .map_err(|e| UpError::Settings(format!("{}: {e}", path.display())))?;
    if settings.max_pages == 0 {
        return Err(UpError::Settings("max_pages must be at least 1".to_string()));
    }
    Ok(settings)
}
