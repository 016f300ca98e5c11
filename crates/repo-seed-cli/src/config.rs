use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Optional defaults file. Flags always override file values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Default author name for the license and README copyright line.
    pub author: Option<String>,
    /// Default license (display name or canonical key).
    pub license: Option<String>,
    /// Override the GitHub API base URL.
    pub api_base_url: Option<String>,
    /// Create repositories as private by default.
    #[serde(default)]
    pub private: bool,
}

/// Config file path: `~/.config/repo-seeder/config.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("repo-seeder").join("config.toml"))
}

/// Load config from file, falling back to defaults if missing.
pub fn load_config() -> AppConfig {
    if let Some(path) = config_path()
        && let Ok(contents) = std::fs::read_to_string(&path)
    {
        if let Ok(config) = toml::from_str::<AppConfig>(&contents) {
            return config;
        }
        eprintln!(
            "warning: failed to parse config at {}, using defaults",
            path.display()
        );
    }

    AppConfig::default()
}
