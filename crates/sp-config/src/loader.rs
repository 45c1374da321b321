//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "config.toml",
    "sheetpress.toml",
    "./config/config.toml",
    "/etc/sheetpress/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file() {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        self.apply_env_overrides(&mut config);
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
        }

        if let Ok(path) = env::var("SHEETPRESS_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        for path in CONFIG_PATHS {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        None
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&self, config: &mut AppConfig) {
        // HTTP
        if let Ok(val) = env::var("SHEETPRESS_HTTP_PORT") {
            if let Ok(port) = val.parse() {
                config.http.port = port;
            }
        }
        if let Ok(val) = env::var("SHEETPRESS_HTTP_HOST") {
            config.http.host = val;
        }
        if let Ok(val) = env::var("SHEETPRESS_CORS_ORIGINS") {
            config.http.cors_origins = val.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Caller tokens
        if let Ok(val) = env::var("SHEETPRESS_ADMIN_TOKEN") {
            config.auth.admin_token = val;
        }
        if let Ok(val) = env::var("SHEETPRESS_VIEWER_TOKEN") {
            config.auth.viewer_token = val;
        }

        // Google Sheets
        if let Ok(val) = env::var("SHEETPRESS_SPREADSHEET_ID") {
            config.google.spreadsheet_id = val;
        }
        if let Ok(val) = env::var("SHEETPRESS_SERVICE_ACCOUNT_JSON")
            .or_else(|_| env::var("GOOGLE_SERVICE_ACCOUNT_JSON"))
        {
            config.google.service_account_json = val;
        }
        if let Ok(val) = env::var("SHEETPRESS_SHEETS_API_BASE") {
            config.google.api_base = val;
        }

        // GitHub
        if let Ok(val) = env::var("SHEETPRESS_GITHUB_REPO") {
            config.github.repo = val;
        }
        if let Ok(val) = env::var("SHEETPRESS_GITHUB_BRANCH") {
            config.github.branch = val;
        }
        if let Ok(val) = env::var("SHEETPRESS_GITHUB_TOKEN").or_else(|_| env::var("GITHUB_TOKEN")) {
            config.github.token = val;
        }
        if let Ok(val) = env::var("SHEETPRESS_GITHUB_API_BASE") {
            config.github.api_base = val;
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
