//! SheetPress Configuration System
//!
//! This crate provides TOML-based configuration with environment variable
//! override support. Tokens and credentials are carried inside the config
//! struct and passed into each operation explicitly, never read from
//! ambient global state, so tests can inject fixtures.

use serde::{Deserialize, Serialize};
use sp_common::{RefreshPriority, TableDescriptor, TableRole};
use std::path::Path;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Root application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub auth: AuthTokens,
    pub google: GoogleConfig,
    pub github: GitHubConfig,

    /// The table registry exposed through the config endpoint and used by
    /// batch publishing.
    pub tables: Vec<TableDescriptor>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            auth: AuthTokens::default(),
            google: GoogleConfig::default(),
            github: GitHubConfig::default(),
            tables: default_tables(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tables.is_empty() {
            return Err(ConfigError::ValidationError(
                "table registry cannot be empty".to_string(),
            ));
        }
        for table in &self.tables {
            if table.name.is_empty() {
                return Err(ConfigError::ValidationError(
                    "table name cannot be empty".to_string(),
                ));
            }
        }
        if !self.github.repo.is_empty() && !self.github.repo.contains('/') {
            return Err(ConfigError::ValidationError(format!(
                "github repo must be owner/name, got '{}'",
                self.github.repo
            )));
        }
        Ok(())
    }

    /// Names of all active tables, in registry order.
    pub fn active_table_names(&self) -> Vec<String> {
        self.tables
            .iter()
            .filter(|t| t.active)
            .map(|t| t.name.clone())
            .collect()
    }

    /// Look up a table descriptor by name.
    pub fn find_table(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            cors_origins: vec!["*".to_string()],
        }
    }
}

/// Static caller secrets.
///
/// The admin token grants both admin and viewer capability; the viewer
/// token grants read-only capability. Comparison is plain equality.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthTokens {
    pub admin_token: String,
    pub viewer_token: String,
}

/// Google Sheets access configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    /// Spreadsheet to read tables from
    pub spreadsheet_id: String,
    /// Raw service-account key JSON (the Google key-file shape)
    pub service_account_json: String,
    /// Sheets API base URL (overridable for tests)
    pub api_base: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            service_account_json: String::new(),
            api_base: "https://sheets.googleapis.com".to_string(),
        }
    }
}

/// GitHub publishing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Target repository, "owner/name"
    pub repo: String,
    /// Target branch for commits
    pub branch: String,
    /// Personal access token used for the contents API
    pub token: String,
    /// GitHub API base URL (overridable for tests)
    pub api_base: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            repo: String::new(),
            branch: "main".to_string(),
            token: String::new(),
            api_base: "https://api.github.com".to_string(),
        }
    }
}

/// The canonical table registry.
///
/// Daily tables hold fast-moving content; weekly tables are mostly static.
/// Contact and about pages require the admin editorial role.
pub fn default_tables() -> Vec<TableDescriptor> {
    use RefreshPriority::{Daily, Weekly};
    use TableRole::{Admin, Editor};

    vec![
        TableDescriptor::new("menu", Daily, Editor),
        TableDescriptor::new("price", Daily, Editor),
        TableDescriptor::new("offer", Daily, Editor),
        TableDescriptor::new("booking", Daily, Editor),
        TableDescriptor::new("zakazfoods", Daily, Editor),
        TableDescriptor::new("rules", Weekly, Editor),
        TableDescriptor::new("reviews", Weekly, Editor),
        TableDescriptor::new("contacts", Weekly, Admin),
        TableDescriptor::new("infrastructure", Weekly, Editor),
        TableDescriptor::new("roomtypes", Weekly, Editor),
        TableDescriptor::new("gallery", Weekly, Editor),
        TableDescriptor::new("activities", Weekly, Editor),
        TableDescriptor::new("faq", Weekly, Editor),
        TableDescriptor::new("aboutus", Weekly, Admin),
    ]
}
