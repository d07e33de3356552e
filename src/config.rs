//! Configuration management for Prescription Console

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    /// Server root, e.g. `http://localhost:8080` (no `/api/prescriptions` suffix)
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SessionConfig {
    /// File holding the persisted credential document
    pub store_path: PathBuf,
}

/// Where chart data comes from
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticsSource {
    /// Server summary, falling back to client-side bucketing when unavailable
    Server,
    /// Always fetch records and bucket them locally
    Client,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub daily_window_days: u32,
    pub monthly_window_months: u32,
    pub source: AnalyticsSource,
    /// Number of records requested when aggregating client-side
    pub client_fetch_size: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ListConfig {
    pub page_size: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    /// Optional log directory; logs go to stderr when unset
    pub file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub list: ListConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix PRESCRIPTION_)
            .add_source(
                Environment::with_prefix("PRESCRIPTION")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            // Override API URL from PRESCRIPTION_API_URL if present
            .set_override_option("api.base_url", env::var("PRESCRIPTION_API_URL").ok())?
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a single explicit file, ignoring `config/`
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path))
            .add_source(
                Environment::with_prefix("PRESCRIPTION")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        let store_path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("prescription-console")
            .join("session.json");
        Self { store_path }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            daily_window_days: 7,
            monthly_window_months: 6,
            source: AnalyticsSource::Server,
            client_fetch_size: 1000,
        }
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: crate::views::list::DEFAULT_PAGE_SIZE,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}
