use chrono::NaiveDate;
use serde::Deserialize;
use std::path::PathBuf;

/// Root application configuration. Loaded from environment variables
/// with the prefix `ENGAGEMENT_COPILOT__` and an optional
/// `engagement-copilot.toml` in the working directory.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub brief: BriefConfig,
}

/// Where the CSV inputs live and how example data is synthesized.
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_days")]
    pub days: u32,
    #[serde(default = "default_anchor_date")]
    pub anchor_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BriefConfig {
    #[serde(default = "default_window_days")]
    pub window_days: u32,
}

// Default functions
fn default_data_dir() -> PathBuf {
    PathBuf::from("ingest/example_data")
}
fn default_seed() -> u64 {
    42
}
fn default_days() -> u32 {
    28
}
fn default_anchor_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 28).unwrap_or_default()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_metrics_port() -> u16 {
    9091
}
fn default_window_days() -> u32 {
    7
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            seed: default_seed(),
            days: default_days(),
            anchor_date: default_anchor_date(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_metrics_port(),
        }
    }
}

impl Default for BriefConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
            brief: BriefConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the optional config file and environment
    /// variables. Environment values win over the file.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("engagement-copilot").required(false))
            .add_source(
                config::Environment::with_prefix("ENGAGEMENT_COPILOT")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
