use serde::Deserialize;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub adapters: AdaptersConfig,
    pub evaluation: EvaluationConfig,
    pub reports: ReportsConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Where the two classifiers are reached
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdaptersConfig {
    pub old: EndpointConfig,
    pub rag: EndpointConfig,
    /// `max_results` sent with every search request
    pub max_results: u32,
    /// Serve both approaches from a recorded fixture instead of HTTP
    pub replay_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub base_url: Option<String>,
    pub path: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    pub slow_threshold_ms: f64,
    /// Concurrent cases; 0 means one per available CPU
    pub workers: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReportsConfig {
    pub html: Option<PathBuf>,
    pub json: Option<PathBuf>,
    pub junit_xml: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Prometheus text file written at the end of a run
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for AdaptersConfig {
    fn default() -> Self {
        Self {
            old: EndpointConfig::default(),
            rag: EndpointConfig::default(),
            max_results: 20,
            replay_file: None,
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            path: "/api/search".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            slow_threshold_ms: 5000.0,
            workers: 1,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Parse configuration from TOML text, without files or environment
    pub fn from_toml(content: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(content, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
