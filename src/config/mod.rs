//! Layered configuration: `config/default`, `config/local`, then `APP__*`
//! environment variables

mod app_config;

pub use app_config::{
    AdaptersConfig, AppConfig, EndpointConfig, EvaluationConfig, LogFormat, LoggingConfig,
    MetricsConfig, ReportsConfig,
};
