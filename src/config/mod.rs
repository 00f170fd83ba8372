//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, ClassifierConfig, CorsConfig, DatabaseConfig, LogFormat, LoggingConfig,
    ServerConfig, UploadConfig,
};
