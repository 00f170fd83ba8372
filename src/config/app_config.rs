use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub database: DatabaseConfig,
    pub classifier: ClassifierConfig,
    pub upload: UploadConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
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

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite connection URL; the file is created when missing
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// ONNX model file; when unset or unloadable the random fallback is used
    pub model_path: Option<String>,
    /// Edge length of the square model input
    pub input_size: u32,
    /// Refuse to start instead of falling back when the model cannot be loaded
    pub allow_fallback: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub max_images: usize,
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins; empty allows any origin
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://skin_ai.db".to_string(),
            max_connections: 5,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            input_size: 224,
            allow_fallback: true,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_images: 3,
            max_body_bytes: 16 * 1024 * 1024,
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
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
