//! Configuration loading and management
//!
//! Configuration comes from a YAML file (default `config.yaml`, or the path in
//! `MARKET_CONFIG`), then environment variables override individual values.
//! Every field has a default except the token secret, which must be provided.

use axum::http::{HeaderName, StatusCode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Environment variable naming an alternative configuration file
pub const CONFIG_PATH_ENV: &str = "MARKET_CONFIG";

/// Errors raised while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Complete service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub token: TokenConfig,
    pub password: PasswordConfig,
    pub storage: StorageConfig,
    pub cors: CorsConfig,
    pub logging: LoggingConfig,
}

/// Listening address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Token signing and gate behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// HS256 shared secret. Never serialized back out.
    #[serde(skip_serializing)]
    pub secret: String,
    pub ttl_seconds: u64,
    /// Header carrying the token on protected routes
    pub header: String,
    /// Status of the gate's rejection payload
    pub gate_failure_status: u16,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            ttl_seconds: 3600,
            header: "x-access-token".to_string(),
            gate_failure_status: 200,
        }
    }
}

impl TokenConfig {
    pub fn header_name(&self) -> Result<HeaderName, ConfigError> {
        HeaderName::from_bytes(self.header.to_ascii_lowercase().as_bytes())
            .map_err(|_| ConfigError::Invalid(format!("token.header '{}' is not a header name", self.header)))
    }

    pub fn failure_status(&self) -> Result<StatusCode, ConfigError> {
        StatusCode::from_u16(self.gate_failure_status).map_err(|_| {
            ConfigError::Invalid(format!(
                "token.gate_failure_status {} is not an HTTP status",
                self.gate_failure_status
            ))
        })
    }

    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::try_from(self.ttl_seconds).unwrap_or(i64::MAX))
    }
}

/// Password hashing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    /// bcrypt cost factor
    pub cost: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            cost: crate::core::password::DEFAULT_COST,
        }
    }
}

/// Which store backs the service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Mongodb,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub mongodb: MongoConfig,
}

/// MongoDB connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub database: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 27017,
            user: None,
            password: None,
            database: "market".to_string(),
        }
    }
}

impl MongoConfig {
    /// Connection string
    pub fn uri(&self) -> String {
        match (&self.user, &self.password) {
            (Some(user), Some(password)) => format!(
                "mongodb://{}:{}@{}:{}/{}?authSource=admin&w=1",
                user, password, self.host, self.port, self.database
            ),
            _ => format!(
                "mongodb://{}:{}/{}?w=1",
                self.host, self.port, self.database
            ),
        }
    }
}

/// Cross-origin policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins; empty allows any origin
    pub allowed_origins: Vec<String>,
    /// Separator used when origins come from `ALLOWED_ORIGINS`
    pub origin_delimiter: String,
    pub allowed_methods: Vec<String>,
    /// Allowed request headers; empty allows any header
    pub allowed_headers: Vec<String>,
    pub exposed_headers: Vec<String>,
    pub allow_credentials: bool,
    pub max_age: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            origin_delimiter: ",".to_string(),
            allowed_methods: ["GET", "HEAD", "PUT", "PATCH", "POST", "DELETE"]
                .into_iter()
                .map(String::from)
                .collect(),
            allowed_headers: Vec::new(),
            exposed_headers: Vec::new(),
            allow_credentials: false,
            max_age: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

fn split_list(value: &str, delimiter: &str) -> Vec<String> {
    value
        .split(delimiter)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{} has an invalid value '{}'", key, value)))
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load from the default location, apply the process environment, validate.
    ///
    /// A missing file at the default path is not an error; a missing file at
    /// an explicitly configured path is.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_yaml_file(path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_yaml_file(DEFAULT_CONFIG_PATH)?
            }
            Err(_) => Self::default(),
        };

        config.apply_env(std::env::vars())?;
        config.validate()?;
        Ok(config)
    }

    /// Override values from environment-style pairs
    pub fn apply_env<I>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: Vec<(String, String)> = vars.into_iter().collect();

        // The delimiter must be known before origins are split.
        if let Some((_, delimiter)) = vars.iter().find(|(k, _)| k == "ORIGIN_DELIMITER") {
            self.cors.origin_delimiter = delimiter.clone();
        }

        for (key, value) in &vars {
            match key.as_str() {
                "SECRET" => self.token.secret = value.clone(),
                "PORT" => self.server.port = parse_env(key, value)?,
                "DB_HOST" => self.storage.mongodb.host = value.clone(),
                "DB_PORT" => self.storage.mongodb.port = parse_env(key, value)?,
                "DB_USER" => self.storage.mongodb.user = Some(value.clone()),
                "DB_PASS" => self.storage.mongodb.password = Some(value.clone()),
                "DB_NAME" => self.storage.mongodb.database = value.clone(),
                "ALLOWED_ORIGINS" => {
                    self.cors.allowed_origins = split_list(value, &self.cors.origin_delimiter)
                }
                "ALLOWED_METHODS" => self.cors.allowed_methods = split_list(value, ","),
                "ALLOWED_HEADERS" => self.cors.allowed_headers = split_list(value, ","),
                "EXPOSED_HEADERS" => self.cors.exposed_headers = split_list(value, ","),
                "ALLOW_CREDENTIALS" => self.cors.allow_credentials = parse_env(key, value)?,
                "MAX_AGE" => self.cors.max_age = Some(parse_env(key, value)?),
                _ => {}
            }
        }

        Ok(())
    }

    /// Reject configurations the service cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.secret.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "token.secret must be set (config file or SECRET)".to_string(),
            ));
        }
        self.token.header_name()?;
        self.token.failure_status()?;
        Ok(())
    }
}
