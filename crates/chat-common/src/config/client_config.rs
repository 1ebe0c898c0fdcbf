//! Client configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use std::env;
use std::str::FromStr;

/// Main client configuration
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub app: AppSettings,
    pub cache: CacheConfig,
    pub gateway: GatewayConfig,
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
    /// Emit JSON logs instead of the pretty format
    pub log_json: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            env: Environment::default(),
            log_json: false,
        }
    }
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            _ => Err(ConfigError::InvalidValue("APP_ENV", s.to_string())),
        }
    }
}

/// Entity cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached messages; 0 disables message caching
    pub message_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            message_capacity: default_message_capacity(),
        }
    }
}

/// Packet processing configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Number of packets handled concurrently by the worker pool
    pub max_concurrent_handlers: usize,
    /// Capacity of the inbound packet channel
    pub packet_buffer: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_concurrent_handlers: default_max_concurrent_handlers(),
            packet_buffer: default_packet_buffer(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "chat-client".to_string()
}

fn default_message_capacity() -> usize {
    50_000
}

fn default_max_concurrent_handlers() -> usize {
    8
}

fn default_packet_buffer() -> usize {
    1024
}

/// Read and parse an optional variable, failing on unparsable values
fn parse_var<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        Err(_) => Ok(None),
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// Every variable is optional; unset values fall back to defaults.
    ///
    /// # Errors
    /// Returns an error if a variable is set to a value that cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let config = Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: match env::var("APP_ENV") {
                    Ok(raw) => raw.parse()?,
                    Err(_) => Environment::default(),
                },
                log_json: parse_var("LOG_JSON")?.unwrap_or(false),
            },
            cache: CacheConfig {
                message_capacity: parse_var("CACHE_MESSAGE_CAPACITY")?
                    .unwrap_or_else(default_message_capacity),
            },
            gateway: GatewayConfig {
                max_concurrent_handlers: parse_var("GATEWAY_MAX_CONCURRENT_HANDLERS")?
                    .unwrap_or_else(default_max_concurrent_handlers),
                packet_buffer: parse_var("GATEWAY_PACKET_BUFFER")?
                    .unwrap_or_else(default_packet_buffer),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gateway.max_concurrent_handlers == 0 {
            return Err(ConfigError::InvalidValue(
                "GATEWAY_MAX_CONCURRENT_HANDLERS",
                "0".to_string(),
            ));
        }
        if self.gateway.packet_buffer == 0 {
            return Err(ConfigError::InvalidValue("GATEWAY_PACKET_BUFFER", "0".to_string()));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
