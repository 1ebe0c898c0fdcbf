//! # chat-common
//!
//! Shared utilities including client configuration, error handling, and telemetry.

pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use config::{AppSettings, CacheConfig, ClientConfig, ConfigError, Environment, GatewayConfig};
pub use error::{ClientError, ClientResult};
pub use telemetry::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
