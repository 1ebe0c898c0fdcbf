//! Configuration structs

mod client_config;

pub use client_config::{
    AppSettings, CacheConfig, ClientConfig, ConfigError, Environment, GatewayConfig,
};
