use axum::http::{HeaderValue, Method};
use std::net::SocketAddr;
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::roster::EvictionPolicy;

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid port: {0}")]
    InvalidPort(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Which browser origins may open connections
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    /// Unrestricted, for local development only
    Any,
    List(Vec<String>),
}

/// Process configuration, read once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: AllowedOrigins,
    pub eviction_policy: EvictionPolicy,
    pub queue_capacity: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            allowed_origins: AllowedOrigins::Any,
            eviction_policy: EvictionPolicy::PruneEmpty,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl RelayConfig {
    /// Reads `PORT`, `RELAY_HOST`, `RELAY_ALLOWED_ORIGINS`,
    /// `RELAY_PRUNE_EMPTY_ROOMS` and `RELAY_QUEUE_CAPACITY`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => defaults.port,
        };

        let host = lookup("RELAY_HOST")
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or(defaults.host);

        let allowed_origins = match lookup("RELAY_ALLOWED_ORIGINS") {
            Some(raw) => parse_origins(&raw),
            None => defaults.allowed_origins,
        };

        let eviction_policy = match lookup("RELAY_PRUNE_EMPTY_ROOMS") {
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => EvictionPolicy::PruneEmpty,
                "false" | "0" | "no" => EvictionPolicy::Retain,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "RELAY_PRUNE_EMPTY_ROOMS",
                        value: raw,
                    })
                }
            },
            None => defaults.eviction_policy,
        };

        let queue_capacity = match lookup("RELAY_QUEUE_CAPACITY") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(capacity) if capacity > 0 => capacity,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "RELAY_QUEUE_CAPACITY",
                        value: raw,
                    })
                }
            },
            None => defaults.queue_capacity,
        };

        Ok(Self {
            host,
            port,
            allowed_origins,
            eviction_policy,
            queue_capacity,
        })
    }

    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                name: "RELAY_HOST",
                value: self.host.clone(),
            })
    }

    pub fn cors_layer(&self) -> Result<CorsLayer, ConfigError> {
        let layer = CorsLayer::new().allow_methods([Method::GET, Method::POST]);

        match &self.allowed_origins {
            AllowedOrigins::Any => {
                warn!("CORS is unrestricted; set RELAY_ALLOWED_ORIGINS outside development");
                Ok(layer.allow_origin(Any))
            }
            AllowedOrigins::List(origins) => {
                let values = origins
                    .iter()
                    .map(|origin| {
                        HeaderValue::from_str(origin).map_err(|_| ConfigError::InvalidValue {
                            name: "RELAY_ALLOWED_ORIGINS",
                            value: origin.clone(),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(layer.allow_origin(AllowOrigin::list(values)))
            }
        }
    }
}

fn parse_origins(raw: &str) -> AllowedOrigins {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowedOrigins::Any
    } else {
        AllowedOrigins::List(origins)
    }
}
