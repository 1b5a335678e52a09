use std::{env, net::SocketAddr};

use thiserror::Error;
use tracing::info;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8100";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub auth_service_endpoint: String,
    pub restaurant_service_endpoint: String,
    pub order_service_endpoint: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let listen_addr = env::var("LISTEN_ADDR").unwrap_or_else(|_| {
            info!("LISTEN_ADDR not set, using default: {DEFAULT_LISTEN_ADDR}");
            DEFAULT_LISTEN_ADDR.to_string()
        });
        Ok(Self {
            listen_addr: listen_addr.parse().map_err(|e| ConfigError::Invalid {
                key: "LISTEN_ADDR",
                message: format!("{e}"),
            })?,
            auth_service_endpoint: required("AUTH_SERVICE_ENDPOINT")?,
            restaurant_service_endpoint: required("RESTAURANT_SERVICE_ENDPOINT")?,
            order_service_endpoint: required("ORDER_SERVICE_ENDPOINT")?,
        })
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}
