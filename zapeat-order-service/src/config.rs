use std::{env, fmt::Display, net::SocketAddr, str::FromStr};

use diesel::{Connection, ConnectionError, PgConnection};
use thiserror::Error;
use tracing::info;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8103";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub listen_addr: SocketAddr,
    pub kafka_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            listen_addr: parse_or("LISTEN_ADDR", DEFAULT_LISTEN_ADDR)?,
            kafka_url: env::var("KAFKA_URL").ok(),
        })
    }

    pub fn kafka_url(&self) -> Result<&str, ConfigError> {
        self.kafka_url
            .as_deref()
            .ok_or(ConfigError::Missing("KAFKA_URL"))
    }
}

pub fn establish_connection(database_url: &str) -> Result<PgConnection, ConnectionError> {
    PgConnection::establish(database_url)
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn parse_or<T>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    let value = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        message: e.to_string(),
    })
}
