use std::{env, fmt::Display, net::SocketAddr, str::FromStr};

use diesel::{Connection, ConnectionError, PgConnection};
use thiserror::Error;
use tracing::info;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8101";

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
        let listen_addr = env::var("LISTEN_ADDR").unwrap_or_else(|_| {
            info!("LISTEN_ADDR not set, using default: {DEFAULT_LISTEN_ADDR}");
            DEFAULT_LISTEN_ADDR.to_string()
        });
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::Missing("DATABASE_URL"))?,
            listen_addr: parse("LISTEN_ADDR", &listen_addr)?,
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

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        message: e.to_string(),
    })
}
