use std::env;
use std::net::IpAddr;

use thiserror::Error;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_DB_PORT: u16 = 3306;
const DEFAULT_DB_USER: &str = "root";
const DEFAULT_DB_NAME: &str = "todos_db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(String),
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
    #[error("Invalid bind address: {0}")]
    InvalidHost(String),
    #[error("Invalid DB_MAX_CONNECTIONS: {0}")]
    InvalidMaxConnections(String),
    #[error("Unsupported DATABASE_URL (expected a sqlite: URL): {0}")]
    UnsupportedDatabaseUrl(String),
}

/// Which backend to open and how to reach it.
#[derive(Clone, PartialEq)]
pub enum DatabaseConfig {
    Sqlite {
        url: String,
    },
    MySql {
        host: String,
        port: u16,
        user: String,
        password: String,
        database: String,
    },
}

impl DatabaseConfig {
    /// Connection summary safe for logs; never includes the password.
    pub fn describe(&self) -> String {
        match self {
            DatabaseConfig::Sqlite { url } => url.clone(),
            DatabaseConfig::MySql {
                host,
                port,
                user,
                database,
                ..
            } => format!("mysql://{user}@{host}:{port}/{database}"),
        }
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub database: DatabaseConfig,
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, falling back to the
    /// documented defaults for unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_port(lookup("PORT"), DEFAULT_PORT)?;

        let host_str = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let host = host_str
            .parse::<IpAddr>()
            .map_err(|_| ConfigError::InvalidHost(host_str.clone()))?;

        let max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::InvalidMaxConnections(raw)),
            },
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let database = match lookup("DATABASE_URL").filter(|url| !url.is_empty()) {
            Some(url) if url.starts_with("sqlite:") => DatabaseConfig::Sqlite { url },
            Some(url) => return Err(ConfigError::UnsupportedDatabaseUrl(url)),
            None => DatabaseConfig::MySql {
                host: lookup("DB_HOST").unwrap_or_else(|| DEFAULT_DB_HOST.to_string()),
                port: parse_port(lookup("DB_PORT"), DEFAULT_DB_PORT)?,
                user: lookup("DB_USER").unwrap_or_else(|| DEFAULT_DB_USER.to_string()),
                password: lookup("DB_PASSWORD").unwrap_or_default(),
                database: lookup("DB_NAME").unwrap_or_else(|| DEFAULT_DB_NAME.to_string()),
            },
        };

        Ok(Config {
            host,
            port,
            database,
            max_connections,
        })
    }
}

fn parse_port(raw: Option<String>, default: u16) -> Result<u16, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let port = raw
        .trim()
        .parse::<u16>()
        .map_err(|_| ConfigError::InvalidPort(raw.clone()))?;
    if port == 0 {
        return Err(ConfigError::PortOutOfRange(port));
    }
    Ok(port)
}
