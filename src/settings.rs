//! Process settings read from the environment (`.env` is honoured by the server binary).

use crate::error::ConfigError;
use std::net::SocketAddr;
use std::str::FromStr;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

/// Connection parameters for PostgreSQL. Rendered into a single connection string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        let auth = if self.password.is_empty() {
            self.user.clone()
        } else {
            format!("{}:{}", self.user, self.password)
        };
        format!("postgres://{}@{}:{}/{}", auth, self.host, self.port, self.database)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreSettings {
    /// `url` is either `DATABASE_URL` verbatim or built from the `DB_*` parts.
    Postgres { url: String, max_connections: u32 },
    Memory,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub store: StoreSettings,
    pub bind_addr: SocketAddr,
    pub max_body_bytes: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Unset and empty values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let store = match get("USER_API_STORE").as_deref().unwrap_or("postgres") {
            "postgres" => {
                let url = match get("DATABASE_URL") {
                    Some(url) => url,
                    None => DatabaseSettings {
                        user: get("DB_USER").unwrap_or_else(|| "postgres".into()),
                        password: get("DB_PASSWORD").unwrap_or_default(),
                        host: get("DB_HOST").unwrap_or_else(|| "localhost".into()),
                        port: parse(&get, "DB_PORT", 5432)?,
                        database: get("DB_NAME").unwrap_or_else(|| "users".into()),
                    }
                    .connection_string(),
                };
                StoreSettings::Postgres {
                    url,
                    max_connections: parse(&get, "DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
                }
            }
            "memory" => StoreSettings::Memory,
            other => return Err(ConfigError::UnknownStore(other.to_string())),
        };

        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into());
        let bind_addr = bind_addr.parse().map_err(|_| ConfigError::InvalidValue {
            key: "BIND_ADDR",
            value: bind_addr.clone(),
        })?;

        Ok(Settings {
            store,
            bind_addr,
            max_body_bytes: parse(&get, "MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?,
        })
    }
}

fn parse<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue { key, value }),
    }
}
