use std::{env, str::FromStr};

use thiserror::Error;
use tracing::Level;

use crate::repositories::MongoDbInitializationInfo;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("environment variable {0} is required")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub enum StoreBackend {
    Memory,
    MongoDb(MongoDbInitializationInfo),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub store: StoreBackend,
    pub log_path: Option<String>,
    pub log_level: Level,
    /// Single allowed CORS origin; any origin is allowed when unset.
    pub cors_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let store = match var("STORE_BACKEND").as_deref() {
            None | Some("memory") => StoreBackend::Memory,
            Some("mongodb") => StoreBackend::MongoDb(MongoDbInitializationInfo {
                uri: var("MONGODB_URI").ok_or(ConfigError::Missing("MONGODB_URI"))?,
                database: var("MONGODB_DB").ok_or(ConfigError::Missing("MONGODB_DB"))?,
                products_collection: var("MONGODB_PRODUCTS_COLLECTION")
                    .unwrap_or_else(|| "products".to_string()),
                users_collection: var("MONGODB_USERS_COLLECTION")
                    .unwrap_or_else(|| "users".to_string()),
            }),
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "STORE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        Ok(Config {
            port: parse_or("PORT", var("PORT"), 3001)?,
            store,
            log_path: var("LOG_PATH"),
            log_level: parse_or("LOG_LEVEL", var("LOG_LEVEL"), Level::DEBUG)?,
            cors_origin: var("CORS_ORIGIN"),
        })
    }
}

fn parse_or<T: FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_memory_store_on_port_3001() {
        let config = Config::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.port, 3001);
        assert!(matches!(config.store, StoreBackend::Memory));
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.cors_origin, None);
    }

    #[test]
    fn mongodb_backend_requires_uri() {
        let result = Config::from_lookup(lookup(&[("STORE_BACKEND", "mongodb"), ("MONGODB_DB", "inventory")]));

        assert_eq!(result.unwrap_err(), ConfigError::Missing("MONGODB_URI"));
    }

    #[test]
    fn mongodb_collections_have_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("STORE_BACKEND", "mongodb"),
            ("MONGODB_URI", "mongodb://localhost:27017"),
            ("MONGODB_DB", "inventory"),
        ]))
        .unwrap();

        match config.store {
            StoreBackend::MongoDb(info) => {
                assert_eq!(info.products_collection, "products");
                assert_eq!(info.users_collection, "users");
            }
            StoreBackend::Memory => panic!("expected mongodb backend"),
        }
    }

    #[test]
    fn invalid_port_is_reported() {
        let result = Config::from_lookup(lookup(&[("PORT", "eighty")]));

        assert_eq!(
            result.unwrap_err(),
            ConfigError::Invalid {
                key: "PORT",
                value: "eighty".to_string()
            }
        );
    }

    #[test]
    fn log_level_is_parsed() {
        let config = Config::from_lookup(lookup(&[("LOG_LEVEL", "warn")])).unwrap();

        assert_eq!(config.log_level, Level::WARN);
    }
}
