use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use dotenvy::dotenv;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    MySql,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" => Ok(StoreBackend::MySql),
            "memory" => Ok(StoreBackend::Memory),
            other => bail!("unknown STORE_BACKEND '{}', expected mysql or memory", other),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub employee_seed_file: Option<String>,
    pub store_timeout: Duration,

    // Rate limiting, 0 disables
    pub rate_limit_per_min: u32,

    pub log_dir: String,
    pub log_level: String,

    // Analytics
    pub top_attendee_threshold: f64,
    pub absence_limit: u64,
    pub recent_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:8080".to_string(),
            store_backend: StoreBackend::MySql,
            database_url: None,
            db_max_connections: 10,
            employee_seed_file: None,
            store_timeout: Duration::from_secs(5),
            rate_limit_per_min: 1000,
            log_dir: "logs".to_string(),
            log_level: "info".to_string(),
            top_attendee_threshold: 95.0,
            absence_limit: 5,
            recent_limit: 5,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let defaults = Config::default();
        let config = Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or(defaults.server_addr),
            store_backend: parse_or("STORE_BACKEND", defaults.store_backend)?,
            database_url: env::var("DATABASE_URL").ok(),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            employee_seed_file: env::var("EMPLOYEE_SEED_FILE").ok(),
            store_timeout: Duration::from_secs(parse_or(
                "STORE_TIMEOUT_SECS",
                defaults.store_timeout.as_secs(),
            )?),
            rate_limit_per_min: parse_or("RATE_LIMIT_PER_MIN", defaults.rate_limit_per_min)?,
            log_dir: env::var("LOG_DIR").unwrap_or(defaults.log_dir),
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            top_attendee_threshold: parse_or(
                "TOP_ATTENDEE_THRESHOLD",
                defaults.top_attendee_threshold,
            )?,
            absence_limit: parse_or("ABSENCE_LIMIT", defaults.absence_limit)?,
            recent_limit: parse_or("RECENT_LIMIT", defaults.recent_limit)?,
        };

        if config.store_backend == StoreBackend::MySql && config.database_url.is_none() {
            bail!("DATABASE_URL must be set when STORE_BACKEND is mysql");
        }

        Ok(config)
    }
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("invalid value for {}: '{}' ({})", key, raw, e)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names_are_case_insensitive() {
        assert_eq!("MySQL".parse::<StoreBackend>().unwrap(), StoreBackend::MySql);
        assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert!("mongo".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn defaults_match_analytics_rules() {
        let config = Config::default();
        assert_eq!(config.top_attendee_threshold, 95.0);
        assert_eq!(config.absence_limit, 5);
        assert_eq!(config.recent_limit, 5);
        assert_eq!(config.store_timeout, Duration::from_secs(5));
    }

    #[test]
    fn dotenv_is_loaded_only_by_from_env() {
        // main must not load .env a second time before from_env
        let main_src = include_str!("main.rs");
        assert!(!main_src.contains("dotenv"));
    }
}
