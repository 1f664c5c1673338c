//! Configuration management for Slate Server

use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub resolver: ResolverConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Root under which files live at `collection_id/record_id/filename`
    pub root: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolverConfig {
    pub interval_secs: u64,
    pub extraction_timeout_secs: u64,
    pub page_timeout_secs: u64,
    pub book_concurrency: usize,
    pub run_on_startup: bool,
}

impl ResolverConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8090,
            },
            database: DatabaseConfig {
                url: "sqlite:./slate.db".to_string(),
                max_connections: 5,
            },
            storage: StorageConfig {
                root: PathBuf::from("./data/storage"),
            },
            resolver: ResolverConfig {
                interval_secs: 300,
                extraction_timeout_secs: 60,
                page_timeout_secs: 15,
                book_concurrency: 2,
                run_on_startup: false,
            },
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        let defaults = Config::default();

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_or("SERVER_PORT", defaults.server.port),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(defaults.database.url),
                max_connections: parse_or(
                    "DATABASE_MAX_CONNECTIONS",
                    defaults.database.max_connections,
                ),
            },
            storage: StorageConfig {
                root: PathBuf::from(env::var("STORAGE_ROOT")?),
            },
            resolver: ResolverConfig {
                interval_secs: parse_or("RESOLVER_INTERVAL_SECS", defaults.resolver.interval_secs),
                extraction_timeout_secs: parse_or(
                    "RESOLVER_EXTRACTION_TIMEOUT_SECS",
                    defaults.resolver.extraction_timeout_secs,
                ),
                page_timeout_secs: parse_or(
                    "READER_PAGE_TIMEOUT_SECS",
                    defaults.resolver.page_timeout_secs,
                ),
                book_concurrency: parse_or(
                    "RESOLVER_BOOK_CONCURRENCY",
                    defaults.resolver.book_concurrency,
                ),
                run_on_startup: parse_or("RESOLVER_RUN_ON_STARTUP", defaults.resolver.run_on_startup),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8090);
        assert_eq!(config.resolver.interval(), Duration::from_secs(300));
        assert_eq!(config.resolver.book_concurrency, 2);
        assert!(!config.resolver.run_on_startup);
    }

    #[test]
    fn test_interval_never_zero() {
        let mut config = Config::default();
        config.resolver.interval_secs = 0;
        assert_eq!(config.resolver.interval(), Duration::from_secs(1));
    }
}
