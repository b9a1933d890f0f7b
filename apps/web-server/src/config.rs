//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Without it the server runs on the in-memory store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub posts_per_page: u64,
    /// Lifetime of a cached index page.
    pub index_cache_ttl: Duration,
    pub media_root: PathBuf,
    pub redis_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            database_url: None,
            db_max_connections: 20,
            db_min_connections: 2,
            posts_per_page: 10,
            index_cache_ttl: Duration::from_secs(20),
            media_root: PathBuf::from("media"),
            redis_url: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parsed("PORT").unwrap_or(defaults.port),
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            db_max_connections: parsed("DB_MAX_CONNECTIONS")
                .unwrap_or(defaults.db_max_connections),
            db_min_connections: parsed("DB_MIN_CONNECTIONS")
                .unwrap_or(defaults.db_min_connections),
            posts_per_page: parsed("POSTS_PER_PAGE")
                .filter(|&n: &u64| n > 0)
                .unwrap_or(defaults.posts_per_page),
            index_cache_ttl: parsed("INDEX_CACHE_SECONDS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.index_cache_ttl),
            media_root: env::var("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.media_root),
            redis_url: env::var("REDIS_URL").ok().filter(|s| !s.is_empty()),
        }
    }
}

fn parsed<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}
