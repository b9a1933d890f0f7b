//! Application state - shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use yatube_core::Paginator;
use yatube_core::ports::{Cache, MediaStorage, PasswordService, TokenService};
use yatube_core::services::{
    AccountService, FeedService, FollowService, PostService, Repositories,
};
use yatube_infra::{
    Argon2PasswordService, InMemoryCache, InMemoryStore, JwtTokenService, LocalMediaStorage,
};

use crate::config::AppConfig;

/// Concrete adapters the services are built on.
pub struct Backends {
    pub repos: Repositories,
    pub cache: Arc<dyn Cache>,
    pub media: Arc<dyn MediaStorage>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    /// Label reported by the health check.
    pub store: &'static str,
}

#[derive(Clone)]
pub struct AppState {
    pub feed: FeedService,
    pub posts: PostService,
    pub follows: FollowService,
    pub accounts: AccountService,
    pub cache: Arc<dyn Cache>,
    pub media: Arc<dyn MediaStorage>,
    pub tokens: Arc<dyn TokenService>,
    pub index_cache_ttl: Duration,
    pub store: &'static str,
}

impl AppState {
    /// Connect every backend named in `config`, falling back to in-memory
    /// implementations when a service is not configured or unreachable.
    pub async fn new(config: &AppConfig) -> Self {
        let (repos, store) = match connect_store(config).await {
            Some(repos) => (repos, "postgres"),
            None => (Arc::new(InMemoryStore::new()).repositories(), "memory"),
        };

        let cache = match connect_cache(config).await {
            Some(cache) => cache,
            None => Arc::new(InMemoryCache::new()) as Arc<dyn Cache>,
        };

        let backends = Backends {
            repos,
            cache,
            media: Arc::new(LocalMediaStorage::new(config.media_root.clone())),
            tokens: Arc::new(JwtTokenService::from_env()),
            passwords: Arc::new(Argon2PasswordService::new()),
            store,
        };

        tracing::info!(store, media_root = %config.media_root.display(), "Application state initialized");
        Self::from_backends(backends, config.posts_per_page, config.index_cache_ttl)
    }

    pub fn from_backends(backends: Backends, posts_per_page: u64, index_cache_ttl: Duration) -> Self {
        let Backends {
            repos,
            cache,
            media,
            tokens,
            passwords,
            store,
        } = backends;

        Self {
            feed: FeedService::new(repos.clone(), Paginator::new(posts_per_page)),
            posts: PostService::new(repos.clone(), media.clone()),
            follows: FollowService::new(repos.clone()),
            accounts: AccountService::new(repos, passwords),
            cache,
            media,
            tokens,
            index_cache_ttl,
            store,
        }
    }
}

#[cfg(feature = "postgres")]
async fn connect_store(config: &AppConfig) -> Option<Repositories> {
    use yatube_infra::database::{DatabaseConfig, DatabaseConnections};

    let Some(url) = &config.database_url else {
        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        return None;
    };

    let db_config = DatabaseConfig {
        url: url.clone(),
        max_connections: config.db_max_connections,
        min_connections: config.db_min_connections,
    };
    match DatabaseConnections::init(&db_config).await {
        Ok(connections) => Some(connections.repositories()),
        Err(e) => {
            tracing::error!(
                "Failed to connect to database: {}. Using in-memory fallback.",
                e
            );
            None
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn connect_store(_config: &AppConfig) -> Option<Repositories> {
    tracing::info!("Running without postgres feature - using in-memory store");
    None
}

#[cfg(feature = "redis")]
async fn connect_cache(config: &AppConfig) -> Option<Arc<dyn Cache>> {
    use yatube_infra::{RedisCache, RedisConfig};

    let url = config.redis_url.as_ref()?;
    match RedisCache::new(RedisConfig::from_env(url.clone())).await {
        Ok(cache) => Some(Arc::new(cache)),
        Err(e) => {
            tracing::warn!("Redis unavailable: {}. Using in-memory page cache.", e);
            None
        }
    }
}

#[cfg(not(feature = "redis"))]
async fn connect_cache(_config: &AppConfig) -> Option<Arc<dyn Cache>> {
    None
}
