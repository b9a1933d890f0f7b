//! Whole-page caching for anonymous-safe views.

use std::future::Future;
use std::time::Duration;

use actix_web::HttpRequest;
use serde::Serialize;

use yatube_core::ports::Cache;

use crate::middleware::error::AppResult;

/// `page:<path>?<query>`; the query string is kept verbatim so every page
/// number gets its own entry.
pub fn key(req: &HttpRequest) -> String {
    format!("page:{}?{}", req.path(), req.query_string())
}

/// Return the cached body for `key`, or render the page, store it for `ttl`
/// and return it. A failing cache never fails the request.
pub async fn get_or_render<T, F, Fut>(
    cache: &dyn Cache,
    key: &str,
    ttl: Duration,
    render: F,
) -> AppResult<String>
where
    T: Serialize,
    F: FnOnce() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    if let Some(body) = cache.get(key).await {
        tracing::debug!(key, "Page cache hit");
        return Ok(body);
    }

    let body = serde_json::to_string(&render().await?)?;
    if let Err(e) = cache.set(key, &body, Some(ttl)).await {
        tracing::warn!(key, error = %e, "Page cache write failed");
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use yatube_infra::InMemoryCache;

    #[actix_web::test]
    async fn test_second_render_is_served_from_cache() {
        let cache = InMemoryCache::new();
        let ttl = Duration::from_secs(20);

        let first = get_or_render(&cache, "page:/?", ttl, || async { Ok(vec![1, 2]) })
            .await
            .unwrap();
        let second = get_or_render(&cache, "page:/?", ttl, || async { Ok(vec![3]) })
            .await
            .unwrap();

        assert_eq!(first, "[1,2]");
        assert_eq!(second, "[1,2]");
    }

    #[actix_web::test]
    async fn test_render_error_is_not_cached() {
        let cache = InMemoryCache::new();
        let ttl = Duration::from_secs(20);

        let failed = get_or_render::<Vec<i32>, _, _>(&cache, "k", ttl, || async {
            Err(crate::middleware::error::AppError::NotFound("x".into()))
        })
        .await;
        assert!(failed.is_err());
        assert!(!cache.exists("k").await);
    }
}
