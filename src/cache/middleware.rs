//! Response cache middleware for the cached public routes.

use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    extract::State,
    http::{HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::config::CacheConfig;
use super::store::{CachedPage, PageCache};

// Rendered listing pages are small; this bound only guards against caching
// something unexpectedly huge.
const MAX_CACHED_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct CacheState {
    pub config: CacheConfig,
    pub store: Arc<PageCache>,
}

/// Serve cached GET responses and store fresh 200s.
///
/// The key is the full request path including the query string, so `/` and
/// `/?page=2` are distinct entries. Within the TTL a hit replays the stored
/// response byte for byte, whatever happened to the underlying posts since.
pub async fn page_cache_layer(
    State(cache): State<CacheState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !cache.config.enabled || request.method() != Method::GET {
        return next.run(request).await;
    }

    let key = match request.uri().query() {
        Some(query) => format!("{}?{query}", request.uri().path()),
        None => request.uri().path().to_string(),
    };

    if let Some(cached) = cache.store.get(&key) {
        debug!(cache = "page", outcome = "hit", key, "serving cached response");
        return replay(cached);
    }

    debug!(cache = "page", outcome = "miss", key, "rendering");

    let response = next.run(request).await;

    if response.status() != StatusCode::OK {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_CACHED_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };

    let headers = parts
        .headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.to_string(), value.to_string()))
        })
        .collect();

    cache
        .store
        .insert(key, CachedPage::new(parts.status.as_u16(), headers, bytes.clone()));

    Response::from_parts(parts, Body::from(bytes))
}

fn replay(cached: CachedPage) -> Response {
    let mut builder = Response::builder().status(cached.status);

    for (name, value) in cached.headers {
        if let Ok(value) = HeaderValue::from_str(&value) {
            builder = builder.header(name, value);
        }
    }

    builder
        .body(Body::from(cached.body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
