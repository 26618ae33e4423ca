//! Named cache stores that map request urls to buffered responses.
//!
//! [`CacheStorage`] is the set of named caches (the browser's `caches` global), [`Cache`] is a
//! single one of them. Implementations:
//! - [`MemoryStorage`] keeps everything in process
//! - `SledStorage` persists caches on disk (host only)
//! - `WebCacheStorage` wraps the browser's `CacheStorage` (service worker only)

use crate::*;

mod memory;
pub use memory::*;

#[cfg(host)]
mod sled_storage;
#[cfg(host)]
pub use sled_storage::*;

/// Absolute url without the fragment, identifies a cached response
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn from_url(mut url: Url) -> Self {
        url.set_fragment(None);
        Self(url.into())
    }

    pub fn parse(url: &str) -> Result<Self> {
        Ok(Self::from_url(Url::parse(url)?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Fully buffered response as it was stored
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl CachedResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Collects the body of a network response
    pub async fn from_response(response: Response<Body>) -> Result<Self> {
        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(body, usize::MAX).await?;
        Ok(Self {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }
}

impl IntoResponse for CachedResponse {
    fn into_response(self) -> Response<Body> {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Single named cache
#[cfg_attr(host, async_trait)]
#[cfg_attr(sw, async_trait(?Send))]
pub trait Cache: MaybeSendSync {
    async fn lookup(&self, key: &CacheKey) -> Result<Option<CachedResponse>>;

    /// Stores every entry or none of them
    async fn put_all(&self, entries: Vec<(CacheKey, CachedResponse)>) -> Result;

    async fn keys(&self) -> Result<Vec<CacheKey>>;
}

/// Set of named caches
#[cfg_attr(host, async_trait)]
#[cfg_attr(sw, async_trait(?Send))]
pub trait CacheStorage: MaybeSendSync {
    type Cache: Cache;

    /// Opens the cache with this name, creating an empty one if needed
    async fn open(&self, name: &str) -> Result<Self::Cache>;

    async fn has(&self, name: &str) -> Result<bool>;

    /// Returns whether there was a cache to delete
    async fn delete(&self, name: &str) -> Result<bool>;

    /// Cache names in creation order
    async fn keys(&self) -> Result<Vec<String>>;

    /// First stored response for the key, searching caches in creation order
    async fn match_any(&self, key: &CacheKey) -> Result<Option<CachedResponse>> {
        for name in self.keys().await? {
            let cache = self.open(&name).await?;
            if let Some(response) = cache.lookup(key).await? {
                return Ok(Some(response));
            }
        }
        Ok(None)
    }
}
