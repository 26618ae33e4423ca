use crate::*;

use js_sys::Array;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

/// Browser `CacheStorage` of the worker scope
pub struct WebCacheStorage {
    caches: web_sys::CacheStorage,
}

pub struct WebCache {
    cache: web_sys::Cache,
}

impl WebCacheStorage {
    pub fn new(caches: web_sys::CacheStorage) -> Self {
        Self { caches }
    }

    /// Stored response exactly as the browser keeps it, opaque ones included.
    ///
    /// Only `GET` requests can match, fragments are ignored by `caches.match` itself.
    pub async fn match_request(
        &self,
        request: &web_sys::Request,
    ) -> Result<Option<web_sys::Response>> {
        if request.method() != Method::GET.as_str() {
            return Ok(None);
        }
        let hit = JsFuture::from(self.caches.match_with_request(request)).await?;
        if hit.is_undefined() {
            return Ok(None);
        }
        Ok(Some(hit.unchecked_into()))
    }
}

#[async_trait(?Send)]
impl CacheStorage for WebCacheStorage {
    type Cache = WebCache;

    async fn open(&self, name: &str) -> Result<WebCache> {
        let cache = JsFuture::from(self.caches.open(name)).await?;
        Ok(WebCache {
            cache: cache.unchecked_into(),
        })
    }

    async fn has(&self, name: &str) -> Result<bool> {
        let has = JsFuture::from(self.caches.has(name)).await?;
        Ok(has.as_bool().unwrap_or(false))
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        let deleted = JsFuture::from(self.caches.delete(name)).await?;
        Ok(deleted.as_bool().unwrap_or(false))
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let names: Array = JsFuture::from(self.caches.keys()).await?.unchecked_into();
        Ok(names.iter().filter_map(|name| name.as_string()).collect())
    }

    /// `caches.match` already searches in creation order
    async fn match_any(&self, key: &CacheKey) -> Result<Option<CachedResponse>> {
        let hit = JsFuture::from(self.caches.match_with_str(key.as_str())).await?;
        if hit.is_undefined() {
            return Ok(None);
        }
        Ok(Some(read_web_response(hit.unchecked_into()).await?))
    }
}

#[async_trait(?Send)]
impl Cache for WebCache {
    async fn lookup(&self, key: &CacheKey) -> Result<Option<CachedResponse>> {
        let hit = JsFuture::from(self.cache.match_with_str(key.as_str())).await?;
        if hit.is_undefined() {
            return Ok(None);
        }
        Ok(Some(read_web_response(hit.unchecked_into()).await?))
    }

    /// Browsers have no batch put, entries written before a failure are removed again
    async fn put_all(&self, entries: Vec<(CacheKey, CachedResponse)>) -> Result {
        let mut written = Vec::with_capacity(entries.len());
        for (key, response) in entries {
            let response = cached_into_web(response)?;
            if let Err(e) = JsFuture::from(self.cache.put_with_str(key.as_str(), &response)).await {
                for key in written {
                    let _ = JsFuture::from(self.cache.delete_with_str(key.as_str())).await;
                }
                return Err(e.into());
            }
            written.push(key);
        }
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<CacheKey>> {
        let requests: Array = JsFuture::from(self.cache.keys()).await?.unchecked_into();
        requests
            .iter()
            .map(|request| CacheKey::parse(&request.unchecked_into::<web_sys::Request>().url()))
            .collect()
    }
}
