use crate::*;

use futures::future::try_join_all;

/// Install, activate and fetch handlers of the pre-caching worker
pub struct Worker<S, F> {
    config: PrecacheConfig,
    storage: S,
    fetcher: F,
}

/// Result of a successful install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub cache_name: String,
    /// Stored keys in asset list order
    pub keys: Vec<CacheKey>,
}

impl<S: CacheStorage, F: Fetcher> Worker<S, F> {
    pub fn new(config: PrecacheConfig, storage: S, fetcher: F) -> Self {
        Self {
            config,
            storage,
            fetcher,
        }
    }

    pub fn config(&self) -> &PrecacheConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Fetches every asset and stores them under the current cache name.
    ///
    /// Nothing is written unless every asset responded with a success status, the cache
    /// itself is still created like the browser's `caches.open` does.
    pub async fn install(&self) -> Result<InstallReport> {
        let cache_name = self.config.cache_name();
        let keys = self.config.asset_keys()?;
        let cache = self.storage.open(&cache_name).await?;

        let entries = try_join_all(keys.iter().cloned().map(|key| self.fetch_asset(key)))
            .await
            .inspect_err(|e| warn!("install of {cache_name} failed: {e}"))?;
        cache.put_all(entries).await?;

        info!("cached {} assets into {cache_name}", keys.len());
        Ok(InstallReport { cache_name, keys })
    }

    async fn fetch_asset(&self, key: CacheKey) -> Result<(CacheKey, CachedResponse)> {
        let request = Request::get(key.as_str()).body(Body::empty())?;
        let response = self.fetcher.fetch(request).await?;
        let status = response.status();
        if !status.is_success() || status == StatusCode::PARTIAL_CONTENT {
            return Err(Error::BadStatus {
                url: key.to_string(),
                status,
            });
        }
        let response = CachedResponse::from_response(response).await?;
        Ok((key, response))
    }

    /// Stored response for a request, only `GET` requests can match
    pub async fn lookup(&self, method: &Method, url: &str) -> Result<Option<CachedResponse>> {
        if method != Method::GET {
            return Ok(None);
        }
        let key = self.config.resolve(url)?;
        let hit = self.storage.match_any(&key).await?;
        if hit.is_some() {
            trace!("cache hit for {key}");
        }
        Ok(hit)
    }

    /// Serves from any cache when possible, otherwise makes exactly one network request
    pub async fn fetch(&self, mut request: Request<Body>) -> Result<Response<Body>> {
        let url = request.uri().to_string();
        if let Some(hit) = self.lookup(request.method(), &url).await? {
            return Ok(hit.into_response());
        }
        if request.uri().scheme().is_none() {
            *request.uri_mut() = self.config.resolve(&url)?.as_str().parse()?;
        }
        self.fetcher.fetch(request).await
    }

    /// Deletes older caches of this app when `prune_stale` is set, returns their names
    pub async fn activate(&self) -> Result<Vec<String>> {
        if !self.config.prune_stale {
            return Ok(vec![]);
        }
        self.prune().await
    }

    /// Deletes every cache of this app except the current one
    pub async fn prune(&self) -> Result<Vec<String>> {
        let current = self.config.cache_name();
        let mut deleted = vec![];
        for name in self.storage.keys().await? {
            if name == current || !self.config.owns_cache(&name) {
                continue;
            }
            if self.storage.delete(&name).await? {
                info!("deleted stale cache {name}");
                deleted.push(name);
            }
        }
        Ok(deleted)
    }
}
