use crate::*;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Maps cache names to their creation sequence numbers
static REGISTRY_TREE: &str = "precache:registry";
static CACHE_TREE_PREFIX: &str = "precache:cache:";

/// Cache storage persisted on disk, each cache lives in its own sled tree
#[derive(Clone)]
pub struct SledStorage {
    db: sled::Db,
    registry: sled::Tree,
}

#[derive(Clone)]
pub struct SledCache {
    tree: sled::Tree,
}

#[derive(Serialize, Deserialize)]
struct StoredEntry {
    status: u16,
    headers: Vec<(String, Vec<u8>)>,
    body: Vec<u8>,
}

impl SledStorage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_db(sled::open(path)?)
    }

    /// Storage removed from disk once dropped
    pub fn temporary() -> Result<Self> {
        Self::from_db(sled::Config::new().temporary(true).open()?)
    }

    /// Opens the storage inside the platform data dir of the app
    pub fn in_data_dir(app: &str) -> Result<Self> {
        let Some(project_dirs) = directories::ProjectDirs::from("", "", app) else {
            return Err(Error::Config(format!("no data dir available for {app}")));
        };
        let mut path = project_dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&path)?;
        path.push("caches");
        Self::open(path)
    }

    fn from_db(db: sled::Db) -> Result<Self> {
        let registry = db.open_tree(REGISTRY_TREE)?;
        Ok(Self { db, registry })
    }

    fn cache_tree(&self, name: &str) -> Result<sled::Tree> {
        Ok(self.db.open_tree(format!("{CACHE_TREE_PREFIX}{name}"))?)
    }

    pub fn flush(&self) -> Result {
        self.db.flush()?;
        Ok(())
    }
}

#[async_trait]
impl CacheStorage for SledStorage {
    type Cache = SledCache;

    async fn open(&self, name: &str) -> Result<SledCache> {
        if !self.registry.contains_key(name)? {
            let seq = self.db.generate_id()?;
            self.registry.insert(name, seq.to_be_bytes().to_vec())?;
            debug!("created cache {name}");
        }
        Ok(SledCache {
            tree: self.cache_tree(name)?,
        })
    }

    async fn has(&self, name: &str) -> Result<bool> {
        Ok(self.registry.contains_key(name)?)
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        if self.registry.remove(name)?.is_none() {
            return Ok(false);
        }
        self.db.drop_tree(format!("{CACHE_TREE_PREFIX}{name}"))?;
        debug!("deleted cache {name}");
        Ok(true)
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut caches = vec![];
        for item in self.registry.iter() {
            let (name, seq) = item?;
            let Ok(seq) = <[u8; 8]>::try_from(seq.as_ref()) else {
                return Err(Error::Corrupted("cache registry sequence".to_owned()));
            };
            let name = String::from_utf8(name.to_vec())
                .map_err(|_| Error::Corrupted("cache registry name".to_owned()))?;
            caches.push((u64::from_be_bytes(seq), name));
        }
        caches.sort();
        Ok(caches.into_iter().map(|(_, name)| name).collect())
    }
}

#[async_trait]
impl Cache for SledCache {
    async fn lookup(&self, key: &CacheKey) -> Result<Option<CachedResponse>> {
        let Some(value) = self.tree.get(key.as_str())? else {
            return Ok(None);
        };
        let entry: StoredEntry = bincode::deserialize(&value)?;
        Ok(Some(entry.try_into()?))
    }

    async fn put_all(&self, entries: Vec<(CacheKey, CachedResponse)>) -> Result {
        let mut batch = sled::Batch::default();
        for (key, response) in entries {
            let value = bincode::serialize(&StoredEntry::from(response))?;
            batch.insert(key.as_str(), value);
        }
        self.tree.apply_batch(batch)?;
        self.tree.flush()?;
        Ok(())
    }

    /// Keys in lexicographic order
    async fn keys(&self) -> Result<Vec<CacheKey>> {
        let mut keys = vec![];
        for key in self.tree.iter().keys() {
            let key = String::from_utf8(key?.to_vec())
                .map_err(|_| Error::Corrupted("cache key".to_owned()))?;
            keys.push(CacheKey::parse(&key)?);
        }
        Ok(keys)
    }
}

impl From<CachedResponse> for StoredEntry {
    fn from(response: CachedResponse) -> Self {
        Self {
            status: response.status.as_u16(),
            headers: response
                .headers
                .iter()
                .map(|(name, value)| (name.to_string(), value.as_bytes().to_vec()))
                .collect(),
            body: response.body.to_vec(),
        }
    }
}

impl TryFrom<StoredEntry> for CachedResponse {
    type Error = Error;

    fn try_from(entry: StoredEntry) -> Result<Self> {
        let status = StatusCode::from_u16(entry.status)
            .map_err(|_| Error::Corrupted(format!("status {}", entry.status)))?;
        let mut headers = HeaderMap::with_capacity(entry.headers.len());
        for (name, value) in entry.headers {
            let name = HeaderName::try_from(name)
                .map_err(|e| Error::Corrupted(format!("header name: {e}")))?;
            let value = HeaderValue::from_bytes(&value)
                .map_err(|e| Error::Corrupted(format!("header value: {e}")))?;
            headers.append(name, value);
        }
        Ok(CachedResponse::new(status, headers, entry.body))
    }
}
