use crate::*;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Template values filled in at build time from `[package.metadata.precache]`
pub static EMBEDDED_CONFIG: &str = include_str!(concat!(env!("OUT_DIR"), "/precache.toml"));

pub static ENV_CONFIG: &str = "PRECACHE_CONFIG";
pub static ENV_APP: &str = "PRECACHE_APP";
pub static ENV_VERSION: &str = "PRECACHE_VERSION";
pub static ENV_ORIGIN: &str = "PRECACHE_ORIGIN";

static DEFAULT_ORIGIN: &str = "http://localhost/";

/// Shell files served from under the base path, the empty entry is the base path itself
pub static DEFAULT_LOCAL_ASSETS: [&str; 8] = [
    "",
    "app-state.js",
    "config.js",
    "favicon.ico",
    "index.html",
    "index.js",
    "manifest.json",
    "styles/index.css",
];

/// Shared header/footer components and stylesheets hosted on another origin
pub static DEFAULT_REMOTE_ASSETS: [&str; 5] = [
    "https://civic-interconnect.github.io/app-core/components/ci-header/ci-header.js",
    "https://civic-interconnect.github.io/app-core/components/ci-footer/ci-footer.js",
    "https://civic-interconnect.github.io/app-core/styles/tokens.css",
    "https://civic-interconnect.github.io/app-core/styles/themes.css",
    "https://civic-interconnect.github.io/app-core/styles/base.css",
];

/// Everything the worker needs to know about the app shell it caches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrecacheConfig {
    pub app: String,
    pub version: semver::Version,
    /// Origin the worker is served from, relative assets resolve against it
    #[serde(default = "default_origin")]
    pub origin: Url,
    #[serde(default = "default_local_assets")]
    pub local_assets: Vec<String>,
    #[serde(default = "default_remote_assets")]
    pub remote_assets: Vec<String>,
    /// Delete older versions of this app's cache on activation
    #[serde(default)]
    pub prune_stale: bool,
}

fn default_origin() -> Url {
    Url::parse(DEFAULT_ORIGIN).expect("default origin is a valid url")
}

fn default_local_assets() -> Vec<String> {
    DEFAULT_LOCAL_ASSETS.iter().map(|s| s.to_string()).collect()
}

fn default_remote_assets() -> Vec<String> {
    DEFAULT_REMOTE_ASSETS.iter().map(|s| s.to_string()).collect()
}

impl PrecacheConfig {
    /// Config with the default asset list for the given app name and version
    pub fn new(app: &str, version: &str) -> Result<Self> {
        let config = Self {
            app: app.to_owned(),
            version: version.parse()?,
            origin: default_origin(),
            local_assets: default_local_assets(),
            remote_assets: default_remote_assets(),
            prune_stale: false,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Config generated by the build script
    pub fn embedded() -> Result<Self> {
        Self::from_toml(EMBEDDED_CONFIG)
    }

    /// Reads the file at `path` (or `PRECACHE_CONFIG`, or the embedded config)
    /// and applies `PRECACHE_APP`, `PRECACHE_VERSION` and `PRECACHE_ORIGIN` overrides
    #[cfg(host)]
    pub fn load(path: Option<&std::path::Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_toml(&std::fs::read_to_string(path)?)?,
            None => match env::var(ENV_CONFIG) {
                Ok(path) => Self::from_toml(&std::fs::read_to_string(path)?)?,
                Err(_) => Self::embedded()?,
            },
        };
        config.apply_overrides(|var| env::var(var).ok())?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result {
        if let Some(app) = lookup(ENV_APP) {
            self.app = app;
        }
        if let Some(version) = lookup(ENV_VERSION) {
            self.version = version.parse()?;
        }
        if let Some(origin) = lookup(ENV_ORIGIN) {
            self.origin = Url::parse(&origin)?;
        }
        self.validate()
    }

    pub fn with_origin(mut self, origin: Url) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_version(mut self, version: semver::Version) -> Self {
        self.version = version;
        self
    }

    pub fn with_remote_assets<I: IntoIterator<Item = S>, S: Into<String>>(mut self, assets: I) -> Self {
        self.remote_assets = assets.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_local_assets<I: IntoIterator<Item = S>, S: Into<String>>(mut self, assets: I) -> Self {
        self.local_assets = assets.into_iter().map(Into::into).collect();
        self
    }

    pub fn prune_stale(mut self, prune: bool) -> Self {
        self.prune_stale = prune;
        self
    }

    /// `{app}-cache-v{version}`
    pub fn cache_name(&self) -> String {
        format!("{}{}", self.cache_prefix(), self.version)
    }

    /// Shared by every version of this app's cache
    pub fn cache_prefix(&self) -> String {
        format!("{}-cache-v", self.app)
    }

    /// Whether `name` is some version of this app's cache, the remainder after the prefix
    /// has to be a version so apps whose names extend this one are left alone
    pub fn owns_cache(&self, name: &str) -> bool {
        name.strip_prefix(&self.cache_prefix())
            .is_some_and(|version| semver::Version::parse(version).is_ok())
    }

    /// `/{app}/`
    pub fn base_path(&self) -> String {
        format!("/{}/", self.app)
    }

    /// Asset list as written in the worker source: local paths under the base path, then remote urls
    pub fn asset_urls(&self) -> Vec<String> {
        let base = self.base_path();
        self.local_assets
            .iter()
            .map(|asset| format!("{base}{asset}"))
            .chain(self.remote_assets.iter().cloned())
            .collect()
    }

    /// Resolves a possibly relative url against the origin into a cache key
    pub fn resolve(&self, url: &str) -> Result<CacheKey> {
        Ok(CacheKey::from_url(self.origin.join(url)?))
    }

    /// Absolute keys of every asset, in list order
    pub fn asset_keys(&self) -> Result<Vec<CacheKey>> {
        let mut seen = HashSet::new();
        let mut keys = Vec::with_capacity(self.local_assets.len() + self.remote_assets.len());
        for url in self.asset_urls() {
            let key = self.resolve(&url)?;
            if !seen.insert(key.clone()) {
                return Err(Error::DuplicateAsset(key.to_string()));
            }
            keys.push(key);
        }
        Ok(keys)
    }

    pub fn validate(&self) -> Result {
        if self.app.is_empty() {
            return Err(Error::Config("app name is empty".to_owned()));
        }
        if self.app.contains('/') {
            return Err(Error::Config(format!("app name {:?} contains '/'", self.app)));
        }
        if self.origin.cannot_be_a_base() {
            return Err(Error::Config(format!("origin {} can't resolve paths", self.origin)));
        }
        self.asset_keys()?;
        Ok(())
    }
}
