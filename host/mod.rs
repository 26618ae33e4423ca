use crate::*;

use std::path::Path;

mod server;
pub use server::*;

#[cfg(feature = "traces")]
mod traces;
#[cfg(feature = "traces")]
pub use traces::*;

/// Worker that persists caches with sled and fetches over HTTP
pub type HostWorker = Worker<SledStorage, HttpFetcher>;

/// Opens the cache store in `data_dir`, or in the platform data dir of the app
pub fn host_worker(config: PrecacheConfig, data_dir: Option<&Path>) -> Result<HostWorker> {
    let storage = match data_dir {
        Some(dir) => SledStorage::open(dir)?,
        None => SledStorage::in_data_dir(&config.app)?,
    };
    Ok(Worker::new(config, storage, HttpFetcher::default()))
}
