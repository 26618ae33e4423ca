//! Pre-caches the files of a web app shell into a named, versioned cache and serves requests
//! cache-first with a network fallback.
//!
//! The same [`Worker`] runs as a browser service worker (compiled to wasm, see the `handle_*`
//! exports) and natively in [`host`], where caches are persisted with sled and served over HTTP.
#![doc(html_favicon_url = "https://civic-interconnect.github.io/app-core/favicon.ico")]

mod result;
pub use result::*;

mod config;
pub use config::*;

mod cache;
pub use cache::*;

mod network;
pub use network::*;

mod worker;
pub use worker::*;

mod template;
pub use template::*;

#[cfg(host)]
pub mod host;

#[cfg(sw)]
mod service_worker;
#[cfg(sw)]
pub use service_worker::*;

// for doc links and macro-like paths
pub(crate) use crate as precache;

pub use async_trait::async_trait;
pub use axum::{self, body::Body, response::IntoResponse, Router};
pub use bytes::Bytes;
pub use http::{
    self, header, HeaderMap, HeaderName, HeaderValue, Method, Request, Response, StatusCode, Uri,
};
pub use std::{env, sync::Arc};
pub use tower::{self, BoxError, Service, ServiceExt};
pub use tracing::{debug, error, info, trace, warn};
pub use url::Url;

/// `Send + Sync` on the host, no bounds in the browser
#[cfg(host)]
pub trait MaybeSendSync: Send + Sync {}
#[cfg(host)]
impl<T: Send + Sync> MaybeSendSync for T {}

#[cfg(sw)]
pub trait MaybeSendSync {}
#[cfg(sw)]
impl<T> MaybeSendSync for T {}
