use crate::*;

/// Basic Result alias with [`enum@precache::Error`]
pub type Result<T = (), E = Error> = std::result::Result<T, E>;

use thiserror::Error;
/// Error type used across the precache codebase
#[derive(Error, Debug)]
pub enum Error {
    #[error("fetching {url} failed: {reason}")]
    Network { url: String, reason: String },
    #[error("{url} responded with {status}")]
    BadStatus { url: String, status: StatusCode },
    #[error("asset {0} is listed more than once")]
    DuplicateAsset(String),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("corrupted cache entry: {0}")]
    Corrupted(String),
    #[error(transparent)]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Http(#[from] http::Error),
    #[error(transparent)]
    InvalidUri(#[from] http::uri::InvalidUri),
    #[error(transparent)]
    Body(#[from] axum::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Semver(#[from] semver::Error),
    #[cfg(host)]
    #[error(transparent)]
    Env(#[from] std::env::VarError),
    #[cfg(host)]
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[cfg(host)]
    #[error(transparent)]
    Sled(#[from] sled::Error),
    #[cfg(host)]
    #[error(transparent)]
    Bincode(#[from] bincode::Error),
    #[cfg(sw)]
    #[error("{0}")]
    Js(String),
}

impl Error {
    /// Whether the error came from the network rather than from the cache or config
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network { .. } | Error::BadStatus { .. })
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response<Body> {
        if self.is_network() {
            warn!("{self}");
            StatusCode::BAD_GATEWAY.into_response()
        } else {
            error!("{self}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(sw)]
impl From<wasm_bindgen::JsValue> for Error {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        match value.as_string() {
            Some(message) => Error::Js(message),
            None => Error::Js(format!("{value:?}")),
        }
    }
}

#[cfg(sw)]
impl From<Error> for wasm_bindgen::JsValue {
    fn from(value: Error) -> Self {
        js_sys::Error::new(&value.to_string()).into()
    }
}
