#![allow(dead_code)]

use precache::*;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const ORIGIN: &str = "https://shell.test";

/// Fake network that answers every request with its own url, or 404 for paths ending in `missing`
#[derive(Clone, Default)]
pub struct Network {
    calls: Arc<AtomicUsize>,
}

impl Network {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }

    pub fn fetcher(&self, missing: &'static [&'static str]) -> ServiceFetcher<Router> {
        let calls = self.calls.clone();
        let router = Router::new().fallback(move |uri: Uri| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                if missing.iter().any(|path| uri.path().ends_with(path)) {
                    return (StatusCode::NOT_FOUND, "missing").into_response();
                }
                ([(header::CONTENT_TYPE, "text/plain")], uri.to_string()).into_response()
            }
        });
        ServiceFetcher::new(router)
    }
}

pub fn config(version: &str) -> PrecacheConfig {
    PrecacheConfig::new("civic-app", version)
        .unwrap()
        .with_origin(Url::parse(ORIGIN).unwrap())
}

pub fn get(url: &str) -> Request<Body> {
    Request::get(url).body(Body::empty()).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
