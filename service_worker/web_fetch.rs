use crate::*;

use js_sys::{Array, Uint8Array};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::ServiceWorkerGlobalScope;

/// Network access through the worker scope's `fetch`
pub struct WebFetcher {
    scope: ServiceWorkerGlobalScope,
}

impl WebFetcher {
    pub fn new(scope: ServiceWorkerGlobalScope) -> Self {
        Self { scope }
    }
}

#[async_trait(?Send)]
impl Fetcher for WebFetcher {
    async fn fetch(&self, request: Request<Body>) -> Result<Response<Body>> {
        let url = request.uri().to_string();
        let request = axum_request_into_web(request).await?;
        let response = JsFuture::from(self.scope.fetch_with_request(&request))
            .await
            .map_err(|e| Error::Network {
                url,
                reason: Error::from(e).to_string(),
            })?;
        Ok(read_web_response(response.unchecked_into())
            .await?
            .into_response())
    }
}

pub async fn axum_request_into_web(request: Request<Body>) -> Result<web_sys::Request> {
    let (parts, body) = request.into_parts();

    // init web_sys::Headers
    let headers = web_sys::Headers::new()?;
    for (name, value) in &parts.headers {
        let Ok(value) = value.to_str() else {
            continue;
        };
        headers.append(name.as_str(), value)?;
    }

    let mut init = web_sys::RequestInit::new();
    init.set_method(parts.method.as_str());
    init.set_headers(&headers);
    let body = axum::body::to_bytes(body, usize::MAX).await?;
    if !body.is_empty() {
        init.set_body(&Uint8Array::from(body.as_ref()));
    }

    Ok(web_sys::Request::new_with_str_and_init(
        &parts.uri.to_string(),
        &init,
    )?)
}

/// Buffers a browser response, opaque responses have no readable status and are rejected
pub async fn read_web_response(response: web_sys::Response) -> Result<CachedResponse> {
    let status = StatusCode::from_u16(response.status()).map_err(|_| Error::Network {
        url: response.url(),
        reason: format!("unreadable status {}", response.status()),
    })?;

    // collect web_sys::Headers items into the HeaderMap
    let mut headers = HeaderMap::new();
    if let Some(entries) = js_sys::try_iter(&response.headers())? {
        for entry in entries {
            let pair: Array = entry?.unchecked_into();
            let (Some(name), Some(value)) = (pair.get(0).as_string(), pair.get(1).as_string())
            else {
                continue;
            };
            let (Ok(name), Ok(value)) = (HeaderName::try_from(name), HeaderValue::try_from(value))
            else {
                continue;
            };
            headers.append(name, value);
        }
    }

    let buffer = JsFuture::from(response.array_buffer()?).await?;
    let body = Uint8Array::new(&buffer).to_vec();
    Ok(CachedResponse::new(status, headers, body))
}

pub fn cached_into_web(cached: CachedResponse) -> Result<web_sys::Response> {
    // init web_sys::Headers
    let headers = web_sys::Headers::new()?;
    for (name, value) in &cached.headers {
        let Ok(value) = value.to_str() else {
            continue;
        };
        headers.append(name.as_str(), value)?;
    }
    // init web_sys::ResponseInit (~= http::response::Parts)
    let mut parts = web_sys::ResponseInit::new();
    parts.set_status(cached.status.as_u16());
    parts.set_headers(&headers);

    let mut body = cached.body.to_vec();
    let body = (!body.is_empty()).then_some(body.as_mut_slice());
    Ok(web_sys::Response::new_with_opt_u8_array_and_init(
        body, &parts,
    )?)
}
