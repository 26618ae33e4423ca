use crate::*;

/// Performs requests that missed the cache
#[cfg_attr(host, async_trait)]
#[cfg_attr(sw, async_trait(?Send))]
pub trait Fetcher: MaybeSendSync {
    /// Resolves to whatever the network returned, including error statuses
    async fn fetch(&self, request: Request<Body>) -> Result<Response<Body>>;
}

/// Uses a tower service (like an axum [`Router`]) as the network
#[cfg(host)]
#[derive(Clone)]
pub struct ServiceFetcher<S> {
    service: S,
}

#[cfg(host)]
impl<S> ServiceFetcher<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }
}

#[cfg(host)]
#[async_trait]
impl<S> Fetcher for ServiceFetcher<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + Sync + 'static,
    S::Future: Send,
    S::Error: Into<BoxError>,
{
    async fn fetch(&self, request: Request<Body>) -> Result<Response<Body>> {
        let url = request.uri().to_string();
        self.service
            .clone()
            .oneshot(request)
            .await
            .map_err(|e| {
                let e: BoxError = e.into();
                Error::Network {
                    url,
                    reason: e.to_string(),
                }
            })
    }
}

/// Fetches over HTTP with reqwest
#[cfg(host)]
#[derive(Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

#[cfg(host)]
impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[cfg(host)]
#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: Request<Body>) -> Result<Response<Body>> {
        let (parts, body) = request.into_parts();
        let url = parts.uri.to_string();
        let network_error = |e: reqwest::Error| Error::Network {
            url: url.clone(),
            reason: e.to_string(),
        };

        let body = axum::body::to_bytes(body, usize::MAX).await?;
        let response = self
            .client
            .request(parts.method, &url)
            .headers(parts.headers)
            .body(body)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        let mut headers = response.headers().clone();
        // the body below is already fully read
        headers.remove(header::TRANSFER_ENCODING);
        headers.remove(header::CONNECTION);
        let body = response.bytes().await.map_err(network_error)?;
        trace!("fetched {url} with {status}");

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}
