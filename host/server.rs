use crate::*;

use axum::{extract::State, routing::get};
use std::net::SocketAddr;
use tower_http::catch_panic::CatchPanicLayer;

pub static HEALTH_PATH: &str = "/__precache/health";

/// Sends every request through the worker's fetch handler, resolved against the configured origin
pub fn shell_router<S, F>(worker: Arc<Worker<S, F>>) -> Router
where
    S: CacheStorage + 'static,
    F: Fetcher + 'static,
{
    Router::new()
        .route(HEALTH_PATH, get(StatusCode::OK))
        .fallback(intercept::<S, F>)
        .layer(CatchPanicLayer::new())
        .with_state(worker)
}

async fn intercept<S, F>(
    State(worker): State<Arc<Worker<S, F>>>,
    mut request: Request<Body>,
) -> Result<Response<Body>>
where
    S: CacheStorage + 'static,
    F: Fetcher + 'static,
{
    // only path and query are taken from the request, the host always stays the origin's
    let mut url = worker.config().origin.clone();
    url.set_path(request.uri().path());
    url.set_query(request.uri().query());
    *request.uri_mut() = url.as_str().parse()?;
    // belongs to the local server, not to the origin
    request.headers_mut().remove(header::HOST);
    worker.fetch(request).await
}

pub async fn serve(router: Router, port: u16) -> Result {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting serving at http://localhost:{port}");
    axum_server::bind(addr)
        .serve(router.into_make_service())
        .await?;
    Ok(())
}
