mod common;

use common::*;
use precache::host::{shell_router, HEALTH_PATH};
use precache::*;

async fn send(router: &Router, uri: &str) -> Response<Body> {
    router
        .clone()
        .oneshot(
            Request::get(uri)
                .header(header::HOST, "localhost:8080")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn serves_installed_shell_from_cache() {
    let network = Network::default();
    let worker = Arc::new(Worker::new(
        config("0.0.2"),
        MemoryStorage::new(),
        network.fetcher(&[]),
    ));
    worker.install().await.unwrap();
    network.reset();

    let router = shell_router(worker);
    let response = send(&router, "/civic-app/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "https://shell.test/civic-app/");
    assert_eq!(network.calls(), 0);

    let response = send(&router, "/civic-app/api/items?page=2").await;
    assert_eq!(
        body_text(response).await,
        "https://shell.test/civic-app/api/items?page=2"
    );
    assert_eq!(network.calls(), 1);

    assert_eq!(send(&router, HEALTH_PATH).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn offline_misses_are_bad_gateway() {
    let offline = tower::service_fn(|_: Request<Body>| async {
        Err::<Response<Body>, BoxError>("offline".into())
    });
    let worker = Arc::new(Worker::new(
        config("0.0.2"),
        MemoryStorage::new(),
        ServiceFetcher::new(offline),
    ));

    let response = send(&shell_router(worker), "/civic-app/index.html").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn scheme_relative_paths_stay_on_the_origin() {
    let network = Network::default();
    let worker = Arc::new(Worker::new(
        config("0.0.2"),
        MemoryStorage::new(),
        network.fetcher(&[]),
    ));

    let response = send(&shell_router(worker), "//evil.test/steal?x=1").await;
    assert_eq!(response.status(), StatusCode::OK);
    let upstream = body_text(response).await;
    assert_eq!(upstream, "https://shell.test//evil.test/steal?x=1");
    assert_eq!(network.calls(), 1);
}
