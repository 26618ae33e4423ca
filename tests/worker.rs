mod common;

use common::*;
use precache::*;

#[tokio::test]
async fn install_caches_every_asset() {
    let network = Network::default();
    let config = config("0.0.2");
    let storage = MemoryStorage::new();
    let worker = Worker::new(config.clone(), storage.clone(), network.fetcher(&[]));

    let report = worker.install().await.unwrap();
    assert_eq!(report.cache_name, "civic-app-cache-v0.0.2");
    assert_eq!(report.keys, config.asset_keys().unwrap());
    assert_eq!(network.calls(), config.asset_urls().len());

    let cache = storage.open("civic-app-cache-v0.0.2").await.unwrap();
    let stored = cache.keys().await.unwrap();
    assert_eq!(stored.len(), config.asset_urls().len());
    for url in config.asset_urls() {
        let key = config.resolve(&url).unwrap();
        assert!(stored.contains(&key), "{key} should be cached");
    }
    assert!(stored
        .iter()
        .any(|key| key.as_str() == "https://shell.test/civic-app/"));
    assert!(stored.iter().any(|key| key.as_str()
        == "https://civic-interconnect.github.io/app-core/styles/base.css"));
}

#[tokio::test]
async fn cached_requests_skip_the_network() {
    let network = Network::default();
    let worker = Worker::new(config("0.0.2"), MemoryStorage::new(), network.fetcher(&[]));
    worker.install().await.unwrap();
    network.reset();

    let response = worker
        .fetch(get("https://shell.test/civic-app/index.html"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
    assert_eq!(
        body_text(response).await,
        "https://shell.test/civic-app/index.html"
    );

    let response = worker
        .fetch(get("https://civic-interconnect.github.io/app-core/components/ci-header/ci-header.js"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(network.calls(), 0);
}

#[tokio::test]
async fn relative_and_fragment_urls_hit_the_cache() {
    let network = Network::default();
    let worker = Worker::new(config("0.0.2"), MemoryStorage::new(), network.fetcher(&[]));
    worker.install().await.unwrap();
    network.reset();

    worker.fetch(get("/civic-app/config.js")).await.unwrap();
    worker
        .fetch(get("https://shell.test/civic-app/index.js#main"))
        .await
        .unwrap();
    assert_eq!(network.calls(), 0);
}

#[tokio::test]
async fn misses_go_to_the_network_once() {
    let network = Network::default();
    let worker = Worker::new(
        config("0.0.2"),
        MemoryStorage::new(),
        network.fetcher(&["gone.js"]),
    );
    worker.install().await.unwrap();
    network.reset();

    let response = worker
        .fetch(get("https://shell.test/civic-app/data.json"))
        .await
        .unwrap();
    assert_eq!(network.calls(), 1);
    assert_eq!(body_text(response).await, "https://shell.test/civic-app/data.json");

    // error statuses come back unmodified
    let response = worker
        .fetch(get("https://shell.test/civic-app/gone.js"))
        .await
        .unwrap();
    assert_eq!(network.calls(), 2);
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "missing");

    // a miss is not stored
    worker
        .fetch(get("https://shell.test/civic-app/data.json"))
        .await
        .unwrap();
    assert_eq!(network.calls(), 3);
}

#[tokio::test]
async fn relative_misses_are_fetched_from_the_origin() {
    let network = Network::default();
    let worker = Worker::new(config("0.0.2"), MemoryStorage::new(), network.fetcher(&[]));

    let response = worker.fetch(get("/civic-app/new.js")).await.unwrap();
    assert_eq!(body_text(response).await, "https://shell.test/civic-app/new.js");
}

#[tokio::test]
async fn only_get_requests_match() {
    let network = Network::default();
    let worker = Worker::new(config("0.0.2"), MemoryStorage::new(), network.fetcher(&[]));
    worker.install().await.unwrap();
    network.reset();

    let request = Request::post("https://shell.test/civic-app/index.html")
        .body(Body::from("form=1"))
        .unwrap();
    worker.fetch(request).await.unwrap();
    assert_eq!(network.calls(), 1);
}

#[tokio::test]
async fn failed_asset_leaves_cache_empty() {
    let network = Network::default();
    let storage = MemoryStorage::new();
    let worker = Worker::new(
        config("0.0.2"),
        storage.clone(),
        network.fetcher(&["favicon.ico"]),
    );

    let err = worker.install().await.unwrap_err();
    assert!(
        matches!(&err, Error::BadStatus { url, status } if url.ends_with("/civic-app/favicon.ico") && *status == StatusCode::NOT_FOUND),
        "{err}"
    );

    let cache = storage.open("civic-app-cache-v0.0.2").await.unwrap();
    assert!(cache.keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn network_errors_propagate() {
    let offline = tower::service_fn(|_: Request<Body>| async {
        Err::<Response<Body>, BoxError>("offline".into())
    });
    let storage = MemoryStorage::new();
    let worker = Worker::new(config("0.0.2"), storage.clone(), ServiceFetcher::new(offline));

    let err = worker.install().await.unwrap_err();
    assert!(err.is_network(), "{err}");
    let cache = storage.open("civic-app-cache-v0.0.2").await.unwrap();
    assert!(cache.keys().await.unwrap().is_empty());

    let err = worker
        .fetch(get("https://shell.test/civic-app/index.html"))
        .await
        .unwrap_err();
    assert!(
        matches!(&err, Error::Network { url, reason } if url == "https://shell.test/civic-app/index.html" && reason == "offline"),
        "{err}"
    );
}

#[tokio::test]
async fn new_version_installs_next_to_the_old_one() {
    let network = Network::default();
    let storage = MemoryStorage::new();
    let old = Worker::new(config("0.0.2"), storage.clone(), network.fetcher(&[]));
    old.install().await.unwrap();
    let old_keys = storage
        .open("civic-app-cache-v0.0.2")
        .await
        .unwrap()
        .keys()
        .await
        .unwrap();

    let new = Worker::new(config("0.0.3"), storage.clone(), network.fetcher(&[]));
    new.install().await.unwrap();

    assert_eq!(
        storage.keys().await.unwrap(),
        ["civic-app-cache-v0.0.2", "civic-app-cache-v0.0.3"]
    );
    let old_cache = storage.open("civic-app-cache-v0.0.2").await.unwrap();
    assert_eq!(old_cache.keys().await.unwrap(), old_keys);

    // activation keeps stale caches unless pruning is enabled
    assert!(new.activate().await.unwrap().is_empty());
    assert!(storage.has("civic-app-cache-v0.0.2").await.unwrap());
}

#[tokio::test]
async fn activate_prunes_only_this_apps_stale_caches() {
    let network = Network::default();
    let storage = MemoryStorage::new();
    for name in [
        "civic-app-cache-v0.0.1",
        "other-app-cache-v0.0.1",
        "civic-app-cache-vx-cache-v1.0.0",
        "civic-app-cache-v0.0.2",
    ] {
        storage.open(name).await.unwrap();
    }

    let worker = Worker::new(
        config("0.0.3").prune_stale(true),
        storage.clone(),
        network.fetcher(&[]),
    );
    worker.install().await.unwrap();

    let deleted = worker.activate().await.unwrap();
    assert_eq!(deleted, ["civic-app-cache-v0.0.1", "civic-app-cache-v0.0.2"]);
    assert_eq!(
        storage.keys().await.unwrap(),
        [
            "other-app-cache-v0.0.1",
            "civic-app-cache-vx-cache-v1.0.0",
            "civic-app-cache-v0.0.3"
        ]
    );
}

#[tokio::test]
async fn any_cache_can_answer() {
    let network = Network::default();
    let storage = MemoryStorage::new();
    let shared = storage.open("shared-assets").await.unwrap();
    let key = CacheKey::parse("https://cdn.test/logo.svg").unwrap();
    shared
        .put_all(vec![(
            key,
            CachedResponse::new(StatusCode::OK, HeaderMap::new(), "<svg/>"),
        )])
        .await
        .unwrap();

    let worker = Worker::new(config("0.0.2"), storage, network.fetcher(&[]));
    let response = worker.fetch(get("https://cdn.test/logo.svg")).await.unwrap();
    assert_eq!(body_text(response).await, "<svg/>");
    assert_eq!(network.calls(), 0);
}
