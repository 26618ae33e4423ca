use crate::*;

mod web_cache;
pub use web_cache::*;

mod web_fetch;
pub use web_fetch::*;

pub use console_error_panic_hook::set_once as set_panic_hook;
pub use wasm_bindgen::prelude::wasm_bindgen;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::{future_to_promise, JsFuture};
pub use web_sys::{FetchEvent, ServiceWorkerGlobalScope};

use std::{cell::OnceCell, rc::Rc};

/// Worker backed by the browser's caches and fetch
pub type BrowserWorker = Worker<WebCacheStorage, WebFetcher>;

thread_local! {
    static WORKER: OnceCell<Rc<BrowserWorker>> = const { OnceCell::new() };
}

/// Builds the worker on the first event from the embedded config and the scope's origin
fn worker(sw: &ServiceWorkerGlobalScope) -> Result<Rc<BrowserWorker>> {
    WORKER.with(|cell| {
        if let Some(worker) = cell.get() {
            return Ok(worker.clone());
        }
        set_panic_hook();
        init_tracing();

        let origin = Url::parse(&sw.location().origin())?;
        let config = PrecacheConfig::embedded()?.with_origin(origin);
        let worker = Rc::new(Worker::new(
            config,
            WebCacheStorage::new(sw.caches()?),
            WebFetcher::new(sw.clone()),
        ));
        let _ = cell.set(worker.clone());
        Ok(worker)
    })
}

fn init_tracing() {
    #[cfg(feature = "traces")]
    {
        use tracing_subscriber::fmt::{
            format::{FmtSpan, Pretty},
            time::UtcTime,
        };
        use tracing_subscriber::prelude::*;
        use tracing_web::{performance_layer, MakeWebConsoleWriter};

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false) // Only partially supported across browsers
            .with_timer(UtcTime::rfc_3339())
            .with_writer(MakeWebConsoleWriter::new().with_pretty_level())
            .with_level(false)
            .with_span_events(FmtSpan::ACTIVE);
        let perf_layer = performance_layer().with_details_from_fields(Pretty::default());

        let _ = tracing_subscriber::registry()
            .with(fmt_layer)
            .with(perf_layer)
            .try_init();
    }
}

/// Install listener, the returned promise rejects if any asset couldn't be cached
#[wasm_bindgen]
pub async fn handle_install(sw: ServiceWorkerGlobalScope) -> Result<(), JsValue> {
    let worker = worker(&sw)?;
    worker.install().await?;
    Ok(())
}

/// Activate listener, prunes older caches of this app when configured to
#[wasm_bindgen]
pub async fn handle_activate(sw: ServiceWorkerGlobalScope) -> Result<(), JsValue> {
    let worker = worker(&sw)?;
    worker.activate().await?;
    Ok(())
}

/// Fetch listener, responds from any cache or passes the original request to the network
#[wasm_bindgen]
pub fn handle_fetch(sw: ServiceWorkerGlobalScope, event: FetchEvent) -> Result<(), JsValue> {
    let worker = worker(&sw)?;
    let response = respond(worker, sw, event.request());
    // respondWith has to be called before the listener returns
    event.respond_with(&future_to_promise(response))
}

async fn respond(
    worker: Rc<BrowserWorker>,
    sw: ServiceWorkerGlobalScope,
    request: web_sys::Request,
) -> Result<JsValue, JsValue> {
    if let Some(hit) = worker.storage().match_request(&request).await? {
        return Ok(hit.into());
    }
    JsFuture::from(sw.fetch_with_request(&request)).await
}
