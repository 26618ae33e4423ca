use crate::*;

use std::fmt::Write;

/// `addEventListener` glue that forwards worker events into the wasm exports, generated by the build script
pub static LISTENERS_JS: &str = include_str!(concat!(env!("OUT_DIR"), "/listeners.js"));

static INSTALL_LISTENER: &str = r#"self.addEventListener("install", (event) => {
  event.waitUntil(
    caches.open(CACHE_NAME).then((cache) => cache.addAll(urlsToCache))
  );
});
"#;

static ACTIVATE_LISTENER: &str = r#"const VERSION = /^\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?(?:\+[0-9A-Za-z.-]+)?$/;

self.addEventListener("activate", (event) => {
  event.waitUntil(
    caches.keys().then((names) =>
      Promise.all(
        names
          .filter(
            (name) =>
              name !== CACHE_NAME &&
              name.startsWith(CACHE_PREFIX) &&
              VERSION.test(name.slice(CACHE_PREFIX.length))
          )
          .map((name) => caches.delete(name))
      )
    )
  );
});
"#;

static FETCH_LISTENER: &str = r#"self.addEventListener("fetch", (event) => {
  event.respondWith(
    caches
      .match(event.request)
      .then((response) => response || fetch(event.request))
  );
});
"#;

/// Renders a standalone JS service worker with the same behaviour as [`Worker`]
pub fn render_service_worker(config: &PrecacheConfig) -> String {
    let mut js = String::new();
    // writing into a String can't fail
    let _ = writeln!(js, "const CACHE_NAME = {};", js_string(&config.cache_name()));
    if config.prune_stale {
        let _ = writeln!(js, "const CACHE_PREFIX = {};", js_string(&config.cache_prefix()));
    }
    let _ = writeln!(js, "const BASE_PATH = {};", js_string(&config.base_path()));
    js += "const urlsToCache = [\n";
    for asset in &config.local_assets {
        if asset.is_empty() {
            js += "  BASE_PATH,\n";
        } else {
            let _ = writeln!(js, "  BASE_PATH + {},", js_string(asset));
        }
    }
    for url in &config.remote_assets {
        let _ = writeln!(js, "  {},", js_string(url));
    }
    js += "];\n\n";

    js += INSTALL_LISTENER;
    if config.prune_stale {
        js += "\n";
        js += ACTIVATE_LISTENER;
    }
    js += "\n";
    js += FETCH_LISTENER;
    js
}

/// JSON string literals are valid JS string literals
fn js_string(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}
