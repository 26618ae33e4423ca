use std::fs::write;

static LISTENER_TEMPLATE: &str = "self.addEventListener('NAME', event => LISTENER);\n";

/// Listeners that forward lifecycle and fetch events into the wasm exports
pub static DEFAULT_LISTENERS: [(&str, &str); 3] = [
    ("install", "event.waitUntil(handle_install(self))"),
    ("activate", "event.waitUntil(handle_activate(self))"),
    ("fetch", "handle_fetch(self, event)"),
];

/// Name of the generated listeners file inside `OUT_DIR`
pub static LISTENERS_FILE: &str = "listeners.js";

pub fn listeners_snippet(listeners: &[(&str, &str)]) -> String {
    let mut js = String::new();
    for (name, listener) in listeners {
        js += LISTENER_TEMPLATE
            .replace("NAME", name)
            .replace("LISTENER", listener)
            .as_str();
    }
    js
}

/// Writes the default listeners glue into `OUT_DIR` so it can be appended to wasm-bindgen output
pub fn write_listeners() -> anyhow::Result<()> {
    write(
        super::out_path(LISTENERS_FILE)?,
        listeners_snippet(&DEFAULT_LISTENERS),
    )?;
    Ok(())
}
