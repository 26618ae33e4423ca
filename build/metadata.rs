use anyhow::{bail, Result};
use std::fs::write;
use toml::{Table, Value};

pub static ENV_APP: &str = "PRECACHE_APP";
pub static ENV_VERSION: &str = "PRECACHE_VERSION";
pub static ENV_ORIGIN: &str = "PRECACHE_ORIGIN";

/// Name of the generated config file inside `OUT_DIR`
pub static EMBEDDED_CONFIG_FILE: &str = "precache.toml";

/// Fills the worker template values from `[package.metadata.precache]` and `PRECACHE_*` env vars
/// and saves them as `OUT_DIR/precache.toml` for `include_str!`
pub fn write_embedded_config() -> Result<()> {
    let manifest = super::read_manifest()?;
    let mut config = metadata_table(&manifest).unwrap_or_default();

    for var in [ENV_APP, ENV_VERSION, ENV_ORIGIN] {
        println!("cargo:rerun-if-env-changed={var}");
    }
    apply_overrides(&mut config, |var| std::env::var(var).ok());
    fill_package_defaults(&mut config, &manifest);

    let Some(app) = config.get("app").and_then(Value::as_str) else {
        bail!("precache needs an app name in [package.metadata.precache] or {ENV_APP}");
    };
    if app.is_empty() || app.contains('/') {
        bail!("invalid precache app name: {app:?}");
    }

    write(
        super::out_path(EMBEDDED_CONFIG_FILE)?,
        toml::to_string(&config)?,
    )?;
    Ok(())
}

/// Extracts `[package.metadata.precache]` from a parsed manifest
pub fn metadata_table(manifest: &Table) -> Option<Table> {
    manifest
        .get("package")?
        .get("metadata")?
        .get("precache")?
        .as_table()
        .cloned()
}

pub fn apply_overrides(config: &mut Table, lookup: impl Fn(&str) -> Option<String>) {
    for (var, key) in [(ENV_APP, "app"), (ENV_VERSION, "version"), (ENV_ORIGIN, "origin")] {
        if let Some(value) = lookup(var) {
            config.insert(key.to_owned(), Value::String(value));
        }
    }
}

/// Falls back to the package name and version when the metadata leaves them out
fn fill_package_defaults(config: &mut Table, manifest: &Table) {
    for key in ["name", "version"] {
        let target = if key == "name" { "app" } else { key };
        if config.contains_key(target) {
            continue;
        }
        if let Some(value) = manifest.get("package").and_then(|p| p.get(key)) {
            config.insert(target.to_owned(), value.clone());
        }
    }
}
