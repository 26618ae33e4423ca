use anyhow::{Context, Result};
use toml::Table;

mod metadata;
pub use metadata::*;

mod sw;
pub use sw::*;

pub use cfg_aliases::cfg_aliases;

pub fn default_cfg_aliases() {
    cfg_aliases! {
        wasm: { target_arch = "wasm32" },
        sw: { wasm },
        not_wasm: { not(wasm) },
        host: { not_wasm },
        debug: { debug_assertions },
        release: { not(debug_assertions) },
    }
}

/// Reads and parses the `Cargo.toml` of the crate currently being built
pub fn read_manifest() -> Result<Table> {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR")?;
    let manifest_path = format!("{manifest_dir}/Cargo.toml");
    println!("cargo:rerun-if-changed={manifest_path}");
    let manifest = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("reading {manifest_path}"))?;
    Ok(manifest.parse::<Table>()?)
}

/// Utility for composition of paths to build artifacts
pub fn out_path(filename: &str) -> Result<String> {
    let dir = std::env::var("OUT_DIR").context("OUT_DIR is only set for build scripts")?;
    Ok(format!("{dir}/{filename}"))
}
