use anyhow::Result;
use clap::{Parser, Subcommand};
use precache::{host::*, render_service_worker, warn, Cache, CacheStorage, PrecacheConfig, LISTENERS_JS};
use std::{path::PathBuf, sync::Arc};

#[derive(Parser)]
#[command(version, about = "Pre-caches a web app shell and serves it cache-first")]
struct Cli {
    /// TOML config, defaults to the one embedded at build time
    #[arg(long, env = "PRECACHE_CONFIG")]
    config: Option<PathBuf>,
    /// Directory of the persistent cache store
    #[arg(long, env = "PRECACHE_DATA_DIR")]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch every asset into the current cache
    Install,
    /// Install, then serve requests cache-first
    Serve {
        #[arg(long, env = "PORT", default_value_t = 8080)]
        port: u16,
    },
    /// Print the JS service worker for the config
    Render {
        /// Print the listeners glue for the wasm worker instead
        #[arg(long)]
        glue: bool,
    },
    /// List stored caches with their entry counts
    Caches,
    /// Delete older caches of this app
    Prune,
}

#[tokio::main]
async fn main() -> Result<()> {
    // before parsing, clap reads env-backed args like PORT
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    #[cfg(feature = "traces")]
    init_tracing_subscriber();

    let config = PrecacheConfig::load(cli.config.as_deref())?;
    if let Command::Render { glue } = cli.command {
        if glue {
            print!("{LISTENERS_JS}");
        } else {
            print!("{}", render_service_worker(&config));
        }
        return Ok(());
    }

    let worker = Arc::new(host_worker(config, cli.data_dir.as_deref())?);
    match cli.command {
        Command::Install => {
            let report = worker.install().await?;
            println!("{} assets cached in {}", report.keys.len(), report.cache_name);
        }
        Command::Serve { port } => {
            // serve whatever is cached even if the network is down
            if let Err(e) = worker.install().await {
                warn!("serving without a fresh install: {e}");
            }
            let router = shell_router(worker.clone());
            #[cfg(feature = "traces")]
            let router = router.layer(trace_layer());
            serve(router, port).await?;
        }
        Command::Caches => {
            let storage = worker.storage();
            for name in storage.keys().await? {
                let entries = storage.open(&name).await?.keys().await?.len();
                println!("{name}\t{entries}");
            }
        }
        Command::Prune => {
            for name in worker.prune().await? {
                println!("deleted {name}");
            }
        }
        Command::Render { .. } => {}
    }
    worker.storage().flush()?;
    Ok(())
}
