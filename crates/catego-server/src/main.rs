mod config;
mod routes;

use std::sync::{Arc, Mutex};

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Args;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();
    info!("catego-server v{}", env!("CARGO_PKG_VERSION"));

    // Models load before the runtime starts; the remote summarizer's blocking
    // client must not be created or dropped on an async thread. `categorizer`
    // is declared first so it outlives the runtime.
    let categorizer = Arc::new(Mutex::new(config::build_categorizer(&args)?));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(routes::serve(&args.bind, Arc::clone(&categorizer)))?;

    info!("shut down");
    Ok(())
}
