use clap::Parser;
use tracing_subscriber::EnvFilter;

use coffeehouse::config::Config;
use coffeehouse::{http, seed, CoffeeStore, DEFAULT_SEED};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let backend = config.storage()?;
    let store = backend.open()?;
    tracing::info!(storage = %backend, "opened coffee store");

    if config.seed && store.count()? == 0 {
        let seeded = seed(store.as_ref(), DEFAULT_SEED)?;
        tracing::info!(count = seeded.len(), "seeded coffees");
    }

    http::serve(store, &config.bind, shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
}
