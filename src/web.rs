#![cfg(not(tarpaulin_include))]

use clap::Parser;
use journal_ratings::app::{self, AppState};
use journal_ratings::config::Config;
use journal_ratings::dataset::DatasetCache;
use journal_ratings::login::{CredentialList, SessionStore};
use log::{error, info, warn};
use std::sync::Arc;

/// Main entry point for the web application
///
/// Reads the configuration, loads the journal list once, and serves the
/// lookup pages until the process stops.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    info!(
        "Starting journal-ratings v{} with dataset {}",
        env!("CARGO_PKG_VERSION"),
        config.dataset.display()
    );

    let credentials = CredentialList::from_env();
    if credentials.is_empty() {
        warn!("No credentials configured; nobody will be able to sign in");
    } else {
        info!("Loaded {} credentials", credentials.len());
    }

    let dataset = DatasetCache::new(&config.dataset);
    // Load eagerly so a bad file shows up in the log at startup; requests
    // retry the load until it succeeds
    if let Err(e) = dataset.get_or_load() {
        error!("Failed to load {}: {}", config.dataset.display(), e);
    }

    let state = Arc::new(AppState::new(
        dataset,
        credentials,
        SessionStore::new(config.session_duration()),
    )?);

    app::run(state, &config.bind, &config.static_dir).await
}
