//! Folio - editable single-page portfolio
//!
//! Edit the portfolio in place, save it to a GitHub repository and share a
//! read-only link to the saved snapshot.

mod app;
mod core;
mod sync;
mod ui;

use anyhow::{Context, Result};
use app::PortfolioApp;
use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::core::{cache::LocalCache, config::AppConfig, config::TOKEN_VAR};
use crate::sync::{github::GitHubStore, SyncController, SyncSettings};

fn main() -> Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Starting Folio...");

    let config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!("Using default configuration: {:#}", e);
        AppConfig::default()
    });
    if config.github_token.is_none() {
        tracing::warn!("{} is not set; saving and sharing will fail", TOKEN_VAR);
    }

    let cache = match LocalCache::open_default() {
        Ok(cache) => Some(cache),
        Err(e) => {
            tracing::warn!("Local cache unavailable: {:#}", e);
            None
        }
    };
    let store = GitHubStore::new(&config.remote, config.github_token.clone())
        .context("Failed to set up the remote store")?;
    let sync = SyncController::new(store, cache, SyncSettings::from_config(&config));
    tracing::info!(
        "Snapshots are stored as {}, shared under {}",
        sync.settings().file_path,
        sync.share_reference()
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;

    // Optional first argument: a snapshot id or share link to open
    let initial_snapshot = std::env::args()
        .nth(1)
        .and_then(|arg| ui::snapshot_dialog::snapshot_id_from_input(&arg));

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 820.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title("Folio"),
        ..Default::default()
    };

    eframe::run_native(
        "Folio",
        native_options,
        Box::new(move |cc| {
            Ok(Box::new(PortfolioApp::new(
                cc,
                config,
                sync,
                runtime,
                initial_snapshot,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run the application: {e}"))
}
