//! Tsunami risk dashboard server.
//!
//! Loads the classifier once, then serves the parameter form, HTMX fragments
//! and a small JSON API.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tsunami_core::loader::load_model;
use tsunami_core::Classifier;

mod config;
mod render;
mod server;

use config::{Args, DashboardConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = DashboardConfig::from(&args);

    let model = load_model(&config.model_path)
        .inspect_err(|e| error!(path = %config.model_path.display(), "model load failed: {e}"))
        .with_context(|| format!("loading model from {}", config.model_path.display()))?;
    info!(
        estimator = model.kind(),
        importances = model.feature_importances().is_some(),
        "model ready"
    );

    let model: Arc<dyn Classifier> = model;
    server::run_server(config, model).await
}
