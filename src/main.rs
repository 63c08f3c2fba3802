use anyhow::{Context, Result};
use ragdesk::app::RagDeskApp;
use ragdesk::config::Config;
use std::sync::mpsc;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = Config::parse_args();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    config.validate()?;
    tracing::info!(backend = %config.backend_url, "starting ragdesk");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    let handle = runtime.handle().clone();

    let (tx, rx) = mpsc::channel();

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([800.0, 560.0])
            .with_title("RAG Knowledge Base"),
        ..Default::default()
    };

    eframe::run_native(
        "ragdesk",
        options,
        Box::new(move |cc| Ok(Box::new(RagDeskApp::new(cc, &config, handle, tx, rx)))),
    )
    .map_err(|err| anyhow::anyhow!("failed to start UI: {err}"))
}
