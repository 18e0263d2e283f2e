mod app;
mod cache;
mod client;
mod config;
mod debounce;
mod error;
mod pagination;
mod summary;
mod ui;
mod validate;

use crate::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;
    init_tracing(&config.log_file)?;
    tracing::info!(sheet_id = %config.sheet_id, "starting salvadanaio");

    let mut app = app::App::new(config)?;
    app.run().await?;
    Ok(())
}

/// The TUI owns stdout, so diagnostics go to a log file instead.
fn init_tracing(path: &str) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::sync::Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
