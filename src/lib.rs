// BloodLens: Core Library
// Blood report photo in, structured biomarker summary out.

pub mod commands;
pub mod config;
pub mod services;

use std::sync::Arc;

use anyhow::Context;

use crate::services::gemini::GeminiGateway;

/// Start the BloodLens HTTP service and serve until shutdown.
pub async fn run() -> anyhow::Result<()> {
    // .env is optional; a missing file is not an error
    let _ = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = config::load()?;
    if !settings.gemini_configured() {
        log::warn!("GEMINI_API_KEY not set; analysis requests will fail until it is configured");
    }

    let gateway = Arc::new(GeminiGateway::from_settings(&settings));
    let addr = settings.bind_addr();
    log::info!(
        "Model {}, uploads up to {} bytes, static files from {}",
        settings.gemini_model,
        settings.max_upload_bytes,
        settings.static_dir.display()
    );

    let app = commands::router(commands::AppState::new(settings, gateway));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    log::info!("BloodLens listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    log::info!("BloodLens stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
