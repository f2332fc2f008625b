//! dealscope service
//!
//! Loads layered settings, installs tracing and serves the REST API until
//! ctrl-c.

use anyhow::Context;
use dealscope::api::rest::{AppState, create_router};
use dealscope::infrastructure::config::Settings;
use dealscope::infrastructure::logging::init_tracing;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run().await
}

async fn run() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading settings")?;
    init_tracing(&settings.logging).context("installing tracing subscriber")?;

    settings.validate().context("validating settings")?;
    let provider = settings.build_provider().context("building signal provider")?;
    let engine = settings
        .build_engine(provider)
        .context("building scoring engine")?;

    let addr = settings.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    info!(
        %addr,
        provider = engine.provider_name(),
        max_concurrency = engine.config().max_concurrency,
        "dealscope listening"
    );

    axum::serve(listener, create_router(AppState::new(engine)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving")?;

    info!("dealscope stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
