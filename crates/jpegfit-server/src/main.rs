use anyhow::Context;
use clap::Parser;
use jpegfit_server::{app, AppState, Args};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jpegfit_server=info,jpegfit_core=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Args::parse().into_config()?;
    let state = AppState::new(&config).context("failed to build encoder")?;
    info!(
        addr = %config.addr,
        raw_byte_limit = ?config.budget.raw_byte_limit,
        encoded_byte_limit = ?config.budget.encoded_byte_limit,
        max_upload_bytes = config.intake.max_input_bytes,
        policy = ?config.policy,
        "starting jpegfit server"
    );

    let listener = TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
}
