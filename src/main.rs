use std::sync::Arc;

use haulboard::error::AppError;
use haulboard::store::FileBackend;
use haulboard::{api, config, notify, state};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = config::Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false)
        .compact()
        .init();

    let store_backend = Box::new(FileBackend::new(&config.data_path));
    let session_backend = Box::new(FileBackend::new(&config.session_path));
    let (app_state, event_rx) = state::AppState::new(&config, store_backend, session_backend);
    let shared_state = Arc::new(app_state);

    // Resolve push permission once; every later notice is best-effort.
    shared_state.push.request_permission();

    let app = api::rest::router(shared_state.clone());

    tokio::spawn(notify::run_notifier(shared_state.clone(), event_rx));

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(http_port = config.http_port, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
