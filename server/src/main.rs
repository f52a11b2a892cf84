mod app;
mod config;
mod dataset;
mod routes;
mod state;

use tokio::signal;
use tracing_subscriber::EnvFilter;

use crate::dataset::Dataset;
use crate::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let data_path = config::data_path();
    let dataset = match Dataset::load(&data_path) {
        Ok(dataset) => dataset,
        Err(e) => {
            tracing::error!(error = %e, "failed to load organization dataset");
            return;
        }
    };
    tracing::info!(
        path = %data_path.display(),
        companies = dataset.len(),
        with_coordinates = dataset.with_coordinates(),
        "Dataset loaded"
    );
    if dataset.is_empty() {
        tracing::warn!("dataset has no active organizations");
    }

    let static_dir = config::static_dir();
    if !static_dir.is_dir() {
        tracing::warn!(path = %static_dir.display(), "static directory missing; only the API will be served");
    }

    let app = app::build_app(AppState::new(dataset), &static_dir);

    let addr = format!("0.0.0.0:{}", config::server_port());
    tracing::info!("Tech Map server listening on {addr}");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "failed to bind TCP listener");
            return;
        }
    };
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server failed");
    }

    tracing::info!("Server shut down gracefully");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                return;
            }
        };
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
