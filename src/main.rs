//! Portal session daemon.
//!
//! Wires the session context from configuration and keeps the stored
//! credential pair fresh until shut down.

use std::sync::{Arc, Weak};

use tokio::sync::{broadcast, watch};
use tracing_subscriber::{EnvFilter, fmt};

use portal_auth::session::{CredentialStore, RenewalCoordinator, SessionManager};
use portal_client::HttpAuthClient;
use portal_core::config::AppConfig;
use portal_core::error::AppError;
use portal_core::events::SessionEvent;
use portal_core::traits::AccessTokenSource;
use portal_storage::StorageManager;
use portal_storage::audit::build_audit_sink;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Session daemon failed");
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("PORTAL_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    AppConfig::load(Some(&config_path))
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting portal session daemon");

    let storage = StorageManager::new(&config.storage).await?;
    let store = CredentialStore::load(Arc::new(storage), &config.storage.key_prefix).await?;
    let audit = build_audit_sink(&config.audit).await?;
    tracing::info!(sink = %config.audit.sink, "Audit sink initialized");

    let client = Arc::new(HttpAuthClient::new(config.api.clone())?);
    let session = Arc::new(
        SessionManager::new(Arc::new(store), config.renewal.clone())
            .with_logout_endpoint(client.clone()),
    );
    let source: Weak<dyn AccessTokenSource> = Arc::downgrade(&session) as Weak<SessionManager>;
    client.bind_token_source(source);

    tracing::info!(
        base_url = %config.api.base_url,
        has_session = session.has_valid_session().await,
        "Session context ready"
    );

    let coordinator = Arc::new(RenewalCoordinator::new(
        session.clone(),
        client,
        audit,
        config.renewal.clone(),
    ));

    let events = tokio::spawn(log_session_events(session.subscribe()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let renewal = coordinator.spawn(shutdown_rx);

    shutdown_signal().await;
    tracing::info!("Shutdown signal received");
    let _ = shutdown_tx.send(true);

    if let Err(e) = renewal.await {
        tracing::warn!(error = %e, "Renewal task ended abnormally");
    }
    events.abort();

    tracing::info!("Portal session daemon stopped");
    Ok(())
}

async fn log_session_events(mut events: broadcast::Receiver<SessionEvent>) {
    loop {
        match events.recv().await {
            Ok(SessionEvent::Cleared { reason }) => {
                tracing::warn!(reason = ?reason, "Session cleared; login required");
            }
            Ok(event) => tracing::info!(event = ?event, "Session event"),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Session event log lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
