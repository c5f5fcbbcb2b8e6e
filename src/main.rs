//! Total Economy - per-player currency accounts
//!
//! Serves the economy over HTTP, persists balances to the accounts file and
//! logs every economy notification.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use total_economy::api::{self, AppState};
use total_economy::{Config, EconomyEvent, EconomyService, InMemoryProfiles};

/// Initialize tracing/logging
fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "total_economy=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Log every notification until the economy is dropped
fn spawn_event_logger(economy: &EconomyService) {
    let mut events = economy.subscribe();

    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(EconomyEvent::Transaction(result)) => tracing::info!(
                    account_id = %result.account_id(),
                    currency = %result.currency().display_name(),
                    amount = %result.amount(),
                    result = ?result.result(),
                    transaction_type = ?result.transaction_type(),
                    "Economy transaction"
                ),
                Ok(EconomyEvent::Transfer(result)) => tracing::info!(
                    from = %result.account_id(),
                    to = %result.to_account_id(),
                    currency = %result.currency().display_name(),
                    amount = %result.amount(),
                    result = ?result.result(),
                    "Economy transfer"
                ),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event logger fell behind, notifications dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(config.is_production());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("Starting total economy server");
    tracing::info!(path = %config.accounts_file.display(), "Loading accounts file...");

    let profiles = Arc::new(InMemoryProfiles::new());
    let economy = EconomyService::open(
        config.accounts_file.clone(),
        config.economy.clone(),
        profiles.clone(),
    )
    .await?;

    let accounts = economy.account_count().await;
    tracing::info!(
        accounts,
        currency = %economy.default_currency().display_name(),
        money_cap = ?economy.config().effective_cap(),
        "Accounts loaded"
    );

    spawn_event_logger(&economy);

    let mut state = AppState::new(economy, profiles);
    match config.admin_api_key.clone() {
        Some(key) => state = state.with_admin_api_key(key),
        None => tracing::warn!("ADMIN_API_KEY not set, balance overrides are unguarded"),
    }

    let app = api::build_app(state, !config.is_production());

    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped. Goodbye!");

    Ok(())
}

/// Shutdown signal handler for graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}
