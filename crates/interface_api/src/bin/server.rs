//! Loan Billing Core - API Server Binary
//!
//! # Usage
//!
//! ```bash
//! # In-memory store, default terms
//! cargo run --bin billing-api
//!
//! # PostgreSQL store, JSON logs
//! BILLING_DATABASE_URL=postgres://... BILLING_LOG_FORMAT=json cargo run --bin billing-api
//! ```
//!
//! # Environment Variables
//!
//! * `BILLING_HOST` - Server host (default: 0.0.0.0)
//! * `BILLING_PORT` - Server port (default: 5001)
//! * `BILLING_DATABASE_URL` - PostgreSQL connection string (default: in-memory store)
//! * `BILLING_DB_MAX_CONNECTIONS` - Pool size (default: 10)
//! * `BILLING_LOG_LEVEL` - trace, debug, info, warn, error (default: info); `RUST_LOG` wins
//! * `BILLING_LOG_FORMAT` - pretty or json (default: pretty)
//! * `BILLING_LOAN_DURATION_WEEKS` - Installments per loan (default: 50)
//! * `BILLING_INTEREST_RATE` - Flat interest rate (default: 0.10)
//! * `BILLING_DELINQUENCY_THRESHOLD` - Missed installments tolerated (default: 2)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::SystemClock;
use domain_billing::ports::memory::InMemoryLedgerStore;
use domain_billing::{BillingEngine, LedgerStore};
use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresLedgerStore};
use interface_api::config::{LogFormat, ServiceConfig};
use interface_api::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ServiceConfig::from_env().context("invalid configuration")?;

    init_tracing(&config);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        loan_duration_weeks = config.loan_duration_weeks,
        interest_rate = %config.interest_rate,
        delinquency_threshold = config.delinquency_threshold,
        "Starting Loan Billing API Server"
    );

    let store = build_store(&config).await?;
    let engine = BillingEngine::new(store.clone(), Arc::new(SystemClock), config.engine_config())
        .context("invalid engine configuration")?;

    let app = create_router(AppState::new(engine, store));

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid listen address {}", config.server_addr()))?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Installs the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(config: &ServiceConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init(),
    }
}

/// Connects to PostgreSQL when a URL is configured, otherwise falls back to
/// the in-memory store
async fn build_store(config: &ServiceConfig) -> anyhow::Result<Arc<dyn LedgerStore>> {
    let Some(url) = config.database_url.as_deref() else {
        tracing::warn!("No database configured, using in-memory ledger store");
        return Ok(Arc::new(InMemoryLedgerStore::new()));
    };

    tracing::info!("Connecting to database...");
    let pool = create_pool(DatabaseConfig::new(url).max_connections(config.db_max_connections))
        .await
        .context("database connection failed")?;
    run_migrations(&pool).await.context("database migration failed")?;
    tracing::info!("Database ready");

    Ok(Arc::new(PostgresLedgerStore::new(pool)))
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
