//! HTTP API Layer
//!
//! This crate exposes the billing engine over HTTP using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: one per engine operation, plus ping and health checks
//! - **Middleware**: access logging and request tracing
//! - **DTOs**: request/response bodies, validated with `validator`
//! - **Error Handling**: engine errors mapped to status codes and a JSON body
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(AppState::new(engine, store));
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod handlers;
pub mod dto;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_billing::{BillingEngine, LedgerStore};

use crate::handlers::{billables, health};
use crate::middleware::access_log_middleware;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: BillingEngine,
    pub store: Arc<dyn LedgerStore>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Creates the state, recording the start time from the engine clock
    ///
    /// `store` should be the store the engine was built with; it is used
    /// for readiness checks.
    pub fn new(engine: BillingEngine, store: Arc<dyn LedgerStore>) -> Self {
        let started_at = engine.clock().now();
        Self {
            engine,
            store,
            started_at,
        }
    }
}

/// Creates the main API router
///
/// # Arguments
///
/// * `state` - Engine, store and start time shared with every handler
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(health::ping))
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let billable_routes = Router::new()
        .route("/", post(billables::create_billable))
        .route("/:billable_id", get(billables::get_billable))
        .route("/:billable_id/make-payment", post(billables::make_payment))
        .route("/:billable_id/payments", get(billables::list_payments))
        .route("/:billable_id/outstandings", get(billables::get_outstanding))
        .route("/:billable_id/check-delinquency", post(billables::check_delinquency));

    Router::new()
        .merge(public_routes)
        .nest("/billables", billable_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum_middleware::from_fn(access_log_middleware))
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}
