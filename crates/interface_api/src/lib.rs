//! HTTP API Layer
//!
//! This crate provides the REST API for trip settlement reports using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for health and trip reports
//! - **Middleware**: Request ids, tracing, request logging
//! - **DTOs**: Response bodies and query parameters
//! - **Error Handling**: Consistent error responses
//! - **Seed**: Loads trips into the in-memory store at startup
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let store = Arc::new(InMemoryTripStore::new());
//! let app = create_router(store, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod seed;

use axum::{http::HeaderName, middleware as axum_middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use domain_settlement::{SettlementService, TripSnapshotPort};

use crate::config::ApiConfig;
use crate::handlers::{health, trips};
use crate::middleware::{request_logging, REQUEST_ID_HEADER};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: SettlementService,
    pub config: ApiConfig,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `port` - Storage adapter the reports are computed from
/// * `config` - API configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(port: Arc<dyn TripSnapshotPort>, config: ApiConfig) -> Router {
    let state = AppState {
        service: SettlementService::new(port),
        config,
    };
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let trip_routes = Router::new()
        .route("/:trip_id/summary", get(trips::get_summary))
        .route("/:trip_id/members/:member_id/debts", get(trips::get_member_debts))
        .route("/:trip_id/spending", get(trips::get_spending))
        .route("/:trip_id/expenses", get(trips::list_expenses));

    let api_routes = Router::new()
        .nest("/trips", trip_routes)
        .layer(axum_middleware::from_fn(request_logging));

    // The last layer added runs first, so the request id exists before tracing and logging run
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .with_state(state)
}
