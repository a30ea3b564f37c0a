//! HTTP API Layer
//!
//! This crate provides the REST API for the customer system using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: customer CRUD plus the bulk import/export endpoints
//! - **DTOs**: response shapes and listing parameters
//! - **Error Handling**: domain error kinds mapped to status codes
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, config::ApiConfig};
//!
//! let app = create_router(pool, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_customer::BulkTransferService;
use infra_db::CustomerRepository;

use crate::config::ApiConfig;
use crate::handlers::{bulk, customers, health};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: ApiConfig,
    pub customers: CustomerRepository,
    pub bulk: Arc<BulkTransferService>,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `pool` - Database connection pool
/// * `config` - API configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(pool: PgPool, config: ApiConfig) -> Router {
    let customers = CustomerRepository::new(pool.clone());
    let bulk = Arc::new(BulkTransferService::new(Arc::new(customers.clone())));

    let state = AppState {
        pool,
        config,
        customers,
        bulk,
    };

    // Public routes (no state-dependent middleware)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Customer routes
    let customer_routes = Router::new()
        .route(
            "/",
            post(customers::create_customer).get(customers::list_customers),
        )
        .route(
            "/:id",
            get(customers::get_customer)
                .put(customers::update_customer)
                .delete(customers::delete_customer),
        )
        .route("/bulk-create", post(bulk::bulk_create))
        .route("/bulk-update", post(bulk::bulk_update))
        .route("/bulk/template", get(bulk::download_template))
        // Spreadsheet uploads outgrow the default 2 MB body limit.
        .layer(DefaultBodyLimit::max(32 * 1024 * 1024));

    Router::new()
        .merge(public_routes)
        .nest("/api/customers", customer_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
