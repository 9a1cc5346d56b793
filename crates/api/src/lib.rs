//! HTTP API server for order management.
//!
//! Provides REST endpoints for orders, the catalog, users and reports, with
//! structured logging (tracing) and Prometheus metrics. The caller's
//! identity arrives in the `X-User-Id` and `X-User-Role` headers.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use store::Store;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use state::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Store + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    use routes::{catalog, orders, reports, users};

    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/orders",
            get(orders::list::<S>).post(orders::create::<S>),
        )
        .route("/orders/stats", get(orders::stats::<S>))
        .route(
            "/orders/{id}",
            get(orders::get::<S>)
                .put(orders::change_state::<S>)
                .delete(orders::cancel::<S>),
        )
        .route(
            "/products",
            get(catalog::list_products::<S>).post(catalog::create_product::<S>),
        )
        .route("/products/stats", get(catalog::inventory_stats::<S>))
        .route(
            "/products/{id}",
            get(catalog::get_product::<S>)
                .put(catalog::update_product::<S>)
                .delete(catalog::deactivate_product::<S>),
        )
        .route(
            "/categories",
            get(catalog::list_categories::<S>).post(catalog::create_category::<S>),
        )
        .route(
            "/categories/{id}",
            get(catalog::get_category::<S>)
                .put(catalog::update_category::<S>)
                .delete(catalog::deactivate_category::<S>),
        )
        .route("/users", get(users::list::<S>).post(users::create::<S>))
        .route(
            "/users/{id}",
            get(users::get::<S>)
                .put(users::update::<S>)
                .delete(users::deactivate::<S>),
        )
        .route("/roles", get(users::roles::<S>))
        .route(
            "/reports",
            get(reports::list::<S>).post(reports::create::<S>),
        )
        .route(
            "/reports/{id}",
            get(reports::get::<S>)
                .put(reports::update::<S>)
                .delete(reports::deactivate::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
