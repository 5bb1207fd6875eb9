//! HTTP API for the Loja do Joaquim storefront.
//!
//! Provides the catalog CRUD endpoints used by the storefront and the admin
//! panel, order intake and checkout quotes, with structured logging
//! (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use catalog::InMemoryCatalogStore;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: AppState, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::system::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::system::health))
        .route(
            "/produtos",
            get(routes::products::list).post(routes::products::create),
        )
        .route(
            "/produtos/{id}",
            get(routes::products::get)
                .put(routes::products::update)
                .delete(routes::products::delete),
        )
        .route(
            "/categorias",
            get(routes::categories::list).post(routes::categories::create),
        )
        // GET takes a category name, PUT and DELETE an id.
        .route(
            "/categorias/{categoria}",
            get(routes::categories::products)
                .put(routes::categories::rename)
                .delete(routes::categories::delete),
        )
        .route(
            "/subcategorias",
            get(routes::subcategories::list).post(routes::subcategories::create),
        )
        .route(
            "/subcategorias/{id}",
            put(routes::subcategories::update)
                .delete(routes::subcategories::delete),
        )
        .route(
            "/subcategorias/{id}/produtos",
            get(routes::subcategories::products),
        )
        .route("/admin", post(routes::admin::handle))
        .route("/pedidos", post(routes::orders::receive))
        .route("/checkout/cotacao", post(routes::checkout::quote))
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

/// Creates application state backed by the seeded in-memory catalog.
pub fn create_default_state() -> AppState {
    AppState::new(Arc::new(InMemoryCatalogStore::seeded()))
}
