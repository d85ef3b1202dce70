//! Route definitions for the ShareMirror HTTP API.
//!
//! All routes are mounted under `/api` and receive `AppState` through
//! Axum's `State` extractor.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(health_routes())
        .merge(location_routes())
        .merge(node_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Location administration, sync and browse
fn location_routes() -> Router<AppState> {
    use handlers::location;

    Router::new()
        .route(
            "/locations",
            get(location::list_root_views).post(location::create_location),
        )
        .route(
            "/locations/{id}",
            get(location::get_location).delete(location::delete_location),
        )
        .route("/locations/{id}/sync", post(location::sync_location))
        .route("/locations/{id}/tree", get(location::location_tree))
        .route("/locations/{id}/paths", get(location::list_all_paths))
}

/// Node views, syncs and live queries
fn node_routes() -> Router<AppState> {
    use handlers::node;

    Router::new()
        .route("/nodes/{id}/view", get(node::get_node_view))
        .route("/nodes/{id}/sync", post(node::sync_node))
        .route("/nodes/{id}/available", get(node::is_available))
        .route("/nodes/{id}/content", get(node::download_content))
}
