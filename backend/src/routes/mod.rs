//! Route definitions for the stock tracking server

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    let max_upload = state.config.upload.max_bytes;

    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes(state.clone()))
        // Protected routes
        .nest("/stock", stock_routes(state.clone(), max_upload))
        .nest("/sales", sales_routes(state.clone()))
        .nest("/pending", pending_routes(state.clone()))
        .nest("/overview", overview_routes(state.clone()))
        .nest("/analytics", analytics_routes(state))
}

/// Authentication routes
fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/logout", post(handlers::logout))
        .route("/me", get(handlers::me))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
}

/// Stock routes (protected)
fn stock_routes(state: AppState, max_upload: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_stock).post(handlers::add_stock_item))
        .route(
            "/upload",
            post(handlers::upload_invoices).layer(DefaultBodyLimit::max(max_upload)),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Sale routes (protected)
fn sales_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales).post(handlers::record_sale))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
        // Live feed authenticates with a query token
        .route("/live", get(handlers::live_sales))
}

/// Pending item routes (protected)
fn pending_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_pending))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Overview routes (protected)
fn overview_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_overview))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Analytics routes (protected)
fn analytics_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_analytics))
        .route("/export", get(handlers::export_report))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
