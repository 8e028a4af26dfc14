//! Route definitions for the Anar trade calculator API

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Stateless calculator (public)
        .nest("/calculator", calculator_routes())
        .route("/averages/compute", post(handlers::compute_average))
        // Protected routes - saved history and records
        .nest("/calculations", calculation_routes(state.clone()))
        .nest("/trades", trade_routes(state.clone()))
        .nest("/averages", average_routes(state))
}

/// Calculator routes (public)
fn calculator_routes() -> Router<AppState> {
    Router::new()
        .route("/defaults", get(handlers::get_defaults))
        .route("/compute", post(handlers::compute))
        .route("/safe-buy", post(handlers::safe_buy))
        .route("/alerts", post(handlers::alerts))
        .route("/export", post(handlers::export_result))
}

/// Calculation history routes (protected)
fn calculation_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_calculations).post(handlers::save_calculation),
        )
        .route("/compute", post(handlers::compute_and_save))
        .route("/insights", get(handlers::get_insights))
        .route(
            "/:id",
            get(handlers::get_calculation).delete(handlers::delete_calculation),
        )
        .route("/:id/export", get(handlers::export_calculation))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Real trade routes (protected)
fn trade_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_trades).post(handlers::create_trade))
        .route("/stats", get(handlers::get_trade_stats))
        .route("/:trade_id", delete(handlers::delete_trade))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Saved average routes (protected)
fn average_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_averages).post(handlers::save_average))
        .route("/:id", delete(handlers::delete_average))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
