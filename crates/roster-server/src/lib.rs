//! Roster server library logic.

pub mod api_users;
pub mod config;
pub mod error;
pub mod openapi;
pub mod session;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use roster_db::DbPool;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool. Each request checks out its own connection.
    pub pool: DbPool,
}

/// Maximum request body size (64 KiB). A user record is a handful of fields.
const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/openapi.json", get(openapi::openapi_handler))
        .route(
            "/api/users",
            get(api_users::list_users_handler).post(api_users::create_user_handler),
        )
        .route(
            "/api/users/",
            get(api_users::list_users_handler).post(api_users::create_user_handler),
        )
        .route(
            "/api/users/{user_id}",
            get(api_users::get_user_handler).delete(api_users::delete_user_handler),
        )
        .route("/api/user", post(api_users::legacy_create_user_handler))
        .route(
            "/api/user/{user_id}",
            delete(api_users::delete_user_handler),
        )
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(Arc::new(state)))
}
