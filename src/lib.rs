pub mod appresult;
pub mod auth;
pub mod chats;
pub mod db;
pub mod friends;
pub mod profiles;

use axum::{Json, Router, extract::FromRef, response::IntoResponse, routing::get};
use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;

pub use appresult::{AppError, AppResult};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
}

/// The full HTTP surface. One canonical route per operation; every error
/// body is `{"error": <message>}`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/users/search", get(friends::search_users))
        .nest("/auth", auth::router())
        .nest("/profile", profiles::router())
        .nest("/friends", friends::router())
        .nest("/chats", chats::router())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "OK", "timestamp": Utc::now() }))
}
