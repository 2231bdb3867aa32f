pub mod auth;
pub mod todos;

use axum::{routing::get, Json, Router};
use serde_json::json;

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(auth::routes(state.clone()))
        .merge(todos::routes(state))
        .route("/health", get(health_check))
}

// GET /health - Liveness probe
pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "UP",
        "service": "todo-backend",
    }))
}
