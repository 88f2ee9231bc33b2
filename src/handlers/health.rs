use axum::{Json, response::IntoResponse};

pub async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "PassCraft API is running"
    }))
}

// health handler
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
