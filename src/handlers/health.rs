use axum::{Json, response::IntoResponse};

use crate::models::WelcomeResponse;

// liveness / welcome
pub async fn root_handler() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Gemini relay is running. POST your question to /ask".to_string(),
    })
}

pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
