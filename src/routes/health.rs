use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use time::OffsetDateTime;

use crate::routes::{AppState, iso_timestamp};

/// GET /health - Liveness probe
pub async fn health(State(app_state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "OK",
            "timestamp": iso_timestamp(OffsetDateTime::now_utc()),
            "environment": app_state.config.app.environment,
            "allowedOrigins": app_state.origins.origins(),
        })),
    )
}
