use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use crate::routes::AppState;

/// GET / - Service banner and endpoint directory
pub async fn page(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "message": format!("{} Contact API is running", app_state.config.brand.company_name),
        "endpoints": {
            "contact": "/api/contact/submit",
            "newsletter": "/api/newsletter/subscribe",
            "careers": "/api/careers/apply",
            "health": "/health",
        }
    }))
}
