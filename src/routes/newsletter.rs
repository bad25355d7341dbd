use axum::{Json, extract::State, response::IntoResponse};
use formrelay_notification::Notice;
use formrelay_submission::{NewsletterForm, SubmissionEvent};
use serde_json::json;
use time::OffsetDateTime;

use crate::{
    error::AppError,
    extract::{ClientIp, Payload},
    routes::{AppState, iso_timestamp},
};

/// POST /api/newsletter/subscribe
#[tracing::instrument(skip_all)]
pub async fn action(
    State(app_state): State<AppState>,
    ClientIp(ip): ClientIp,
    Payload(form): Payload<NewsletterForm>,
) -> Result<impl IntoResponse, AppError> {
    let signup = form
        .into_event(OffsetDateTime::now_utc(), ip)
        .map_err(|errors| AppError::Validation {
            message: "Invalid email address",
            errors,
        })?;

    let email = signup.email.clone();
    let timestamp = signup.timestamp;
    let event = SubmissionEvent::from(signup);
    let outcome = app_state.dispatcher.dispatch(&event).await;

    if outcome.is_total_failure() {
        return Err(AppError::Delivery(
            "Email service temporarily unavailable. Please try again later.".to_string(),
        ));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Thank you for subscribing! Check your email for confirmation.",
        "data": {
            "email": email,
            "timestamp": iso_timestamp(timestamp),
            "subscribed": true,
            "welcomeSent": outcome.succeeded(&Notice::UserWelcome),
        }
    })))
}
