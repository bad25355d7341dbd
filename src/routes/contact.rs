use axum::{Json, extract::State, response::IntoResponse};
use formrelay_notification::Notice;
use formrelay_submission::{ContactForm, SubmissionEvent};
use serde_json::json;
use time::OffsetDateTime;

use crate::{
    error::AppError,
    extract::{ClientIp, Payload},
    routes::{AppState, iso_timestamp},
};

/// POST /api/contact/submit
#[tracing::instrument(skip_all)]
pub async fn action(
    State(app_state): State<AppState>,
    ClientIp(ip): ClientIp,
    Payload(form): Payload<ContactForm>,
) -> Result<impl IntoResponse, AppError> {
    let message = form
        .into_event(OffsetDateTime::now_utc(), ip)
        .map_err(AppError::validation)?;

    let timestamp = message.timestamp;
    let event = SubmissionEvent::from(message);
    let outcome = app_state.dispatcher.dispatch(&event).await;

    if outcome.is_total_failure() {
        return Err(AppError::Delivery(format!(
            "Email service temporarily unavailable. Please email us directly at {}",
            app_state.dispatcher.brand().support_email
        )));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Thank you for contacting us! We'll get back to you within 24 hours.",
        "data": {
            "timestamp": iso_timestamp(timestamp),
            "adminNotified": outcome.succeeded(&Notice::AdminAlert),
            "confirmationSent": outcome.succeeded(&Notice::UserAutoReply),
        }
    })))
}
