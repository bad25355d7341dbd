use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{Field, MultipartError, MultipartRejection},
    },
    response::IntoResponse,
};
use formrelay_submission::{CareerForm, ResumeUpload, SubmissionEvent};
use serde_json::json;
use time::OffsetDateTime;

use crate::{error::AppError, extract::ClientIp, routes::AppState};

/// POST /api/careers/apply
///
/// Multipart fields: `name`, `email`, `portfolio`, `jobTitle`, `message` and
/// the `resume` file.
#[tracing::instrument(skip_all)]
pub async fn action(
    State(app_state): State<AppState>,
    ClientIp(ip): ClientIp,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let mut multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let mut form = CareerForm::default();
    let mut resume = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_owned();

        match name.as_str() {
            "name" => form.name = text(field).await?,
            "email" => form.email = text(field).await?,
            "portfolio" => form.portfolio = Some(text(field).await?),
            "jobTitle" => form.job_title = text(field).await?,
            "message" => form.message = Some(text(field).await?),
            "resume" => {
                let filename = field.file_name().map(str::to_owned);
                let content_type = field.content_type().map(str::to_owned);
                let content = field.bytes().await.map_err(bad_multipart)?;

                resume = Some(ResumeUpload {
                    filename,
                    content_type,
                    content,
                });
            }
            other => tracing::debug!(field = %other, "Ignoring unknown multipart field"),
        }
    }

    let application = form
        .into_event(resume, OffsetDateTime::now_utc(), ip)
        .map_err(AppError::validation)?;

    tracing::info!(
        job_title = %application.job_title,
        resume = %application.resume.filename,
        resume_bytes = application.resume.size_bytes,
        "Job application received"
    );

    let outcome = app_state
        .dispatcher
        .dispatch(&SubmissionEvent::from(application))
        .await;

    if outcome.is_total_failure() {
        return Err(AppError::Delivery(
            "Failed to submit application. Please try again.".to_string(),
        ));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Application submitted successfully!",
    })))
}

async fn text(field: Field<'_>) -> Result<String, AppError> {
    field.text().await.map_err(bad_multipart)
}

fn bad_multipart(error: MultipartError) -> AppError {
    tracing::debug!(status = %error.status(), "Failed to read multipart body: {}", error);
    AppError::BadRequest(error.body_text())
}
