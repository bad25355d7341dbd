use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{Method, Uri},
    middleware::from_fn_with_state,
    routing::{get, post},
};
use formrelay_notification::{Dispatcher, Mailer, Recipients};
use time::{OffsetDateTime, UtcOffset, macros::format_description};

use crate::{
    config::Config,
    error::AppError,
    middleware::{OriginPolicy, RateLimiter, rate_limit_middleware},
};

mod careers;
mod contact;
mod health;
mod index;
mod newsletter;

/// Body limit of the JSON and urlencoded routes.
pub const FORM_BODY_LIMIT: usize = 100 * 1024;

/// Body limit of the multipart careers route. Larger than the résumé cap so
/// an oversized résumé is reported as a validation error.
pub const MULTIPART_BODY_LIMIT: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub dispatcher: Dispatcher,
    pub limiter: Arc<RateLimiter>,
    pub origins: OriginPolicy,
}

impl AppState {
    pub fn new(config: Config, mailer: Arc<dyn Mailer>) -> Self {
        let dispatcher = Dispatcher::new(
            mailer,
            Recipients {
                admin: config.email.admin_address.clone(),
                careers: config.email.careers_address.clone(),
            },
            config.brand.clone(),
        );

        let limiter = Arc::new(
            RateLimiter::new(
                Duration::from_millis(config.rate_limit.window_ms),
                config.rate_limit.max_requests,
            )
            .trust_proxy(config.rate_limit.trust_proxy),
        );

        let origins = OriginPolicy::new(config.allowed_origins());

        Self {
            config: Arc::new(config),
            dispatcher,
            limiter,
            origins,
        }
    }
}

pub async fn fallback(method: Method, uri: Uri) -> AppError {
    AppError::NotFound {
        path: uri.path().to_string(),
        method: method.to_string(),
    }
}

pub fn router(app_state: AppState) -> Router {
    let limited = Router::new()
        .route("/api/contact/submit", post(contact::action))
        .route("/api/newsletter/subscribe", post(newsletter::action))
        .route_layer(from_fn_with_state(
            app_state.limiter.clone(),
            rate_limit_middleware,
        ))
        .layer(DefaultBodyLimit::max(FORM_BODY_LIMIT));

    let careers = Router::new()
        .route("/api/careers/apply", post(careers::action))
        .layer(DefaultBodyLimit::max(MULTIPART_BODY_LIMIT));

    Router::new()
        .route("/", get(index::page))
        .route("/health", get(health::health))
        .merge(limited)
        .merge(careers)
        .fallback(fallback)
        .method_not_allowed_fallback(fallback)
        .with_state(app_state)
}

/// ISO 8601 timestamp in UTC with millisecond precision, as sent to clients.
pub(crate) fn iso_timestamp(timestamp: OffsetDateTime) -> String {
    let format = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
    );
    let utc = timestamp.to_offset(UtcOffset::UTC);
    utc.format(format).unwrap_or_else(|_| utc.to_string())
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn test_iso_timestamp_has_milliseconds() {
        assert_eq!(
            iso_timestamp(datetime!(2026-10-19 11:09:12.123456789 UTC)),
            "2026-10-19T11:09:12.123Z"
        );
        assert_eq!(
            iso_timestamp(datetime!(2026-10-19 16:39:12 +05:30)),
            "2026-10-19T11:09:12.000Z"
        );
    }
}
