pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod observability;
pub mod routes;

use std::any::Any;

use axum::{
    Router,
    http::{HeaderName, HeaderValue, header},
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
};
use tower_http::{
    catch_panic::CatchPanicLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

pub use config::Config;
pub use error::AppError;
pub use routes::AppState;

/// Create the application router with every layer applied.
///
/// Used by `serve` and by the integration tests, which drive it with
/// `tower::ServiceExt::oneshot`.
pub fn create_app(app_state: AppState) -> Router {
    let origins = app_state.origins.clone();
    let expose_errors = !app_state.config.is_production();

    routes::router(app_state)
        .layer(origins.cors_layer())
        .layer(from_fn_with_state(origins, middleware::origin_guard))
        .layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send>| {
            panic_response(panic, expose_errors)
        }))
        .layer(security_header(
            header::X_CONTENT_TYPE_OPTIONS,
            "nosniff",
        ))
        .layer(security_header(header::X_FRAME_OPTIONS, "SAMEORIGIN"))
        .layer(security_header(header::REFERRER_POLICY, "no-referrer"))
        .layer(security_header(
            HeaderName::from_static("cross-origin-resource-policy"),
            "same-origin",
        ))
        .layer(TraceLayer::new_for_http())
}

fn security_header(
    name: HeaderName,
    value: &'static str,
) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::if_not_present(name, HeaderValue::from_static(value))
}

fn panic_response(panic: Box<dyn Any + Send>, expose: bool) -> Response {
    let message = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "handler panicked".to_string());

    AppError::internal(message, expose).into_response()
}
