use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderValue, Method, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::error::AppError;

/// Origins allowed to call the API from a browser.
#[derive(Clone, Debug)]
pub struct OriginPolicy {
    allowed: Arc<[String]>,
    any: bool,
}

impl OriginPolicy {
    pub fn new(allowed: Vec<String>) -> Self {
        let any = allowed.iter().any(|origin| origin == "*");
        Self {
            allowed: allowed.into(),
            any,
        }
    }

    pub fn allows(&self, origin: &str) -> bool {
        self.any || self.allowed.iter().any(|o| o == origin.trim_end_matches('/'))
    }

    pub fn origins(&self) -> &[String] {
        &self.allowed
    }

    /// CORS response headers for allowed origins. Credentials are allowed, so
    /// a wildcard list mirrors the request origin instead of sending `*`.
    pub fn cors_layer(&self) -> CorsLayer {
        let allow_origin = if self.any {
            AllowOrigin::mirror_request()
        } else {
            AllowOrigin::list(
                self.allowed
                    .iter()
                    .filter_map(|origin| HeaderValue::from_str(origin).ok()),
            )
        };

        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true)
    }
}

/// Rejects browser requests from origins outside the allow-list. Requests
/// without an `Origin` header (curl, server to server) pass through.
pub async fn origin_guard(
    State(policy): State<OriginPolicy>,
    req: Request,
    next: Next,
) -> Response {
    if let Some(origin) = req.headers().get(header::ORIGIN) {
        let allowed = origin
            .to_str()
            .map(|origin| policy.allows(origin))
            .unwrap_or(false);

        if !allowed {
            tracing::warn!(origin = ?origin, path = %req.uri().path(), "Origin not allowed");
            return AppError::OriginRejected.into_response();
        }
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_listed_origins_only() {
        let policy = OriginPolicy::new(vec![
            "https://orivanta.ai".to_string(),
            "http://localhost:3000".to_string(),
        ]);

        assert!(policy.allows("https://orivanta.ai"));
        assert!(policy.allows("https://orivanta.ai/"));
        assert!(policy.allows("http://localhost:3000"));
        assert!(!policy.allows("https://evil.example"));
        assert!(!policy.allows("http://orivanta.ai"));
    }

    #[test]
    fn test_wildcard_allows_everything() {
        let policy = OriginPolicy::new(vec!["*".to_string()]);
        assert!(policy.allows("https://anything.example"));
    }
}
