//! API Middleware
//!
//! Admin key check and request logging.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderName, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::AppState;

/// Header carrying the admin key
pub const ADMIN_KEY_HEADER: &str = "X-API-Key";

// =========================================================================
// Admin key check
// =========================================================================

/// Guard balance overrides (set / reset) behind the configured admin key.
///
/// When no admin key is configured every request passes.
pub async fn admin_key_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let Some(expected) = state.admin_api_key.as_deref() else {
        return Ok(next.run(request).await);
    };

    match headers.get(ADMIN_KEY_HEADER).and_then(|v| v.to_str().ok()) {
        Some(key) if key == expected => Ok(next.run(request).await),
        Some(_) => {
            tracing::warn!(uri = %request.uri(), "Rejected request with invalid admin key");
            Err((
                StatusCode::FORBIDDEN,
                Json(json!({
                    "error": "Invalid API key",
                    "error_code": "invalid_api_key"
                })),
            )
                .into_response())
        }
        None => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "Missing X-API-Key header",
                "error_code": "missing_api_key"
            })),
        )
            .into_response()),
    }
}

// =========================================================================
// Request logging
// =========================================================================

fn is_sensitive(name: &HeaderName) -> bool {
    *name == header::AUTHORIZATION
        || *name == header::COOKIE
        || *name == header::SET_COOKIE
        || name.as_str().eq_ignore_ascii_case(ADMIN_KEY_HEADER)
}

/// Header pairs safe to log; credentials are replaced by `[REDACTED]`
pub fn mask_headers_for_logging(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let shown = if is_sensitive(name) {
                "[REDACTED]".to_string()
            } else {
                String::from_utf8_lossy(value.as_bytes()).into_owned()
            };
            (name.as_str().to_string(), shown)
        })
        .collect()
}

/// Request logging middleware
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let headers = mask_headers_for_logging(request.headers());

    let start = std::time::Instant::now();

    tracing::info!(
        method = %method,
        uri = %uri,
        headers = ?headers,
        "Incoming request"
    );

    let response = next.run(request).await;

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %response.status(),
        duration_ms = %start.elapsed().as_millis(),
        "Request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_are_redacted() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, "application/json".parse().unwrap());
        headers.insert("x-api-key", "secret-key-12345".parse().unwrap());
        headers.insert(header::AUTHORIZATION, "Bearer abc".parse().unwrap());

        let masked = mask_headers_for_logging(&headers);
        let value_of = |name: &str| {
            masked
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        };

        assert_eq!(value_of("x-api-key").as_deref(), Some("[REDACTED]"));
        assert_eq!(value_of("authorization").as_deref(), Some("[REDACTED]"));
        assert_eq!(value_of("content-type").as_deref(), Some("application/json"));
    }
}
