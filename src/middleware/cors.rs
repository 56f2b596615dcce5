use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::SecurityConfig;

pub const PREFLIGHT_BODY: &str = r#"{"message":"CORS Preflight OK"}"#;

/// CORS policy: credentials allowed on every route. A `*` origin mirrors the
/// caller's origin, since browsers reject a literal wildcard with credentials.
pub fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.is_empty() || security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::very_permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Skipping invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::very_permissive().allow_origin(AllowOrigin::list(origins))
}

/// Sits outside the CORS layer, which answers every OPTIONS request with an
/// empty body; successful preflights get the JSON acknowledgment instead.
pub async fn preflight_body(request: Request, next: Next) -> Response {
    let is_preflight = request.method() == Method::OPTIONS;
    let response = next.run(request).await;
    if !is_preflight || !response.status().is_success() {
        return response;
    }

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    parts
        .headers
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Response::from_parts(parts, Body::from(PREFLIGHT_BODY))
}
