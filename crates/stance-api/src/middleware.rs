//! Tower middleware for the study API

use axum::{
    extract::{Request, State},
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::{Duration, Instant};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::error::{ApiError, StudyFailure};

static REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Request ID wrapper
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Request ID middleware
///
/// Reuses an incoming `X-Request-ID` when it is a valid header value.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(&REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= 128)
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID.clone(), value);
    }

    response
}

/// Request tracing middleware
pub async fn tracing_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let span = tracing::info_span!(
        "http_request",
        method = %method,
        path = %path,
        request_id = %request_id,
    );

    let response = {
        let _enter = span.enter();
        next.run(request).await
    };

    let status = response.status();
    let latency_ms = start.elapsed().as_millis() as u64;
    if status.is_server_error() {
        tracing::warn!(method = %method, path = %path, status = status.as_u16(), latency_ms, request_id = %request_id, "Request failed");
    } else {
        tracing::info!(method = %method, path = %path, status = status.as_u16(), latency_ms, request_id = %request_id, "Request completed");
    }

    response
}

/// CORS configuration helper
///
/// `origins` is a comma-separated list (STANCE_CORS_ORIGINS). Without it only
/// localhost may call the API cross-origin.
pub fn cors_layer(origins: Option<&str>) -> CorsLayer {
    let localhost = || {
        AllowOrigin::list([
            HeaderValue::from_static("http://localhost:5173"),
            HeaderValue::from_static("http://localhost:8080"),
        ])
    };

    let allow_origin = match origins {
        Some(origins_str) if !origins_str.trim().is_empty() => {
            let origins: Vec<HeaderValue> = origins_str
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                tracing::warn!("STANCE_CORS_ORIGINS contains no valid origins, allowing localhost only");
                localhost()
            } else {
                tracing::info!("CORS configured for {} origin(s)", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => {
            tracing::debug!("STANCE_CORS_ORIGINS not set, allowing localhost only");
            localhost()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, REQUEST_ID.clone()])
        .max_age(Duration::from_secs(3600))
}

/// Routes whose clients append every answer to the chat transcript
fn answers_with_message(path: &str) -> bool {
    path.starts_with("/study/group-") || path.starts_with("/api-tester/")
}

/// Request timeout middleware
///
/// Study and tester routes time out with an error-role message (408);
/// everything else gets the `ApiError` envelope.
pub async fn timeout_middleware(
    State(limit): State<Duration>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(path = %path, limit_ms = limit.as_millis() as u64, "Request timed out");
            let reason = format!("no response within {:?}", limit);
            if answers_with_message(&path) {
                StudyFailure::new(StatusCode::REQUEST_TIMEOUT, "request", reason).into_response()
            } else {
                ApiError::Timeout(reason).into_response()
            }
        }
    }
}

/// Request body size limit
pub fn body_limit_layer(limit: usize) -> tower_http::limit::RequestBodyLimitLayer {
    tower_http::limit::RequestBodyLimitLayer::new(limit)
}

/// Security headers middleware
///
/// The study is embedded in the survey platform's iframe, so framing stays
/// allowed.
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static("geolocation=(), microphone=(), camera=()"),
    );

    response
}
