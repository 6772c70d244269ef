//! API error types with proper HTTP mapping
//!
//! Two shapes leave this service. Study and tester endpoints always answer
//! with a transcript message (`{role, content}`) so the frontend can append
//! it to the chat; failures there are [`StudyFailure`]s. Everything else uses
//! [`ApiError`] and the `{error: {code, message}}` envelope.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use stance_core::{CoreError, Message};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors of the non-conversational endpoints
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            ApiError::Timeout(msg) => (StatusCode::REQUEST_TIMEOUT, "TIMEOUT", msg.clone()),
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                msg.clone(),
            ),
            ApiError::Internal(msg) => {
                // Don't expose internal errors to clients
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<stance_persist::StorageError> for ApiError {
    fn from(e: stance_persist::StorageError) -> Self {
        match e {
            stance_persist::StorageError::Connection(msg) => ApiError::ServiceUnavailable(msg),
            _ => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<csv::Error> for ApiError {
    fn from(e: csv::Error) -> Self {
        ApiError::Internal(format!("CSV error: {}", e))
    }
}

impl From<std::io::Error> for ApiError {
    fn from(e: std::io::Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}

/// A study turn that produced no model call, rendered as an error message
#[derive(Debug, Clone, PartialEq)]
pub struct StudyFailure {
    pub status: StatusCode,
    pub message: Message,
}

impl StudyFailure {
    pub fn new(status: StatusCode, component: &str, reason: impl std::fmt::Display) -> Self {
        Self {
            status,
            message: Message::error(format!("{} Error: {}", component, reason)),
        }
    }

    pub fn bad_request(component: &str, reason: impl std::fmt::Display) -> Self {
        Self::new(StatusCode::BAD_REQUEST, component, reason)
    }
}

impl From<CoreError> for StudyFailure {
    fn from(e: CoreError) -> Self {
        let status = match &e {
            CoreError::ThesisNotFound(_) => StatusCode::NOT_FOUND,
            CoreError::MalformedTranscript(_) | CoreError::ContinuationNotPermitted(_) => {
                StatusCode::BAD_REQUEST
            }
            CoreError::InvalidPosition(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        tracing::debug!(status = status.as_u16(), error = %e, "Study request rejected");
        Self {
            status,
            message: e.to_message(),
        }
    }
}

impl From<JsonRejection> for StudyFailure {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), "request", rejection.body_text())
    }
}

impl IntoResponse for StudyFailure {
    fn into_response(self) -> Response {
        (self.status, Json(self.message)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use stance_core::{Condition, ThesisId};

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_error_response() {
        let response = ApiError::NotFound("No study data found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_internal_error_is_opaque() {
        let response = ApiError::Internal("disk full at /var/db".to_string()).into_response();
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "An internal error occurred");
    }

    #[tokio::test]
    async fn test_study_failure_status_mapping() {
        let cases = [
            (CoreError::ThesisNotFound(ThesisId::from("9")), StatusCode::NOT_FOUND),
            (CoreError::MalformedTranscript("x".into()), StatusCode::BAD_REQUEST),
            (
                CoreError::ContinuationNotPermitted(Condition::Persuasive),
                StatusCode::BAD_REQUEST,
            ),
            (CoreError::InvalidPosition(120), StatusCode::UNPROCESSABLE_ENTITY),
        ];
        for (error, status) in cases {
            let response = StudyFailure::from(error).into_response();
            assert_eq!(response.status(), status);
            let json = body_json(response).await;
            assert_eq!(json["role"], "error");
            assert!(json["content"].as_str().unwrap().contains(" Error: "));
        }
    }
}
