// HTTP API error types and the Failure value shared with the accessors.
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::auth::AuthError;
use crate::store::StoreError;

/// Structured `{message, help}` value returned in place of a resource when a
/// lookup, validation, or mutation cannot complete. Callers branch on this
/// shape; nothing in the core raises through to them.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Failure {
    pub message: String,
    pub help: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,
    /// Identifier the caller referenced that does not resolve to a user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_user: Option<Value>,
}

impl Failure {
    pub fn new(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            help: help.into(),
            exception: None,
            missing_user: None,
        }
    }

    pub fn with_exception(mut self, exception: impl Into<String>) -> Self {
        self.exception = Some(exception.into());
        self
    }

    pub fn with_missing_user(mut self, id: Value) -> Self {
        self.missing_user = Some(id);
        self
    }
}

/// HTTP API error with appropriate status codes and client-facing messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    MissingCredentials,
    InvalidToken(String),
    ExpiredToken,
    Validation { missing: String },
    InvalidFields(Failure),
    BadRequest(Failure),

    // 401 Unauthorized
    Unauthorized,

    // 404 Not Found
    NotFound(Failure),

    // 409 Conflict
    Conflict(Failure),

    // 500 Internal Server Error
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingCredentials => StatusCode::BAD_REQUEST,
            ApiError::InvalidToken(_) => StatusCode::BAD_REQUEST,
            ApiError::ExpiredToken => StatusCode::BAD_REQUEST,
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::InvalidFields(_) => StatusCode::BAD_REQUEST,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::MissingCredentials => {
                "Header does not contain authorization token.".to_string()
            }
            ApiError::InvalidToken(_) => "There's a problem with the token.".to_string(),
            ApiError::ExpiredToken => "Expired token.".to_string(),
            ApiError::Validation { .. } => "Not all fields were provided.".to_string(),
            ApiError::InvalidFields(failure) => failure.message.clone(),
            ApiError::BadRequest(failure) => failure.message.clone(),
            ApiError::Unauthorized => "Unauthorized.".to_string(),
            ApiError::NotFound(failure) => failure.message.clone(),
            ApiError::Conflict(failure) => failure.message.clone(),
            ApiError::Internal(msg) => msg.clone(),
        }
    }

    /// JSON response body in the fail envelope.
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::InvalidToken(detail) => json!({
                "status": "fail",
                "error": "Bad request",
                "message": self.message(),
                "exception": detail,
            }),
            ApiError::Validation { missing } => json!({
                "status": "fail",
                "message": self.message(),
                "missing": missing,
            }),
            ApiError::NotFound(failure)
            | ApiError::Conflict(failure)
            | ApiError::InvalidFields(failure)
            | ApiError::BadRequest(failure) => {
                let mut body = json!({ "status": "fail" });
                let fields = serde_json::to_value(failure).unwrap_or(Value::Null);
                if let (Value::Object(body_map), Value::Object(failure_map)) =
                    (&mut body, fields)
                {
                    body_map.extend(failure_map);
                }
                body
            }
            ApiError::Internal(_) => json!({
                "status": "fail",
                "message": "An error occurred while processing the request.",
            }),
            _ => json!({
                "status": "fail",
                "message": self.message(),
            }),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingKey => {
                ApiError::Internal("authentication keys are not configured".to_string())
            }
            AuthError::InvalidToken(detail) => ApiError::InvalidToken(detail),
            AuthError::Expired => ApiError::ExpiredToken,
            AuthError::TokenGeneration(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UnknownField(field) => ApiError::InvalidFields(
                Failure::new(
                    "Error encountered when setting attributes.",
                    "Ensure all fields you're updating are valid.",
                )
                .with_exception(format!("unknown field: {field}")),
            ),
            StoreError::Conflict(detail) => ApiError::Conflict(
                Failure::new(
                    "Ensure the object you're saving is valid.",
                    "Has all fields and doesn't repeat unique values.",
                )
                .with_exception(detail),
            ),
            StoreError::Query(detail) => {
                tracing::error!("store query error: {}", detail);
                ApiError::Internal(detail)
            }
            StoreError::Sqlx(e) => {
                // Log the real error but keep the response generic
                tracing::error!("sqlx error: {}", e);
                ApiError::Internal("database error occurred".to_string())
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_errors_map_to_distinct_messages() {
        assert_eq!(
            ApiError::MissingCredentials.message(),
            "Header does not contain authorization token."
        );
        assert_eq!(ApiError::ExpiredToken.message(), "Expired token.");
        assert_ne!(
            ApiError::InvalidToken("bad signature".to_string()).message(),
            ApiError::ExpiredToken.message()
        );
    }

    #[test]
    fn failure_body_carries_message_and_help() {
        let err = ApiError::NotFound(Failure::new("The unit does not exist.", "Check the id."));
        let body = err.to_json();
        assert_eq!(body["status"], "fail");
        assert_eq!(body["message"], "The unit does not exist.");
        assert_eq!(body["help"], "Check the id.");
        assert!(body.get("exception").is_none());
    }

    #[test]
    fn unknown_field_is_not_a_validation_failure() {
        let err: ApiError = StoreError::UnknownField("floor".to_string()).into();
        assert!(matches!(err, ApiError::InvalidFields(_)));
        let body = err.to_json();
        assert!(body.get("missing").is_none());
    }
}
