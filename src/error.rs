use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum HubError {
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Remote store error ({status}): {}", .body.message)]
    Store {
        status: StatusCode,
        body: StoreErrorBody,
    },

    #[error("Missing or invalid session")]
    Unauthorized,

    #[error("Invalid criteria: {0}")]
    InvalidCriteria(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Remote store returned no rows for {0}")]
    EmptyResult(String),

    #[error("Actor error: {0}")]
    ActorError(String),
}

// Malformed query strings get the same error body as any other bad criteria.
impl From<QueryRejection> for HubError {
    fn from(rejection: QueryRejection) -> Self {
        HubError::InvalidCriteria(rejection.body_text())
    }
}

impl IntoResponse for HubError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            HubError::Store { status, body } => {
                // 4xx from the store is the caller's problem and is passed through as is.
                let status = if status.is_client_error() {
                    status
                } else {
                    StatusCode::BAD_GATEWAY
                };
                let code = body.code.unwrap_or_else(|| "STORE_ERROR".to_string());
                (
                    status,
                    ApiErrorBody {
                        code,
                        message: body.message,
                        details: body.details,
                        hint: body.hint,
                    },
                )
            }
            HubError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ApiErrorBody::new("UNAUTHORIZED", "Missing or invalid session."),
            ),
            HubError::InvalidCriteria(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody::new("INVALID_CRITERIA", msg),
            ),
            HubError::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiErrorBody::new("VALIDATION_FAILED", msg),
            ),
            HubError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiErrorBody::new("NOT_FOUND", msg)),
            HubError::Json(_) => (
                StatusCode::BAD_GATEWAY,
                ApiErrorBody::new("BAD_PAYLOAD", "Upstream returned an unreadable payload."),
            ),
            HubError::EmptyResult(what) => (
                StatusCode::BAD_GATEWAY,
                ApiErrorBody::new("EMPTY_RESULT", format!("No rows returned for {what}.")),
            ),
            HubError::Reqwest(_) | HubError::UrlParse(_) => (
                StatusCode::BAD_GATEWAY,
                ApiErrorBody::new("BAD_GATEWAY", "Upstream service is unavailable."),
            ),
            HubError::Io(_) | HubError::ActorError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorBody::new("INTERNAL_ERROR", "An internal server error occurred."),
            ),
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ApiErrorBody {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
            hint: None,
        }
    }
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

/// Error object returned by the hosted backend (PostgREST, auth and storage
/// all use a variant of this shape).
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct StoreErrorBody {
    #[serde(default, alias = "msg")]
    pub message: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl StoreErrorBody {
    /// Decode an error body, keeping the raw text when it is not JSON.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_else(|_| Self {
            message: String::from_utf8_lossy(bytes).trim().to_string(),
            ..Self::default()
        })
    }
}

// Auth reports numeric codes, PostgREST string ones.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
