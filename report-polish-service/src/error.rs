use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

/// Every non-success outcome of a polish request.
#[derive(Error, Debug)]
pub enum PolishError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Missing text")]
    MissingText,

    #[error("Server missing DEEPSEEK_API_KEY")]
    MissingApiKey,

    /// Non-2xx answer from the completion API; `details` is its body, verbatim.
    #[error("DeepSeek error {status}: {details}")]
    Upstream { status: u16, details: String },

    #[error("Server exception: {0}")]
    Exception(String),
}

pub type Result<T> = std::result::Result<T, PolishError>;

impl PolishError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PolishError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            PolishError::MissingText => StatusCode::BAD_REQUEST,
            PolishError::MissingApiKey => StatusCode::INTERNAL_SERVER_ERROR,
            PolishError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            PolishError::Exception(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> Value {
        match self {
            PolishError::MethodNotAllowed => json!({ "error": "Method Not Allowed" }),
            PolishError::MissingText => json!({ "error": "Missing text" }),
            PolishError::MissingApiKey => json!({ "error": "Server missing DEEPSEEK_API_KEY" }),
            PolishError::Upstream { details, .. } => json!({
                "error": "DeepSeek error",
                "details": details
            }),
            PolishError::Exception(details) => json!({
                "error": "Server exception",
                "details": details
            }),
        }
    }
}

impl IntoResponse for PolishError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}

impl From<serde_json::Error> for PolishError {
    fn from(err: serde_json::Error) -> Self {
        PolishError::Exception(err.to_string())
    }
}

impl From<reqwest::Error> for PolishError {
    fn from(err: reqwest::Error) -> Self {
        PolishError::Exception(err.to_string())
    }
}

impl From<axum::Error> for PolishError {
    fn from(err: axum::Error) -> Self {
        PolishError::Exception(err.to_string())
    }
}
