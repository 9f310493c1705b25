use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json
};
use serde_json::json;

use funds::LedgerError;

/// Errors of the JSON API. The HTML page never shows these.
pub(crate) enum ServerError{
    InvalidContribution(String),
    StoreUnavailable(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::InvalidContribution(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            Self::StoreUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg)
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<LedgerError> for ServerError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidContribution(reason) => Self::InvalidContribution(reason.to_string()),
            other => Self::StoreUnavailable(format!("{:#}", anyhow::Error::new(other)))
        }
    }
}
