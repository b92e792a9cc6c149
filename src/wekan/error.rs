use super::webhook::PayloadError;
use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Every way a webhook request can be refused. The messages are what the
/// caller sees; underlying causes stay in our logs.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("Error: You need to provide the network name in the URL.")]
    MissingNetwork,
    #[error("Error: Unknown network '{0}'")]
    UnknownNetwork(String),
    #[error("Error: Invalid JSON data sent.")]
    InvalidJson(#[source] serde_json::Error),
    #[error("Error: Invalid JSON data sent.")]
    UnreadableBody(#[source] BytesRejection),
    #[error("Error: Invalid data sent.")]
    InvalidData(#[from] PayloadError),
}

/// All failures are reported as `403 Forbidden` in plain text, never as a
/// server error.
impl IntoResponse for HookError {
    fn into_response(self) -> Response {
        (StatusCode::FORBIDDEN, self.to_string()).into_response()
    }
}
