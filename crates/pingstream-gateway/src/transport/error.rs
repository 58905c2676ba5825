//! HTTP rendering of request errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use pingstream_core::error::{ClientCode, PingStreamError};

/// A rejected stream request, rendered as `{"message": "..."}`.
#[derive(Debug)]
pub struct ApiError(pub PingStreamError);

impl From<PingStreamError> for ApiError {
    fn from(e: PingStreamError) -> Self {
        Self(e)
    }
}

pub fn status_for(code: ClientCode) -> StatusCode {
    match code {
        ClientCode::BadRequest | ClientCode::UnsupportedVersion => StatusCode::BAD_REQUEST,
        ClientCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        ClientCode::TooManyConnections => StatusCode::TOO_MANY_REQUESTS,
        ClientCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.client_code());
        let body = Json(json!({ "message": self.0.to_string() }));
        (status, body).into_response()
    }
}
