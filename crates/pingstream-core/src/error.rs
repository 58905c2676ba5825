//! Shared error type across pingstream crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input (missing/invalid/unreachable url, bad config).
    BadRequest,
    /// Only GET is served.
    MethodNotAllowed,
    /// Per-address stream ceiling reached.
    TooManyConnections,
    /// Server is draining; no new streams.
    Unavailable,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in logs and tests.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ClientCode::TooManyConnections => "TOO_MANY_CONNECTIONS",
            ClientCode::Unavailable => "UNAVAILABLE",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, PingStreamError>;

/// Unified error type used by core and gateway.
///
/// Display strings of the request errors go to clients verbatim as
/// `{"message": "..."}`.
#[derive(Debug, Error)]
pub enum PingStreamError {
    #[error("Missing URL parameter.")]
    MissingUrl,
    #[error("Invalid URL parameter.")]
    InvalidUrl,
    #[error("URL is unreachable.")]
    Unreachable,
    #[error("Method not allowed.")]
    MethodNotAllowed,
    #[error("Maximum connections per IP reached.")]
    ConnectionLimit,
    #[error("Server is shutting down.")]
    Draining,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl PingStreamError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            PingStreamError::MissingUrl
            | PingStreamError::InvalidUrl
            | PingStreamError::Unreachable
            | PingStreamError::BadRequest(_) => ClientCode::BadRequest,
            PingStreamError::MethodNotAllowed => ClientCode::MethodNotAllowed,
            PingStreamError::ConnectionLimit => ClientCode::TooManyConnections,
            PingStreamError::Draining => ClientCode::Unavailable,
            PingStreamError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            PingStreamError::Internal(_) => ClientCode::Internal,
        }
    }

    /// Short label used for metrics (`missing_url`, `limit`, ...).
    pub fn reason(&self) -> &'static str {
        match self {
            PingStreamError::MissingUrl => "missing_url",
            PingStreamError::InvalidUrl => "invalid_url",
            PingStreamError::Unreachable => "unreachable",
            PingStreamError::MethodNotAllowed => "method",
            PingStreamError::ConnectionLimit => "limit",
            PingStreamError::Draining => "draining",
            PingStreamError::BadRequest(_) => "bad_request",
            PingStreamError::UnsupportedVersion => "version",
            PingStreamError::Internal(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_errors_render_client_messages() {
        assert_eq!(PingStreamError::MissingUrl.to_string(), "Missing URL parameter.");
        assert_eq!(
            PingStreamError::ConnectionLimit.to_string(),
            "Maximum connections per IP reached."
        );
        assert_eq!(PingStreamError::Unreachable.client_code(), ClientCode::BadRequest);
        assert_eq!(
            PingStreamError::ConnectionLimit.client_code().as_str(),
            "TOO_MANY_CONNECTIONS"
        );
        assert_eq!(PingStreamError::Draining.client_code(), ClientCode::Unavailable);
        assert_eq!(PingStreamError::Draining.reason(), "draining");
    }
}
