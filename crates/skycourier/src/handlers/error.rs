//! api error handling for http handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// api error type for handler responses.
///
/// the variants mirror the error kinds surfaced to clients; each maps onto
/// one http status.
#[derive(Debug)]
pub enum ApiError {
    /// malformed request (400).
    InvalidArgument(String),
    /// missing or invalid credential (401).
    Unauthenticated(String),
    /// wrong principal kind or ownership (403).
    PermissionDenied(String),
    /// referenced entity missing (404).
    NotFound(String),
    /// assignment race lost; the client may retry (409).
    Aborted(String),
    /// state-machine or geofence violation (412).
    FailedPrecondition(String),
    /// unexpected failure (500).
    Internal(String),
}

impl ApiError {
    /// create an invalid-argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// create an unauthenticated error.
    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    /// create a permission-denied error.
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// create a not-found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// create an internal error from any displayable error.
    pub fn internal(e: impl std::fmt::Display) -> Self {
        Self::Internal(e.to_string())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::PermissionDenied(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Aborted(_) => StatusCode::CONFLICT,
            Self::FailedPrecondition(_) => StatusCode::PRECONDITION_FAILED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            Self::InvalidArgument(msg)
            | Self::Unauthenticated(msg)
            | Self::PermissionDenied(msg)
            | Self::NotFound(msg)
            | Self::Aborted(msg)
            | Self::FailedPrecondition(msg)
            | Self::Internal(msg) => msg,
        };
        (status, message).into_response()
    }
}

impl From<skycourier_dispatch::Error> for ApiError {
    fn from(err: skycourier_dispatch::Error) -> Self {
        use skycourier_dispatch::Error as E;
        match err {
            E::NotFound(what) => Self::NotFound(format!("{what} not found")),
            E::PermissionDenied(msg) => Self::PermissionDenied(msg),
            E::FailedPrecondition(msg) => Self::FailedPrecondition(msg),
            E::InvalidArgument(msg) => Self::InvalidArgument(msg),
            E::AssignRace(msg) => Self::Aborted(format!("assign race: {msg}")),
            E::Store(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<skycourier_db::Error> for ApiError {
    fn from(err: skycourier_db::Error) -> Self {
        match err {
            skycourier_db::Error::NotFound(msg) => Self::NotFound(msg),
            skycourier_db::Error::AlreadyExists(msg) => Self::Aborted(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}
