//! dispatch engine error kinds.
//!
//! these mirror the error categories surfaced to clients; the transport
//! layer maps them onto status codes.

use thiserror::Error;

/// errors produced by dispatch operations.
#[derive(Debug, Error)]
pub enum Error {
    /// a referenced user, drone or order does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// the caller is not allowed to perform this operation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// the operation is not valid in the current state.
    #[error("failed precondition: {0}")]
    FailedPrecondition(String),

    /// the request is malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// another drone won the assignment race; the client may retry.
    #[error("assign race: {0}")]
    AssignRace(String),

    /// underlying store failure.
    #[error(transparent)]
    Store(#[from] skycourier_db::Error),
}
