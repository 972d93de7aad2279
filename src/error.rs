use std::io;

use axum::http::header::InvalidHeaderValue;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors raised while looking up or preparing a file response.
///
/// Apart from [`Error::NotFound`] and [`Error::Io`] these are programming
/// errors: they are raised as soon as the misuse happens and are never
/// corrected silently.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("file not found: {0}")]
    NotFound(String),

    #[error("storage lookup failed: {0}")]
    Io(#[from] io::Error),

    #[error("content cannot be set on a streaming file response")]
    LiteralContent,

    #[error("rate limit must be at least 1 byte per second")]
    InvalidRateLimit,

    /// Automatic ETag requested for a file with no checksum, and
    /// `resolve_etag` was not awaited.
    #[error("no content digest available for ETag of {0:?}")]
    MissingDigest(String),

    #[error("invalid disposition filename {0:?}")]
    InvalidFilename(String),

    #[error(transparent)]
    InvalidHeader(#[from] InvalidHeaderValue),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

/// Failure of the upstream fetch against the backing store.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// The backing store answered with a non-success status.
    #[error("upstream responded {status}: {message}")]
    Upstream { status: StatusCode, message: String },

    /// Connecting to or reading from the backing store failed.
    #[error("upstream transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A ranged fetch was answered with something other than 206.
    #[error("upstream ignored range request, responded {0}")]
    RangeIgnored(StatusCode),

    #[error("upstream ended after {received} of {expected} bytes")]
    Truncated { expected: u64, received: u64 },

    /// The receiving side went away or the session was cancelled.
    #[error("transfer aborted")]
    Aborted,

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl TransferError {
    /// The status to answer the client with, if headers have not been sent yet.
    pub fn status(&self) -> StatusCode {
        match self {
            TransferError::Upstream { status, .. }
                if status.is_client_error() || status.is_server_error() => *status,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for TransferError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
