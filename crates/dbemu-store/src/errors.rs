//! Error handling for dbemu-store
//!
//! Wraps dbemu-core ExError with store-specific helpers

use dbemu_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Wrap a lower-level error as a failed snapshot write
pub fn persistence_error(operation: &str, path: &std::path::Path, source: ExError) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op(operation.to_string())
        .with_message(format!("Failed to write {}", path.display()))
        .with_source(source)
}

/// Create an error from a failed HTTP exchange
///
/// Timeouts keep their own kind so they can be told apart in the summary;
/// everything else that never produced a response is a connection failure.
pub fn from_reqwest(operation: &str, err: reqwest::Error) -> ExError {
    let kind = if err.is_timeout() {
        ExErrorKind::Timeout
    } else if err.is_decode() {
        ExErrorKind::MalformedResponse
    } else {
        ExErrorKind::Connection
    };
    ExError::new(kind)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create an error from a non-success HTTP status
pub fn http_status(operation: &str, status: reqwest::StatusCode, body: &str) -> ExError {
    let kind = match status.as_u16() {
        401 | 403 => ExErrorKind::Connection,
        408 | 504 => ExErrorKind::Timeout,
        _ if status.is_server_error() => ExErrorKind::Connection,
        _ => ExErrorKind::Query,
    };
    let body = body.trim();
    let message = if body.is_empty() {
        format!("HTTP {}", status)
    } else {
        format!("HTTP {}: {}", status, body)
    };
    ExError::new(kind)
        .with_op(operation.to_string())
        .with_message(message)
}

/// Create an error from a `{code, message}` entry of a Neo4j `errors` array
pub fn neo4j_error(operation: &str, code: &str, message: &str) -> ExError {
    let kind = if code.contains("Security") {
        ExErrorKind::Connection
    } else if code.contains("TransactionTimedOut") || code.contains("Timeout") {
        ExErrorKind::Timeout
    } else {
        ExErrorKind::Query
    };
    ExError::new(kind)
        .with_op(operation.to_string())
        .with_message(format!("{}: {}", code, message))
}

/// Create an error for a response body that is not what the endpoint promises
pub fn malformed_response(operation: &str, reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::MalformedResponse)
        .with_op(operation.to_string())
        .with_message(reason)
}

/// Create an error for a snapshot file that cannot be read back
pub fn invalid_snapshot(path: &std::path::Path, reason: impl std::fmt::Display) -> ExError {
    ExError::new(ExErrorKind::InvalidSnapshot)
        .with_op("load_snapshot")
        .with_message(format!("{}: {}", path.display(), reason))
}
