//! Maps HTTP outcomes onto error kinds.

use reqwest::StatusCode;

use drivepath_core::error::{AppError, ErrorKind};

/// Status codes the retry policy treats as transient.
pub const TRANSIENT_STATUSES: &[u16] = &[408, 429, 500, 502, 503, 504, 506, 507, 508, 510];

/// Error kind for a non-success status.
pub fn kind_for_status(status: StatusCode) -> ErrorKind {
    match status.as_u16() {
        401 => ErrorKind::NotAuthenticated,
        404 => ErrorKind::NotFound,
        code if TRANSIENT_STATUSES.contains(&code) => ErrorKind::Transient,
        _ => ErrorKind::Remote,
    }
}

/// Build the error for a non-success response.
pub fn status_error(status: StatusCode, body: &str) -> AppError {
    let snippet: String = body.chars().take(512).collect();
    AppError::new(
        kind_for_status(status),
        format!("Drive API returned {status}: {snippet}"),
    )
}

/// Build the error for a failed send.
///
/// Connection-level failures are transient; a malformed request is not.
pub fn transport_error(err: reqwest::Error) -> AppError {
    let kind = if err.is_builder() {
        ErrorKind::Internal
    } else if err.is_decode() {
        ErrorKind::Serialization
    } else {
        ErrorKind::Transient
    };
    AppError::with_source(kind, format!("Drive API request failed: {err}"), err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(kind_for_status(StatusCode::UNAUTHORIZED), ErrorKind::NotAuthenticated);
        assert_eq!(kind_for_status(StatusCode::NOT_FOUND), ErrorKind::NotFound);
        assert_eq!(kind_for_status(StatusCode::TOO_MANY_REQUESTS), ErrorKind::Transient);
        assert_eq!(kind_for_status(StatusCode::SERVICE_UNAVAILABLE), ErrorKind::Transient);
        assert_eq!(kind_for_status(StatusCode::BAD_REQUEST), ErrorKind::Remote);
        assert_eq!(kind_for_status(StatusCode::FORBIDDEN), ErrorKind::Remote);
        assert_eq!(kind_for_status(StatusCode::NOT_IMPLEMENTED), ErrorKind::Remote);
    }

    #[test]
    fn test_status_error_truncates_body() {
        let body = "x".repeat(4096);
        let err = status_error(StatusCode::BAD_GATEWAY, &body);
        assert!(err.is_retryable());
        assert!(err.message.len() < 1024);
    }
}
