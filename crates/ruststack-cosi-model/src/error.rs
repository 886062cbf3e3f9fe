//! COSI error types.
//!
//! Error codes follow the gRPC status codes that the COSI sidecar
//! understands. On the JSON transport they are rendered as
//! `{"code": "AlreadyExists", "message": "..."}` with a matching HTTP status.

use std::fmt;

/// Well-known COSI error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum CosiErrorCode {
    /// A required field is missing or malformed.
    InvalidArgument,
    /// The requested method does not exist.
    NotFound,
    /// The HTTP method is not POST.
    MethodNotAllowed,
    /// The name is taken by a resource with incompatible parameters.
    AlreadyExists,
    /// The operation did not finish before its deadline.
    DeadlineExceeded,
    /// Backend failure. Callers are expected to retry.
    #[default]
    Internal,
}

impl CosiErrorCode {
    /// Returns the short error code string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "InvalidArgument",
            Self::NotFound => "NotFound",
            Self::MethodNotAllowed => "MethodNotAllowed",
            Self::AlreadyExists => "AlreadyExists",
            Self::DeadlineExceeded => "DeadlineExceeded",
            Self::Internal => "Internal",
        }
    }

    /// Returns the default HTTP status code for this error.
    #[must_use]
    pub fn default_status_code(&self) -> http::StatusCode {
        match self {
            Self::InvalidArgument => http::StatusCode::BAD_REQUEST,
            Self::NotFound => http::StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => http::StatusCode::METHOD_NOT_ALLOWED,
            Self::AlreadyExists => http::StatusCode::CONFLICT,
            Self::DeadlineExceeded => http::StatusCode::GATEWAY_TIMEOUT,
            Self::Internal => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for CosiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A COSI error response.
#[derive(Debug)]
pub struct CosiError {
    /// The error code.
    pub code: CosiErrorCode,
    /// A human-readable error message.
    pub message: String,
    /// The HTTP status code.
    pub status_code: http::StatusCode,
    /// The underlying source error, if any.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for CosiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CosiError({}): {}", self.code, self.message)
    }
}

impl std::error::Error for CosiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl CosiError {
    /// Create a new `CosiError` with a custom message.
    #[must_use]
    pub fn with_message(code: CosiErrorCode, message: impl Into<String>) -> Self {
        Self {
            status_code: code.default_status_code(),
            message: message.into(),
            code,
            source: None,
        }
    }

    /// Set the source error.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // -- Convenience constructors --

    /// A required field is missing or malformed.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::with_message(CosiErrorCode::InvalidArgument, message)
    }

    /// The name is taken by a resource with different parameters.
    #[must_use]
    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::with_message(CosiErrorCode::AlreadyExists, message)
    }

    /// Backend failure.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_message(CosiErrorCode::Internal, message)
    }

    /// The operation ran past its deadline.
    #[must_use]
    pub fn deadline_exceeded(message: impl Into<String>) -> Self {
        Self::with_message(CosiErrorCode::DeadlineExceeded, message)
    }

    /// The request body could not be decoded.
    #[must_use]
    pub fn malformed_body(detail: impl fmt::Display) -> Self {
        Self::invalid_argument(format!("Failed to deserialize request body: {detail}"))
    }

    /// Unknown method path.
    #[must_use]
    pub fn unknown_method(path: &str) -> Self {
        Self::with_message(
            CosiErrorCode::NotFound,
            format!("Unrecognized method: {path}"),
        )
    }

    /// Non-POST request.
    #[must_use]
    pub fn method_not_allowed(method: &http::Method) -> Self {
        Self::with_message(
            CosiErrorCode::MethodNotAllowed,
            format!("COSI requires POST method, got {method}"),
        )
    }
}
