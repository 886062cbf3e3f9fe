//! COSI response serialization and error formatting.

use ruststack_cosi_model::error::CosiError;

use crate::body::CosiResponseBody;

/// Content type for COSI JSON responses.
pub const CONTENT_TYPE: &str = "application/json";

/// Response header carrying the request ID.
pub const REQUEST_ID_HEADER: &str = "x-cosi-request-id";

/// Serialize a COSI error into a JSON response body.
///
/// ```json
/// {
///   "code": "AlreadyExists",
///   "message": "bucket 'photos' already exists with different parameters"
/// }
/// ```
#[must_use]
pub fn error_to_json(error: &CosiError) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "code": error.code.as_str(),
        "message": error.message,
    }))
    .expect("JSON serialization of error cannot fail")
}

/// Convert a `CosiError` into a complete HTTP error response.
#[must_use]
pub fn error_to_response(error: &CosiError, request_id: &str) -> http::Response<CosiResponseBody> {
    let body = CosiResponseBody::from_json(error_to_json(error));

    http::Response::builder()
        .status(error.status_code)
        .header("content-type", CONTENT_TYPE)
        .header(REQUEST_ID_HEADER, request_id)
        .body(body)
        .expect("valid error response")
}

/// Build a success response from JSON bytes.
#[must_use]
pub fn json_response(json: Vec<u8>, request_id: &str) -> http::Response<CosiResponseBody> {
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header("content-type", CONTENT_TYPE)
        .header(REQUEST_ID_HEADER, request_id)
        .body(CosiResponseBody::from_json(json))
        .expect("valid JSON response")
}
