//! COSI request router.
//!
//! Each RPC is addressed by its gRPC method path:
//!
//! ```text
//! POST /cosi.v1alpha1.Provisioner/DriverCreateBucket
//! POST /cosi.v1alpha1.Identity/DriverGetInfo
//! ```
//!
//! `GET /healthz` and `GET /health` are answered by the service directly.

use std::time::Duration;

use ruststack_cosi_model::error::CosiError;
use ruststack_cosi_model::operations::CosiOperation;

/// Request header a caller uses to shorten the deadline, in milliseconds.
pub const TIMEOUT_HEADER: &str = "x-cosi-timeout-ms";

/// Resolve a COSI operation from the request path.
pub fn resolve_operation(path: &str) -> Result<CosiOperation, CosiError> {
    CosiOperation::from_path(path).ok_or_else(|| CosiError::unknown_method(path))
}

/// Whether the request targets the health endpoint.
#[must_use]
pub fn is_health_check(method: &http::Method, path: &str) -> bool {
    method == http::Method::GET && matches!(path, "/healthz" | "/health")
}

/// Compute the effective deadline for a request.
///
/// A caller-supplied [`TIMEOUT_HEADER`] can only shorten the configured
/// default. As with `COSI_REQUEST_TIMEOUT_MS`, `0` means no deadline, so a
/// zero or unparsable header value is ignored.
#[must_use]
pub fn request_deadline(headers: &http::HeaderMap, default: Option<Duration>) -> Option<Duration> {
    let requested = headers
        .get(TIMEOUT_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis);

    match (requested, default) {
        (Some(r), Some(d)) => Some(r.min(d)),
        (r, d) => r.or(d),
    }
}
