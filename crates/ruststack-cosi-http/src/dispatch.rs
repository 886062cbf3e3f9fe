//! COSI handler trait and operation dispatch.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;

use ruststack_cosi_model::error::CosiError;
use ruststack_cosi_model::operations::CosiOperation;

use crate::body::CosiResponseBody;

/// Boxed future returned by [`CosiHandler::handle_operation`].
pub type HandlerFuture =
    Pin<Box<dyn Future<Output = Result<http::Response<CosiResponseBody>, CosiError>> + Send>>;

/// Trait that the COSI business logic provider must implement.
///
/// The handler receives a parsed operation enum, the raw JSON body bytes and
/// the request ID, and returns a complete HTTP response. This trait serves as
/// the boundary between the HTTP transport layer and the business logic
/// layer.
pub trait CosiHandler: Send + Sync + 'static {
    /// Handle a COSI operation and produce an HTTP response.
    fn handle_operation(
        &self,
        op: CosiOperation,
        body: Bytes,
        request_id: String,
    ) -> HandlerFuture;
}

/// Dispatch a COSI operation to the handler, bounded by `deadline`.
///
/// When the deadline elapses the handler future is dropped and
/// `DeadlineExceeded` is returned.
pub async fn dispatch_operation<H: CosiHandler>(
    handler: &H,
    op: CosiOperation,
    body: Bytes,
    request_id: &str,
    deadline: Option<Duration>,
) -> Result<http::Response<CosiResponseBody>, CosiError> {
    tracing::debug!(operation = %op, request_id, "dispatching COSI operation");
    let fut = handler.handle_operation(op, body, request_id.to_owned());

    let Some(deadline) = deadline else {
        return fut.await;
    };
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation = %op, request_id, ?deadline, "COSI operation timed out");
            Err(CosiError::deadline_exceeded(format!(
                "{op} did not complete within {}ms",
                deadline.as_millis()
            )))
        }
    }
}
