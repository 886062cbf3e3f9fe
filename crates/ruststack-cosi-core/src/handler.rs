//! COSI handler implementation bridging HTTP to the provider.

use std::sync::Arc;

use bytes::Bytes;

use ruststack_cosi_http::body::CosiResponseBody;
use ruststack_cosi_http::dispatch::{CosiHandler, HandlerFuture};
use ruststack_cosi_http::response::json_response;
use ruststack_cosi_model::error::CosiError;
use ruststack_cosi_model::operations::CosiOperation;

use crate::provider::RustStackCosi;

/// Handler that bridges the HTTP layer to the COSI provider.
#[derive(Debug)]
pub struct RustStackCosiHandler {
    provider: Arc<RustStackCosi>,
}

impl RustStackCosiHandler {
    /// Create a new handler wrapping a provider.
    #[must_use]
    pub fn new(provider: Arc<RustStackCosi>) -> Self {
        Self { provider }
    }
}

impl CosiHandler for RustStackCosiHandler {
    fn handle_operation(
        &self,
        op: CosiOperation,
        body: Bytes,
        request_id: String,
    ) -> HandlerFuture {
        let provider = Arc::clone(&self.provider);
        Box::pin(async move { dispatch(provider.as_ref(), op, &body, &request_id).await })
    }
}

/// Dispatch a COSI operation to the appropriate provider method.
async fn dispatch(
    provider: &RustStackCosi,
    op: CosiOperation,
    body: &[u8],
    request_id: &str,
) -> Result<http::Response<CosiResponseBody>, CosiError> {
    match op {
        CosiOperation::DriverGetInfo => {
            let input = deserialize(body)?;
            let output = provider.handle_get_info(input)?;
            serialize(&output, request_id)
        }
        CosiOperation::DriverCreateBucket => {
            let input = deserialize(body)?;
            let output = provider.handle_create_bucket(input).await?;
            serialize(&output, request_id)
        }
        CosiOperation::DriverDeleteBucket => {
            let input = deserialize(body)?;
            let output = provider.handle_delete_bucket(input).await?;
            serialize(&output, request_id)
        }
        CosiOperation::DriverGrantBucketAccess => {
            let input = deserialize(body)?;
            let output = provider.handle_grant_bucket_access(input).await?;
            serialize(&output, request_id)
        }
        CosiOperation::DriverRevokeBucketAccess => {
            let input = deserialize(body)?;
            let output = provider.handle_revoke_bucket_access(input).await?;
            serialize(&output, request_id)
        }
    }
}

/// Deserialize a JSON request body into the input type.
///
/// An empty body is treated as `{}`.
fn deserialize<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, CosiError> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}".as_slice()
    } else {
        body
    };
    serde_json::from_slice(body).map_err(CosiError::malformed_body)
}

/// Serialize an output type into a JSON HTTP response.
fn serialize<T: serde::Serialize>(
    output: &T,
    request_id: &str,
) -> Result<http::Response<CosiResponseBody>, CosiError> {
    let json = serde_json::to_vec(output)
        .map_err(|e| CosiError::internal(format!("Failed to serialize response: {e}")))?;
    Ok(json_response(json, request_id))
}
