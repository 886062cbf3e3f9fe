//! COSI HTTP service implementing the hyper `Service` trait.

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::body::Incoming;

use ruststack_cosi_model::error::CosiError;

use crate::body::CosiResponseBody;
use crate::dispatch::{CosiHandler, dispatch_operation};
use crate::response::{CONTENT_TYPE, REQUEST_ID_HEADER, error_to_response, json_response};
use crate::router::{is_health_check, request_deadline, resolve_operation};

/// Configuration for the COSI HTTP service.
#[derive(Debug, Clone)]
pub struct CosiHttpConfig {
    /// Default per-request deadline; `None` disables it.
    pub request_timeout: Option<Duration>,
    /// Driver name reported by the health endpoint.
    pub driver_name: String,
}

impl Default for CosiHttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            driver_name: "cosi.ruststack.dev".to_owned(),
        }
    }
}

/// Hyper `Service` implementation for COSI.
///
/// Wraps a [`CosiHandler`] implementation and routes incoming HTTP requests
/// to the appropriate COSI operation.
#[derive(Debug)]
pub struct CosiHttpService<H: CosiHandler> {
    handler: Arc<H>,
    config: Arc<CosiHttpConfig>,
}

impl<H: CosiHandler> CosiHttpService<H> {
    /// Create a new `CosiHttpService`.
    pub fn new(handler: Arc<H>, config: CosiHttpConfig) -> Self {
        Self {
            handler,
            config: Arc::new(config),
        }
    }
}

impl<H: CosiHandler> Clone for CosiHttpService<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            config: Arc::clone(&self.config),
        }
    }
}

impl<H: CosiHandler> hyper::service::Service<http::Request<Incoming>> for CosiHttpService<H> {
    type Response = http::Response<CosiResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let handler = Arc::clone(&self.handler);
        let config = Arc::clone(&self.config);
        let request_id = uuid::Uuid::new_v4().to_string();

        Box::pin(async move {
            let response = process_request(req, handler.as_ref(), &config, &request_id).await;
            let response = add_common_headers(response, &request_id);
            Ok(response)
        })
    }
}

/// Process a single COSI HTTP request through the full pipeline.
async fn process_request<H, B>(
    req: http::Request<B>,
    handler: &H,
    config: &CosiHttpConfig,
    request_id: &str,
) -> http::Response<CosiResponseBody>
where
    H: CosiHandler,
    B: http_body::Body<Data = Bytes>,
    B::Error: fmt::Display,
{
    let (parts, incoming) = req.into_parts();

    // 1. Health probe.
    if is_health_check(&parts.method, parts.uri.path()) {
        return health_response(config, request_id);
    }

    // 2. Verify POST method (every COSI RPC is a POST).
    if parts.method != http::Method::POST {
        return error_to_response(&CosiError::method_not_allowed(&parts.method), request_id);
    }

    // 3. Route: extract operation from the method path.
    let op = match resolve_operation(parts.uri.path()) {
        Ok(op) => op,
        Err(err) => return error_to_response(&err, request_id),
    };

    // 4. Collect body.
    let body = match collect_body(incoming).await {
        Ok(body) => body,
        Err(err) => return error_to_response(&err, request_id),
    };

    // 5. Dispatch to handler under the request deadline.
    let deadline = request_deadline(&parts.headers, config.request_timeout);
    match dispatch_operation(handler, op, body, request_id, deadline).await {
        Ok(response) => response,
        Err(err) => {
            tracing::debug!(operation = %op, code = %err.code, "COSI operation failed");
            error_to_response(&err, request_id)
        }
    }
}

/// Collect the incoming body into a single `Bytes` buffer.
async fn collect_body<B>(incoming: B) -> Result<Bytes, CosiError>
where
    B: http_body::Body<Data = Bytes>,
    B::Error: fmt::Display,
{
    incoming
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .map_err(|e| CosiError::internal(format!("Failed to read request body: {e}")))
}

/// Build the health endpoint response.
fn health_response(config: &CosiHttpConfig, request_id: &str) -> http::Response<CosiResponseBody> {
    let json = serde_json::to_vec(&serde_json::json!({
        "status": "ok",
        "driver": config.driver_name,
    }))
    .expect("JSON serialization of health status cannot fail");
    json_response(json, request_id)
}

/// Add common response headers to every COSI response.
fn add_common_headers(
    mut response: http::Response<CosiResponseBody>,
    request_id: &str,
) -> http::Response<CosiResponseBody> {
    let headers = response.headers_mut();

    if let Ok(hv) = http::HeaderValue::from_str(request_id) {
        headers.entry(REQUEST_ID_HEADER).or_insert(hv);
    }

    headers
        .entry("content-type")
        .or_insert(http::HeaderValue::from_static(CONTENT_TYPE));

    headers.insert("server", http::HeaderValue::from_static("RustStack"));

    response
}
