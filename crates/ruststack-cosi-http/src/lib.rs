//! COSI HTTP service layer for RustStack.
//!
//! Carries the COSI RPCs as JSON over HTTP/1.1 and HTTP/2:
//!
//! - **Router**: maps `POST /cosi.v1alpha1.<Service>/<Method>` to an operation
//! - **Handler trait**: defines the boundary between HTTP and business logic
//! - **Service**: Hyper `Service` implementation with per-request deadlines
//! - **Response helpers**: JSON success/error response formatting
#![allow(missing_docs)]

pub mod body;
pub mod dispatch;
pub mod response;
pub mod router;
pub mod service;

pub use body::CosiResponseBody;
pub use dispatch::{CosiHandler, HandlerFuture};
pub use service::{CosiHttpConfig, CosiHttpService};
