//! COSI model types for RustStack.
//!
//! This crate provides the request, response, and error types for the
//! Container Object Storage Interface (COSI) driver implemented by
//! `ruststack-cosi-core`. The types are hand-written serde structs that mirror
//! the COSI protobuf messages, using `camelCase` JSON field names so they can
//! be carried over the JSON transport in `ruststack-cosi-http`.
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod input;
pub mod operations;
pub mod output;
pub mod types;

pub use error::{CosiError, CosiErrorCode};
pub use operations::CosiOperation;
