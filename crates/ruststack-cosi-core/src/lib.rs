//! COSI driver core for RustStack.
//!
//! Provisions buckets and access credentials against an in-memory object
//! storage backend. Every lifecycle operation is idempotent: replaying a
//! request with identical arguments yields the same result and leaves the
//! state unchanged.
//!
//! # Architecture
//!
//! ```text
//! ruststack-cosi-http (routing, JSON, deadlines)
//!        |
//!        v
//! RustStackCosiHandler (CosiHandler impl)
//!        |
//!        v
//! RustStackCosi (idempotency policy, responses)
//!        |
//!        v
//! StorageBackend (InMemoryStorage: buckets, users)
//! ```
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod handler;
pub mod keygen;
pub mod provider;
pub mod storage;

pub use config::{CosiConfig, CosiEndpoint};
pub use handler::RustStackCosiHandler;
pub use keygen::{KeyGenerator, RandomKeyGenerator, SeededKeyGenerator};
pub use provider::RustStackCosi;
pub use storage::{Bucket, InMemoryStorage, Provisioned, StorageBackend, User};
