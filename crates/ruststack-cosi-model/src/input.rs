//! COSI input types.
//!
//! Field names are `camelCase` to match the protobuf JSON mapping. Every
//! struct defaults missing fields so that a missing name surfaces as an
//! `InvalidArgument` from the provider rather than a decode failure.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Input for the `DriverGetInfo` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DriverGetInfoInput {}

// ---------------------------------------------------------------------------
// Provisioner
// ---------------------------------------------------------------------------

/// Input for the `DriverCreateBucket` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DriverCreateBucketInput {
    /// Bucket name; also the returned bucket ID.
    pub name: String,

    /// Creation parameters (e.g. `region`). Compared for equality on replay.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
}

/// Input for the `DriverDeleteBucket` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DriverDeleteBucketInput {
    /// ID returned by `DriverCreateBucket`.
    pub bucket_id: String,

    /// Opaque context from the orchestrator.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub delete_context: HashMap<String, String>,
}

/// Input for the `DriverGrantBucketAccess` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DriverGrantBucketAccessInput {
    /// Bucket the access is requested for.
    pub bucket_id: String,

    /// Account name; the idempotency key for the issued credentials.
    pub name: String,

    /// Access parameters from the orchestrator.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub parameters: HashMap<String, String>,
}

/// Input for the `DriverRevokeBucketAccess` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DriverRevokeBucketAccessInput {
    /// Bucket the access was granted for.
    pub bucket_id: String,

    /// Account ID returned by `DriverGrantBucketAccess`.
    pub account_id: String,

    /// Opaque context from the orchestrator.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub revoke_access_context: HashMap<String, String>,
}
