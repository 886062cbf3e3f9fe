//! COSI output types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{CredentialDetails, Protocol};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Output for the `DriverGetInfo` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverGetInfoOutput {
    /// The driver (provisioner) name.
    pub name: String,
}

// ---------------------------------------------------------------------------
// Provisioner
// ---------------------------------------------------------------------------

/// Output for the `DriverCreateBucket` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverCreateBucketOutput {
    /// Identifier of the bucket; equal to the requested name.
    pub bucket_id: String,

    /// How to address the bucket.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket_info: Option<Protocol>,
}

/// Output for the `DriverDeleteBucket` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriverDeleteBucketOutput {}

/// Output for the `DriverGrantBucketAccess` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverGrantBucketAccessOutput {
    /// Identifier to pass to `DriverRevokeBucketAccess`.
    pub account_id: String,

    /// Protocol name to credential bundle.
    pub credentials: HashMap<String, CredentialDetails>,
}

/// Output for the `DriverRevokeBucketAccess` operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriverRevokeBucketAccessOutput {}
