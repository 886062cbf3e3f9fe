//! COSI provider implementing the Identity and Provisioner services.
//!
//! The provider holds no state of its own. Each operation validates its
//! input, makes a single atomic call into the [`StorageBackend`], and builds
//! the response from what the backend returned. Replaying any request with
//! identical arguments is safe.

use std::collections::HashMap;
use std::sync::Arc;

use ruststack_cosi_model::error::CosiError;
use ruststack_cosi_model::input::{
    DriverCreateBucketInput, DriverDeleteBucketInput, DriverGetInfoInput,
    DriverGrantBucketAccessInput, DriverRevokeBucketAccessInput,
};
use ruststack_cosi_model::output::{
    DriverCreateBucketOutput, DriverDeleteBucketOutput, DriverGetInfoOutput,
    DriverGrantBucketAccessOutput, DriverRevokeBucketAccessOutput,
};
use ruststack_cosi_model::types::{CredentialDetails, Protocol, S3_PROTOCOL, S3Protocol};

use crate::config::CosiConfig;
use crate::error::{StorageError, storage_error_to_cosi};
use crate::storage::{Bucket, InMemoryStorage, Provisioned, StorageBackend};

/// The RustStack COSI driver.
#[derive(Debug)]
pub struct RustStackCosi {
    storage: Arc<dyn StorageBackend>,
    config: Arc<CosiConfig>,
}

impl RustStackCosi {
    /// Create a provider backed by a fresh [`InMemoryStorage`].
    #[must_use]
    pub fn new(config: CosiConfig) -> Self {
        Self::with_storage(config, Arc::new(InMemoryStorage::new()))
    }

    /// Create a provider over an existing storage backend.
    #[must_use]
    pub fn with_storage(config: CosiConfig, storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            storage,
            config: Arc::new(config),
        }
    }

    // -----------------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------------

    /// Handle `DriverGetInfo`.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if no driver name is configured.
    pub fn handle_get_info(
        &self,
        _input: DriverGetInfoInput,
    ) -> Result<DriverGetInfoOutput, CosiError> {
        if self.config.driver_name.is_empty() {
            return Err(CosiError::internal("driver name is not configured"));
        }
        Ok(DriverGetInfoOutput {
            name: self.config.driver_name.clone(),
        })
    }

    // -----------------------------------------------------------------------
    // Provisioner
    // -----------------------------------------------------------------------

    /// Handle `DriverCreateBucket`.
    ///
    /// Creates the bucket if absent. An existing bucket with equal
    /// parameters is reported as success; one with different parameters
    /// yields `AlreadyExists` and is left unchanged.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an empty name, `AlreadyExists` on a parameter
    /// conflict, `Internal` on backend failure.
    pub async fn handle_create_bucket(
        &self,
        input: DriverCreateBucketInput,
    ) -> Result<DriverCreateBucketOutput, CosiError> {
        require_non_empty("name", &input.name)?;
        let name = input.name;

        let bucket = match self.storage.create_bucket(&name, input.parameters).await {
            Ok(Provisioned::Created(bucket)) => {
                tracing::info!(bucket = %name, "created bucket");
                bucket
            }
            Ok(Provisioned::Existing(bucket)) => {
                tracing::debug!(bucket = %name, "bucket already exists with same parameters");
                bucket
            }
            Err(e @ StorageError::BucketConflict { .. }) => {
                tracing::info!(bucket = %name, "bucket exists with different parameters");
                return Err(storage_error_to_cosi(e));
            }
            Err(e) => {
                tracing::error!(bucket = %name, error = %e, "failed to create bucket");
                return Err(storage_error_to_cosi(e));
            }
        };

        Ok(DriverCreateBucketOutput {
            bucket_id: bucket.name.clone(),
            bucket_info: Some(self.bucket_info(&bucket)),
        })
    }

    /// Handle `DriverDeleteBucket`. Deleting a missing bucket succeeds.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an empty ID, `Internal` on backend failure.
    pub async fn handle_delete_bucket(
        &self,
        input: DriverDeleteBucketInput,
    ) -> Result<DriverDeleteBucketOutput, CosiError> {
        require_non_empty("bucketId", &input.bucket_id)?;
        let name = input.bucket_id;

        match self.storage.delete_bucket(&name).await {
            Ok(Some(_)) => tracing::info!(bucket = %name, "deleted bucket"),
            Ok(None) => tracing::debug!(bucket = %name, "bucket already absent"),
            Err(e) => {
                tracing::error!(bucket = %name, error = %e, "failed to delete bucket");
                return Err(storage_error_to_cosi(e));
            }
        }
        Ok(DriverDeleteBucketOutput {})
    }

    /// Handle `DriverGrantBucketAccess`.
    ///
    /// The account name is the idempotency key: the first grant creates a
    /// user with a fresh key pair, later grants return the stored keys.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an empty name, `Internal` on backend failure.
    pub async fn handle_grant_bucket_access(
        &self,
        input: DriverGrantBucketAccessInput,
    ) -> Result<DriverGrantBucketAccessOutput, CosiError> {
        require_non_empty("name", &input.name)?;
        let name = input.name;

        let user = match self.storage.create_user(&name).await {
            Ok(Provisioned::Created(user)) => {
                tracing::info!(user = %name, bucket = %input.bucket_id, "created user");
                user
            }
            Ok(Provisioned::Existing(user)) => {
                tracing::debug!(user = %name, bucket = %input.bucket_id, "user already exists");
                user
            }
            Err(e) => {
                tracing::error!(user = %name, error = %e, "failed to create user");
                return Err(storage_error_to_cosi(e));
            }
        };

        let credentials = HashMap::from([(
            S3_PROTOCOL.to_owned(),
            CredentialDetails::s3(user.access_key, user.secret_key),
        )]);
        Ok(DriverGrantBucketAccessOutput {
            account_id: user.name,
            credentials,
        })
    }

    /// Handle `DriverRevokeBucketAccess`. Revoking a missing account succeeds.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an empty account ID, `Internal` on backend failure.
    pub async fn handle_revoke_bucket_access(
        &self,
        input: DriverRevokeBucketAccessInput,
    ) -> Result<DriverRevokeBucketAccessOutput, CosiError> {
        require_non_empty("accountId", &input.account_id)?;
        let name = input.account_id;

        match self.storage.delete_user(&name).await {
            Ok(Some(_)) => tracing::info!(user = %name, "deleted user"),
            Ok(None) => tracing::debug!(user = %name, "user already absent"),
            Err(e) => {
                tracing::error!(user = %name, error = %e, "failed to delete user");
                return Err(storage_error_to_cosi(e));
            }
        }
        Ok(DriverRevokeBucketAccessOutput {})
    }

    fn bucket_info(&self, bucket: &Bucket) -> Protocol {
        let region = bucket
            .region()
            .unwrap_or(&self.config.default_region)
            .to_owned();
        Protocol::S3(S3Protocol {
            region,
            signature_version: self.config.signature_version,
        })
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), CosiError> {
    if value.is_empty() {
        return Err(CosiError::invalid_argument(format!(
            "{field} must not be empty"
        )));
    }
    Ok(())
}
