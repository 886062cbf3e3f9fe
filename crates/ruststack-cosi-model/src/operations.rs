//! COSI operation enum.
//!
//! Every COSI RPC belongs to one of two gRPC services: `Identity` or
//! `Provisioner`. The JSON transport addresses an operation by its gRPC
//! method path, e.g. `/cosi.v1alpha1.Provisioner/DriverCreateBucket`.

use std::fmt;

/// gRPC package of the COSI services.
pub const COSI_PACKAGE: &str = "cosi.v1alpha1";

/// The COSI service an operation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CosiService {
    /// Driver identification.
    Identity,
    /// Bucket and access lifecycle.
    Provisioner,
}

impl CosiService {
    /// Returns the unqualified service name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identity => "Identity",
            Self::Provisioner => "Provisioner",
        }
    }
}

/// All supported COSI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CosiOperation {
    // Identity
    /// Report the driver name.
    DriverGetInfo,

    // Provisioner
    /// Create a bucket (idempotent).
    DriverCreateBucket,
    /// Delete a bucket (idempotent).
    DriverDeleteBucket,
    /// Issue credentials for an account (idempotent).
    DriverGrantBucketAccess,
    /// Revoke an account's credentials (idempotent).
    DriverRevokeBucketAccess,
}

impl CosiOperation {
    /// All operations, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::DriverGetInfo,
        Self::DriverCreateBucket,
        Self::DriverDeleteBucket,
        Self::DriverGrantBucketAccess,
        Self::DriverRevokeBucketAccess,
    ];

    /// Returns the RPC method name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DriverGetInfo => "DriverGetInfo",
            Self::DriverCreateBucket => "DriverCreateBucket",
            Self::DriverDeleteBucket => "DriverDeleteBucket",
            Self::DriverGrantBucketAccess => "DriverGrantBucketAccess",
            Self::DriverRevokeBucketAccess => "DriverRevokeBucketAccess",
        }
    }

    /// Returns the service this operation is served by.
    #[must_use]
    pub fn service(&self) -> CosiService {
        match self {
            Self::DriverGetInfo => CosiService::Identity,
            _ => CosiService::Provisioner,
        }
    }

    /// Returns the fully-qualified method path, e.g.
    /// `/cosi.v1alpha1.Provisioner/DriverCreateBucket`.
    #[must_use]
    pub fn path(&self) -> String {
        format!(
            "/{COSI_PACKAGE}.{}/{}",
            self.service().as_str(),
            self.as_str()
        )
    }

    /// Parse an RPC method name into a `CosiOperation`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "DriverGetInfo" => Some(Self::DriverGetInfo),
            "DriverCreateBucket" => Some(Self::DriverCreateBucket),
            "DriverDeleteBucket" => Some(Self::DriverDeleteBucket),
            "DriverGrantBucketAccess" => Some(Self::DriverGrantBucketAccess),
            "DriverRevokeBucketAccess" => Some(Self::DriverRevokeBucketAccess),
            _ => None,
        }
    }

    /// Parse a `/<package>.<Service>/<Method>` path.
    ///
    /// The method must belong to the named service, so
    /// `/cosi.v1alpha1.Identity/DriverCreateBucket` does not resolve.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let rest = path.strip_prefix('/')?;
        let (qualified_service, method) = rest.split_once('/')?;
        let service = qualified_service
            .strip_prefix(COSI_PACKAGE)?
            .strip_prefix('.')?;
        let op = Self::from_name(method)?;
        (op.service().as_str() == service).then_some(op)
    }
}

impl fmt::Display for CosiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
