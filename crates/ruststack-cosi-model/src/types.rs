//! Shared COSI types: protocol metadata and credential bundles.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Protocol key under which S3 credentials are returned.
pub const S3_PROTOCOL: &str = "s3";

/// Secret field carrying the access key ID.
pub const ACCESS_KEY_ID: &str = "accessKeyID";

/// Secret field carrying the secret access key.
pub const ACCESS_SECRET_KEY: &str = "accessSecretKey";

/// S3 request signing scheme advertised to bucket consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum S3SignatureVersion {
    /// Unspecified.
    UnknownSignature,
    /// AWS Signature Version 2.
    #[default]
    S3V2,
    /// AWS Signature Version 4.
    S3V4,
}

impl S3SignatureVersion {
    /// Returns the wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownSignature => "UnknownSignature",
            Self::S3V2 => "S3V2",
            Self::S3V4 => "S3V4",
        }
    }
}

impl fmt::Display for S3SignatureVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for S3SignatureVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "S3V2" | "V2" => Ok(Self::S3V2),
            "S3V4" | "V4" => Ok(Self::S3V4),
            "UNKNOWNSIGNATURE" | "UNKNOWN" => Ok(Self::UnknownSignature),
            _ => Err(format!("unknown S3 signature version: {s}")),
        }
    }
}

/// S3 addressing metadata for a provisioned bucket.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Protocol {
    /// Region the bucket lives in.
    pub region: String,
    /// Signature version clients must use.
    pub signature_version: S3SignatureVersion,
}

/// Protocol-specific bucket metadata.
///
/// Serialized as a single-key object, e.g. `{"s3": {"region": "..."}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Protocol {
    /// Amazon S3 compatible bucket.
    S3(S3Protocol),
}

/// Secret material for one protocol.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialDetails {
    /// Secret field name to value.
    pub secrets: HashMap<String, String>,
}

impl CredentialDetails {
    /// Build an S3 key pair bundle.
    #[must_use]
    pub fn s3(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            secrets: HashMap::from([
                (ACCESS_KEY_ID.to_owned(), access_key_id.into()),
                (ACCESS_SECRET_KEY.to_owned(), secret_access_key.into()),
            ]),
        }
    }
}
