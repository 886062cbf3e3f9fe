//! COSI driver configuration.
//!
//! Provides [`CosiConfig`] for configuring the RustStack COSI driver.
//! Configuration values are loaded from environment variables; unparsable
//! values are ignored and the default is kept.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use ruststack_cosi_model::types::S3SignatureVersion;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// COSI driver configuration.
///
/// # Examples
///
/// ```
/// use ruststack_cosi_core::config::CosiConfig;
///
/// let config = CosiConfig::default();
/// assert_eq!(config.endpoint, "unix:///var/lib/cosi/cosi.sock");
/// assert_eq!(config.default_region, "eu-central-1");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct CosiConfig {
    /// Listen endpoint, `unix://<path>` or `tcp://<host:port>`.
    #[builder(default = String::from("unix:///var/lib/cosi/cosi.sock"))]
    pub endpoint: String,

    /// Driver name reported by `DriverGetInfo`.
    #[builder(default = String::from("cosi.ruststack.dev"))]
    pub driver_name: String,

    /// Region reported for buckets created without a `region` parameter.
    #[builder(default = String::from("eu-central-1"))]
    pub default_region: String,

    /// Signature version advertised in bucket info.
    #[builder(default)]
    pub signature_version: S3SignatureVersion,

    /// Per-request deadline in milliseconds; `0` disables it.
    #[builder(default = 30_000)]
    pub request_timeout_ms: u64,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,
}

impl Default for CosiConfig {
    fn default() -> Self {
        Self {
            endpoint: String::from("unix:///var/lib/cosi/cosi.sock"),
            driver_name: String::from("cosi.ruststack.dev"),
            default_region: String::from("eu-central-1"),
            signature_version: S3SignatureVersion::default(),
            request_timeout_ms: 30_000,
            log_level: String::from("info"),
        }
    }
}

impl CosiConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `COSI_ENDPOINT` | `unix:///var/lib/cosi/cosi.sock` |
    /// | `COSI_DRIVER_NAME` | `cosi.ruststack.dev` |
    /// | `DEFAULT_REGION` | `eu-central-1` |
    /// | `COSI_SIGNATURE_VERSION` | `S3V2` |
    /// | `COSI_REQUEST_TIMEOUT_MS` | `30000` |
    /// | `LOG_LEVEL` | `info` |
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("COSI_ENDPOINT") {
            config.endpoint = v;
        }
        if let Ok(v) = std::env::var("COSI_DRIVER_NAME") {
            config.driver_name = v;
        }
        if let Ok(v) = std::env::var("DEFAULT_REGION") {
            config.default_region = v;
        }
        if let Ok(v) = std::env::var("COSI_SIGNATURE_VERSION") {
            if let Ok(version) = v.parse() {
                config.signature_version = version;
            }
        }
        if let Ok(v) = std::env::var("COSI_REQUEST_TIMEOUT_MS") {
            if let Ok(n) = v.parse::<u64>() {
                config.request_timeout_ms = n;
            }
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }

    /// The per-request deadline, or `None` when disabled.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }

    /// Parse [`endpoint`](Self::endpoint).
    ///
    /// # Errors
    ///
    /// Returns an error message if the endpoint scheme is not supported.
    pub fn listen_endpoint(&self) -> Result<CosiEndpoint, String> {
        self.endpoint.parse()
    }
}

/// Where the driver listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CosiEndpoint {
    /// TCP socket address, e.g. `0.0.0.0:9000`.
    Tcp(String),
    /// Unix domain socket path.
    Unix(PathBuf),
}

impl FromStr for CosiEndpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(path) = s.strip_prefix("unix://") {
            if path.is_empty() {
                return Err(format!("empty unix socket path in endpoint: {s}"));
            }
            return Ok(Self::Unix(PathBuf::from(path)));
        }
        if let Some(addr) = s.strip_prefix("tcp://") {
            return Ok(Self::Tcp(addr.to_owned()));
        }
        if s.contains("://") {
            return Err(format!("unsupported endpoint scheme: {s}"));
        }
        Ok(Self::Tcp(s.to_owned()))
    }
}

impl fmt::Display for CosiEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp(addr) => write!(f, "tcp://{addr}"),
            Self::Unix(path) => write!(f, "unix://{}", path.display()),
        }
    }
}
