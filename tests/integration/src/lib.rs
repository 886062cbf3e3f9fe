//! End-to-end tests for the RustStack COSI driver.
//!
//! Each test starts an in-process driver on an ephemeral TCP port and talks
//! to it over HTTP with `reqwest`, exercising routing, JSON encoding and the
//! provider together.

use std::sync::{Arc, Once};

use anyhow::{Context, Result};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;

use ruststack_cosi_core::{CosiConfig, InMemoryStorage, RustStackCosi, RustStackCosiHandler};
use ruststack_cosi_http::service::{CosiHttpConfig, CosiHttpService};
use ruststack_cosi_model::operations::CosiOperation;

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// A driver running inside the test process.
#[derive(Debug)]
pub struct TestServer {
    base_url: String,
    storage: Arc<InMemoryStorage>,
    client: reqwest::Client,
}

impl TestServer {
    /// Start a driver with the default configuration.
    pub async fn start() -> Result<Self> {
        Self::start_with(CosiConfig::default()).await
    }

    /// Start a driver with a custom configuration.
    ///
    /// The endpoint in `config` is ignored; the server binds `127.0.0.1:0`.
    pub async fn start_with(config: CosiConfig) -> Result<Self> {
        init_tracing();

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind test listener")?;
        let addr = listener.local_addr()?;

        let storage = Arc::new(InMemoryStorage::new());
        let http_config = CosiHttpConfig {
            request_timeout: config.request_timeout(),
            driver_name: config.driver_name.clone(),
        };
        let provider = RustStackCosi::with_storage(config, storage.clone());
        let handler = RustStackCosiHandler::new(Arc::new(provider));
        let service = CosiHttpService::new(Arc::new(handler), http_config);

        tokio::spawn(async move {
            let http = HttpConnBuilder::new(TokioExecutor::new());
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    continue;
                };
                let conn = http
                    .serve_connection(TokioIo::new(stream), service.clone())
                    .into_owned();
                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        tracing::debug!(error = %e, "test connection error");
                    }
                });
            }
        });

        Ok(Self {
            base_url: format!("http://{addr}"),
            storage,
            client: reqwest::Client::new(),
        })
    }

    /// Base URL of the server, e.g. `http://127.0.0.1:41234`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The store behind the server.
    #[must_use]
    pub fn storage(&self) -> &InMemoryStorage {
        &self.storage
    }

    /// The HTTP client used by [`call`](Self::call).
    #[must_use]
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Invoke an RPC and return the status code and decoded JSON body.
    pub async fn call(
        &self,
        op: CosiOperation,
        body: serde_json::Value,
    ) -> Result<(reqwest::StatusCode, serde_json::Value)> {
        let resp = self
            .client
            .post(format!("{}{}", self.base_url, op.path()))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("{op} request failed"))?;
        let status = resp.status();
        let json = resp.json().await.with_context(|| format!("{op} body"))?;
        Ok((status, json))
    }
}

/// Generate a unique bucket name for a test.
#[must_use]
pub fn test_bucket_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}

mod test_error;
mod test_identity;
mod test_provisioner;
