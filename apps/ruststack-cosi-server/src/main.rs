//! RustStack COSI Server - object storage provisioner driver.
//!
//! Serves the COSI Identity and Provisioner RPCs as JSON over HTTP on a TCP
//! or Unix domain socket, backed by an in-memory object storage store.
//!
//! # Usage
//!
//! ```text
//! COSI_ENDPOINT=tcp://0.0.0.0:9000 ruststack-cosi-server
//! ruststack-cosi-server --health-check
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `COSI_ENDPOINT` | `unix:///var/lib/cosi/cosi.sock` | Listen endpoint |
//! | `COSI_DRIVER_NAME` | `cosi.ruststack.dev` | Name reported by `DriverGetInfo` |
//! | `DEFAULT_REGION` | `eu-central-1` | Region for buckets without a `region` parameter |
//! | `COSI_SIGNATURE_VERSION` | `S3V2` | Signature version advertised in bucket info |
//! | `COSI_REQUEST_TIMEOUT_MS` | `30000` | Per-request deadline, `0` to disable |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::future::Future;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
#[cfg(unix)]
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
#[cfg(unix)]
use tokio::net::UnixListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ruststack_cosi_core::{CosiConfig, CosiEndpoint, RustStackCosi, RustStackCosiHandler};
use ruststack_cosi_http::service::{CosiHttpConfig, CosiHttpService};

/// Server version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

type Service = CosiHttpService<RustStackCosiHandler>;

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

fn build_http_config(config: &CosiConfig) -> CosiHttpConfig {
    CosiHttpConfig {
        request_timeout: config.request_timeout(),
        driver_name: config.driver_name.clone(),
    }
}

fn build_service(config: &CosiConfig) -> Service {
    let provider = RustStackCosi::new(config.clone());
    let handler = RustStackCosiHandler::new(Arc::new(provider));
    CosiHttpService::new(Arc::new(handler), build_http_config(config))
}

/// A bound listening socket.
enum Listener {
    Tcp(TcpListener),
    #[cfg(unix)]
    Unix(UnixListener),
}

impl Listener {
    async fn bind(endpoint: &CosiEndpoint) -> Result<Self> {
        match endpoint {
            CosiEndpoint::Tcp(addr) => {
                let listener = TcpListener::bind(addr.as_str())
                    .await
                    .with_context(|| format!("failed to bind to {addr}"))?;
                Ok(Self::Tcp(listener))
            }
            #[cfg(unix)]
            CosiEndpoint::Unix(path) => {
                prepare_socket_path(path)?;
                let listener = UnixListener::bind(path)
                    .with_context(|| format!("failed to bind to {}", path.display()))?;
                Ok(Self::Unix(listener))
            }
            #[cfg(not(unix))]
            CosiEndpoint::Unix(path) => {
                anyhow::bail!("unix sockets are not supported here: {}", path.display())
            }
        }
    }
}

/// Remove a stale socket file and create the parent directory.
///
/// Anything other than a socket at `path` is left in place and is an error.
#[cfg(unix)]
fn prepare_socket_path(path: &Path) -> Result<()> {
    use std::os::unix::fs::FileTypeExt;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e).with_context(|| format!("failed to stat {}", path.display())),
    };
    if !metadata.file_type().is_socket() {
        anyhow::bail!(
            "refusing to replace {}: existing file is not a socket",
            path.display()
        );
    }
    std::fs::remove_file(path)
        .with_context(|| format!("failed to remove {}", path.display()))?;
    warn!(path = %path.display(), "removed stale socket file");
    Ok(())
}

/// Remove the socket file on shutdown.
#[cfg(unix)]
fn cleanup_socket_path(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "failed to remove socket file");
        }
    }
}

/// Serve one connection, tracked by the graceful shutdown watcher.
fn spawn_connection<S>(
    http: &HttpConnBuilder<TokioExecutor>,
    graceful: &GracefulShutdown,
    stream: S,
    service: Service,
    peer: String,
) where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let conn = http.serve_connection(TokioIo::new(stream), service);
    let conn = graceful.watch(conn.into_owned());

    tokio::spawn(async move {
        if let Err(e) = conn.await {
            error!(peer = %peer, error = %e, "connection error");
        }
    });
}

/// Run the accept loop, serving connections until `shutdown` resolves.
async fn serve(listener: Listener, service: Service, shutdown: impl Future<Output = ()>) {
    let graceful = GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = accept(&listener) => {
                match result {
                    Ok((stream, peer)) => match stream {
                        Accepted::Tcp(s) => spawn_connection(&http, &graceful, s, service.clone(), peer),
                        #[cfg(unix)]
                        Accepted::Unix(s) => spawn_connection(&http, &graceful, s, service.clone(), peer),
                    },
                    Err(e) => warn!(error = %e, "failed to accept connection"),
                }
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    // Wait for in-flight requests to complete.
    graceful.shutdown().await;
    info!("all connections drained, exiting");
}

/// An accepted connection.
enum Accepted {
    Tcp(tokio::net::TcpStream),
    #[cfg(unix)]
    Unix(tokio::net::UnixStream),
}

async fn accept(listener: &Listener) -> std::io::Result<(Accepted, String)> {
    match listener {
        Listener::Tcp(l) => {
            let (stream, addr) = l.accept().await?;
            Ok((Accepted::Tcp(stream), addr.to_string()))
        }
        #[cfg(unix)]
        Listener::Unix(l) => {
            let (stream, _) = l.accept().await?;
            Ok((Accepted::Unix(stream), "unix".to_owned()))
        }
    }
}

/// Resolve when SIGINT or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    info!("received shutdown signal, draining connections");
}

/// Perform a health check by connecting to the endpoint and requesting `/healthz`.
async fn run_health_check(endpoint: &CosiEndpoint) -> Result<()> {
    match endpoint {
        CosiEndpoint::Tcp(addr) => {
            let addr = health_check_address(addr);
            let stream = tokio::net::TcpStream::connect(&addr)
                .await
                .with_context(|| format!("cannot connect to {addr}"))?;
            probe_health(stream, &addr).await
        }
        #[cfg(unix)]
        CosiEndpoint::Unix(path) => {
            let stream = tokio::net::UnixStream::connect(path)
                .await
                .with_context(|| format!("cannot connect to {}", path.display()))?;
            probe_health(stream, "localhost").await
        }
        #[cfg(not(unix))]
        CosiEndpoint::Unix(path) => {
            anyhow::bail!("unix sockets are not supported here: {}", path.display())
        }
    }
}

/// Rewrite an unspecified bind address (`0.0.0.0`, `[::]`) to loopback.
fn health_check_address(addr: &str) -> String {
    match addr.parse::<SocketAddr>() {
        Ok(mut socket_addr) if socket_addr.ip().is_unspecified() => {
            let loopback = match socket_addr.ip() {
                IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
                IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::LOCALHOST),
            };
            socket_addr.set_ip(loopback);
            socket_addr.to_string()
        }
        _ => addr.to_owned(),
    }
}

async fn probe_health<S>(mut stream: S, host: &str) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let request = format!("GET /healthz HTTP/1.1\r\nHost: {host}\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await?;

    let mut response = String::new();
    stream.read_to_string(&mut response).await?;

    if response.starts_with("HTTP/1.1 200") && response.contains("\"ok\"") {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {host}")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = CosiConfig::from_env();
    let endpoint = config
        .listen_endpoint()
        .map_err(anyhow::Error::msg)
        .context("invalid COSI_ENDPOINT")?;

    // Handle --health-check flag for container probes.
    if std::env::args().any(|a| a == "--health-check") {
        let healthy = run_health_check(&endpoint).await.is_ok();
        std::process::exit(i32::from(!healthy));
    }

    init_tracing(&config.log_level)?;

    let listener = Listener::bind(&endpoint).await?;
    info!(
        %endpoint,
        driver = %config.driver_name,
        default_region = %config.default_region,
        signature_version = %config.signature_version,
        version = VERSION,
        "starting RustStack COSI Server",
    );

    serve(listener, build_service(&config), shutdown_signal()).await;

    #[cfg(unix)]
    if let CosiEndpoint::Unix(path) = &endpoint {
        cleanup_socket_path(path);
    }

    Ok(())
}
