//! `virtctl-vnc`: attach a local VNC viewer to a KubeVirt VM console.
//!
//! The console is opened with a WebSocket upgrade on the VM's `vnc`
//! subresource and then bridged either to this process's stdin/stdout or to
//! exactly one TCP connection accepted on `--listen`.
//!
//! # Usage
//!
//! ```text
//! virtctl-vnc [OPTIONS] <NAME>
//!
//! Options:
//!   --server <URL>             API server base URL [default: http://127.0.0.1:8001]
//!   --token <TOKEN>            Bearer token
//!   -n, --namespace <NS>       Namespace of the VM [default: default]
//!   --config <FILE>            TOML configuration file
//!   --listen <ADDR>            Accept one viewer on ADDR instead of using stdio
//!   --connect-timeout <SECS>   Upgrade timeout in seconds [default: 10]
//!   --chunk-size <BYTES>       Maximum bytes per outbound message [default: 32768]
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable         | Flag          |
//! |------------------|---------------|
//! | `VIRT_SERVER`    | `--server`    |
//! | `VIRT_TOKEN`     | `--token`     |
//! | `VIRT_NAMESPACE` | `--namespace` |
//! | `VIRT_CONFIG`    | `--config`    |
//!
//! Command-line values win over the configuration file, which wins over the
//! built-in defaults.  Logs go to stderr (`RUST_LOG`, default `info`) so that
//! stdout stays a clean data channel.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use virt_client::infrastructure::{load_config, proxy_stdio, proxy_tcp, ConfigFile};
use virt_client::{open_console, ClientConfig};
use virt_core::ResourceRef;

/// Namespace used when neither the command line nor the file names one.
const DEFAULT_NAMESPACE: &str = "default";

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Attach to the VNC console of a KubeVirt virtual machine.
#[derive(Debug, Parser)]
#[command(
    name = "virtctl-vnc",
    about = "Bridge a KubeVirt VM's VNC console to stdio or a local TCP port",
    version
)]
struct Cli {
    /// API server base URL (`http://` or `https://`).
    #[arg(long, env = "VIRT_SERVER")]
    server: Option<String>,

    /// Bearer token for the API server.
    #[arg(long, env = "VIRT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Namespace of the VM.
    #[arg(short = 'n', long, env = "VIRT_NAMESPACE")]
    namespace: Option<String>,

    /// Optional TOML configuration file.
    #[arg(long, env = "VIRT_CONFIG")]
    config: Option<PathBuf>,

    /// Accept exactly one viewer on this address instead of using stdio.
    #[arg(long)]
    listen: Option<SocketAddr>,

    /// Upper bound on the console upgrade, in seconds.
    #[arg(long)]
    connect_timeout: Option<u64>,

    /// Maximum bytes per outbound console message.
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Name of the VM.
    name: String,
}

impl Cli {
    /// Merges the flags over `file` over the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the namespace or VM name is not a valid path
    /// segment.
    fn resolve(&self, file: &ConfigFile) -> anyhow::Result<(ClientConfig, ResourceRef)> {
        let mut config = file.apply_to(ClientConfig::default());
        if let Some(server) = &self.server {
            config.server = server.clone();
        }
        if let Some(token) = &self.token {
            config.token = Some(token.clone());
        }
        if let Some(secs) = self.connect_timeout {
            config.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = chunk_size;
        }

        let namespace = self
            .namespace
            .as_deref()
            .or(file.namespace.as_deref())
            .unwrap_or(DEFAULT_NAMESPACE);
        let target = ResourceRef::new(namespace, self.name.as_str())
            .with_context(|| format!("invalid VM reference '{namespace}/{}'", self.name))?;

        Ok((config, target))
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    // ── Logging setup ─────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;
    let result = runtime.block_on(run(cli));

    // A stdin read parked on a blocking thread cannot be interrupted.
    runtime.shutdown_timeout(Duration::from_millis(100));
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let file = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ConfigFile::default(),
    };
    let (config, target) = cli.resolve(&file)?;
    info!("virtctl-vnc starting: server={}, vm={target}", config.server);

    // Bind before connecting so a busy port fails fast.
    let listener = match cli.listen {
        Some(addr) => {
            let listener = TcpListener::bind(addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?;
            let bound = listener.local_addr().unwrap_or(addr);
            info!("waiting for a VNC viewer on {bound}");
            Some(listener)
        }
        None => None,
    };

    let session = open_console(&config, target.clone())
        .await
        .with_context(|| format!("failed to open the console of {target}"))?;

    let relay = async move {
        match listener {
            Some(listener) => proxy_tcp(&session, listener).await,
            None => proxy_stdio(&session).await,
        }
    };

    tokio::select! {
        result = relay => {
            let termination = result?;
            info!("console of {target} ended: {termination}");
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl+C")?;
            info!("received Ctrl+C, dropping the console of {target}");
        }
    }

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
