//! Client configuration types.
//!
//! [`ClientConfig`] is the single source of truth for runtime settings of
//! both the resource verbs and the console bridge.  It is a plain struct:
//! the binary fills it from CLI flags and the optional TOML file, tests build
//! it directly.

use std::fmt;
use std::time::Duration;

/// Server used when nothing else is configured (a local `kubectl proxy`).
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8001";

/// Bytes read from the input endpoint per outbound message.
pub const DEFAULT_CHUNK_SIZE: usize = 32 * 1024;

/// All runtime configuration of the client.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the API server, `http://` or `https://`.  A path component
    /// (e.g. when the API is served behind a prefix) is preserved.
    pub server: String,

    /// Bearer token sent with every request, if any.
    pub token: Option<String>,

    /// Upper bound on the TCP connect + WebSocket upgrade of a console.
    pub connect_timeout: Duration,

    /// Upper bound on a single resource verb round trip.
    pub request_timeout: Duration,

    /// How long teardown waits for the close handshake and for the second
    /// relay task before it is aborted.
    pub close_timeout: Duration,

    /// Maximum payload of one outbound console message.
    pub chunk_size: usize,
}

impl ClientConfig {
    /// Defaults with `server` replaced.
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ..Self::default()
        }
    }

    /// Sets the bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

impl Default for ClientConfig {
    /// | Field           | Default                 |
    /// |-----------------|-------------------------|
    /// | server          | `http://127.0.0.1:8001` |
    /// | token           | none                    |
    /// | connect_timeout | 10 seconds              |
    /// | request_timeout | 30 seconds              |
    /// | close_timeout   | 2 seconds               |
    /// | chunk_size      | 32 KiB                  |
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            token: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            close_timeout: Duration::from_secs(2),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

// Hand-written so the token never reaches a log line.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("server", &self.server)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("close_timeout", &self.close_timeout)
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
