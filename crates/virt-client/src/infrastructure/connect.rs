//! Opening a VM console: the WebSocket upgrade on the `vnc` subresource.
//!
//! ```text
//! server URL  http://host:port/prefix
//!      ↓  scheme http→ws, https→wss; prefix kept
//! ws://host:port/prefix/apis/subresources.kubevirt.io/v1alpha1/namespaces/{ns}/virtualmachines/{name}/vnc
//!      ↓  GET + Upgrade: websocket (+ Authorization: Bearer …)
//! HTTP 101  → ConsoleSession
//! other     → ConnectError::UpgradeRejected
//! ```
//!
//! Exactly one connection attempt is made.  Anything opened along the way is
//! dropped before an error is returned.

use std::time::Duration;

use reqwest::Url;
use thiserror::Error;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Error as WsError;
use tracing::{debug, info, warn};

use virt_core::{vnc_path, ResourceRef, ResourceRefError};

use crate::domain::ClientConfig;
use crate::infrastructure::console::ConsoleSession;

/// Why a console could not be opened.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The namespace or name cannot be used in a request path.
    #[error("invalid console target: {0}")]
    InvalidTarget(#[from] ResourceRefError),

    /// The configured server URL cannot be turned into a WebSocket URL.
    #[error("invalid server URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The bearer token contains bytes that are not allowed in a header.
    #[error("bearer token is not a valid header value")]
    InvalidToken,

    /// The server answered the upgrade request with something other than 101.
    #[error("console upgrade rejected with HTTP {status}")]
    UpgradeRejected { status: u16, body: String },

    /// Network or handshake failure (refused, reset, malformed response, TLS).
    #[error("console connection failed: {0}")]
    Transport(#[source] WsError),

    /// The upgrade did not complete within the configured connect timeout.
    #[error("console upgrade did not complete within {0:?}")]
    Timeout(Duration),
}

/// Builds the WebSocket URL of `target`'s console below `server`.
///
/// # Errors
///
/// [`ConnectError::InvalidUrl`] when `server` does not parse or its scheme is
/// neither `http` nor `https`.
pub fn console_url(server: &str, target: &ResourceRef) -> Result<Url, ConnectError> {
    let invalid = |reason: String| ConnectError::InvalidUrl {
        url: server.to_string(),
        reason,
    };

    let mut url = Url::parse(server).map_err(|e| invalid(e.to_string()))?;
    let scheme = match url.scheme() {
        "http" => "ws",
        "https" => "wss",
        other => return Err(invalid(format!("unsupported scheme {other:?}"))),
    };
    url.set_scheme(scheme)
        .map_err(|()| invalid(format!("cannot switch to {scheme}")))?;

    let prefix = url.path().trim_end_matches('/').to_string();
    url.set_path(&format!("{prefix}{}", vnc_path(target)));
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Performs the upgrade handshake for `target`'s console.
///
/// Returns only after the server has answered with HTTP 101.  The returned
/// session has not transferred any bytes yet.
///
/// # Errors
///
/// See [`ConnectError`].  No retry is attempted.
pub async fn open_console(config: &ClientConfig, target: ResourceRef) -> Result<ConsoleSession, ConnectError> {
    let url = console_url(&config.server, &target)?;

    let mut request = url
        .as_str()
        .into_client_request()
        .map_err(ConnectError::Transport)?;
    if let Some(token) = &config.token {
        let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| ConnectError::InvalidToken)?;
        request.headers_mut().insert(AUTHORIZATION, value);
    }

    debug!("opening console for {target} at {url}");
    let (connection, response) = match timeout(config.connect_timeout, connect_async(request)).await {
        Ok(Ok(established)) => established,
        Ok(Err(WsError::Http(response))) => {
            let status = response.status().as_u16();
            let body = response
                .body()
                .as_deref()
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                .unwrap_or_default();
            warn!("console upgrade for {target} rejected: HTTP {status}");
            return Err(ConnectError::UpgradeRejected { status, body });
        }
        Ok(Err(e)) => {
            warn!("console connection for {target} failed: {e}");
            return Err(ConnectError::Transport(e));
        }
        Err(_) => {
            warn!(
                "console upgrade for {target} timed out after {:?}",
                config.connect_timeout
            );
            return Err(ConnectError::Timeout(config.connect_timeout));
        }
    };

    let session = ConsoleSession::new(target, connection, config);
    info!(
        "console {}: upgraded {} (HTTP {})",
        session.id(),
        session.target(),
        response.status().as_u16()
    );
    Ok(session)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
