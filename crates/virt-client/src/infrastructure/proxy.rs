//! Endpoints for a console session: the process's stdio or one TCP client.
//!
//! `virtctl-vnc` uses these to hand a console to a local VNC viewer, either
//! through a pipe (stdin/stdout) or by listening for exactly one connection.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tracing::info;

use crate::application::relay::StreamOptions;
use crate::domain::Termination;
use crate::infrastructure::console::ConsoleSession;

/// Bridges the console to this process's stdin and stdout.
///
/// # Errors
///
/// Any [`StreamError`](crate::application::StreamError) of the relay, with
/// context attached.
pub async fn proxy_stdio<T>(session: &ConsoleSession<T>) -> anyhow::Result<Termination>
where
    T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let options = StreamOptions {
        input: tokio::io::stdin(),
        output: tokio::io::stdout(),
    };
    session
        .stream(options)
        .await
        .with_context(|| format!("console relay for {} failed", session.target()))
}

/// Accepts exactly one connection on `listener`, closes the listener, and
/// bridges the console to that connection.
///
/// # Errors
///
/// Returns an error if the accept fails or the relay fails.
pub async fn proxy_tcp<T>(session: &ConsoleSession<T>, listener: TcpListener) -> anyhow::Result<Termination>
where
    T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let local: Option<SocketAddr> = listener.local_addr().ok();
    let (socket, peer) = listener
        .accept()
        .await
        .with_context(|| format!("failed to accept a viewer on {local:?}"))?;
    drop(listener);
    info!("console {}: viewer connected from {peer}", session.id());

    let (input, output) = socket.into_split();
    session
        .stream(StreamOptions { input, output })
        .await
        .with_context(|| format!("console relay for {} failed", session.target()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
