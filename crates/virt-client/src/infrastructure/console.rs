//! Console sessions: one upgraded connection, streamed at most once.
//!
//! [`ConsoleSession::stream`] runs the two relay loops from
//! [`crate::application::relay`] as separate Tokio tasks:
//!
//! - **Outbound**: input endpoint → connection (one message per read)
//! - **Inbound**: connection → output endpoint (one write per message)
//!
//! Either direction may sit idle indefinitely while the other is busy, so
//! each gets its own task and the multi-threaded runtime runs them in
//! parallel.  The call returns as soon as the first task finishes.
//!
//! # Teardown
//!
//! ```text
//! first finished = inbound   → abort outbound (it is parked on the caller's
//!                              input, closing the connection cannot wake it)
//!                            → close connection
//! first finished = outbound  → close connection
//!                            → give inbound `close_timeout` to see the peer's
//!                              close reply, then abort it
//! ```
//!
//! Closing goes through [`ConnectionCloser`], which sends the close frame at
//! most once no matter how many paths ask for it.  Aborting a task drops its
//! half of the connection; once both halves are gone the socket is released.
//!
//! If both tasks are ready in the same poll, inbound wins the tie and its
//! result is reported.  The result of the second task is only logged.
//!
//! Both tasks are held in `RelayTask` guards: if the caller drops the
//! `stream` future before it returns, the guards abort both tasks, which
//! drops both halves and releases the socket.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::{Sink, SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use uuid::Uuid;

use virt_core::ResourceRef;

use crate::application::relay::{
    pump_inbound, pump_outbound, RelayOutcome, StreamError, StreamOptions,
};
use crate::domain::{ClientConfig, Direction};

/// The transport under a console obtained from an API server.
pub type TcpTransport = MaybeTlsStream<TcpStream>;

// ── ConsoleSession ────────────────────────────────────────────────────────────

/// A live, upgraded console connection to one VM.
///
/// Created by the session establisher
/// ([`open_console`](crate::infrastructure::connect::open_console)); the
/// transport parameter only differs from the default in tests.
///
/// Dropping a session that was never streamed drops the connection (the
/// socket is closed without a close frame); call [`ConsoleSession::close`]
/// for a graceful goodbye instead.
pub struct ConsoleSession<T = TcpTransport> {
    id: Uuid,
    target: ResourceRef,
    connection: StdMutex<Option<WebSocketStream<T>>>,
    chunk_size: usize,
    close_timeout: Duration,
}

impl<T> ConsoleSession<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    /// Wraps an already upgraded connection.
    pub fn new(target: ResourceRef, connection: WebSocketStream<T>, config: &ClientConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            target,
            connection: StdMutex::new(Some(connection)),
            chunk_size: config.chunk_size,
            close_timeout: config.close_timeout,
        }
    }

    /// Random identifier used in log lines.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The VM this console belongs to.
    pub fn target(&self) -> &ResourceRef {
        &self.target
    }

    /// True once the connection has been handed to [`ConsoleSession::stream`]
    /// or closed.
    pub fn is_consumed(&self) -> bool {
        self.lock_connection().is_none()
    }

    /// Closes a session that will not be streamed, sending a close frame
    /// bounded by the configured close timeout.
    pub async fn close(self) {
        let Some(mut connection) = self.take_connection() else {
            return;
        };
        match timeout(self.close_timeout, connection.close(None)).await {
            Ok(Ok(())) => debug!("console {}: closed without streaming", self.id),
            Ok(Err(e)) => debug!("console {}: close handshake failed: {e}", self.id),
            Err(_) => warn!(
                "console {}: close did not complete within {:?}",
                self.id, self.close_timeout
            ),
        }
    }

    /// Relays bytes between the console and `options` until either direction
    /// ends.
    ///
    /// # Returns
    ///
    /// - `Ok(Termination::InputEnded)` when the input endpoint hit EOF first
    /// - `Ok(Termination::ClosedByPeer)` when the peer closed first
    /// - `Err(StreamError::AlreadyConsumed)` on a second call (no I/O done)
    /// - any other [`StreamError`] for the first failure observed
    ///
    /// The connection is closed before this returns.
    pub async fn stream<R, W>(&self, options: StreamOptions<R, W>) -> RelayOutcome
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let Some(connection) = self.take_connection() else {
            debug!("console {}: stream requested on a consumed session", self.id);
            return Err(StreamError::AlreadyConsumed);
        };

        let session_id = self.id.to_string();
        info!("console {session_id}: streaming {}", self.target);

        let (sink, stream) = connection.split();
        let sink = Arc::new(Mutex::new(sink));
        let closer = ConnectionCloser::new(Arc::clone(&sink), self.close_timeout, session_id.clone());

        let StreamOptions { input, output } = options;
        let chunk_size = self.chunk_size;

        // ── Task A: input → connection ────────────────────────────────────────
        let mut outbound = RelayTask::spawn({
            let sink = Arc::clone(&sink);
            let session_id = session_id.clone();
            let mut input = input;
            async move { pump_outbound(&mut input, &*sink, chunk_size, &session_id).await }
        });

        // ── Task B: connection → output ───────────────────────────────────────
        let mut inbound = RelayTask::spawn({
            let session_id = session_id.clone();
            let mut stream = stream;
            let mut output = output;
            async move { pump_inbound(&mut stream, &mut output, &session_id).await }
        });

        // ── Wait for the first task to finish ─────────────────────────────────
        let (first, direction) = tokio::select! {
            biased;
            result = &mut inbound => (result, Direction::Inbound),
            result = &mut outbound => (result, Direction::Outbound),
        };
        let outcome = settle(first, direction, &session_id);
        debug!("console {session_id}: {direction} relay finished first: {outcome:?}");

        // ── Tear down ─────────────────────────────────────────────────────────
        match direction {
            Direction::Inbound => {
                outbound.abort();
                log_remaining(outbound.await, Direction::Outbound, &session_id);
                closer.close().await;
            }
            Direction::Outbound => {
                closer.close().await;
                match timeout(self.close_timeout, &mut inbound).await {
                    Ok(result) => log_remaining(result, Direction::Inbound, &session_id),
                    Err(_) => {
                        debug!(
                            "console {session_id}: inbound relay still blocked after {:?}; aborting",
                            self.close_timeout
                        );
                        inbound.abort();
                        log_remaining(inbound.await, Direction::Inbound, &session_id);
                    }
                }
            }
        }

        match &outcome {
            Ok(termination) => info!("console {session_id}: session ended: {termination}"),
            Err(e) => warn!("console {session_id}: session failed: {e}"),
        }
        outcome
    }

    fn take_connection(&self) -> Option<WebSocketStream<T>> {
        self.lock_connection().take()
    }
}

impl<T> ConsoleSession<T> {
    fn lock_connection(&self) -> std::sync::MutexGuard<'_, Option<WebSocketStream<T>>> {
        // Nothing panics while holding this lock; recover the value if it ever does.
        self.connection
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl<T> Drop for ConsoleSession<T> {
    fn drop(&mut self) {
        if self.lock_connection().is_some() {
            debug!("console {}: discarded without streaming; dropping connection", self.id);
        }
    }
}

/// Turns a task join result into the outcome of its direction.
fn settle(result: Result<RelayOutcome, JoinError>, direction: Direction, session_id: &str) -> RelayOutcome {
    result.unwrap_or_else(|e| {
        warn!("console {session_id}: {direction} relay task did not complete: {e}");
        Err(StreamError::RelayAborted { direction })
    })
}

fn log_remaining(result: Result<RelayOutcome, JoinError>, direction: Direction, session_id: &str) {
    match result {
        Ok(outcome) => debug!("console {session_id}: {direction} relay ended during teardown: {outcome:?}"),
        Err(e) if e.is_cancelled() => debug!("console {session_id}: {direction} relay aborted"),
        Err(e) => warn!("console {session_id}: {direction} relay task failed: {e}"),
    }
}

// ── RelayTask ─────────────────────────────────────────────────────────────────

/// A spawned relay loop that is aborted when its handle is dropped.
struct RelayTask(JoinHandle<RelayOutcome>);

impl RelayTask {
    fn spawn<F>(relay: F) -> Self
    where
        F: Future<Output = RelayOutcome> + Send + 'static,
    {
        Self(tokio::spawn(relay))
    }

    fn abort(&self) {
        self.0.abort();
    }
}

impl Future for RelayTask {
    type Output = Result<RelayOutcome, JoinError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().0).poll(cx)
    }
}

impl Drop for RelayTask {
    fn drop(&mut self) {
        // No-op for a task that already finished.
        self.0.abort();
    }
}

// ── ConnectionCloser ──────────────────────────────────────────────────────────

/// Sends the close frame on a shared sink exactly once.
///
/// Safe to call from any number of places; only the first call does any I/O
/// and reports `true`.
pub(crate) struct ConnectionCloser<S> {
    sink: Arc<Mutex<S>>,
    closed: AtomicBool,
    close_timeout: Duration,
    session_id: String,
}

impl<S> ConnectionCloser<S>
where
    S: Sink<Message, Error = WsError> + Unpin,
{
    pub(crate) fn new(sink: Arc<Mutex<S>>, close_timeout: Duration, session_id: String) -> Self {
        Self {
            sink,
            closed: AtomicBool::new(false),
            close_timeout,
            session_id,
        }
    }

    /// Closes the connection if nobody has yet.  Returns whether this call did.
    pub(crate) async fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::AcqRel) {
            return false;
        }

        let session_id = &self.session_id;
        let closing = async {
            let mut sink = self.sink.lock().await;
            sink.close().await
        };
        match timeout(self.close_timeout, closing).await {
            Ok(Ok(())) => debug!("console {session_id}: close frame sent"),
            // The peer may already be gone; the socket is released either way.
            Ok(Err(e)) => debug!("console {session_id}: close handshake failed: {e}"),
            Err(_) => warn!(
                "console {session_id}: close did not complete within {:?}",
                self.close_timeout
            ),
        }
        true
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
