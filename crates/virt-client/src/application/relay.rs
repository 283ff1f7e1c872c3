//! The two relay loops of a console session.
//!
//! A console connection is message-oriented: the VNC byte stream travels as
//! a sequence of discrete WebSocket binary messages.  The loops in this
//! module move bytes between those messages and a pair of plain byte
//! endpoints supplied by the caller:
//!
//! ```text
//!                 pump_outbound
//!   input  ──read(chunk)──▶ one Binary message per read ──▶ connection
//!
//!                 pump_inbound
//!   output ◀──write_all + flush── one payload per message ◀── connection
//! ```
//!
//! Both loops are generic over the sink/stream halves of the connection and
//! over the endpoint types, so they can be driven by a real socket, an
//! in-memory `tokio::io::duplex` pair, or a `tokio_test` mock.  They never
//! close or shut down anything: teardown belongs to
//! [`ConsoleSession::stream`](crate::infrastructure::console::ConsoleSession::stream).

use std::io;

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::{debug, warn};

use crate::domain::{Direction, Termination};

// ── Types ─────────────────────────────────────────────────────────────────────

/// The caller-supplied endpoints of a console relay.
///
/// `input` is read for outbound bytes, `output` receives inbound bytes.  The
/// relay moves both into its tasks and drops them when those tasks end; it
/// never calls `shutdown` on `output`.
#[derive(Debug)]
pub struct StreamOptions<R, W> {
    pub input: R,
    pub output: W,
}

/// Why a relay failed.
///
/// Every variant except [`StreamError::AlreadyConsumed`] belongs to one
/// direction, see [`StreamError::direction`].
#[derive(Debug, Error)]
pub enum StreamError {
    /// Reading the input endpoint failed.
    #[error("reading from the input endpoint failed: {0}")]
    InputReadFailed(#[source] io::Error),

    /// Writing or flushing the output endpoint failed.
    #[error("writing to the output endpoint failed: {0}")]
    OutputWriteFailed(#[source] io::Error),

    /// Receiving from the console connection failed (including a reset
    /// without a close handshake).
    #[error("receiving from the console connection failed: {0}")]
    ConnectionReadFailed(#[source] WsError),

    /// Sending to the console connection failed.
    #[error("sending to the console connection failed: {0}")]
    ConnectionWriteFailed(#[source] WsError),

    /// The session was already streamed once.  No I/O was performed.
    #[error("console session has already been streamed")]
    AlreadyConsumed,

    /// A relay task panicked or was cancelled by the runtime.
    #[error("{direction} relay task ended abnormally")]
    RelayAborted { direction: Direction },
}

impl StreamError {
    /// The direction the failure was observed on.
    pub fn direction(&self) -> Option<Direction> {
        match self {
            StreamError::InputReadFailed(_) | StreamError::ConnectionWriteFailed(_) => {
                Some(Direction::Outbound)
            }
            StreamError::OutputWriteFailed(_) | StreamError::ConnectionReadFailed(_) => {
                Some(Direction::Inbound)
            }
            StreamError::RelayAborted { direction } => Some(*direction),
            StreamError::AlreadyConsumed => None,
        }
    }
}

/// Terminal result of a relay: a clean [`Termination`] or a [`StreamError`].
pub type RelayOutcome = Result<Termination, StreamError>;

// ── Outbound: input → connection ──────────────────────────────────────────────

/// Reads `input` in chunks of at most `chunk_size` bytes and sends every
/// chunk as exactly one binary message.
///
/// The sink sits behind an async mutex so that teardown can close it while
/// this loop is parked on `input.read`.  The lock is only held for the
/// duration of one `send`.
///
/// Returns `Ok(Termination::InputEnded)` when `input` reports end-of-stream.
pub async fn pump_outbound<R, S>(
    input: &mut R,
    sink: &Mutex<S>,
    chunk_size: usize,
    session_id: &str,
) -> RelayOutcome
where
    R: AsyncRead + Unpin,
    S: Sink<Message, Error = WsError> + Unpin,
{
    // A zero-sized buffer would read 0 bytes forever and look like EOF.
    let mut buf = vec![0u8; chunk_size.max(1)];

    loop {
        let n = match input.read(&mut buf).await {
            Ok(0) => {
                debug!("console {session_id}: input reached end of stream");
                return Ok(Termination::InputEnded);
            }
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("console {session_id}: input read failed: {e}");
                return Err(StreamError::InputReadFailed(e));
            }
        };

        let mut sink = sink.lock().await;
        if let Err(e) = sink.send(Message::Binary(buf[..n].to_vec())).await {
            warn!("console {session_id}: send of {n} bytes failed: {e}");
            return Err(StreamError::ConnectionWriteFailed(e));
        }
    }
}

// ── Inbound: connection → output ──────────────────────────────────────────────

/// Receives messages and writes each payload to `output` in full, flushing
/// after every message.
///
/// Binary and text payloads are both delivered as raw bytes.  Ping, pong and
/// raw frames carry no console data and are skipped; tungstenite answers pings
/// on its own.
///
/// Returns `Ok(Termination::ClosedByPeer)` on a close frame or when the
/// stream ends after a completed close handshake.
pub async fn pump_inbound<St, W>(stream: &mut St, output: &mut W, session_id: &str) -> RelayOutcome
where
    St: Stream<Item = Result<Message, WsError>> + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        let message = match stream.next().await {
            Some(Ok(message)) => message,
            Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) | None => {
                debug!("console {session_id}: connection stream ended");
                return Ok(Termination::ClosedByPeer);
            }
            Some(Err(e)) => {
                warn!("console {session_id}: receive failed: {e}");
                return Err(StreamError::ConnectionReadFailed(e));
            }
        };

        match message {
            Message::Binary(data) => write_payload(output, &data).await?,
            Message::Text(text) => write_payload(output, text.as_bytes()).await?,
            Message::Close(frame) => {
                debug!("console {session_id}: close frame received: {frame:?}");
                return Ok(Termination::ClosedByPeer);
            }
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
        }
    }
}

async fn write_payload<W>(output: &mut W, payload: &[u8]) -> Result<(), StreamError>
where
    W: AsyncWrite + Unpin,
{
    output
        .write_all(payload)
        .await
        .map_err(StreamError::OutputWriteFailed)?;
    output.flush().await.map_err(StreamError::OutputWriteFailed)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::DuplexStream;
    use tokio_test::io::Builder;
    use tokio_tungstenite::tungstenite::protocol::Role;
    use tokio_tungstenite::WebSocketStream;

    /// A connected client/server WebSocket pair over an in-memory pipe.
    async fn ws_pair() -> (WebSocketStream<DuplexStream>, WebSocketStream<DuplexStream>) {
        let (a, b) = tokio::io::duplex(64 * 1024);
        let client = WebSocketStream::from_raw_socket(a, Role::Client, None).await;
        let server = WebSocketStream::from_raw_socket(b, Role::Server, None).await;
        (client, server)
    }

    async fn next_binary(server: &mut WebSocketStream<DuplexStream>) -> Vec<u8> {
        match server.next().await {
            Some(Ok(Message::Binary(data))) => data,
            other => panic!("expected a binary message, got {other:?}"),
        }
    }

    // ── StreamError ───────────────────────────────────────────────────────────

    #[test]
    fn test_stream_error_directions() {
        let io_err = || io::Error::new(io::ErrorKind::Other, "x");

        assert_eq!(
            StreamError::InputReadFailed(io_err()).direction(),
            Some(Direction::Outbound)
        );
        assert_eq!(
            StreamError::OutputWriteFailed(io_err()).direction(),
            Some(Direction::Inbound)
        );
        assert_eq!(
            StreamError::ConnectionReadFailed(WsError::ConnectionClosed).direction(),
            Some(Direction::Inbound)
        );
        assert_eq!(
            StreamError::ConnectionWriteFailed(WsError::ConnectionClosed).direction(),
            Some(Direction::Outbound)
        );
        assert_eq!(StreamError::AlreadyConsumed.direction(), None);
    }

    #[test]
    fn test_relay_aborted_message_names_direction() {
        let err = StreamError::RelayAborted {
            direction: Direction::Inbound,
        };
        assert_eq!(err.to_string(), "inbound relay task ended abnormally");
    }

    // ── Outbound ──────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_outbound_sends_each_read_as_one_message() {
        // Arrange: two separate reads followed by EOF
        let (client, mut server) = ws_pair().await;
        let (sink, _stream) = client.split();
        let sink = Mutex::new(sink);
        let mut input = Builder::new().read(b"hello").read(b", vnc!").build();

        // Act
        let outcome = pump_outbound(&mut input, &sink, 1024, "test").await;

        // Assert: boundaries are preserved, nothing is coalesced
        assert!(matches!(outcome, Ok(Termination::InputEnded)));
        assert_eq!(next_binary(&mut server).await, b"hello");
        assert_eq!(next_binary(&mut server).await, b", vnc!");
    }

    #[tokio::test]
    async fn test_outbound_splits_reads_larger_than_chunk_size() {
        let (client, mut server) = ws_pair().await;
        let (sink, _stream) = client.split();
        let sink = Mutex::new(sink);
        let mut input = Builder::new().read(b"0123456789").build();

        let outcome = pump_outbound(&mut input, &sink, 4, "test").await;

        assert!(matches!(outcome, Ok(Termination::InputEnded)));
        assert_eq!(next_binary(&mut server).await, b"0123");
        assert_eq!(next_binary(&mut server).await, b"4567");
        assert_eq!(next_binary(&mut server).await, b"89");
    }

    #[tokio::test]
    async fn test_outbound_zero_chunk_size_still_makes_progress() {
        let (client, mut server) = ws_pair().await;
        let (sink, _stream) = client.split();
        let sink = Mutex::new(sink);
        let mut input = Builder::new().read(b"ab").build();

        let outcome = pump_outbound(&mut input, &sink, 0, "test").await;

        assert!(matches!(outcome, Ok(Termination::InputEnded)));
        assert_eq!(next_binary(&mut server).await, b"a");
        assert_eq!(next_binary(&mut server).await, b"b");
    }

    #[tokio::test]
    async fn test_outbound_input_error_is_reported() {
        let (client, _server) = ws_pair().await;
        let (sink, _stream) = client.split();
        let sink = Mutex::new(sink);
        let mut input = Builder::new()
            .read_error(io::Error::new(io::ErrorKind::BrokenPipe, "pipe gone"))
            .build();

        let outcome = pump_outbound(&mut input, &sink, 64, "test").await;

        let err = outcome.unwrap_err();
        assert!(matches!(err, StreamError::InputReadFailed(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
        assert_eq!(err.direction(), Some(Direction::Outbound));
    }

    #[tokio::test]
    async fn test_outbound_send_to_vanished_peer_fails() {
        // Arrange: the peer end of the pipe is gone before anything is sent
        let (client, server) = ws_pair().await;
        drop(server);
        let (sink, _stream) = client.split();
        let sink = Mutex::new(sink);
        let mut input = Builder::new().read(b"lost").build();

        // Act
        let outcome = pump_outbound(&mut input, &sink, 64, "test").await;

        // Assert
        assert!(matches!(outcome, Err(StreamError::ConnectionWriteFailed(_))));
    }

    // ── Inbound ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_inbound_writes_payloads_in_order_until_close() {
        // Arrange
        let (client, mut server) = ws_pair().await;
        let (_sink, mut stream) = client.split();
        server.send(Message::Binary(b"hello".to_vec())).await.unwrap();
        server.send(Message::Text("vnc".to_string())).await.unwrap();
        server.send(Message::Ping(vec![1, 2, 3])).await.unwrap();
        server.send(Message::Binary(vec![0u8; 3])).await.unwrap();
        server.send(Message::Close(None)).await.unwrap();
        let mut output = Builder::new()
            .write(b"hello")
            .write(b"vnc")
            .write(&[0u8; 3])
            .build();

        // Act
        let outcome = pump_inbound(&mut stream, &mut output, "test").await;

        // Assert: ping carried no data, close is a clean end
        assert!(matches!(outcome, Ok(Termination::ClosedByPeer)));
    }

    #[tokio::test]
    async fn test_inbound_output_failure_is_reported() {
        let (client, mut server) = ws_pair().await;
        let (_sink, mut stream) = client.split();
        server.send(Message::Binary(b"x".to_vec())).await.unwrap();
        let mut output = Builder::new()
            .write_error(io::Error::new(io::ErrorKind::BrokenPipe, "viewer gone"))
            .build();

        let outcome = pump_inbound(&mut stream, &mut output, "test").await;

        let err = outcome.unwrap_err();
        assert!(matches!(err, StreamError::OutputWriteFailed(_)));
        assert_eq!(err.direction(), Some(Direction::Inbound));
    }

    #[tokio::test]
    async fn test_inbound_reset_without_close_is_a_read_failure() {
        // Arrange: the peer disappears without a close handshake
        let (client, server) = ws_pair().await;
        drop(server);
        let (_sink, mut stream) = client.split();
        let mut output = Builder::new().build();

        // Act
        let outcome = pump_inbound(&mut stream, &mut output, "test").await;

        // Assert
        assert!(matches!(outcome, Err(StreamError::ConnectionReadFailed(_))));
    }
}
