//! Application layer for virt-client.
//!
//! The relay loops that move console bytes between a message-oriented
//! connection and caller-supplied byte endpoints, plus the error taxonomy
//! they report with.
//!
//! # What does NOT belong here?
//!
//! - Opening connections or performing the WebSocket upgrade (infrastructure)
//! - Spawning the relay tasks and tearing the connection down (infrastructure)

pub mod relay;

pub use relay::{pump_inbound, pump_outbound, RelayOutcome, StreamError, StreamOptions};
