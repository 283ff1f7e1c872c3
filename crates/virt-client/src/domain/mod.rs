//! Domain layer for virt-client.
//!
//! Pure types with no dependency on sockets, runtimes or HTTP: the client
//! configuration and the vocabulary used to describe how a console relay
//! ended.

pub mod config;
pub mod outcome;

pub use config::ClientConfig;
pub use outcome::{Direction, Termination};
