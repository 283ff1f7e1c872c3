//! virt-client library crate.
//!
//! A client for KubeVirt virtual machines: the VM resource verbs and a bridge
//! that relays a VM's VNC console between a WebSocket connection and a pair
//! of local byte streams.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! local endpoints (stdin/stdout, a TCP viewer, in-memory pipes)
//!         ↕
//! [virt-client]
//!   ├── domain/           ClientConfig, Direction, Termination
//!   ├── application/      The two relay loops and StreamError
//!   └── infrastructure/
//!         ├── connect/    WebSocket upgrade on the `vnc` subresource
//!         ├── console/    ConsoleSession: spawn, race, close once
//!         ├── rest/client VM get/list/create/update/delete over HTTP
//!         ├── config_file Optional TOML configuration
//!         └── proxy/      stdio and single-viewer TCP endpoints
//!         ↕
//! API server  (HTTP + WebSocket)
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async.
//! - `application` depends on `domain` and is generic over its transport, so
//!   it can be tested against mocks.
//! - `infrastructure` depends on all other layers plus `tokio`, `reqwest` and
//!   `tokio-tungstenite`.

/// Domain layer: configuration and outcome types (no I/O).
pub mod domain;

/// Application layer: the console relay loops.
pub mod application;

/// Infrastructure layer: HTTP, WebSocket, config file and local endpoints.
pub mod infrastructure;

pub use application::{RelayOutcome, StreamError, StreamOptions};
pub use domain::{ClientConfig, Direction, Termination};
pub use infrastructure::{open_console, ApiError, ConnectError, ConsoleSession, KubevirtClient};
