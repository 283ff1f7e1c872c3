//! Infrastructure layer: everything that touches the network or the disk.
//!
//! # Responsibilities
//!
//! - Building console URLs and performing the WebSocket upgrade (`connect`)
//! - Owning a live console and running its two relay tasks (`console`)
//! - Sending the VM resource verbs over HTTP (`rest`, `client`)
//! - Reading the optional TOML configuration file (`config_file`)
//! - Attaching a console to stdio or a single TCP viewer (`proxy`)
//!
//! # What does NOT belong here?
//!
//! - The relay loops themselves (that is the application layer)
//! - Configuration and outcome types (that is the domain layer)
//! - Command-line parsing (that is done in `main.rs`)

pub mod client;
pub mod config_file;
pub mod connect;
pub mod console;
pub mod proxy;
pub mod rest;

pub use client::{KubevirtClient, VmInterface};
pub use config_file::{load_config, ConfigError, ConfigFile};
pub use connect::{console_url, open_console, ConnectError};
pub use console::ConsoleSession;
pub use proxy::{proxy_stdio, proxy_tcp};
pub use rest::{ApiError, RestClient};
