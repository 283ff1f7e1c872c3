//! # virt-core
//!
//! Shared, I/O-free building blocks of the KubeVirt console client:
//!
//! - **`domain`** – [`ResourceRef`] (a validated namespace + name), the VM
//!   resource envelope types, Kubernetes `Status` error bodies and the
//!   per-verb request options.
//!
//! - **`api`** – API group/version constants and the functions that turn a
//!   [`ResourceRef`] into collection, resource and subresource paths, among
//!   them the VNC console path.
//!
//! The network-facing pieces (HTTP verbs, the WebSocket upgrade and the
//! stream bridge) live in the `virt-client` crate.

pub mod api;
pub mod domain;

// Re-export the most-used types at the crate root so callers can write
// `virt_core::ResourceRef` instead of `virt_core::domain::resource::ResourceRef`.
pub use api::paths::{vnc_path, GroupVersion};
pub use domain::options::{DeleteOptions, GetOptions, ListOptions, PropagationPolicy};
pub use domain::resource::{ResourceRef, ResourceRefError};
pub use domain::status::Status;
pub use domain::vm::{ListMeta, ObjectMeta, VirtualMachine, VirtualMachineList};
