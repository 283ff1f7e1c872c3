//! Domain types: resource references, VM objects, API status bodies and
//! per-verb request options.  Nothing in here performs I/O.

pub mod options;
pub mod resource;
pub mod status;
pub mod vm;

pub use options::{DeleteOptions, GetOptions, ListOptions, PropagationPolicy};
pub use resource::{ResourceRef, ResourceRefError};
pub use status::Status;
pub use vm::{ListMeta, ObjectMeta, VirtualMachine, VirtualMachineList};
