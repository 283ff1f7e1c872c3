//! API group/version constants and request path builders.

pub mod paths;

pub use paths::{
    collection_path, resource_path, subresource_path, vnc_path, GroupVersion, KUBEVIRT_V1ALPHA1,
    SUBRESOURCES_V1ALPHA1, VIRTUAL_MACHINES, VNC_SUBRESOURCE,
};
