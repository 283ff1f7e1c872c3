//! Request path construction for namespaced API resources.
//!
//! Layout:
//! ```text
//! /apis/{group}/{version}/namespaces/{namespace}/{plural}                      collection
//! /apis/{group}/{version}/namespaces/{namespace}/{plural}/{name}               resource
//! /apis/{group}/{version}/namespaces/{namespace}/{plural}/{name}/{subresource} subresource
//! ```
//!
//! The regular VM verbs live in the `kubevirt.io` group while the console
//! lives in the separate `subresources.kubevirt.io` group served by the
//! aggregated API.  Segments are not escaped: [`ResourceRef`] has already
//! rejected anything that would change the path structure.

use std::fmt;

use crate::domain::resource::ResourceRef;

/// An API group plus version, e.g. `kubevirt.io/v1alpha1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupVersion {
    pub group: &'static str,
    pub version: &'static str,
}

impl GroupVersion {
    /// The value used in an object's `apiVersion` field.
    pub fn api_version(&self) -> String {
        format!("{}/{}", self.group, self.version)
    }

    /// `/apis/{group}/{version}`
    pub fn prefix(&self) -> String {
        format!("/apis/{}/{}", self.group, self.version)
    }
}

impl fmt::Display for GroupVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.version)
    }
}

/// Group/version of the VM resource verbs.
pub const KUBEVIRT_V1ALPHA1: GroupVersion = GroupVersion {
    group: "kubevirt.io",
    version: "v1alpha1",
};

/// Group/version of the streaming subresources (VNC, console).
pub const SUBRESOURCES_V1ALPHA1: GroupVersion = GroupVersion {
    group: "subresources.kubevirt.io",
    version: "v1alpha1",
};

/// Plural resource name of VMs.
pub const VIRTUAL_MACHINES: &str = "virtualmachines";

/// Subresource name of the graphical console.
pub const VNC_SUBRESOURCE: &str = "vnc";

/// Path of the collection of `plural` in `namespace`.
pub fn collection_path(gv: GroupVersion, namespace: &str, plural: &str) -> String {
    format!("{}/namespaces/{namespace}/{plural}", gv.prefix())
}

/// Path of one named resource.
pub fn resource_path(gv: GroupVersion, target: &ResourceRef, plural: &str) -> String {
    format!(
        "{}/{}",
        collection_path(gv, target.namespace(), plural),
        target.name()
    )
}

/// Path of a subresource of one named resource.
pub fn subresource_path(
    gv: GroupVersion,
    target: &ResourceRef,
    plural: &str,
    subresource: &str,
) -> String {
    format!("{}/{subresource}", resource_path(gv, target, plural))
}

/// Path of the VNC console of a VM.
///
/// ```rust
/// use virt_core::{api::paths::vnc_path, ResourceRef};
///
/// let vm = ResourceRef::new("default", "testvm").unwrap();
/// assert_eq!(
///     vnc_path(&vm),
///     "/apis/subresources.kubevirt.io/v1alpha1/namespaces/default/virtualmachines/testvm/vnc"
/// );
/// ```
pub fn vnc_path(target: &ResourceRef) -> String {
    subresource_path(SUBRESOURCES_V1ALPHA1, target, VIRTUAL_MACHINES, VNC_SUBRESOURCE)
}
