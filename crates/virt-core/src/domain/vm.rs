//! Virtual machine resource types as they appear on the wire.
//!
//! Only the envelope (type meta + object meta) is modelled field by field.
//! `spec` and `status` are carried as opaque JSON so the client round-trips
//! whatever the server stores without having to track the VM schema.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::api::paths::KUBEVIRT_V1ALPHA1;

/// `kind` of a single VM object.
pub const VIRTUAL_MACHINE_KIND: &str = "VirtualMachine";

/// `kind` of a VM list.
pub const VIRTUAL_MACHINE_LIST_KIND: &str = "VirtualMachineList";

/// Standard object metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

/// Metadata attached to list responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    #[serde(rename = "continue", default, skip_serializing_if = "Option::is_none")]
    pub continue_token: Option<String>,
}

/// A KubeVirt virtual machine object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachine {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub spec: serde_json::Value,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub status: serde_json::Value,
}

impl VirtualMachine {
    /// A VM carrying nothing but its type meta and name.
    ///
    /// ```rust
    /// use virt_core::VirtualMachine;
    ///
    /// let vm = VirtualMachine::new_minimal("testvm");
    /// assert_eq!(vm.metadata.name, "testvm");
    /// assert_eq!(vm.api_version, "kubevirt.io/v1alpha1");
    /// ```
    pub fn new_minimal(name: impl Into<String>) -> Self {
        Self {
            api_version: KUBEVIRT_V1ALPHA1.api_version(),
            kind: VIRTUAL_MACHINE_KIND.to_string(),
            metadata: ObjectMeta {
                name: name.into(),
                ..ObjectMeta::default()
            },
            spec: serde_json::Value::Null,
            status: serde_json::Value::Null,
        }
    }
}

/// A list of VMs as returned by the collection endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineList {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: ListMeta,
    #[serde(default)]
    pub items: Vec<VirtualMachine>,
}

impl VirtualMachineList {
    /// Wraps `items` in a list envelope with the KubeVirt type meta.
    pub fn new(items: Vec<VirtualMachine>) -> Self {
        Self {
            api_version: KUBEVIRT_V1ALPHA1.api_version(),
            kind: VIRTUAL_MACHINE_LIST_KIND.to_string(),
            metadata: ListMeta::default(),
            items,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
