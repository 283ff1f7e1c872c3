//! Integration tests for resource references and request paths.
//!
//! These exercise the public API the client crate relies on: a validated
//! [`ResourceRef`] feeding the path builders, and the VM envelope types
//! decoding the bodies an API server actually returns.

use virt_core::api::paths::{
    collection_path, resource_path, vnc_path, KUBEVIRT_V1ALPHA1, VIRTUAL_MACHINES,
};
use virt_core::{ResourceRef, ResourceRefError, Status, VirtualMachine, VirtualMachineList};

const BASE_PATH: &str = "/apis/kubevirt.io/v1alpha1/namespaces/default/virtualmachines";

#[test]
fn test_crud_paths_for_testvm() {
    let vm = ResourceRef::new("default", "testvm").expect("valid ref");

    assert_eq!(collection_path(KUBEVIRT_V1ALPHA1, vm.namespace(), VIRTUAL_MACHINES), BASE_PATH);
    assert_eq!(
        resource_path(KUBEVIRT_V1ALPHA1, &vm, VIRTUAL_MACHINES),
        format!("{BASE_PATH}/testvm")
    );
}

#[test]
fn test_vnc_path_for_testvm() {
    let vm = ResourceRef::new("default", "testvm").expect("valid ref");

    assert_eq!(
        vnc_path(&vm),
        "/apis/subresources.kubevirt.io/v1alpha1/namespaces/default/virtualmachines/testvm/vnc"
    );
}

#[test]
fn test_traversal_attempts_never_reach_a_path() {
    // Each of these would otherwise escape the namespace or the resource.
    for (ns, name) in [("default", ".."), ("..", "testvm"), ("default", "a/b"), ("default", "%2e%2e")] {
        let result = ResourceRef::new(ns, name);
        assert!(
            matches!(result, Err(ResourceRefError::InvalidPathSegment { .. })),
            "({ns:?}, {name:?}) must be rejected, got {result:?}"
        );
    }
}

#[test]
fn test_vm_list_roundtrips_through_json() {
    let list = VirtualMachineList::new(vec![
        VirtualMachine::new_minimal("testvm"),
        VirtualMachine::new_minimal("othervm"),
    ]);

    let json = serde_json::to_string(&list).expect("serialize");
    let decoded: VirtualMachineList = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(decoded, list);
}

#[test]
fn test_not_found_status_body_decodes() {
    let body = r#"{
        "kind": "Status",
        "apiVersion": "v1",
        "metadata": {},
        "status": "Failure",
        "message": "virtualmachines.kubevirt.io \"testvm\" not found",
        "reason": "NotFound",
        "details": { "name": "testvm", "group": "kubevirt.io", "kind": "virtualmachines" },
        "code": 404
    }"#;

    let status: Status = serde_json::from_str(body).expect("decode status");

    assert!(status.is_not_found());
    assert_eq!(status.code, 404);
}
