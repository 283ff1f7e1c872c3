//! The client facade: `KubevirtClient` → `vm(namespace)` → verbs.
//!
//! ```rust,no_run
//! use virt_client::{ClientConfig, KubevirtClient};
//! use virt_core::GetOptions;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = KubevirtClient::new(ClientConfig::default())?;
//! let vm = client.vm("default").get("testvm", &GetOptions::default()).await?;
//! let _console = client.vm("default").vnc(&vm.metadata.name).await?;
//! # Ok(())
//! # }
//! ```

use reqwest::Method;
use tracing::debug;

use virt_core::api::paths::{collection_path, resource_path, KUBEVIRT_V1ALPHA1, VIRTUAL_MACHINES};
use virt_core::domain::resource::validate_path_segment;
use virt_core::{
    DeleteOptions, GetOptions, ListOptions, ResourceRef, ResourceRefError, VirtualMachine,
    VirtualMachineList,
};

use crate::domain::ClientConfig;
use crate::infrastructure::connect::{open_console, ConnectError};
use crate::infrastructure::console::ConsoleSession;
use crate::infrastructure::rest::{ApiError, RestClient};

/// Entry point for talking to one API server.
#[derive(Debug, Clone)]
pub struct KubevirtClient {
    config: ClientConfig,
    rest: RestClient,
}

impl KubevirtClient {
    /// Builds a client; no request is sent until a verb is called.
    ///
    /// # Errors
    ///
    /// [`ApiError::InvalidUrl`] for an unusable server URL,
    /// [`ApiError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let rest = RestClient::new(&config)?;
        Ok(Self { config, rest })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// VM verbs scoped to `namespace`.
    pub fn vm(&self, namespace: impl Into<String>) -> VmInterface<'_> {
        VmInterface {
            client: self,
            namespace: namespace.into(),
        }
    }
}

/// VM verbs within one namespace.
#[derive(Debug)]
pub struct VmInterface<'a> {
    client: &'a KubevirtClient,
    namespace: String,
}

impl VmInterface<'_> {
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// `GET .../virtualmachines/{name}`
    pub async fn get(&self, name: &str, options: &GetOptions) -> Result<VirtualMachine, ApiError> {
        let path = self.resource_path(name)?;
        let request = self.client.rest.request(Method::GET, &path).query(options);
        self.client.rest.send_json(request).await
    }

    /// `GET .../virtualmachines`
    pub async fn list(&self, options: &ListOptions) -> Result<VirtualMachineList, ApiError> {
        let path = self.collection_path()?;
        let request = self.client.rest.request(Method::GET, &path).query(options);
        self.client.rest.send_json(request).await
    }

    /// `POST .../virtualmachines` with `vm` as the body.
    pub async fn create(&self, vm: &VirtualMachine) -> Result<VirtualMachine, ApiError> {
        let path = self.collection_path()?;
        let request = self.client.rest.request(Method::POST, &path).json(vm);
        self.client.rest.send_json(request).await
    }

    /// `PUT .../virtualmachines/{vm.metadata.name}` with `vm` as the body.
    pub async fn update(&self, vm: &VirtualMachine) -> Result<VirtualMachine, ApiError> {
        let path = self.resource_path(&vm.metadata.name)?;
        let request = self.client.rest.request(Method::PUT, &path).json(vm);
        self.client.rest.send_json(request).await
    }

    /// `DELETE .../virtualmachines/{name}`; `options` travel as the body when
    /// any field is set.
    pub async fn delete(&self, name: &str, options: &DeleteOptions) -> Result<(), ApiError> {
        let path = self.resource_path(name)?;
        let mut request = self.client.rest.request(Method::DELETE, &path);
        if !options.is_empty() {
            request = request.json(options);
        }
        self.client.rest.send_empty(request).await?;
        debug!("deleted virtualmachine {}/{name}", self.namespace);
        Ok(())
    }

    /// Opens the VNC console of VM `name`.
    pub async fn vnc(&self, name: &str) -> Result<ConsoleSession, ConnectError> {
        let target = ResourceRef::new(self.namespace.as_str(), name)?;
        open_console(&self.client.config, target).await
    }

    fn resource_path(&self, name: &str) -> Result<String, ApiError> {
        let target = ResourceRef::new(self.namespace.as_str(), name)?;
        Ok(resource_path(KUBEVIRT_V1ALPHA1, &target, VIRTUAL_MACHINES))
    }

    fn collection_path(&self) -> Result<String, ApiError> {
        if self.namespace.is_empty() {
            return Err(ResourceRefError::EmptyNamespace.into());
        }
        validate_path_segment("namespace", &self.namespace)?;
        Ok(collection_path(KUBEVIRT_V1ALPHA1, &self.namespace, VIRTUAL_MACHINES))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
