// ABOUTME: Client-side proxy presenting ContainerOperations for a remote resource.
// ABOUTME: Resolves the endpoint once, then calls named operations and decodes envelopes.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::envelope::ResultEnvelope;
use super::error::RemoteError;
use super::names::{self, fix_id};
use super::tcp::{DEFAULT_TIMEOUT, TcpInvoker};
use super::transport::Invoker;
use crate::operations::ContainerOperations;
use crate::registry::OperationError;
use crate::state::ContainerState;
use crate::types::{ContainerUri, ResourceId};

/// Finds the transport for a resource id.
pub trait EndpointResolver: Send + Sync {
    fn resolve(&self, resource: &ResourceId) -> Result<Arc<dyn Invoker>, RemoteError>;
}

/// Fixed resource → TCP address table.
#[derive(Debug, Clone)]
pub struct StaticResolver {
    endpoints: HashMap<String, SocketAddr>,
    timeout: Duration,
}

impl Default for StaticResolver {
    fn default() -> Self {
        Self {
            endpoints: HashMap::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, resource: impl Into<String>, addr: SocketAddr) -> Self {
        self.endpoints.insert(resource.into(), addr);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self, resource: &str) -> Option<SocketAddr> {
        self.endpoints.get(resource).copied()
    }
}

impl EndpointResolver for StaticResolver {
    fn resolve(&self, resource: &ResourceId) -> Result<Arc<dyn Invoker>, RemoteError> {
        let addr = self
            .endpoint(resource.as_str())
            .ok_or_else(|| RemoteError::UnknownResource {
                resource: resource.to_string(),
            })?;
        Ok(Arc::new(TcpInvoker::new(addr).with_timeout(self.timeout)))
    }
}

/// Stand-in for the container manager of another resource.
pub struct ContainerClient {
    resource: ResourceId,
    namespace: String,
    invoker: Arc<dyn Invoker>,
}

impl std::fmt::Debug for ContainerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerClient")
            .field("resource", &self.resource)
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl ContainerClient {
    /// Resolve the endpoint of `resource` and bind to it.
    pub fn connect(
        resolver: &dyn EndpointResolver,
        resource: ResourceId,
    ) -> Result<Self, RemoteError> {
        let invoker = resolver.resolve(&resource)?;
        tracing::debug!(resource = %resource, "resolved container endpoint");
        Ok(Self::new(resource, invoker))
    }

    pub fn new(resource: ResourceId, invoker: Arc<dyn Invoker>) -> Self {
        Self {
            resource,
            namespace: names::DEFAULT_NAMESPACE.to_string(),
            invoker,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn resource(&self) -> &ResourceId {
        &self.resource
    }

    /// State from the property mirror instead of an invocation. Degrades to
    /// `UNKNOWN` like [`ContainerOperations::get_state`].
    pub async fn poll_state(&self, id: &str) -> ContainerState {
        let value = self
            .invoker
            .read_property(names::COLL_CONTAINERS, &fix_id(id), names::PROP_STATE)
            .await;
        match value {
            Ok(Some(state)) => parse_state(id, &state),
            Ok(None) => ContainerState::Unknown,
            Err(e) => {
                tracing::error!(id, resource = %self.resource, "cannot poll container state: {}", e);
                ContainerState::Unknown
            }
        }
    }

    async fn call(&self, operation: &str, args: Vec<String>) -> Result<Option<String>, OperationError> {
        let name = names::qualified_name(&self.namespace, operation);
        let raw = self
            .invoker
            .invoke(&name, args)
            .await
            .map_err(|e| remote_failure(operation, e.to_string()))?;
        let envelope = ResultEnvelope::from_json(&raw)
            .map_err(|e| remote_failure(operation, format!("malformed result envelope: {e}")))?;
        envelope
            .into_result()
            .map_err(|message| remote_failure(operation, message))
    }

    async fn call_unit(&self, operation: &str, args: Vec<String>) -> Result<(), OperationError> {
        self.call(operation, args).await.map(|_| ())
    }

    async fn describe(&self, operation: &str) -> String {
        match self.call(operation, Vec::new()).await {
            Ok(value) => value.unwrap_or_default(),
            Err(_) => String::new(),
        }
    }
}

#[async_trait]
impl ContainerOperations for ContainerClient {
    async fn add_container(&self, location: &ContainerUri) -> Result<String, OperationError> {
        self.call(names::OP_ADD_CONTAINER, vec![location.to_string()])
            .await?
            .ok_or_else(|| remote_failure(names::OP_ADD_CONTAINER, "no container id returned".to_string()))
    }

    async fn start_container(&self, id: &str) -> Result<(), OperationError> {
        self.call_unit(names::OP_START_CONTAINER, vec![id.to_string()])
            .await
    }

    async fn stop_container(&self, id: &str) -> Result<(), OperationError> {
        self.call_unit(names::OP_STOP_CONTAINER, vec![id.to_string()])
            .await
    }

    async fn migrate_container(
        &self,
        id: &str,
        resource: &ResourceId,
    ) -> Result<(), OperationError> {
        self.call_unit(
            names::OP_MIGRATE_CONTAINER,
            vec![id.to_string(), resource.to_string()],
        )
        .await
    }

    async fn undeploy_container(&self, id: &str) -> Result<(), OperationError> {
        self.call_unit(names::OP_UNDEPLOY_CONTAINER, vec![id.to_string()])
            .await
    }

    async fn update_container(
        &self,
        id: &str,
        location: &ContainerUri,
    ) -> Result<(), OperationError> {
        self.call_unit(
            names::OP_UPDATE_CONTAINER,
            vec![id.to_string(), location.to_string()],
        )
        .await
    }

    async fn get_state(&self, id: &str) -> ContainerState {
        match self.call(names::OP_GET_STATE, vec![id.to_string()]).await {
            Ok(Some(state)) => parse_state(id, &state),
            Ok(None) => ContainerState::Unknown,
            // already logged by remote_failure
            Err(_) => ContainerState::Unknown,
        }
    }

    async fn container_system_name(&self) -> String {
        self.describe(names::OP_SYSTEM_NAME).await
    }

    async fn container_system_version(&self) -> String {
        self.describe(names::OP_SYSTEM_VERSION).await
    }
}

fn parse_state(id: &str, value: &str) -> ContainerState {
    match value.parse::<ContainerState>() {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(id, value, "cannot decode remote container state: {}", e);
            ContainerState::Unknown
        }
    }
}

fn remote_failure(operation: &str, message: String) -> OperationError {
    OperationError::Remote {
        operation: operation.to_string(),
        message,
    }
    .logged()
}
