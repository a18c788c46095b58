// ABOUTME: The container operation surface shared by the manager and remote proxies.
// ABOUTME: Callers can't tell whether they talk to a local manager or a remote one.

use async_trait::async_trait;

use crate::registry::OperationError;
use crate::state::ContainerState;
use crate::types::{ContainerUri, ResourceId};

/// Lifecycle operations on the containers of one resource.
///
/// Implemented by [`ContainerManager`](crate::manager::ContainerManager), which
/// owns the containers, and by [`ContainerClient`](crate::remote::ContainerClient),
/// which acts on behalf of a caller without direct registry access.
#[async_trait]
pub trait ContainerOperations: Send + Sync {
    /// Register the container described at `location`. The new container is
    /// `AVAILABLE`; returns its id.
    async fn add_container(&self, location: &ContainerUri) -> Result<String, OperationError>;

    /// Bring an `AVAILABLE` container up: `DEPLOYING`, then `DEPLOYED`
    /// (or `FAILED`).
    async fn start_container(&self, id: &str) -> Result<(), OperationError>;

    /// Move a container towards `STOPPED`.
    async fn stop_container(&self, id: &str) -> Result<(), OperationError>;

    /// Relocate a `DEPLOYED` container to another resource.
    async fn migrate_container(&self, id: &str, resource: &ResourceId)
    -> Result<(), OperationError>;

    /// Remove an `AVAILABLE` or `STOPPED` container permanently.
    async fn undeploy_container(&self, id: &str) -> Result<(), OperationError>;

    /// Replace a `DEPLOYED` container with the one described at `location`.
    async fn update_container(
        &self,
        id: &str,
        location: &ContainerUri,
    ) -> Result<(), OperationError>;

    /// State of `id`; `UNKNOWN` for unknown ids. Never fails.
    async fn get_state(&self, id: &str) -> ContainerState;

    async fn container_system_name(&self) -> String;

    async fn container_system_version(&self) -> String;
}
