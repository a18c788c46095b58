// ABOUTME: Pluggable physical effecting of container lifecycle operations.
// ABOUTME: Chosen once at startup and injected into the manager.

mod simulated;

pub use simulated::SimulatedEffector;

use async_trait::async_trait;

use crate::descriptor::ContainerDescriptor;
use crate::registry::{ContainerRegistry, OperationError};
use crate::types::{ContainerUri, ResourceId};

/// Device- or system-specific logic that actually starts, stops, and
/// replaces workloads.
///
/// Implementations record progress through the registry's validated state
/// setters. They are called without any registry lock held and may block on
/// I/O for as long as they need.
#[async_trait]
pub trait ContainerEffector<C: ContainerDescriptor>: Send + Sync {
    /// Obtain the container described at `location` and register it.
    async fn add_container(
        &self,
        registry: &ContainerRegistry<C>,
        location: &ContainerUri,
    ) -> Result<String, OperationError>;

    async fn start_container(
        &self,
        registry: &ContainerRegistry<C>,
        id: &str,
    ) -> Result<(), OperationError>;

    async fn stop_container(
        &self,
        registry: &ContainerRegistry<C>,
        id: &str,
    ) -> Result<(), OperationError>;

    /// Move the workload away from this resource. The registry has already
    /// checked that the container is `DEPLOYED`. Stopping it locally is the
    /// default; the target resource brings up its own instance.
    async fn migrate_container(
        &self,
        registry: &ContainerRegistry<C>,
        id: &str,
        target: &ResourceId,
    ) -> Result<(), OperationError> {
        tracing::info!(id, %target, "migrating container");
        self.stop_container(registry, id).await
    }

    async fn update_container(
        &self,
        registry: &ContainerRegistry<C>,
        id: &str,
        location: &ContainerUri,
    ) -> Result<(), OperationError>;

    /// Release physical resources of a container the registry just removed.
    async fn release_container(&self, _descriptor: &C) -> Result<(), OperationError> {
        Ok(())
    }

    fn system_name(&self) -> String;

    fn system_version(&self) -> String;
}
