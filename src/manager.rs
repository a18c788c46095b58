// ABOUTME: Container manager combining the registry with an injected effector.
// ABOUTME: Gates preconditions in the registry and delegates physical effects.

use std::sync::Arc;

use async_trait::async_trait;

use crate::descriptor::ContainerDescriptor;
use crate::directory::DirectoryNotifier;
use crate::effector::ContainerEffector;
use crate::operations::ContainerOperations;
use crate::registry::{ContainerRegistry, OperationError};
use crate::state::ContainerState;
use crate::types::{ContainerUri, ResourceId};

/// The container manager of one resource.
///
/// The effector is picked once when the manager is built; there is no global
/// lookup at call time.
pub struct ContainerManager<C, E> {
    registry: ContainerRegistry<C>,
    effector: E,
}

impl<C, E> std::fmt::Debug for ContainerManager<C, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerManager")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl<C, E> ContainerManager<C, E>
where
    C: ContainerDescriptor,
    E: ContainerEffector<C>,
{
    pub fn new(directory: Arc<dyn DirectoryNotifier<C>>, effector: E) -> Self {
        Self {
            registry: ContainerRegistry::new(directory),
            effector,
        }
    }

    pub fn registry(&self) -> &ContainerRegistry<C> {
        &self.registry
    }
}

#[async_trait]
impl<C, E> ContainerOperations for ContainerManager<C, E>
where
    C: ContainerDescriptor,
    E: ContainerEffector<C>,
{
    async fn add_container(&self, location: &ContainerUri) -> Result<String, OperationError> {
        self.effector.add_container(&self.registry, location).await
    }

    async fn start_container(&self, id: &str) -> Result<(), OperationError> {
        self.effector.start_container(&self.registry, id).await
    }

    async fn stop_container(&self, id: &str) -> Result<(), OperationError> {
        self.effector.stop_container(&self.registry, id).await
    }

    async fn migrate_container(
        &self,
        id: &str,
        resource: &ResourceId,
    ) -> Result<(), OperationError> {
        let id = self.registry.check_migration(id)?;
        self.effector
            .migrate_container(&self.registry, &id, resource)
            .await
    }

    async fn undeploy_container(&self, id: &str) -> Result<(), OperationError> {
        let removed = self.registry.undeploy_container(id)?;
        self.effector
            .release_container(&removed)
            .await
            .map_err(OperationError::logged)
    }

    async fn update_container(
        &self,
        id: &str,
        location: &ContainerUri,
    ) -> Result<(), OperationError> {
        self.effector
            .update_container(&self.registry, id, location)
            .await
    }

    async fn get_state(&self, id: &str) -> ContainerState {
        self.registry.state(id)
    }

    async fn container_system_name(&self) -> String {
        self.effector.system_name()
    }

    async fn container_system_version(&self) -> String {
        self.effector.system_version()
    }
}
