// ABOUTME: Effector that simulates workloads by walking the state machine.
// ABOUTME: Loads YAML descriptors from file: locations; optional artificial latency.

use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;

use crate::descriptor::{ContainerDescriptor, DescriptorError, LoadDescriptor};
use crate::registry::{ContainerRegistry, OperationError};
use crate::state::ContainerState;
use crate::types::ContainerUri;

use super::ContainerEffector;

/// States a container can be stopped from.
const STOPPABLE: [ContainerState; 4] = [
    ContainerState::Deployed,
    ContainerState::Migrating,
    ContainerState::Updating,
    ContainerState::Failed,
];

/// Runs no real workloads; every operation only moves the container through
/// its lifecycle states.
#[derive(Debug, Clone)]
pub struct SimulatedEffector<C> {
    name: String,
    version: String,
    deploy_delay: Duration,
    stop_delay: Duration,
    _descriptor: PhantomData<fn() -> C>,
}

impl<C> SimulatedEffector<C> {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            deploy_delay: Duration::ZERO,
            stop_delay: Duration::ZERO,
            _descriptor: PhantomData,
        }
    }

    /// Pause between the intermediate and final state of start/update and
    /// of stop, respectively.
    pub fn with_delays(mut self, deploy: Duration, stop: Duration) -> Self {
        self.deploy_delay = deploy;
        self.stop_delay = stop;
        self
    }
}

impl<C: LoadDescriptor> SimulatedEffector<C> {
    async fn load(location: &ContainerUri, activity: &str) -> Result<C, OperationError> {
        let failed = |source| OperationError::Descriptor {
            activity: activity.to_string(),
            source,
        };
        let path = location
            .to_file_path()
            .ok_or_else(|| failed(DescriptorError::UnsupportedLocation(location.to_string())))?;
        let yaml = tokio::fs::read_to_string(&path).await.map_err(|source| {
            failed(DescriptorError::Read {
                location: location.to_string(),
                source,
            })
        })?;
        C::from_yaml(&yaml, location).map_err(failed)
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[async_trait]
impl<C> ContainerEffector<C> for SimulatedEffector<C>
where
    C: ContainerDescriptor + LoadDescriptor,
{
    async fn add_container(
        &self,
        registry: &ContainerRegistry<C>,
        location: &ContainerUri,
    ) -> Result<String, OperationError> {
        let descriptor = Self::load(location, "add container")
            .await
            .map_err(OperationError::logged)?;
        let id = descriptor.id().to_string();
        registry.add_container(&id, descriptor)
    }

    async fn start_container(
        &self,
        registry: &ContainerRegistry<C>,
        id: &str,
    ) -> Result<(), OperationError> {
        let key = registry.registered_id(id, "start")?;
        registry.transition(
            &key,
            Some(&[ContainerState::Available]),
            ContainerState::Deploying,
            "start",
        )?;
        pause(self.deploy_delay).await;
        registry.transition(&key, None, ContainerState::Deployed, "start")?;
        Ok(())
    }

    async fn stop_container(
        &self,
        registry: &ContainerRegistry<C>,
        id: &str,
    ) -> Result<(), OperationError> {
        let key = registry.registered_id(id, "stop")?;
        registry.transition(&key, Some(&STOPPABLE), ContainerState::Stopping, "stop")?;
        pause(self.stop_delay).await;
        registry.transition(&key, None, ContainerState::Stopped, "stop")?;
        Ok(())
    }

    async fn update_container(
        &self,
        registry: &ContainerRegistry<C>,
        id: &str,
        location: &ContainerUri,
    ) -> Result<(), OperationError> {
        // The location changes below, so a source URI stops matching.
        let key = registry.registered_id(id, "update")?;
        let current = registry.transition(
            &key,
            Some(&[ContainerState::Deployed]),
            ContainerState::Updating,
            "update",
        )?;

        let replacement = match Self::load(location, "update container").await {
            Ok(r) if r.id() == current.id() => r,
            Ok(r) => {
                registry.transition(&key, None, ContainerState::Failed, "update")?;
                return Err(OperationError::effector(
                    current.id().as_str(),
                    "update",
                    format!("{location} describes container '{}'", r.id()),
                )
                .logged());
            }
            Err(e) => {
                registry.transition(&key, None, ContainerState::Failed, "update")?;
                return Err(e.logged());
            }
        };

        pause(self.deploy_delay).await;
        registry.modify(&key, "update", |c| {
            c.set_version(replacement.version().clone());
            c.set_location(replacement.uri().clone());
        })?;
        registry.transition(&key, None, ContainerState::Deployed, "update")?;
        Ok(())
    }

    fn system_name(&self) -> String {
        self.name.clone()
    }

    fn system_version(&self) -> String {
        self.version.clone()
    }
}
