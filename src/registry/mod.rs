// ABOUTME: Identifier-keyed registry of container descriptors.
// ABOUTME: Enforces the state machine and pushes best-effort updates to the directory.

mod error;

pub use error::{OperationError, OperationErrorKind};

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::descriptor::ContainerDescriptor;
use crate::directory::{DirectoryError, DirectoryNotifier};
use crate::state::{ContainerState, validate_transition};
use crate::types::ContainerUri;

/// States a container may be undeployed from.
const UNDEPLOYABLE: [ContainerState; 2] = [ContainerState::Available, ContainerState::Stopped];

/// The manager core: owns every descriptor of this device.
///
/// Structural changes (insert/remove) and state writes happen under one write
/// lock, together with the decision whether they are legal. Directory pushes
/// run after the lock is released and never fail the operation.
///
/// Readers only ever get clones; the registry is the sole owner of the
/// descriptors it holds.
pub struct ContainerRegistry<C> {
    containers: RwLock<HashMap<String, C>>,
    directory: Arc<dyn DirectoryNotifier<C>>,
}

impl<C> std::fmt::Debug for ContainerRegistry<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerRegistry")
            .field("containers", &self.containers.read().len())
            .finish()
    }
}

impl<C: ContainerDescriptor> ContainerRegistry<C> {
    pub fn new(directory: Arc<dyn DirectoryNotifier<C>>) -> Self {
        Self {
            containers: RwLock::new(HashMap::new()),
            directory,
        }
    }

    /// Snapshot of all registered ids.
    pub fn ids(&self) -> HashSet<String> {
        self.containers.read().keys().cloned().collect()
    }

    /// Snapshot of all descriptors, regardless of state.
    pub fn containers(&self) -> Vec<C> {
        self.containers.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.containers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.read().is_empty()
    }

    /// Direct lookup by id, without the URI fallback.
    pub fn container(&self, id: &str) -> Option<C> {
        self.containers.read().get(id).cloned()
    }

    /// Current state of `id`, or `UNKNOWN` for empty or unknown ids.
    pub fn state(&self, id: &str) -> ContainerState {
        self.containers
            .read()
            .get(id)
            .map(|c| c.state())
            .unwrap_or(ContainerState::Unknown)
    }

    /// Register `descriptor` under `id`, forcing its state to `AVAILABLE`.
    ///
    /// # Errors
    ///
    /// Fails if `id` is empty or already registered.
    pub fn add_container(&self, id: &str, mut descriptor: C) -> Result<String, OperationError> {
        if id.trim().is_empty() {
            return Err(OperationError::EmptyId {
                activity: "add container".to_string(),
            }
            .logged());
        }
        descriptor.set_state(Some(ContainerState::Available));

        let snapshot = {
            let mut containers = self.containers.write();
            if containers.contains_key(id) {
                return Err(OperationError::DuplicateId { id: id.to_string() }.logged());
            }
            containers.insert(id.to_string(), descriptor.clone());
            descriptor
        };

        tracing::info!(id, name = snapshot.name(), version = %snapshot.version(), "container added");
        self.push("added", &snapshot, |d, c| d.container_added(c));
        Ok(id.to_string())
    }

    /// Remove `id` if it is `AVAILABLE` or `STOPPED` and return the removed
    /// descriptor. On failure the descriptor is left untouched.
    pub fn undeploy_container(&self, id: &str) -> Result<C, OperationError> {
        let removed = {
            let mut containers = self.containers.write();
            let (key, descriptor) = lookup(&containers, id, "id", "undeploy")?;
            let state = descriptor.state();
            if !UNDEPLOYABLE.contains(&state) {
                return Err(OperationError::IllegalState {
                    id: key.clone(),
                    state,
                    activity: "undeploy".to_string(),
                }
                .logged());
            }
            let key = key.clone();
            containers.remove(&key).map(|c| (key, c))
        };

        // lookup() just found the key under the same lock
        let Some((key, removed)) = removed else {
            return Err(unknown(id, "id", "undeploy").logged());
        };
        tracing::info!(id = %key, "container removed");
        self.push("removed", &removed, |d, c| d.container_removed(c));
        Ok(removed)
    }

    /// Check that `id` may be migrated (it must be `DEPLOYED`) and return its
    /// registered id. The registry changes no state here; moving the workload
    /// is up to the physical-effecting side.
    pub fn check_migration(&self, id: &str) -> Result<String, OperationError> {
        let containers = self.containers.read();
        let (key, descriptor) = lookup(&containers, id, "id", "migrate")?;
        match descriptor.state() {
            ContainerState::Deployed => Ok(key.clone()),
            state => Err(OperationError::IllegalState {
                id: key.clone(),
                state,
                activity: "migrate".to_string(),
            }
            .logged()),
        }
    }

    /// Look up `id` directly, then by source URI.
    ///
    /// The URI fallback is a linear scan, O(n) in the number of containers,
    /// which per-device container counts keep small.
    pub fn resolve(
        &self,
        id: &str,
        id_description: &str,
        activity: &str,
    ) -> Result<C, OperationError> {
        let containers = self.containers.read();
        lookup(&containers, id, id_description, activity).map(|(_, c)| c.clone())
    }

    /// The key `id` is registered under, after the URI fallback.
    pub fn registered_id(&self, id: &str, activity: &str) -> Result<String, OperationError> {
        let containers = self.containers.read();
        lookup(&containers, id, "id", activity).map(|(key, _)| key.clone())
    }

    /// Move `id` to `state` if the transition table allows it and push the
    /// change to the directory. Returns the updated descriptor.
    pub fn set_state(&self, id: &str, state: ContainerState) -> Result<C, OperationError> {
        self.transition(id, None, state, "set state of")
    }

    /// Like [`set_state`](Self::set_state), but additionally requires the
    /// current state to be one of `from`. The check and the write happen under
    /// the same lock.
    pub fn transition(
        &self,
        id: &str,
        from: Option<&[ContainerState]>,
        state: ContainerState,
        activity: &str,
    ) -> Result<C, OperationError> {
        let snapshot = {
            let mut containers = self.containers.write();
            let key = lookup(&containers, id, "id", activity)?.0.clone();
            let Some(descriptor) = containers.get_mut(&key) else {
                return Err(unknown(id, "id", activity).logged());
            };
            let current = descriptor.state();
            if let Some(from) = from
                && !from.contains(&current)
            {
                return Err(OperationError::IllegalState {
                    id: key,
                    state: current,
                    activity: activity.to_string(),
                }
                .logged());
            }
            if let Err(source) = validate_transition(Some(current), state) {
                return Err(OperationError::InvalidTransition { id: key, source }.logged());
            }
            descriptor.set_state(Some(state));
            descriptor.clone()
        };

        tracing::debug!(id, %state, "container state changed");
        self.push("state changed", &snapshot, |d, c| d.container_state_changed(c));
        Ok(snapshot)
    }

    /// Apply `change` to the descriptor of `id` (version, location, ...) and
    /// push the result to the directory. State must go through
    /// [`transition`](Self::transition) instead.
    pub fn modify<F>(&self, id: &str, activity: &str, change: F) -> Result<C, OperationError>
    where
        F: FnOnce(&mut C),
    {
        let snapshot = {
            let mut containers = self.containers.write();
            let key = lookup(&containers, id, "id", activity)?.0.clone();
            let Some(descriptor) = containers.get_mut(&key) else {
                return Err(unknown(id, "id", activity).logged());
            };
            let state = descriptor.state();
            change(descriptor);
            descriptor.set_state(Some(state));
            descriptor.clone()
        };

        self.push("state changed", &snapshot, |d, c| d.container_state_changed(c));
        Ok(snapshot)
    }

    /// Best-effort directory push: failures are logged and swallowed.
    fn push<F>(&self, what: &str, descriptor: &C, notify: F)
    where
        F: FnOnce(&dyn DirectoryNotifier<C>, &C) -> Result<(), DirectoryError>,
    {
        if let Err(e) = notify(self.directory.as_ref(), descriptor) {
            tracing::warn!(
                id = %descriptor.id(),
                error = %e,
                "failed to notify directory that container was {what}"
            );
        }
    }
}

/// Direct id lookup with fallback to the registered source URI.
///
/// If several containers were registered from the same location, the one
/// with the smallest id wins.
fn lookup<'a, C: ContainerDescriptor>(
    containers: &'a HashMap<String, C>,
    id: &str,
    id_description: &str,
    activity: &str,
) -> Result<(&'a String, &'a C), OperationError> {
    if id.trim().is_empty() {
        return Err(OperationError::EmptyId {
            activity: activity.to_string(),
        }
        .logged());
    }
    if let Some(found) = containers.get_key_value(id) {
        return Ok(found);
    }

    // Callers may only know the location a container was registered from.
    let normalized = ContainerUri::parse(id).ok();
    containers
        .iter()
        .filter(|(_, c)| {
            c.uri().as_str() == id || normalized.as_ref().is_some_and(|uri| c.uri() == uri)
        })
        .min_by(|(a, _), (b, _)| a.cmp(b))
        .ok_or_else(|| unknown(id, id_description, activity).logged())
}

fn unknown(id: &str, id_description: &str, activity: &str) -> OperationError {
    OperationError::UnknownContainer {
        id: id.to_string(),
        id_description: id_description.to_string(),
        activity: activity.to_string(),
    }
}
