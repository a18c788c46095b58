// ABOUTME: Notification sink for the external directory and a read-only property mirror.
// ABOUTME: The registry pushes adds, removals, and state changes here on a best-effort basis.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use thiserror::Error;

use crate::descriptor::ContainerDescriptor;
use crate::remote::names::{self, fix_id};
use crate::types::ResourceId;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory unavailable: {0}")]
    Unavailable(String),

    #[error("directory rejected update: {0}")]
    Rejected(String),
}

/// The external, eventually consistent mirror of registry state.
///
/// Calls are fire-and-forget from the registry's point of view: an `Err` is
/// logged by the caller and never rolls back the local change.
pub trait DirectoryNotifier<C>: Send + Sync {
    fn container_added(&self, descriptor: &C) -> Result<(), DirectoryError>;
    fn container_removed(&self, descriptor: &C) -> Result<(), DirectoryError>;
    fn container_state_changed(&self, descriptor: &C) -> Result<(), DirectoryError>;
}

/// A directory that drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDirectory;

impl<C> DirectoryNotifier<C> for NoopDirectory {
    fn container_added(&self, _: &C) -> Result<(), DirectoryError> {
        Ok(())
    }

    fn container_removed(&self, _: &C) -> Result<(), DirectoryError> {
        Ok(())
    }

    fn container_state_changed(&self, _: &C) -> Result<(), DirectoryError> {
        Ok(())
    }
}

/// Mirrored, read-only properties of one container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MirrorEntry {
    pub id: String,
    pub name: String,
    pub version: String,
    pub state: String,
    pub resource: String,
    pub last_changed: DateTime<Utc>,
}

impl MirrorEntry {
    /// Value of a named property, using the remote property names.
    pub fn property(&self, name: &str) -> Option<String> {
        match name {
            names::PROP_ID => Some(self.id.clone()),
            names::PROP_NAME => Some(self.name.clone()),
            names::PROP_VERSION => Some(self.version.clone()),
            names::PROP_STATE => Some(self.state.clone()),
            names::PROP_RESOURCE => Some(self.resource.clone()),
            names::PROP_LAST_CHANGED => Some(
                self.last_changed
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
            _ => None,
        }
    }
}

/// In-process directory: keeps a copy of every container's properties keyed
/// by [`fix_id`] of the container id, for cheap polling by remote callers.
#[derive(Debug)]
pub struct ContainerMirror {
    resource: ResourceId,
    entries: RwLock<BTreeMap<String, MirrorEntry>>,
}

impl ContainerMirror {
    pub fn new(resource: ResourceId) -> Self {
        Self {
            resource,
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Entry for a container id (raw or already fixed).
    pub fn entry(&self, id: &str) -> Option<MirrorEntry> {
        let entries = self.entries.read();
        entries
            .get(id)
            .or_else(|| entries.get(&fix_id(id)))
            .cloned()
    }

    pub fn entries(&self) -> Vec<MirrorEntry> {
        self.entries.read().values().cloned().collect()
    }

    pub fn property(&self, key: &str, property: &str) -> Option<String> {
        self.entry(key).and_then(|e| e.property(property))
    }

    fn upsert<C: ContainerDescriptor>(&self, descriptor: &C) {
        let entry = MirrorEntry {
            id: descriptor.id().to_string(),
            name: descriptor.name().to_string(),
            version: descriptor.version().to_string(),
            state: descriptor.state().to_string(),
            resource: self.resource.to_string(),
            last_changed: Utc::now(),
        };
        self.entries
            .write()
            .insert(fix_id(descriptor.id().as_str()), entry);
    }
}

impl<C: ContainerDescriptor> DirectoryNotifier<C> for ContainerMirror {
    fn container_added(&self, descriptor: &C) -> Result<(), DirectoryError> {
        self.upsert(descriptor);
        Ok(())
    }

    fn container_removed(&self, descriptor: &C) -> Result<(), DirectoryError> {
        self.entries
            .write()
            .remove(&fix_id(descriptor.id().as_str()));
        Ok(())
    }

    fn container_state_changed(&self, descriptor: &C) -> Result<(), DirectoryError> {
        self.upsert(descriptor);
        Ok(())
    }
}
