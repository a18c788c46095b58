// ABOUTME: Container descriptors and the capability traits the registry works through.
// ABOUTME: BasicContainerDescriptor validates identity, version, and URI at construction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::ContainerState;
use crate::types::{ContainerId, ContainerUri, ParseUriError, ParseVersionError, Version};

/// Errors raised while constructing or loading a descriptor.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("container id cannot be empty")]
    EmptyId,

    #[error("container name cannot be empty")]
    EmptyName,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid container URI: {0}")]
    InvalidUri(#[from] ParseUriError),

    #[error("invalid container version: {0}")]
    InvalidVersion(#[from] ParseVersionError),

    #[error("unsupported descriptor location {0} (only file: URIs can be loaded)")]
    UnsupportedLocation(String),

    #[error("failed to read descriptor from {location}: {source}")]
    Read {
        location: String,
        source: std::io::Error,
    },

    #[error("failed to parse descriptor from {location}: {source}")]
    Parse {
        location: String,
        source: serde_yaml::Error,
    },
}

/// Identity of a container. Set once at construction.
pub trait Identifiable {
    fn id(&self) -> &ContainerId;
    fn name(&self) -> &str;
}

pub trait Versioned {
    fn version(&self) -> &Version;
    fn set_version(&mut self, version: Version);
}

pub trait Stateful {
    fn state(&self) -> ContainerState;

    /// Stores `state`. `None` is ignored; transition checks happen in the
    /// registry, not here.
    fn set_state(&mut self, state: Option<ContainerState>);
}

pub trait Located {
    fn uri(&self) -> &ContainerUri;
    fn set_location(&mut self, uri: ContainerUri);

    /// Parse, normalize, and store `uri`.
    fn set_uri(&mut self, uri: &str) -> Result<(), DescriptorError> {
        if uri.trim().is_empty() {
            return Err(DescriptorError::InvalidArgument(
                "uri must not be empty".to_string(),
            ));
        }
        self.set_location(ContainerUri::parse(uri)?);
        Ok(())
    }
}

/// Everything the registry needs from a descriptor.
///
/// Implementations add system-specific fields (image names, exposed ports,
/// ...) on top of these capabilities. Anything implementing the four traits
/// qualifies automatically.
pub trait ContainerDescriptor:
    Identifiable + Versioned + Stateful + Located + Clone + Send + Sync + 'static
{
}

impl<T> ContainerDescriptor for T where
    T: Identifiable + Versioned + Stateful + Located + Clone + Send + Sync + 'static
{
}

/// Descriptors that can be created from the YAML file at a location.
pub trait LoadDescriptor: Sized {
    fn from_yaml(yaml: &str, location: &ContainerUri) -> Result<Self, DescriptorError>;
}

/// The default descriptor: identity, version, state, and source location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DescriptorFile")]
pub struct BasicContainerDescriptor {
    id: ContainerId,
    name: String,
    version: Version,
    state: ContainerState,
    uri: ContainerUri,
}

impl BasicContainerDescriptor {
    /// Create a descriptor in state `AVAILABLE`.
    ///
    /// # Errors
    ///
    /// Fails if `id` or `name` is empty or `uri` is not a valid URI.
    pub fn new(id: &str, name: &str, version: Version, uri: &str) -> Result<Self, DescriptorError> {
        let id = ContainerId::new(id).map_err(|_| DescriptorError::EmptyId)?;
        if name.trim().is_empty() {
            return Err(DescriptorError::EmptyName);
        }
        if uri.trim().is_empty() {
            return Err(DescriptorError::InvalidArgument(
                "uri must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id,
            name: name.to_string(),
            version,
            state: ContainerState::Available,
            uri: ContainerUri::parse(uri)?,
        })
    }
}

impl Identifiable for BasicContainerDescriptor {
    fn id(&self) -> &ContainerId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Versioned for BasicContainerDescriptor {
    fn version(&self) -> &Version {
        &self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }
}

impl Stateful for BasicContainerDescriptor {
    fn state(&self) -> ContainerState {
        self.state
    }

    fn set_state(&mut self, state: Option<ContainerState>) {
        if let Some(state) = state {
            self.state = state;
        }
    }
}

impl Located for BasicContainerDescriptor {
    fn uri(&self) -> &ContainerUri {
        &self.uri
    }

    fn set_location(&mut self, uri: ContainerUri) {
        self.uri = uri;
    }
}

impl LoadDescriptor for BasicContainerDescriptor {
    fn from_yaml(yaml: &str, location: &ContainerUri) -> Result<Self, DescriptorError> {
        let mut file: DescriptorFile =
            serde_yaml::from_str(yaml).map_err(|source| DescriptorError::Parse {
                location: location.to_string(),
                source,
            })?;
        // The location it was loaded from wins over anything the file claims.
        file.uri = Some(location.to_string());
        file.state = None;
        Self::try_from(file)
    }
}

/// On-disk shape of a descriptor. This is the only path that sets identity
/// fields after construction, and it re-validates all of them.
#[derive(Debug, Deserialize)]
struct DescriptorFile {
    id: String,
    name: String,
    version: Version,
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    state: Option<ContainerState>,
}

impl TryFrom<DescriptorFile> for BasicContainerDescriptor {
    type Error = DescriptorError;

    fn try_from(file: DescriptorFile) -> Result<Self, Self::Error> {
        let uri = file.uri.unwrap_or_default();
        let mut descriptor = Self::new(&file.id, &file.name, file.version, &uri)?;
        descriptor.set_state(file.state);
        Ok(descriptor)
    }
}
