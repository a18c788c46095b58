// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Container and resource ids, structured versions, and normalized URIs.

mod id;
mod uri;
mod version;

pub use id::{ContainerId, IdError, ResourceId};
pub use uri::{ContainerUri, ParseUriError};
pub use version::{ParseVersionError, Version};
