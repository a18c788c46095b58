// ABOUTME: Operation errors surfaced to callers of the container operations.
// ABOUTME: Every variant names the attempted action and the offending id or state.

use crate::descriptor::DescriptorError;
use crate::state::{ContainerState, StateError};

/// A recoverable, caller-visible failure of a container operation.
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    /// No id given where one is required.
    #[error("cannot {activity}: container id is empty")]
    EmptyId { activity: String },

    /// The id is neither a registered id nor a registered source URI.
    #[error("cannot {activity}: no container with {id_description} '{id}'")]
    UnknownContainer {
        id: String,
        id_description: String,
        activity: String,
    },

    /// The id is already registered.
    #[error("cannot add container: id '{id}' is already known")]
    DuplicateId { id: String },

    /// The container is not in a state the operation may start from.
    #[error("cannot {activity} container '{id}' in state {state}")]
    IllegalState {
        id: String,
        state: ContainerState,
        activity: String,
    },

    /// The requested state change is not in the transition table.
    #[error("cannot change state of container '{id}': {source}")]
    InvalidTransition { id: String, source: StateError },

    /// An argument could not be decoded.
    #[error("cannot {activity}: {reason}")]
    InvalidArgument { activity: String, reason: String },

    /// The descriptor could not be downloaded or parsed.
    #[error("cannot {activity}: {source}")]
    Descriptor {
        activity: String,
        source: DescriptorError,
    },

    /// The physical-effecting implementation failed.
    #[error("{activity} of container '{id}' failed: {reason}")]
    Effector {
        id: String,
        activity: String,
        reason: String,
    },

    /// A remote manager reported a failure or could not be reached.
    #[error("remote {operation} failed: {message}")]
    Remote { operation: String, message: String },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationErrorKind {
    EmptyId,
    UnknownContainer,
    DuplicateId,
    IllegalState,
    InvalidTransition,
    InvalidArgument,
    Descriptor,
    Effector,
    Remote,
}

impl OperationError {
    pub fn kind(&self) -> OperationErrorKind {
        match self {
            OperationError::EmptyId { .. } => OperationErrorKind::EmptyId,
            OperationError::UnknownContainer { .. } => OperationErrorKind::UnknownContainer,
            OperationError::DuplicateId { .. } => OperationErrorKind::DuplicateId,
            OperationError::IllegalState { .. } => OperationErrorKind::IllegalState,
            OperationError::InvalidTransition { .. } => OperationErrorKind::InvalidTransition,
            OperationError::InvalidArgument { .. } => OperationErrorKind::InvalidArgument,
            OperationError::Descriptor { .. } => OperationErrorKind::Descriptor,
            OperationError::Effector { .. } => OperationErrorKind::Effector,
            OperationError::Remote { .. } => OperationErrorKind::Remote,
        }
    }

    /// The offending state, for errors caused by one.
    pub fn state(&self) -> Option<ContainerState> {
        match self {
            OperationError::IllegalState { state, .. } => Some(*state),
            OperationError::InvalidTransition {
                source: StateError::InvalidTransition { source_state, .. },
                ..
            } => Some(*source_state),
            _ => None,
        }
    }

    /// The container id the operation was attempted on, if known.
    pub fn id(&self) -> Option<&str> {
        match self {
            OperationError::UnknownContainer { id, .. }
            | OperationError::DuplicateId { id }
            | OperationError::IllegalState { id, .. }
            | OperationError::InvalidTransition { id, .. }
            | OperationError::Effector { id, .. } => Some(id),
            _ => None,
        }
    }

    /// The attempted action.
    pub fn activity(&self) -> Option<&str> {
        match self {
            OperationError::EmptyId { activity }
            | OperationError::UnknownContainer { activity, .. }
            | OperationError::IllegalState { activity, .. }
            | OperationError::InvalidArgument { activity, .. }
            | OperationError::Descriptor { activity, .. }
            | OperationError::Effector { activity, .. } => Some(activity),
            OperationError::DuplicateId { .. } => Some("add container"),
            OperationError::InvalidTransition { .. } => Some("change state"),
            OperationError::Remote { operation, .. } => Some(operation),
        }
    }

    /// Log at error level and hand the error back, so call sites read
    /// `return Err(OperationError::...logged())`.
    pub fn logged(self) -> Self {
        tracing::error!(
            kind = ?self.kind(),
            id = self.id(),
            state = self.state().map(tracing::field::display),
            action = self.activity(),
            "{self}"
        );
        self
    }

    pub fn effector(id: &str, activity: &str, reason: impl Into<String>) -> Self {
        OperationError::Effector {
            id: id.to_string(),
            activity: activity.to_string(),
            reason: reason.into(),
        }
    }
}
