// ABOUTME: Container lifecycle states and the transition-validity table.
// ABOUTME: Pure logic; FAILED and UNKNOWN are reachable from every state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lifecycle state of a managed container.
///
/// The wire representation is the upper-case name (`DEPLOYED`, ...), both for
/// serde and for `Display`/`FromStr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContainerState {
    Available,
    Deploying,
    Deployed,
    Failed,
    Migrating,
    Updating,
    Stopping,
    Stopped,
    Undeploying,
    Unknown,
}

impl ContainerState {
    pub const ALL: [ContainerState; 10] = [
        ContainerState::Available,
        ContainerState::Deploying,
        ContainerState::Deployed,
        ContainerState::Failed,
        ContainerState::Migrating,
        ContainerState::Updating,
        ContainerState::Stopping,
        ContainerState::Stopped,
        ContainerState::Undeploying,
        ContainerState::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerState::Available => "AVAILABLE",
            ContainerState::Deploying => "DEPLOYING",
            ContainerState::Deployed => "DEPLOYED",
            ContainerState::Failed => "FAILED",
            ContainerState::Migrating => "MIGRATING",
            ContainerState::Updating => "UPDATING",
            ContainerState::Stopping => "STOPPING",
            ContainerState::Stopped => "STOPPED",
            ContainerState::Undeploying => "UNDEPLOYING",
            ContainerState::Unknown => "UNKNOWN",
        }
    }

    /// Targets explicitly reachable from `self`, not counting the
    /// universal sinks `FAILED` and `UNKNOWN`.
    pub fn successors(&self) -> &'static [ContainerState] {
        use ContainerState::*;
        match self {
            Unknown => &[Available],
            Available => &[Deploying],
            Deploying => &[Deployed],
            Deployed => &[Migrating, Updating, Stopping],
            Migrating => &[Deployed, Stopping],
            Updating => &[Deployed, Stopping],
            Stopping => &[Stopped],
            Stopped => &[Undeploying],
            Failed => &[Deployed, Migrating, Updating, Stopping],
            Undeploying => &[],
        }
    }

    /// `FAILED` and `UNKNOWN` signal that something unexpected happened and
    /// are exempt from transition validation.
    pub fn is_universal_sink(&self) -> bool {
        matches!(self, ContainerState::Failed | ContainerState::Unknown)
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown container state: {0}")]
pub struct ParseStateError(pub String);

impl FromStr for ContainerState {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContainerState::ALL
            .into_iter()
            .find(|state| state.as_str() == s.trim())
            .ok_or_else(|| ParseStateError(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("no source state given for transition to {target}")]
    MissingSource { target: ContainerState },

    #[error("invalid state transition from {source_state} to {target}")]
    InvalidTransition {
        source_state: ContainerState,
        target: ContainerState,
    },
}

/// Whether a container may move from `source` to `target`.
pub fn is_valid_transition(source: ContainerState, target: ContainerState) -> bool {
    target.is_universal_sink() || source.successors().contains(&target)
}

/// Like [`is_valid_transition`], but an absent source is always an error.
pub fn validate_transition(
    source: Option<ContainerState>,
    target: ContainerState,
) -> Result<(), StateError> {
    let source = source.ok_or(StateError::MissingSource { target })?;
    if is_valid_transition(source, target) {
        Ok(())
    } else {
        Err(StateError::InvalidTransition {
            source_state: source,
            target,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_parse_agree() {
        for state in ContainerState::ALL {
            assert_eq!(state.to_string().parse::<ContainerState>(), Ok(state));
        }
    }

    #[test]
    fn parse_rejects_lowercase_and_legacy_names() {
        assert!("deployed".parse::<ContainerState>().is_err());
        assert!("RUNNING".parse::<ContainerState>().is_err());
        assert!("STARTING".parse::<ContainerState>().is_err());
    }

    #[test]
    fn serde_uses_upper_case_names() {
        let json = serde_json::to_string(&ContainerState::Undeploying).unwrap();
        assert_eq!(json, "\"UNDEPLOYING\"");
    }

    #[test]
    fn undeploying_has_no_explicit_successors() {
        assert!(ContainerState::Undeploying.successors().is_empty());
        assert!(is_valid_transition(
            ContainerState::Undeploying,
            ContainerState::Unknown
        ));
    }
}
