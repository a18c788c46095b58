// ABOUTME: Normalized source locations of container descriptors.
// ABOUTME: Wraps url::Url so equivalent spellings compare equal.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseUriError {
    #[error("URI cannot be empty")]
    Empty,

    #[error("invalid URI '{input}': {reason}")]
    Invalid { input: String, reason: String },
}

/// The canonical location a container was registered from.
///
/// Parsing normalizes the text (scheme and host case, dot segments,
/// percent-encoding), so `FILE:///tmp/./a.zip` and `file:///tmp/a.zip`
/// are the same `ContainerUri`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerUri(Url);

impl ContainerUri {
    pub fn parse(input: &str) -> Result<Self, ParseUriError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseUriError::Empty);
        }
        Url::parse(input)
            .map(Self)
            .map_err(|e| ParseUriError::Invalid {
                input: input.to_string(),
                reason: e.to_string(),
            })
    }

    /// Build a `file:` URI from an absolute path.
    pub fn from_file_path(path: &Path) -> Result<Self, ParseUriError> {
        Url::from_file_path(path)
            .map(Self)
            .map_err(|()| ParseUriError::Invalid {
                input: path.display().to_string(),
                reason: "path must be absolute".to_string(),
            })
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    /// Local path for `file:` URIs.
    pub fn to_file_path(&self) -> Option<PathBuf> {
        if self.scheme() != "file" {
            return None;
        }
        self.0.to_file_path().ok()
    }
}

impl FromStr for ContainerUri {
    type Err = ParseUriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ContainerUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl Serialize for ContainerUri {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ContainerUri {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
