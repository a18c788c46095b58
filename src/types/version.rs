// ABOUTME: Structured, comparable container versions.
// ABOUTME: Dotted numeric segments with an optional pre-release qualifier.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseVersionError {
    #[error("version cannot be empty")]
    Empty,

    #[error("invalid version segment '{0}'")]
    InvalidSegment(String),

    #[error("version qualifier cannot be empty")]
    EmptyQualifier,
}

/// A version such as `1.0`, `2.3.1` or `1.0.0-SNAPSHOT`.
///
/// Missing trailing segments compare as zero, so `1.0` equals `1.0.0`.
/// A qualified version sorts before the same unqualified version.
#[derive(Debug, Clone)]
pub struct Version {
    segments: Vec<u64>,
    qualifier: Option<String>,
}

impl Version {
    pub fn parse(input: &str) -> Result<Self, ParseVersionError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseVersionError::Empty);
        }

        let (numbers, qualifier) = match input.split_once('-') {
            Some((_, "")) => return Err(ParseVersionError::EmptyQualifier),
            Some((numbers, qualifier)) => (numbers, Some(qualifier.to_string())),
            None => (input, None),
        };

        let segments = numbers
            .split('.')
            .map(|s| {
                s.parse::<u64>()
                    .map_err(|_| ParseVersionError::InvalidSegment(s.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            segments,
            qualifier,
        })
    }

    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    fn segment(&self, index: usize) -> u64 {
        self.segments.get(index).copied().unwrap_or(0)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            match self.segment(i).cmp(&other.segment(i)) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        match (&self.qualifier, &other.qualifier) {
            (None, None) => Ordering::Equal,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(a), Some(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let numbers: Vec<String> = self.segments.iter().map(u64::to_string).collect();
        write!(f, "{}", numbers.join("."))?;
        if let Some(q) = &self.qualifier {
            write!(f, "-{q}")?;
        }
        Ok(())
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // YAML reads `1.10` as the float 1.1, so only whole numbers may be
        // left unquoted.
        let value = serde_yaml::Value::deserialize(deserializer)?;
        let text = match value {
            serde_yaml::Value::String(s) => s,
            serde_yaml::Value::Number(n) if !n.is_f64() => n.to_string(),
            serde_yaml::Value::Number(n) => {
                return Err(serde::de::Error::custom(format!(
                    "version {n} was read as a number, quote it (e.g. version: \"{n}\")"
                )));
            }
            other => {
                return Err(serde::de::Error::custom(format!(
                    "expected a version string, got {other:?}"
                )));
            }
        };
        Version::parse(&text).map_err(serde::de::Error::custom)
    }
}
