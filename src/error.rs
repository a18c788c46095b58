// ABOUTME: Application-wide error types for ecs-runtime.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

use crate::registry::OperationError;
use crate::remote::RemoteError;
use crate::types::{IdError, ParseUriError};

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("invalid id: {0}")]
    Id(#[from] IdError),

    #[error("invalid location: {0}")]
    Uri(#[from] ParseUriError),
}

pub type Result<T> = std::result::Result<T, Error>;
