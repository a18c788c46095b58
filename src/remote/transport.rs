// ABOUTME: Transport abstraction between a client proxy and a ContainerServer.
// ABOUTME: Wire message types plus an in-process invoker that skips the network.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::RemoteError;
use super::server::ContainerServer;

/// One request line of the wire protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Request {
    Invoke {
        operation: String,
        #[serde(default)]
        args: Vec<String>,
    },
    Property {
        collection: String,
        key: String,
        property: String,
    },
}

/// One response line: `{"ok": <string|null>}` or `{"error": <message>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    Ok(Option<String>),
    Error(String),
}

impl Response {
    pub fn into_result(self) -> Result<Option<String>, RemoteError> {
        match self {
            Response::Ok(value) => Ok(value),
            Response::Error(message) => Err(RemoteError::Endpoint { message }),
        }
    }
}

/// Carries named invocations and property reads to a remote endpoint.
#[async_trait]
pub trait Invoker: Send + Sync {
    /// Invoke a qualified operation; returns the JSON result envelope.
    async fn invoke(&self, operation: &str, args: Vec<String>) -> Result<String, RemoteError>;

    async fn read_property(
        &self,
        collection: &str,
        key: &str,
        property: &str,
    ) -> Result<Option<String>, RemoteError>;
}

/// Talks to a server in the same process.
#[derive(Debug, Clone)]
pub struct LocalInvoker {
    server: Arc<ContainerServer>,
}

impl LocalInvoker {
    pub fn new(server: Arc<ContainerServer>) -> Self {
        Self { server }
    }
}

#[async_trait]
impl Invoker for LocalInvoker {
    async fn invoke(&self, operation: &str, args: Vec<String>) -> Result<String, RemoteError> {
        self.server.invoke(operation, args).await
    }

    async fn read_property(
        &self,
        collection: &str,
        key: &str,
        property: &str,
    ) -> Result<Option<String>, RemoteError> {
        Ok(self.server.property(collection, key, property))
    }
}
