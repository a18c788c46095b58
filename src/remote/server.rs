// ABOUTME: Server-side dispatch table binding named remote operations to a ContainerOperations.
// ABOUTME: Decodes string arguments, wraps results in the envelope, and serves mirror properties.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use super::envelope::ResultEnvelope;
use super::error::RemoteError;
use super::names;
use super::transport::{Request, Response};
use crate::directory::ContainerMirror;
use crate::operations::ContainerOperations;
use crate::registry::OperationError;
use crate::types::{ContainerUri, ResourceId};

type Ops = Arc<dyn ContainerOperations>;
type HandlerResult = Result<Option<String>, OperationError>;
type Handler = fn(Ops, Vec<String>) -> BoxFuture<'static, HandlerResult>;

/// Remote control surface of one manager.
///
/// Every operation is registered under `<namespace>_<operation>`; arguments
/// are plain strings and missing ones decode as empty strings.
pub struct ContainerServer {
    namespace: String,
    operations: Ops,
    handlers: HashMap<String, Handler>,
    mirror: Option<Arc<ContainerMirror>>,
}

impl fmt::Debug for ContainerServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerServer")
            .field("namespace", &self.namespace)
            .field("operations", &self.handlers.len())
            .field("mirror", &self.mirror.is_some())
            .finish()
    }
}

impl ContainerServer {
    pub fn new(namespace: impl Into<String>, operations: Arc<dyn ContainerOperations>) -> Self {
        let namespace = namespace.into();
        let table: [(&str, Handler); 9] = [
            (names::OP_ADD_CONTAINER, add_container as Handler),
            (names::OP_START_CONTAINER, start_container as Handler),
            (names::OP_STOP_CONTAINER, stop_container as Handler),
            (names::OP_MIGRATE_CONTAINER, migrate_container as Handler),
            (names::OP_UPDATE_CONTAINER, update_container as Handler),
            (names::OP_UNDEPLOY_CONTAINER, undeploy_container as Handler),
            (names::OP_GET_STATE, get_state as Handler),
            (names::OP_SYSTEM_NAME, system_name as Handler),
            (names::OP_SYSTEM_VERSION, system_version as Handler),
        ];
        let handlers = table
            .into_iter()
            .map(|(op, handler)| (names::qualified_name(&namespace, op), handler))
            .collect();

        Self {
            namespace,
            operations,
            handlers,
            mirror: None,
        }
    }

    /// Serve container properties from `mirror`.
    pub fn with_mirror(mut self, mirror: Arc<ContainerMirror>) -> Self {
        self.mirror = Some(mirror);
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Qualified names of all registered operations, sorted.
    pub fn operation_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Invoke a qualified operation, returning the JSON envelope.
    ///
    /// Operation failures end up inside the envelope; only an unknown
    /// operation name is an `Err`.
    pub async fn invoke(&self, name: &str, args: Vec<String>) -> Result<String, RemoteError> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| RemoteError::UnknownOperation {
                name: name.to_string(),
            })?;
        tracing::debug!(operation = name, args = ?args, "remote invocation");
        let result = handler(Arc::clone(&self.operations), args).await;
        Ok(ResultEnvelope::from_result(result).to_json()?)
    }

    /// Read a mirrored property. Unknown collections, keys, and properties
    /// read as `None`.
    pub fn property(&self, collection: &str, key: &str, property: &str) -> Option<String> {
        if collection != names::COLL_CONTAINERS {
            return None;
        }
        self.mirror.as_ref()?.property(key, property)
    }

    /// Answer one wire request.
    pub async fn handle(&self, request: Request) -> Response {
        match request {
            Request::Invoke { operation, args } => match self.invoke(&operation, args).await {
                Ok(envelope) => Response::Ok(Some(envelope)),
                Err(e) => Response::Error(e.to_string()),
            },
            Request::Property {
                collection,
                key,
                property,
            } => Response::Ok(self.property(&collection, &key, &property)),
        }
    }
}

fn arg(args: &[String], index: usize) -> String {
    args.get(index).cloned().unwrap_or_default()
}

fn uri_arg(args: &[String], index: usize, activity: &str) -> Result<ContainerUri, OperationError> {
    let raw = arg(args, index);
    ContainerUri::parse(&raw).map_err(|e| {
        OperationError::InvalidArgument {
            activity: activity.to_string(),
            reason: format!("invalid location '{raw}': {e}"),
        }
        .logged()
    })
}

fn resource_arg(args: &[String], index: usize) -> Result<ResourceId, OperationError> {
    ResourceId::new(arg(args, index)).map_err(|e| {
        OperationError::InvalidArgument {
            activity: "migrate container".to_string(),
            reason: format!("invalid resource id: {e}"),
        }
        .logged()
    })
}

fn add_container(ops: Ops, args: Vec<String>) -> BoxFuture<'static, HandlerResult> {
    async move {
        let location = uri_arg(&args, 0, "add container")?;
        ops.add_container(&location).await.map(Some)
    }
    .boxed()
}

fn start_container(ops: Ops, args: Vec<String>) -> BoxFuture<'static, HandlerResult> {
    async move {
        ops.start_container(&arg(&args, 0)).await.map(|()| None)
    }
    .boxed()
}

fn stop_container(ops: Ops, args: Vec<String>) -> BoxFuture<'static, HandlerResult> {
    async move {
        ops.stop_container(&arg(&args, 0)).await.map(|()| None)
    }
    .boxed()
}

fn migrate_container(ops: Ops, args: Vec<String>) -> BoxFuture<'static, HandlerResult> {
    async move {
        let resource = resource_arg(&args, 1)?;
        ops.migrate_container(&arg(&args, 0), &resource)
            .await
            .map(|()| None)
    }
    .boxed()
}

fn update_container(ops: Ops, args: Vec<String>) -> BoxFuture<'static, HandlerResult> {
    async move {
        let location = uri_arg(&args, 1, "update container")?;
        ops.update_container(&arg(&args, 0), &location)
            .await
            .map(|()| None)
    }
    .boxed()
}

fn undeploy_container(ops: Ops, args: Vec<String>) -> BoxFuture<'static, HandlerResult> {
    async move {
        ops.undeploy_container(&arg(&args, 0)).await.map(|()| None)
    }
    .boxed()
}

fn get_state(ops: Ops, args: Vec<String>) -> BoxFuture<'static, HandlerResult> {
    async move {
        let state = ops.get_state(&arg(&args, 0)).await;
        Ok::<_, OperationError>(Some(state.to_string()))
    }
    .boxed()
}

fn system_name(ops: Ops, _: Vec<String>) -> BoxFuture<'static, HandlerResult> {
    async move { Ok::<_, OperationError>(Some(ops.container_system_name().await)) }.boxed()
}

fn system_version(ops: Ops, _: Vec<String>) -> BoxFuture<'static, HandlerResult> {
    async move { Ok::<_, OperationError>(Some(ops.container_system_version().await)) }.boxed()
}
