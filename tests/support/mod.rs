// ABOUTME: Test support utilities.
// ABOUTME: Descriptor files on disk and a manager wired to an in-process mirror.

use std::path::Path;
use std::sync::{Arc, Mutex, Once};

use ecs_runtime::descriptor::BasicContainerDescriptor;
use ecs_runtime::directory::ContainerMirror;
use ecs_runtime::effector::SimulatedEffector;
use ecs_runtime::manager::ContainerManager;
use ecs_runtime::types::{ContainerUri, ResourceId};

#[allow(dead_code)]
pub type Manager =
    ContainerManager<BasicContainerDescriptor, SimulatedEffector<BasicContainerDescriptor>>;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("ecs_runtime=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Shared in-memory sink for captured log output.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    #[allow(dead_code)]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a subscriber that records every event on this thread and
/// return what was logged.
#[allow(dead_code)]
pub fn capture_logs<F: FnOnce()>(f: F) -> String {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    buffer.contents()
}

/// Write a descriptor file into `dir` and return its `file:` URI.
#[allow(dead_code)]
pub fn write_descriptor(dir: &Path, file: &str, id: &str, version: &str) -> ContainerUri {
    let path = dir.join(file);
    std::fs::write(
        &path,
        format!("id: {id}\nname: demo\nversion: \"{version}\"\n"),
    )
    .unwrap();
    ContainerUri::from_file_path(&path).unwrap()
}

/// A manager for resource `dev-1` with the simulated effector, pushing into
/// the returned mirror.
#[allow(dead_code)]
pub fn manager() -> (Arc<Manager>, Arc<ContainerMirror>) {
    init_tracing();
    let mirror = Arc::new(ContainerMirror::new(ResourceId::new("dev-1").unwrap()));
    let effector = SimulatedEffector::new("simulated", "1.0");
    let manager = Arc::new(ContainerManager::<BasicContainerDescriptor, _>::new(
        mirror.clone(),
        effector,
    ));
    (manager, mirror)
}
