// ABOUTME: Config scaffolding for new devices.
// ABOUTME: Creates ecs-runtime.yml template files.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::types::ResourceId;

use super::{CONFIG_FILENAME, Config};

/// Write a template config into `dir`; returns the path written.
pub fn init_config(dir: &Path, resource_id: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let mut config = Config::template();

    if let Some(id) = resource_id {
        config.resource_id =
            Some(ResourceId::new(id).map_err(|e| Error::InvalidConfig(e.to_string()))?);
    }

    let yaml = generate_template_yaml(&config);
    std::fs::write(&config_path, yaml)?;

    Ok(config_path)
}

pub fn generate_template_yaml(config: &Config) -> String {
    let resource_id = config
        .resource_id
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default();
    format!(
        r#"resource_id: {}
namespace: {}
listen: {}
request_timeout: {}

# Endpoints of other resources reachable by the client commands
resources: {{}}
#  edge-device-2: 10.0.0.2:9711

simulation:
  deploy_delay: {}
  stop_delay: {}

container_system:
  name: {}
  version: "{}"
"#,
        resource_id,
        config.namespace,
        config.listen,
        format_duration(config.request_timeout),
        format_duration(config.simulation.deploy_delay),
        format_duration(config.simulation.stop_delay),
        config.container_system.name,
        config.container_system.version,
    )
}

// Whole seconds when possible, so the template stays readable.
fn format_duration(duration: Duration) -> String {
    if duration.subsec_millis() == 0 {
        format!("{}s", duration.as_secs())
    } else {
        format!("{}ms", duration.as_millis())
    }
}
