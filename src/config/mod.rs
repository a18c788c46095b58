// ABOUTME: Configuration types and parsing for ecs-runtime.yml.
// ABOUTME: Resolves the local resource identity and the endpoints of other resources.

mod init;

pub use init::{generate_template_yaml, init_config};

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::remote::{StaticResolver, names};
use crate::types::ResourceId;

pub const CONFIG_FILENAME: &str = "ecs-runtime.yml";
pub const CONFIG_FILENAME_ALT: &str = "ecs-runtime.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".ecs-runtime/config.yml";

/// Environment variable consulted when `resource_id` is not configured.
pub const RESOURCE_ID_ENV: &str = "ECS_RESOURCE_ID";

pub const DEFAULT_PORT: u16 = 9711;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub resource_id: Option<ResourceId>,

    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    #[serde(default)]
    pub resources: HashMap<String, SocketAddr>,

    #[serde(default)]
    pub simulation: SimulationConfig,

    #[serde(default)]
    pub container_system: ContainerSystemConfig,

    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
}

/// Artificial latency of the simulated effector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    #[serde(default, with = "humantime_serde")]
    pub deploy_delay: Duration,

    #[serde(default, with = "humantime_serde")]
    pub stop_delay: Duration,
}

/// What `getContainerSystemName/Version` report.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContainerSystemConfig {
    #[serde(default = "default_system_name")]
    pub name: String,

    #[serde(default = "default_system_version")]
    pub version: String,
}

impl Default for ContainerSystemConfig {
    fn default() -> Self {
        Self {
            name: default_system_name(),
            version: default_system_version(),
        }
    }
}

fn default_namespace() -> String {
    names::DEFAULT_NAMESPACE.to_string()
}

fn default_listen() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_system_name() -> String {
    "simulated".to_string()
}

fn default_system_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            resource_id: None,
            namespace: default_namespace(),
            listen: default_listen(),
            resources: HashMap::new(),
            simulation: SimulationConfig::default(),
            container_system: ContainerSystemConfig::default(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = if yaml.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(yaml).map_err(|e| Error::InvalidConfig(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Path of the first config file present in `dir`.
    pub fn find(dir: &Path) -> Option<PathBuf> {
        [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ]
        .into_iter()
        .find(|path| path.exists())
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        match Self::find(dir) {
            Some(path) => Self::load(&path),
            None => Err(Error::ConfigNotFound(dir.to_path_buf())),
        }
    }

    /// Discovered configuration, or the defaults when `dir` has none.
    pub fn discover_or_default(dir: &Path) -> Result<Self> {
        match Self::discover(dir) {
            Err(Error::ConfigNotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.namespace.trim().is_empty() {
            return Err(Error::InvalidConfig("namespace must not be empty".to_string()));
        }
        if self.namespace.contains(char::is_whitespace) {
            return Err(Error::InvalidConfig(format!(
                "namespace '{}' must not contain whitespace",
                self.namespace
            )));
        }
        if let Some(empty) = self.resources.keys().find(|k| k.trim().is_empty()) {
            return Err(Error::InvalidConfig(format!(
                "resource id '{empty}' must not be empty"
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(Error::InvalidConfig(
                "request_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Identity of this device: configured value, then `ECS_RESOURCE_ID`,
    /// then the host name.
    pub fn resource_id(&self) -> Result<ResourceId> {
        if let Some(id) = &self.resource_id {
            return Ok(id.clone());
        }
        if let Ok(value) = std::env::var(RESOURCE_ID_ENV)
            && !value.trim().is_empty()
        {
            return ResourceId::new(value.trim())
                .map_err(|e| Error::InvalidConfig(format!("{RESOURCE_ID_ENV}: {e}")));
        }
        let host = gethostname::gethostname().to_string_lossy().into_owned();
        ResourceId::new(host).map_err(|e| Error::InvalidConfig(format!("host name: {e}")))
    }

    /// Resolver over `resources`, with the local resource mapped to `listen`.
    pub fn resolver(&self) -> Result<StaticResolver> {
        let local = self.resource_id()?;
        let resolver = self
            .resources
            .iter()
            .fold(StaticResolver::new(), |r, (id, addr)| {
                r.with_endpoint(id.clone(), *addr)
            });
        let resolver = if resolver.endpoint(local.as_str()).is_none() {
            resolver.with_endpoint(local.to_string(), self.listen)
        } else {
            resolver
        };
        Ok(resolver.with_timeout(self.request_timeout))
    }

    pub fn template() -> Self {
        Config {
            resource_id: ResourceId::new("edge-device-1").ok(),
            ..Config::default()
        }
    }
}
