//! Abstract service descriptors.
//!
//! A [`ServiceDescriptor`] is one runnable unit and its runtime
//! requirements, before any output format is chosen.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::healthcheck::HealthCheck;

/// Where a service's container image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Built from local source.
    Build(BuildContext),
    /// Pulled from a registry.
    Image(String),
}

/// Local build context of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildContext {
    /// Directory sent to the builder.
    pub context: String,
    /// Build file path, relative to the context.
    pub dockerfile: String,
}

impl Default for BuildContext {
    fn default() -> Self {
        Self {
            context: ".".into(),
            dockerfile: "Dockerfile".into(),
        }
    }
}

/// A published port mapping.
///
/// Both sides are strings because the published side is usually an
/// interpolated default such as `${PORT:-3000}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortMapping {
    /// Host side.
    pub published: String,
    /// Container side.
    pub target: String,
}

impl PortMapping {
    /// Creates a mapping from its two sides.
    pub fn new(published: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            published: published.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for PortMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.published, self.target)
    }
}

/// A mount spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mount {
    /// A persistent volume identified by a logical name.
    Named {
        /// Volume name.
        volume: String,
        /// Mount point inside the container.
        target: String,
    },
    /// A bind or anonymous mount, kept verbatim.
    Local(String),
}

impl Mount {
    /// Parses a `source:target` mount spec.
    ///
    /// Specs starting with `.` or `/`, or without a `:` separator, are
    /// local mounts; everything else names a volume.
    #[must_use]
    pub fn parse(spec: &str) -> Self {
        if spec.starts_with('.') || spec.starts_with('/') {
            return Self::Local(spec.into());
        }
        match spec.split_once(':') {
            Some((volume, target)) => Self::Named {
                volume: volume.into(),
                target: target.into(),
            },
            None => Self::Local(spec.into()),
        }
    }

    /// The volume name, for named volumes only.
    #[must_use]
    pub fn volume_name(&self) -> Option<&str> {
        match self {
            Self::Named { volume, .. } => Some(volume),
            Self::Local(_) => None,
        }
    }
}

impl fmt::Display for Mount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named { volume, target } => write!(f, "{volume}:{target}"),
            Self::Local(spec) => f.write_str(spec),
        }
    }
}

/// What a dependency must reach before a dependent may start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReadinessCondition {
    /// The dependency's container has started.
    #[serde(rename = "service_started")]
    Started,
    /// The dependency reports itself healthy.
    #[serde(rename = "service_healthy")]
    Healthy,
}

impl fmt::Display for ReadinessCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => write!(f, "started"),
            Self::Healthy => write!(f, "healthy"),
        }
    }
}

/// Container restart policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestartPolicy {
    /// Never restart.
    No,
    /// Always restart.
    Always,
    /// Restart on non-zero exit.
    OnFailure,
    /// Restart unless explicitly stopped.
    UnlessStopped,
}

/// One runnable unit and its runtime requirements.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDescriptor {
    /// Unique name; the naming root of every derived artifact.
    pub name: String,
    /// Image source.
    pub origin: Origin,
    /// Published ports, in order.
    pub ports: Vec<PortMapping>,
    /// Environment, in insertion order.
    pub environment: IndexMap<String, String>,
    /// Mount specs, in order.
    pub volumes: Vec<Mount>,
    /// Dependencies keyed by service name.
    pub depends_on: IndexMap<String, ReadinessCondition>,
    /// Optional readiness probe.
    pub health_check: Option<HealthCheck>,
    /// Logical networks the service attaches to.
    pub networks: Vec<String>,
    /// Optional restart policy.
    pub restart: Option<RestartPolicy>,
    /// Optional start command override.
    pub command: Option<String>,
}

impl ServiceDescriptor {
    /// Creates a descriptor with no ports, env, mounts or dependencies.
    pub fn new(name: impl Into<String>, origin: Origin) -> Self {
        Self {
            name: name.into(),
            origin,
            ports: Vec::new(),
            environment: IndexMap::new(),
            volumes: Vec::new(),
            depends_on: IndexMap::new(),
            health_check: None,
            networks: Vec::new(),
            restart: None,
            command: None,
        }
    }

    /// Adds a published port.
    #[must_use]
    pub fn port(mut self, published: impl Into<String>, target: impl Into<String>) -> Self {
        self.ports.push(PortMapping::new(published, target));
        self
    }

    /// Sets an environment variable, replacing any earlier value.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.environment.insert(key.into(), value.into());
        self
    }

    /// Adds a mount parsed from its spec.
    #[must_use]
    pub fn volume(mut self, spec: &str) -> Self {
        self.volumes.push(Mount::parse(spec));
        self
    }

    /// Declares a dependency on another service.
    #[must_use]
    pub fn depends_on(mut self, service: impl Into<String>, condition: ReadinessCondition) -> Self {
        let _ = self.depends_on.insert(service.into(), condition);
        self
    }

    /// Sets the readiness probe.
    #[must_use]
    pub fn health_check(mut self, check: HealthCheck) -> Self {
        self.health_check = Some(check);
        self
    }

    /// Attaches the service to a network.
    #[must_use]
    pub fn network(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.networks.contains(&name) {
            self.networks.push(name);
        }
        self
    }

    /// Sets the restart policy.
    #[must_use]
    pub const fn restart(mut self, policy: RestartPolicy) -> Self {
        self.restart = Some(policy);
        self
    }

    /// Overrides the start command.
    #[must_use]
    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Names of the named volumes this service mounts.
    pub fn named_volumes(&self) -> impl Iterator<Item = &str> {
        self.volumes.iter().filter_map(Mount::volume_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_named_volume() {
        let mount = Mount::parse("postgres_data:/var/lib/postgresql/data");
        assert_eq!(mount.volume_name(), Some("postgres_data"));
        assert_eq!(mount.to_string(), "postgres_data:/var/lib/postgresql/data");
    }

    #[test]
    fn parse_bind_and_anonymous_mounts_as_local() {
        assert_eq!(Mount::parse(".:/app"), Mount::Local(".:/app".into()));
        assert_eq!(
            Mount::parse("/app/node_modules"),
            Mount::Local("/app/node_modules".into())
        );
        assert_eq!(Mount::parse("scratch").volume_name(), None);
    }

    #[test]
    fn port_mapping_renders_both_sides() {
        let port = PortMapping::new("${PORT:-3000}", "3000");
        assert_eq!(port.to_string(), "${PORT:-3000}:3000");
    }

    #[test]
    fn builder_keeps_insertion_order() {
        let svc = ServiceDescriptor::new("api", Origin::Build(BuildContext::default()))
            .env("B", "2")
            .env("A", "1")
            .depends_on("db", ReadinessCondition::Healthy)
            .depends_on("cache", ReadinessCondition::Started);
        let keys: Vec<&str> = svc.environment.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["B", "A"]);
        let deps: Vec<&str> = svc.depends_on.keys().map(String::as_str).collect();
        assert_eq!(deps, vec!["db", "cache"]);
    }

    #[test]
    fn network_is_a_set() {
        let svc = ServiceDescriptor::new("api", Origin::Image("img".into()))
            .network("app-network")
            .network("app-network");
        assert_eq!(svc.networks, vec!["app-network"]);
    }

    #[test]
    fn named_volumes_skip_local_mounts() {
        let svc = ServiceDescriptor::new("api", Origin::Image("img".into()))
            .volume(".:/app")
            .volume("data:/data");
        assert_eq!(svc.named_volumes().collect::<Vec<_>>(), vec!["data"]);
    }
}
