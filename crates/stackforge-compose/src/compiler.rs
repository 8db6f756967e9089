//! Compose document compiler.
//!
//! Sorts the catalogue's descriptors and projects them into a single
//! typed compose document, rendered with `serde_yaml`.

use std::collections::BTreeMap;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use stackforge_common::config::ProjectConfig;
use stackforge_common::constants::COMPOSE_VERSION;
use stackforge_common::error::Result;

use crate::catalog;
use crate::descriptor::{BuildContext, Origin, ReadinessCondition, RestartPolicy, ServiceDescriptor};
use crate::env;
use crate::graph;
use crate::healthcheck::{HealthCheck, compose_duration};
use crate::network::{self, NetworkConfig};

/// A compose document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposeFile {
    /// File format version.
    pub version: String,
    /// Services keyed by name, in startup order.
    pub services: IndexMap<String, ComposeService>,
    /// Top-level networks.
    pub networks: BTreeMap<String, NetworkConfig>,
    /// Named volumes referenced by any service.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub volumes: IndexMap<String, EmptyMap>,
}

/// Serializes as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyMap {}

/// One service entry. The descriptor's name becomes the map key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposeService {
    /// Registry image, for pulled services.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Build context, for locally built services.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildContext>,
    /// Published ports as `published:target`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
    /// Environment variables.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub environment: IndexMap<String, String>,
    /// Mount specs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
    /// Dependencies and the condition each must reach.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub depends_on: IndexMap<String, DependsOnCondition>,
    /// Readiness probe.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healthcheck: Option<ComposeHealthcheck>,
    /// Attached networks.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<String>,
    /// Restart policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart: Option<RestartPolicy>,
    /// Start command override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

/// `depends_on` entry in long form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependsOnCondition {
    /// Required readiness.
    pub condition: ReadinessCondition,
}

/// Compose spelling of a [`HealthCheck`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeHealthcheck {
    /// Probe command.
    pub test: Vec<String>,
    /// Probe interval, e.g. `30s`.
    pub interval: String,
    /// Probe timeout.
    pub timeout: String,
    /// Failures before unhealthy.
    pub retries: u32,
    /// Warm-up grace period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_period: Option<String>,
}

impl From<&HealthCheck> for ComposeHealthcheck {
    fn from(check: &HealthCheck) -> Self {
        Self {
            test: check.test.clone(),
            interval: compose_duration(check.interval),
            timeout: compose_duration(check.timeout),
            retries: check.retries,
            start_period: check.start_period.map(compose_duration),
        }
    }
}

impl From<&ServiceDescriptor> for ComposeService {
    fn from(descriptor: &ServiceDescriptor) -> Self {
        let (image, build) = match &descriptor.origin {
            Origin::Image(image) => (Some(image.clone()), None),
            Origin::Build(context) => (None, Some(context.clone())),
        };
        Self {
            image,
            build,
            ports: descriptor.ports.iter().map(ToString::to_string).collect(),
            environment: descriptor.environment.clone(),
            volumes: descriptor.volumes.iter().map(ToString::to_string).collect(),
            depends_on: descriptor
                .depends_on
                .iter()
                .map(|(name, condition)| {
                    (
                        name.clone(),
                        DependsOnCondition {
                            condition: *condition,
                        },
                    )
                })
                .collect(),
            healthcheck: descriptor.health_check.as_ref().map(ComposeHealthcheck::from),
            networks: descriptor.networks.clone(),
            restart: descriptor.restart,
            command: descriptor.command.clone(),
        }
    }
}

impl ComposeFile {
    /// Renders the document as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Everything the compose compiler produces for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeOutput {
    /// The service-orchestration document.
    pub document: ComposeFile,
    /// Lines of the `.env` file.
    pub env_file: Vec<String>,
    /// Lines of the `.dockerignore` file.
    pub dockerignore: Vec<String>,
}

/// Compiles a configuration into compose artifacts.
///
/// # Errors
///
/// Returns a configuration error if `config` fails validation, and
/// propagates dependency resolution failures unchanged.
pub fn compile(config: &ProjectConfig) -> Result<ComposeOutput> {
    tracing::info!(project = %config.name, "compiling compose document");
    config.validate()?;
    let descriptors = catalog::descriptors(config);
    Ok(ComposeOutput {
        document: compile_descriptors(&descriptors)?,
        env_file: env::env_file_lines(config),
        dockerignore: env::dockerignore_lines(),
    })
}

/// Sorts descriptors and projects them into a compose document.
///
/// # Errors
///
/// Propagates dependency resolution failures unchanged.
pub fn compile_descriptors(descriptors: &[ServiceDescriptor]) -> Result<ComposeFile> {
    let sorted = graph::sort_by_dependencies(descriptors)?;

    let services = sorted
        .iter()
        .map(|d| (d.name.clone(), ComposeService::from(d)))
        .collect();

    Ok(ComposeFile {
        version: COMPOSE_VERSION.into(),
        services,
        networks: network::networks(),
        volumes: named_volumes(&sorted)
            .into_iter()
            .map(|name| (name, EmptyMap::default()))
            .collect(),
    })
}

/// Every distinct named volume across the descriptors, first use first.
#[must_use]
pub fn named_volumes(descriptors: &[ServiceDescriptor]) -> IndexSet<String> {
    descriptors
        .iter()
        .flat_map(ServiceDescriptor::named_volumes)
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use stackforge_common::config::{NoSqlDatabase, Preset, SqlDatabase};
    use stackforge_common::error::StackforgeError;

    use super::*;

    fn app_with_store_and_cache() -> ProjectConfig {
        let mut config = ProjectConfig::new("shop");
        config.sql_database = Some(SqlDatabase::Postgresql);
        config.nosql_databases = vec![NoSqlDatabase::Redis];
        config
    }

    #[test]
    fn services_are_keyed_in_startup_order() {
        let output = compile(&app_with_store_and_cache()).expect("should compile");
        let keys: Vec<&str> = output.document.services.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["postgres", "redis", "shop"]);
    }

    #[test]
    fn volumes_exclude_bind_mounts() {
        let output = compile(&app_with_store_and_cache()).expect("should compile");
        let volumes: Vec<&str> = output.document.volumes.keys().map(String::as_str).collect();
        assert_eq!(volumes, vec!["postgres_data", "redis_data"]);
    }

    #[test]
    fn app_only_omits_volumes_section() {
        let mut config = ProjectConfig::preset(Preset::Minimal, "solo");
        config.sql_database = None;
        let output = compile(&config).expect("should compile");
        assert!(output.document.volumes.is_empty());
        let yaml = output.document.to_yaml().expect("render");
        assert!(!yaml.contains("\nvolumes:"), "got: {yaml}");
        assert!(yaml.contains("app-network"), "got: {yaml}");
    }

    #[test]
    fn rendered_document_has_long_form_conditions() {
        let output = compile(&app_with_store_and_cache()).expect("should compile");
        let yaml = output.document.to_yaml().expect("render");
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).expect("parse");
        assert_eq!(value["version"].as_str(), Some("3.8"));
        assert_eq!(
            value["services"]["shop"]["depends_on"]["postgres"]["condition"].as_str(),
            Some("service_healthy")
        );
        assert_eq!(
            value["services"]["shop"]["healthcheck"]["start_period"].as_str(),
            Some("40s")
        );
        assert_eq!(
            value["services"]["shop"]["build"]["dockerfile"].as_str(),
            Some("Dockerfile")
        );
        assert_eq!(value["services"]["redis"]["restart"].as_str(), Some("unless-stopped"));
        assert!(value["services"]["shop"].get("name").is_none());
        assert_eq!(value["networks"]["app-network"]["driver"].as_str(), Some("bridge"));
    }

    #[test]
    fn cycles_propagate_unchanged() {
        let a = ServiceDescriptor::new("a", Origin::Image("a".into()))
            .depends_on("b", ReadinessCondition::Started);
        let b = ServiceDescriptor::new("b", Origin::Image("b".into()))
            .depends_on("a", ReadinessCondition::Started);
        let err = compile_descriptors(&[a, b]).expect_err("should fail");
        assert!(
            matches!(err, StackforgeError::CircularDependency { .. }),
            "got: {err}"
        );
    }

    #[test]
    fn document_round_trips_through_yaml() {
        let output = compile(&ProjectConfig::preset(Preset::Microservices, "mesh"))
            .expect("should compile");
        let yaml = output.document.to_yaml().expect("render");
        let parsed: ComposeFile = serde_yaml::from_str(&yaml).expect("parse");
        assert_eq!(parsed, output.document);
    }

    #[test]
    fn shared_volume_is_listed_once() {
        let one = ServiceDescriptor::new("one", Origin::Image("x".into())).volume("shared:/a");
        let two = ServiceDescriptor::new("two", Origin::Image("y".into())).volume("shared:/b");
        let volumes = named_volumes(&[one, two]);
        assert_eq!(volumes.len(), 1);
    }
}
