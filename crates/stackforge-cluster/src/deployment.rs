//! Workload builders.

use std::time::Duration;

use stackforge_common::config::ProjectConfig;
use stackforge_common::constants::{APP_PORT, APP_REPLICAS, DEPENDENCY_REPLICAS, HEALTH_PATH};
use stackforge_common::naming;
use stackforge_common::types::DependencyKind;
use stackforge_compose::healthcheck::{self, HealthCheck};

use crate::connection;
use crate::resources::{
    Container, ContainerPort, Deployment, ExecAction, HttpGetAction, ObjectMeta, Probe,
    ResourceList, ResourceRequirements, Volume, VolumeMount,
};

/// The application workload.
#[must_use]
pub fn app_deployment(config: &ProjectConfig) -> Deployment {
    let project = config.name.as_str();
    let labels = naming::app_labels(project, config.framework.as_str());
    let config_store = naming::config_store_name(project);
    let secret_store = naming::secret_store_name(project);

    let container = Container {
        name: project.to_string(),
        image: naming::app_image(project),
        ports: vec![ContainerPort::tcp(APP_PORT)],
        env: connection::app_settings(config)
            .iter()
            .map(|s| s.env_var(&config_store, &secret_store))
            .collect(),
        resources: Some(ResourceRequirements {
            requests: ResourceList::new("100m", "128Mi"),
            limits: ResourceList::new("500m", "512Mi"),
        }),
        liveness_probe: Some(http_probe(30, 10, 5, 3)),
        readiness_probe: Some(http_probe(10, 5, 3, 3)),
        ..Container::default()
    };

    Deployment::new(
        ObjectMeta::new(project, labels.clone()),
        APP_REPLICAS,
        naming::app_selector(project),
        labels,
        vec![container],
        Vec::new(),
    )
}

fn http_probe(initial_delay: u64, period: u64, timeout: u64, failures: u32) -> Probe {
    Probe {
        http_get: Some(HttpGetAction {
            path: HEALTH_PATH.into(),
            port: APP_PORT,
        }),
        exec: None,
        initial_delay_seconds: initial_delay,
        period_seconds: period,
        timeout_seconds: timeout,
        failure_threshold: failures,
    }
}

/// A managed dependency's workload, single replica, backed by its claim.
///
/// Dependencies with a readiness probe get exec liveness and readiness
/// probes derived from it; the document store gets none.
#[must_use]
pub fn dependency_deployment(project: &str, kind: DependencyKind) -> Deployment {
    let name = kind.service_name();
    let labels = naming::dependency_labels(project, kind);
    let config_store = naming::config_store_name(project);
    let secret_store = naming::dependency_secret_name(kind);
    let volume = naming::storage_volume_name(kind);

    let mut ports = vec![ContainerPort::tcp(kind.port())];
    ports.extend(kind.management_port().map(ContainerPort::tcp));

    let check = healthcheck::for_dependency(kind);
    let container = Container {
        name: name.to_string(),
        image: kind.image().to_string(),
        ports,
        env: connection::dependency_settings(kind)
            .iter()
            .map(|s| s.env_var(&config_store, &secret_store))
            .collect(),
        resources: Some(ResourceRequirements {
            requests: ResourceList::new("100m", "256Mi"),
            limits: ResourceList::new("500m", "1Gi"),
        }),
        liveness_probe: check
            .as_ref()
            .map(|c| exec_probe(c, c.start_period.unwrap_or(Duration::from_secs(30)))),
        readiness_probe: check
            .as_ref()
            .map(|c| exec_probe(c, Duration::from_secs(5))),
        volume_mounts: vec![VolumeMount {
            name: volume.clone(),
            mount_path: kind.data_path().to_string(),
        }],
        ..Container::default()
    };

    Deployment::new(
        ObjectMeta::new(name, labels.clone()),
        DEPENDENCY_REPLICAS,
        naming::dependency_selector(project, kind),
        labels,
        vec![container],
        vec![Volume::claim(volume, naming::claim_name(kind))],
    )
}

/// A probe running the health check's command inside the container.
#[must_use]
pub fn exec_probe(check: &HealthCheck, initial_delay: Duration) -> Probe {
    Probe {
        http_get: None,
        exec: Some(ExecAction {
            command: check.exec_command(),
        }),
        initial_delay_seconds: initial_delay.as_secs(),
        period_seconds: check.interval.as_secs(),
        timeout_seconds: check.timeout.as_secs(),
        failure_threshold: check.retries,
    }
}
