//! Typed cluster resource documents.
//!
//! Each resource kind is an explicit struct serialized in the cluster's
//! camelCase wire spelling. Nothing here is a free-form map except label,
//! config and secret data.

// Field names mirror the cluster API.
#![allow(missing_docs)]

use serde::Serialize;
use stackforge_common::naming::Labels;

use crate::pvc::StorageSize;

/// Object metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    #[serde(skip_serializing_if = "Labels::is_empty")]
    pub labels: Labels,
    #[serde(skip_serializing_if = "Labels::is_empty")]
    pub annotations: Labels,
}

impl ObjectMeta {
    pub fn new(name: impl Into<String>, labels: Labels) -> Self {
        Self {
            name: name.into(),
            labels,
            annotations: Labels::new(),
        }
    }
}

// ---- Deployment ----

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub api_version: &'static str,
    pub kind: &'static str,
    pub metadata: ObjectMeta,
    pub spec: DeploymentSpec,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSpec {
    pub replicas: u32,
    pub selector: LabelSelector,
    pub template: PodTemplateSpec,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    pub match_labels: Labels,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodTemplateSpec {
    pub metadata: ObjectMeta,
    pub spec: PodSpec,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    pub containers: Vec<Container>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,
}

impl Deployment {
    pub fn new(
        metadata: ObjectMeta,
        replicas: u32,
        selector: Labels,
        pod_labels: Labels,
        containers: Vec<Container>,
        volumes: Vec<Volume>,
    ) -> Self {
        let pod_name = metadata.name.clone();
        Self {
            api_version: "apps/v1",
            kind: "Deployment",
            metadata,
            spec: DeploymentSpec {
                replicas,
                selector: LabelSelector {
                    match_labels: selector,
                },
                template: PodTemplateSpec {
                    metadata: ObjectMeta::new(pod_name, pod_labels),
                    spec: PodSpec { containers, volumes },
                },
            },
        }
    }

    /// Containers of the pod template.
    #[must_use]
    pub fn containers(&self) -> &[Container] {
        &self.spec.template.spec.containers
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub name: String,
    pub image: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<ContainerPort>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirements>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liveness_probe: Option<Probe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readiness_probe: Option<Probe>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<VolumeMount>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPort {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub container_port: u16,
    pub protocol: &'static str,
}

impl ContainerPort {
    pub const fn tcp(container_port: u16) -> Self {
        Self {
            name: None,
            container_port,
            protocol: "TCP",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRequirements {
    pub requests: ResourceList,
    pub limits: ResourceList,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceList {
    pub cpu: String,
    pub memory: String,
}

impl ResourceList {
    pub fn new(cpu: &str, memory: &str) -> Self {
        Self {
            cpu: cpu.into(),
            memory: memory.into(),
        }
    }
}

// ---- Environment ----

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVar {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_from: Option<EnvVarSource>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVarSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_map_key_ref: Option<KeySelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key_ref: Option<KeySelector>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeySelector {
    pub name: String,
    pub key: String,
}

/// The store an indirect reference points into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StoreKind {
    /// A configuration store.
    ConfigMap,
    /// A secret store.
    Secret,
}

impl EnvVar {
    pub fn literal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            value_from: None,
        }
    }

    pub fn from_config_map(
        name: impl Into<String>,
        config_map_name: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: None,
            value_from: Some(EnvVarSource {
                config_map_key_ref: Some(KeySelector {
                    name: config_map_name.into(),
                    key: key.into(),
                }),
                secret_key_ref: None,
            }),
        }
    }

    pub fn from_secret(
        name: impl Into<String>,
        secret_name: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: None,
            value_from: Some(EnvVarSource {
                config_map_key_ref: None,
                secret_key_ref: Some(KeySelector {
                    name: secret_name.into(),
                    key: key.into(),
                }),
            }),
        }
    }

    /// The store and key this variable reads from, if it is indirect.
    #[must_use]
    pub fn reference(&self) -> Option<(StoreKind, &KeySelector)> {
        let source = self.value_from.as_ref()?;
        source
            .config_map_key_ref
            .as_ref()
            .map(|r| (StoreKind::ConfigMap, r))
            .or_else(|| source.secret_key_ref.as_ref().map(|r| (StoreKind::Secret, r)))
    }
}

// ---- Probes ----

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Probe {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_get: Option<HttpGetAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exec: Option<ExecAction>,
    pub initial_delay_seconds: u64,
    pub period_seconds: u64,
    pub timeout_seconds: u64,
    pub failure_threshold: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpGetAction {
    pub path: String,
    pub port: u16,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecAction {
    pub command: Vec<String>,
}

// ---- Volumes ----

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMount {
    pub name: String,
    pub mount_path: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub name: String,
    pub persistent_volume_claim: ClaimVolumeSource,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimVolumeSource {
    pub claim_name: String,
}

impl Volume {
    pub fn claim(name: impl Into<String>, claim_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            persistent_volume_claim: ClaimVolumeSource {
                claim_name: claim_name.into(),
            },
        }
    }
}

// ---- Service ----

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub api_version: &'static str,
    pub kind: &'static str,
    pub metadata: ObjectMeta,
    pub spec: ServiceSpec,
}

/// How a network endpoint is exposed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ExposureMode {
    /// Reachable inside the cluster only.
    ClusterIP,
    /// Fronted by an external load balancer.
    LoadBalancer,
    /// Bound to a fixed port on every node.
    NodePort,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSpec {
    #[serde(rename = "type")]
    pub service_type: ExposureMode,
    pub selector: Labels,
    pub ports: Vec<ServicePort>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePort {
    pub name: String,
    pub port: u16,
    pub target_port: u16,
    pub protocol: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_port: Option<u16>,
}

impl ServicePort {
    pub fn tcp(name: impl Into<String>, port: u16, target_port: u16) -> Self {
        Self {
            name: name.into(),
            port,
            target_port,
            protocol: "TCP",
            node_port: None,
        }
    }
}

// ---- ConfigMap / Secret ----

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMap {
    pub api_version: &'static str,
    pub kind: &'static str,
    pub metadata: ObjectMeta,
    pub data: Labels,
}

impl ConfigMap {
    pub fn new(metadata: ObjectMeta, data: Labels) -> Self {
        Self {
            api_version: "v1",
            kind: "ConfigMap",
            metadata,
            data,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Secret {
    pub api_version: &'static str,
    pub kind: &'static str,
    pub metadata: ObjectMeta,
    #[serde(rename = "type")]
    pub secret_type: &'static str,
    pub string_data: Labels,
}

impl Secret {
    pub fn new(metadata: ObjectMeta, string_data: Labels) -> Self {
        Self {
            api_version: "v1",
            kind: "Secret",
            metadata,
            secret_type: "Opaque",
            string_data,
        }
    }
}

// ---- Ingress ----

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingress {
    pub api_version: &'static str,
    pub kind: &'static str,
    pub metadata: ObjectMeta,
    pub spec: IngressSpec,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressSpec {
    pub ingress_class_name: String,
    pub rules: Vec<IngressRule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tls: Vec<IngressTls>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressRule {
    pub host: String,
    pub http: HttpIngressRuleValue,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpIngressRuleValue {
    pub paths: Vec<HttpIngressPath>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpIngressPath {
    pub path: String,
    pub path_type: &'static str,
    pub backend: IngressBackend,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressBackend {
    pub service: IngressServiceBackend,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressServiceBackend {
    pub name: String,
    pub port: ServiceBackendPort,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceBackendPort {
    pub number: u16,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressTls {
    pub hosts: Vec<String>,
    pub secret_name: String,
}

impl HttpIngressPath {
    pub fn prefix(path: impl Into<String>, service: impl Into<String>, port: u16) -> Self {
        Self {
            path: path.into(),
            path_type: "Prefix",
            backend: IngressBackend {
                service: IngressServiceBackend {
                    name: service.into(),
                    port: ServiceBackendPort { number: port },
                },
            },
        }
    }
}

// ---- HorizontalPodAutoscaler ----

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HorizontalPodAutoscaler {
    pub api_version: &'static str,
    pub kind: &'static str,
    pub metadata: ObjectMeta,
    pub spec: AutoscalerSpec,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoscalerSpec {
    pub scale_target_ref: ScaleTargetRef,
    pub min_replicas: u32,
    pub max_replicas: u32,
    pub metrics: Vec<MetricSpec>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleTargetRef {
    pub api_version: &'static str,
    pub kind: &'static str,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSpec {
    #[serde(rename = "type")]
    pub metric_type: &'static str,
    pub resource: ResourceMetricSource,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetricSource {
    pub name: &'static str,
    pub target: MetricTarget,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricTarget {
    #[serde(rename = "type")]
    pub target_type: &'static str,
    pub average_utilization: u32,
}

impl MetricSpec {
    /// Average utilisation target for one tracked resource.
    pub const fn utilization(resource: &'static str, percent: u32) -> Self {
        Self {
            metric_type: "Resource",
            resource: ResourceMetricSource {
                name: resource,
                target: MetricTarget {
                    target_type: "Utilization",
                    average_utilization: percent,
                },
            },
        }
    }
}

// ---- PersistentVolumeClaim ----

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistentVolumeClaim {
    pub api_version: &'static str,
    pub kind: &'static str,
    pub metadata: ObjectMeta,
    pub spec: ClaimSpec,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimSpec {
    pub access_modes: Vec<AccessMode>,
    pub resources: StorageRequirements,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class_name: Option<String>,
}

/// How many nodes may mount a claim, and how.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AccessMode {
    /// Read-write by a single node.
    ReadWriteOnce,
    /// Read-write by many nodes.
    ReadWriteMany,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageRequirements {
    pub requests: StorageRequest,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageRequest {
    pub storage: StorageSize,
}

// ---- Any resource ----

/// One cluster resource of any supported kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Resource {
    /// A workload.
    Deployment(Deployment),
    /// A network endpoint.
    Service(Service),
    /// A configuration store.
    ConfigMap(ConfigMap),
    /// A secret store.
    Secret(Secret),
    /// An ingress route.
    Ingress(Ingress),
    /// An autoscale policy.
    HorizontalPodAutoscaler(HorizontalPodAutoscaler),
    /// A volume claim.
    PersistentVolumeClaim(PersistentVolumeClaim),
}

impl Resource {
    /// The resource's metadata.
    #[must_use]
    pub const fn metadata(&self) -> &ObjectMeta {
        match self {
            Self::Deployment(r) => &r.metadata,
            Self::Service(r) => &r.metadata,
            Self::ConfigMap(r) => &r.metadata,
            Self::Secret(r) => &r.metadata,
            Self::Ingress(r) => &r.metadata,
            Self::HorizontalPodAutoscaler(r) => &r.metadata,
            Self::PersistentVolumeClaim(r) => &r.metadata,
        }
    }

    /// The wire `kind` of the resource.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Deployment(r) => r.kind,
            Self::Service(r) => r.kind,
            Self::ConfigMap(r) => r.kind,
            Self::Secret(r) => r.kind,
            Self::Ingress(r) => r.kind,
            Self::HorizontalPodAutoscaler(r) => r.kind,
            Self::PersistentVolumeClaim(r) => r.kind,
        }
    }

    /// The resource name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.metadata().name
    }
}

macro_rules! impl_from_resource {
    ($($kind:ident),* $(,)?) => {
        $(
            impl From<$kind> for Resource {
                fn from(resource: $kind) -> Self {
                    Self::$kind(resource)
                }
            }
        )*
    };
}

impl_from_resource!(
    Deployment,
    Service,
    ConfigMap,
    Secret,
    Ingress,
    HorizontalPodAutoscaler,
    PersistentVolumeClaim,
);
