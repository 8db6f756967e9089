//! Autoscale policy builder.

use stackforge_common::constants::{
    HPA_CPU_THRESHOLD, HPA_MAX_REPLICAS, HPA_MEMORY_THRESHOLD, HPA_MIN_REPLICAS,
};
use stackforge_common::error::{Result, StackforgeError};
use stackforge_common::naming;

use crate::resources::{AutoscalerSpec, HorizontalPodAutoscaler, MetricSpec, ObjectMeta, ScaleTargetRef};

/// Replica bounds and utilisation targets of an autoscale policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoscaleBounds {
    /// Fewest replicas.
    pub min_replicas: u32,
    /// Most replicas.
    pub max_replicas: u32,
    /// CPU utilisation target, percent.
    pub cpu_percent: u32,
    /// Memory utilisation target, percent.
    pub memory_percent: u32,
}

impl Default for AutoscaleBounds {
    fn default() -> Self {
        Self {
            min_replicas: HPA_MIN_REPLICAS,
            max_replicas: HPA_MAX_REPLICAS,
            cpu_percent: HPA_CPU_THRESHOLD,
            memory_percent: HPA_MEMORY_THRESHOLD,
        }
    }
}

/// Scales the `<project>` workload on CPU and memory.
#[must_use]
pub fn app_autoscaler(project: &str, bounds: AutoscaleBounds) -> HorizontalPodAutoscaler {
    HorizontalPodAutoscaler {
        api_version: "autoscaling/v2",
        kind: "HorizontalPodAutoscaler",
        metadata: ObjectMeta::new(naming::autoscaler_name(project), naming::base_labels(project)),
        spec: AutoscalerSpec {
            scale_target_ref: ScaleTargetRef {
                api_version: "apps/v1",
                kind: "Deployment",
                name: project.to_string(),
            },
            min_replicas: bounds.min_replicas,
            max_replicas: bounds.max_replicas,
            metrics: vec![
                MetricSpec::utilization("cpu", bounds.cpu_percent),
                MetricSpec::utilization("memory", bounds.memory_percent),
            ],
        },
    }
}

/// Checks replica bounds and metrics.
///
/// # Errors
///
/// Returns [`StackforgeError::Config`] listing every violated rule.
pub fn validate(policy: &HorizontalPodAutoscaler) -> Result<()> {
    let spec = &policy.spec;
    let mut problems = Vec::new();
    if spec.min_replicas < 1 {
        problems.push("minReplicas must be at least 1");
    }
    if spec.max_replicas < spec.min_replicas {
        problems.push("maxReplicas must be greater than or equal to minReplicas");
    }
    if spec.metrics.is_empty() {
        problems.push("at least one metric is required");
    }
    if problems.is_empty() {
        Ok(())
    } else {
        Err(StackforgeError::config(format!(
            "autoscaler \"{}\": {}",
            policy.metadata.name,
            problems.join("; ")
        )))
    }
}
