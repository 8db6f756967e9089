//! Deployment guide generated alongside the manifests.

use std::fmt::Write as _;

use stackforge_common::constants::CLUSTER_DIR;

use crate::compiler::NamedDocument;
use crate::resources::Resource;

/// Position of a document in the apply sequence.
fn apply_phase(doc: &NamedDocument) -> u8 {
    match (&doc.resource, doc.owner.is_some()) {
        (Resource::Secret(_), _) => 0,
        (Resource::ConfigMap(_), _) => 1,
        (Resource::PersistentVolumeClaim(_), _) => 2,
        (Resource::Deployment(_) | Resource::Service(_), true) => 3,
        (Resource::Deployment(_), false) => 4,
        (Resource::Service(_), false) => 5,
        (Resource::Ingress(_), _) => 6,
        (Resource::HorizontalPodAutoscaler(_), _) => 7,
    }
}

/// File names in the order they should be applied.
///
/// Stores and claims first, then dependencies, then the application and
/// its routing. Documents within a phase keep their emission order.
#[must_use]
pub fn apply_order(documents: &[NamedDocument]) -> Vec<&str> {
    let mut ordered: Vec<&NamedDocument> = documents.iter().collect();
    ordered.sort_by_key(|doc| apply_phase(doc));
    ordered.iter().map(|doc| doc.file_name.as_str()).collect()
}

fn autoscale_range(documents: &[NamedDocument]) -> Option<(u32, u32)> {
    documents.iter().find_map(|doc| match &doc.resource {
        Resource::HorizontalPodAutoscaler(policy) => {
            Some((policy.spec.min_replicas, policy.spec.max_replicas))
        }
        _ => None,
    })
}

/// Renders the deployment guide for one run's documents.
#[must_use]
pub fn render(project: &str, documents: &[NamedDocument]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Kubernetes Deployment Guide\n");
    let _ = writeln!(
        out,
        "This directory contains Kubernetes manifests for deploying {project}.\n"
    );

    out.push_str("## Prerequisites\n\n");
    out.push_str("- Kubernetes cluster (v1.24+)\n");
    out.push_str("- kubectl configured\n");
    out.push_str("- Ingress controller (nginx recommended)\n");
    out.push_str("- Storage provisioner\n\n");

    out.push_str("## Resources\n\n");
    for doc in documents {
        let _ = writeln!(
            out,
            "- **{}** `{}`: `{}`",
            doc.resource.kind(),
            doc.resource.name(),
            doc.file_name
        );
    }
    out.push('\n');

    out.push_str("## Before Deploying\n\n");
    out.push_str("1. Replace every `CHANGE_ME_IN_PRODUCTION` value in the secret manifests.\n");
    out.push_str("2. Set the ingress host to your domain.\n");
    out.push_str("3. Set a `storageClassName` on the volume claims if your cluster needs one.\n");
    out.push_str("4. Review CPU and memory requests and limits.\n\n");

    out.push_str("## Apply Order\n\n```bash\n");
    for file in apply_order(documents) {
        let _ = writeln!(out, "kubectl apply -f {CLUSTER_DIR}/{file}");
    }
    out.push_str("```\n\n");

    let _ = writeln!(out, "## Verify\n\n```bash");
    let _ = writeln!(out, "kubectl get all");
    let _ = writeln!(out, "kubectl describe deployment {project}");
    let _ = writeln!(out, "kubectl logs -f deployment/{project}");
    out.push_str("```\n\n");

    out.push_str("## Scaling\n\n```bash\n");
    let _ = writeln!(out, "kubectl scale deployment {project} --replicas=5");
    out.push_str("```\n\n");
    if let Some((min, max)) = autoscale_range(documents) {
        let _ = writeln!(
            out,
            "Autoscaling keeps between {min} and {max} replicas.\n"
        );
    }

    out.push_str("## Updating\n\n```bash\n");
    let _ = writeln!(
        out,
        "kubectl set image deployment/{project} {project}={project}:v2"
    );
    let _ = writeln!(out, "kubectl rollout status deployment/{project}");
    let _ = writeln!(out, "kubectl rollout undo deployment/{project}");
    out.push_str("```\n\n");

    out.push_str("## Troubleshooting\n\n```bash\n");
    out.push_str("kubectl get pods\n");
    out.push_str("kubectl logs <pod-name>\n");
    out.push_str("kubectl describe pod <pod-name>\n");
    out.push_str("kubectl exec -it <pod-name> -- /bin/sh\n");
    out.push_str("kubectl top pods\n");
    out.push_str("```\n\n");

    out.push_str("## Clean Up\n\n```bash\n");
    let _ = writeln!(out, "kubectl delete -f {CLUSTER_DIR}/");
    out.push_str("```\n");
    out
}

#[cfg(test)]
mod tests {
    use stackforge_common::config::ProjectConfig;

    use super::*;
    use crate::compiler::compile;

    #[test]
    fn stores_come_before_workloads() {
        let documents = compile(&ProjectConfig::new("shop")).expect("should compile");
        assert_eq!(
            apply_order(&documents),
            vec![
                "secret.yml",
                "postgres-secret.yml",
                "configmap.yml",
                "postgres-pvc.yml",
                "redis-pvc.yml",
                "postgres-deployment.yml",
                "postgres-service.yml",
                "redis-deployment.yml",
                "redis-service.yml",
                "deployment.yml",
                "service.yml",
                "ingress.yml",
                "hpa.yml",
            ]
        );
    }

    #[test]
    fn guide_lists_every_file_and_commands() {
        let documents = compile(&ProjectConfig::new("shop")).expect("should compile");
        let guide = render("shop", &documents);
        for doc in &documents {
            assert!(guide.contains(&doc.file_name), "missing {}", doc.file_name);
        }
        assert!(guide.contains("kubectl apply -f k8s/secret.yml"));
        assert!(guide.contains("between 2 and 10 replicas"));
        assert!(guide.contains("kubectl rollout undo deployment/shop"));
        assert!(guide.contains("kubectl delete -f k8s/"));
    }
}
