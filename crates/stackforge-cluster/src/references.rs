//! Cross-document reference checking.
//!
//! Finds every reference from one emitted document to another that does
//! not resolve within the same run: environment keys into config and
//! secret stores, volume claims mounted by workloads, and autoscaler
//! targets.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::compiler::NamedDocument;
use crate::resources::{Resource, StoreKind};

/// A reference whose target was not emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    /// The referring resource, as `Kind/name`.
    pub from: String,
    /// The missing target, as `Kind/name`.
    pub target: String,
    /// The missing key, for store references.
    pub key: Option<String>,
}

impl fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{} -> {} key \"{key}\"", self.from, self.target),
            None => write!(f, "{} -> {}", self.from, self.target),
        }
    }
}

/// Lists every unresolved reference between the documents of one run.
#[must_use]
pub fn dangling_references(documents: &[NamedDocument]) -> Vec<DanglingReference> {
    let mut config_keys: HashMap<&str, HashSet<&str>> = HashMap::new();
    let mut secret_keys: HashMap<&str, HashSet<&str>> = HashMap::new();
    let mut claims = HashSet::new();
    let mut workloads = HashSet::new();

    for doc in documents {
        match &doc.resource {
            Resource::ConfigMap(map) => {
                let _ = config_keys.insert(
                    map.metadata.name.as_str(),
                    map.data.keys().map(String::as_str).collect(),
                );
            }
            Resource::Secret(secret) => {
                let _ = secret_keys.insert(
                    secret.metadata.name.as_str(),
                    secret.string_data.keys().map(String::as_str).collect(),
                );
            }
            Resource::PersistentVolumeClaim(claim) => {
                let _ = claims.insert(claim.metadata.name.as_str());
            }
            Resource::Deployment(deployment) => {
                let _ = workloads.insert(deployment.metadata.name.as_str());
            }
            _ => {}
        }
    }

    let mut dangling = Vec::new();
    for doc in documents {
        let from = format!("{}/{}", doc.resource.kind(), doc.resource.name());
        match &doc.resource {
            Resource::Deployment(deployment) => {
                for var in deployment.containers().iter().flat_map(|c| &c.env) {
                    let Some((store, selector)) = var.reference() else {
                        continue;
                    };
                    let (stores, kind) = match store {
                        StoreKind::ConfigMap => (&config_keys, "ConfigMap"),
                        StoreKind::Secret => (&secret_keys, "Secret"),
                    };
                    let found = stores
                        .get(selector.name.as_str())
                        .is_some_and(|keys| keys.contains(selector.key.as_str()));
                    if !found {
                        dangling.push(DanglingReference {
                            from: from.clone(),
                            target: format!("{kind}/{}", selector.name),
                            key: Some(selector.key.clone()),
                        });
                    }
                }
                for volume in &deployment.spec.template.spec.volumes {
                    let claim = &volume.persistent_volume_claim.claim_name;
                    if !claims.contains(claim.as_str()) {
                        dangling.push(DanglingReference {
                            from: from.clone(),
                            target: format!("PersistentVolumeClaim/{claim}"),
                            key: None,
                        });
                    }
                }
            }
            Resource::HorizontalPodAutoscaler(policy) => {
                let target = &policy.spec.scale_target_ref.name;
                if !workloads.contains(target.as_str()) {
                    dangling.push(DanglingReference {
                        from,
                        target: format!("Deployment/{target}"),
                        key: None,
                    });
                }
            }
            _ => {}
        }
    }
    dangling
}

#[cfg(test)]
mod tests {
    use stackforge_common::config::ProjectConfig;
    use stackforge_common::types::DependencyKind;

    use super::*;
    use crate::hpa::{self, AutoscaleBounds};
    use crate::{deployment, stores};

    fn doc(resource: impl Into<Resource>) -> NamedDocument {
        NamedDocument {
            file_name: "x.yml".into(),
            owner: None,
            resource: resource.into(),
        }
    }

    #[test]
    fn complete_set_has_no_dangling_references() {
        let config = ProjectConfig::new("shop");
        let docs = vec![
            doc(deployment::app_deployment(&config)),
            doc(stores::app_config_map(&config)),
            doc(stores::app_secret(&config)),
            doc(hpa::app_autoscaler("shop", AutoscaleBounds::default())),
        ];
        assert!(dangling_references(&docs).is_empty());
    }

    #[test]
    fn missing_secret_key_is_reported() {
        let config = ProjectConfig::new("shop");
        let mut secret = stores::app_secret(&config);
        let _ = secret.string_data.remove("postgres-password");
        let docs = vec![
            doc(deployment::app_deployment(&config)),
            doc(stores::app_config_map(&config)),
            doc(secret),
        ];
        let dangling = dangling_references(&docs);
        assert_eq!(dangling.len(), 1, "got: {dangling:?}");
        assert_eq!(dangling[0].target, "Secret/shop-secret");
        assert_eq!(dangling[0].key.as_deref(), Some("postgres-password"));
        assert!(dangling[0].to_string().contains("Deployment/shop"));
    }

    #[test]
    fn missing_claim_and_workload_are_reported() {
        let docs = vec![
            doc(deployment::dependency_deployment("shop", DependencyKind::Redis)),
            doc(hpa::app_autoscaler("ghost", AutoscaleBounds::default())),
        ];
        let targets: Vec<String> = dangling_references(&docs)
            .into_iter()
            .map(|d| d.target)
            .collect();
        assert_eq!(
            targets,
            vec!["PersistentVolumeClaim/redis-pvc", "Deployment/ghost"]
        );
    }
}
