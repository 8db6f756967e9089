//! Cluster manifest compiler.
//!
//! Emits one document per resource instance, application resources
//! first, then each dependency's, then the ingress route and autoscaler.
//! Every run is checked for unresolved cross-document references before
//! it is returned.

use stackforge_common::config::{ProjectConfig, SqlDatabase};
use stackforge_common::constants::APP_SERVICE_PORT;
use stackforge_common::error::{Result, StackforgeError};
use stackforge_common::naming;
use stackforge_common::types::DependencyKind;

use crate::hpa::{self, AutoscaleBounds};
use crate::references::dangling_references;
use crate::resources::Resource;
use crate::{deployment, ingress, pvc, service, stores};

/// Knobs of the cluster output that are not part of the project config.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterOptions {
    /// Host the ingress route answers on; `<project>.example.com` if unset.
    pub ingress_host: Option<String>,
    /// Whether the ingress route terminates TLS.
    pub tls: bool,
    /// Storage class requested by volume claims.
    pub storage_class: Option<String>,
}

/// One emitted resource and the file it is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedDocument {
    /// File name inside the manifest directory.
    pub file_name: String,
    /// The dependency owning the resource, `None` for the application.
    pub owner: Option<DependencyKind>,
    /// The resource itself.
    pub resource: Resource,
}

impl NamedDocument {
    fn new(owner: Option<DependencyKind>, suffix: &str, resource: impl Into<Resource>) -> Self {
        Self {
            file_name: naming::manifest_file(owner, suffix),
            owner,
            resource: resource.into(),
        }
    }

    /// Renders the resource as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.resource)?)
    }
}

/// Compiles a configuration with default options.
///
/// # Errors
///
/// See [`compile_with`].
pub fn compile(config: &ProjectConfig) -> Result<Vec<NamedDocument>> {
    compile_with(config, &ClusterOptions::default())
}

/// Compiles a configuration into cluster resource documents.
///
/// # Errors
///
/// Returns [`StackforgeError::Config`] if `config` fails validation,
/// [`StackforgeError::UnsupportedResource`] if a requested store
/// has no manifest template, and [`StackforgeError::Config`] if the
/// emitted documents reference each other inconsistently.
pub fn compile_with(config: &ProjectConfig, options: &ClusterOptions) -> Result<Vec<NamedDocument>> {
    let project = config.name.as_str();
    tracing::info!(project, "compiling cluster manifests");
    config.validate()?;

    if config.sql_database == Some(SqlDatabase::Sqlite) {
        return Err(StackforgeError::UnsupportedResource {
            kind: SqlDatabase::Sqlite.as_str().into(),
            reason: "embedded store has no cluster manifest template".into(),
        });
    }

    let mut documents = vec![
        NamedDocument::new(None, "deployment", deployment::app_deployment(config)),
        NamedDocument::new(None, "service", service::app_service(project)),
        NamedDocument::new(None, "configmap", stores::app_config_map(config)),
        NamedDocument::new(None, "secret", stores::app_secret(config)),
    ];

    for kind in config.managed_dependencies() {
        tracing::debug!(dependency = %kind, "emitting dependency resources");
        let owner = Some(kind);
        documents.push(NamedDocument::new(
            owner,
            "deployment",
            deployment::dependency_deployment(project, kind),
        ));
        documents.push(NamedDocument::new(
            owner,
            "service",
            service::dependency_service(project, kind),
        ));
        documents.push(NamedDocument::new(
            owner,
            "pvc",
            pvc::dependency_claim(
                project,
                kind,
                pvc::default_size(kind)?,
                options.storage_class.as_deref(),
            ),
        ));
        if let Some(secret) = stores::dependency_secret(project, kind) {
            documents.push(NamedDocument::new(owner, "secret", secret));
        }
    }

    let host = options
        .ingress_host
        .clone()
        .unwrap_or_else(|| naming::default_ingress_host(project));
    documents.push(NamedDocument::new(
        None,
        "ingress",
        ingress::app_ingress(project, &host, project, APP_SERVICE_PORT, options.tls),
    ));

    let autoscaler = hpa::app_autoscaler(project, AutoscaleBounds::default());
    hpa::validate(&autoscaler)?;
    documents.push(NamedDocument::new(None, "hpa", autoscaler));

    let dangling = dangling_references(&documents);
    if !dangling.is_empty() {
        let list: Vec<String> = dangling.iter().map(ToString::to_string).collect();
        tracing::error!(count = dangling.len(), "unresolved cross-document references");
        return Err(StackforgeError::config(format!(
            "unresolved references: {}",
            list.join(", ")
        )));
    }

    for doc in &documents {
        if let Resource::Secret(secret) = &doc.resource {
            let keys = stores::placeholder_keys(secret);
            if !keys.is_empty() {
                tracing::warn!(
                    secret = %secret.metadata.name,
                    keys = ?keys,
                    "secret holds placeholder values; replace them before deploying"
                );
            }
        }
    }

    tracing::info!(count = documents.len(), "cluster manifests compiled");
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use stackforge_common::config::{NoSqlDatabase, Preset};

    use super::*;

    fn files(documents: &[NamedDocument]) -> Vec<&str> {
        documents.iter().map(|d| d.file_name.as_str()).collect()
    }

    #[test]
    fn emission_order_and_file_names() {
        let config = ProjectConfig::new("shop");
        let documents = compile(&config).expect("should compile");
        assert_eq!(
            files(&documents),
            vec![
                "deployment.yml",
                "service.yml",
                "configmap.yml",
                "secret.yml",
                "postgres-deployment.yml",
                "postgres-service.yml",
                "postgres-pvc.yml",
                "postgres-secret.yml",
                "redis-deployment.yml",
                "redis-service.yml",
                "redis-pvc.yml",
                "ingress.yml",
                "hpa.yml",
            ]
        );
    }

    #[test]
    fn every_resource_carries_app_label() {
        let config = ProjectConfig::preset(Preset::Microservices, "mesh");
        for doc in compile(&config).expect("should compile") {
            assert_eq!(
                doc.resource.metadata().labels.get("app").map(String::as_str),
                Some("mesh"),
                "{}",
                doc.file_name
            );
        }
    }

    #[test]
    fn sqlite_is_unsupported() {
        let mut config = ProjectConfig::new("shop");
        config.sql_database = Some(SqlDatabase::Sqlite);
        let err = compile(&config).expect_err("should fail");
        assert!(
            matches!(err, StackforgeError::UnsupportedResource { ref kind, .. } if kind == "sqlite"),
            "got: {err}"
        );
    }

    #[test]
    fn options_reach_ingress_and_claims() {
        let mut config = ProjectConfig::preset(Preset::Minimal, "shop");
        config.nosql_databases = vec![NoSqlDatabase::Mongodb];
        let options = ClusterOptions {
            ingress_host: Some("api.shop.io".into()),
            tls: true,
            storage_class: Some("ssd".into()),
        };
        let documents = compile_with(&config, &options).expect("should compile");
        for doc in &documents {
            match &doc.resource {
                Resource::Ingress(route) => {
                    assert_eq!(route.spec.rules[0].host, "api.shop.io");
                    assert_eq!(route.spec.tls[0].secret_name, "shop-tls");
                }
                Resource::PersistentVolumeClaim(claim) => {
                    assert_eq!(claim.spec.storage_class_name.as_deref(), Some("ssd"));
                }
                _ => {}
            }
        }
    }

    #[test]
    fn document_renders_as_yaml() {
        let documents = compile(&ProjectConfig::new("shop")).expect("should compile");
        let yaml = documents[0].to_yaml().expect("render");
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).expect("parse");
        assert_eq!(value["apiVersion"].as_str(), Some("apps/v1"));
        assert_eq!(value["kind"].as_str(), Some("Deployment"));
        assert_eq!(value["spec"]["replicas"].as_u64(), Some(3));
        assert_eq!(
            value["spec"]["template"]["spec"]["containers"][0]["image"].as_str(),
            Some("shop:latest")
        );
    }
}
