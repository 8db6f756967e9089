//! Naming and labelling rules shared by every generated document.
//!
//! The compose compiler and the cluster compiler never agree with each
//! other directly; they agree because both derive names from here.

use std::collections::BTreeMap;

use crate::types::{DependencyKind, Tier};

/// Label map attached to cluster resources.
pub type Labels = BTreeMap<String, String>;

/// Label carried by every resource, valued with the project name.
pub const APP_LABEL: &str = "app";
/// Label identifying which workload a resource belongs to.
pub const COMPONENT_LABEL: &str = "component";
/// Label carrying the [`Tier`] of a workload.
pub const TIER_LABEL: &str = "tier";
/// Label carrying the application framework.
pub const FRAMEWORK_LABEL: &str = "framework";

/// Renders the `${VAR:-default}` interpolation convention.
#[must_use]
pub fn interpolate(var: &str, default: &str) -> String {
    format!("${{{var}:-{default}}}")
}

/// Name of the application's configuration store.
#[must_use]
pub fn config_store_name(project: &str) -> String {
    format!("{project}-config")
}

/// Name of the application's secret store.
#[must_use]
pub fn secret_store_name(project: &str) -> String {
    format!("{project}-secret")
}

/// Name of a managed dependency's own credential store.
#[must_use]
pub fn dependency_secret_name(kind: DependencyKind) -> String {
    format!("{}-secret", kind.service_name())
}

/// Name of a managed dependency's volume claim.
#[must_use]
pub fn claim_name(kind: DependencyKind) -> String {
    format!("{}-pvc", kind.service_name())
}

/// Name of the pod volume that mounts a dependency's claim.
#[must_use]
pub fn storage_volume_name(kind: DependencyKind) -> String {
    format!("{}-storage", kind.service_name())
}

/// Name of the application's ingress route.
#[must_use]
pub fn ingress_name(project: &str) -> String {
    format!("{project}-ingress")
}

/// Name of the application's autoscaler.
#[must_use]
pub fn autoscaler_name(project: &str) -> String {
    format!("{project}-hpa")
}

/// Name of the TLS secret referenced by the ingress route.
#[must_use]
pub fn tls_secret_name(project: &str) -> String {
    format!("{project}-tls")
}

/// Container image of the application.
#[must_use]
pub fn app_image(project: &str) -> String {
    format!("{project}:latest")
}

/// Default host the ingress route answers on.
#[must_use]
pub fn default_ingress_host(project: &str) -> String {
    format!("{project}.example.com")
}

/// File name of a cluster manifest.
///
/// Application resources use the bare resource suffix (`deployment.yml`);
/// dependency resources are prefixed with the service name
/// (`postgres-deployment.yml`).
#[must_use]
pub fn manifest_file(owner: Option<DependencyKind>, resource: &str) -> String {
    owner.map_or_else(
        || format!("{resource}.yml"),
        |kind| format!("{}-{resource}.yml", kind.service_name()),
    )
}

/// Labels carried by every resource of a project.
#[must_use]
pub fn base_labels(project: &str) -> Labels {
    let mut labels = Labels::new();
    let _ = labels.insert(APP_LABEL.into(), project.into());
    labels
}

/// Selector matching the application's pods and nothing else.
#[must_use]
pub fn app_selector(project: &str) -> Labels {
    let mut labels = base_labels(project);
    let _ = labels.insert(COMPONENT_LABEL.into(), project.into());
    labels
}

/// Labels of the application's workload and pods.
#[must_use]
pub fn app_labels(project: &str, framework: &str) -> Labels {
    let mut labels = app_selector(project);
    let _ = labels.insert(TIER_LABEL.into(), Tier::Application.as_str().into());
    let _ = labels.insert(FRAMEWORK_LABEL.into(), framework.into());
    labels
}

/// Selector matching one dependency's pods.
#[must_use]
pub fn dependency_selector(project: &str, kind: DependencyKind) -> Labels {
    let mut labels = base_labels(project);
    let _ = labels.insert(COMPONENT_LABEL.into(), kind.service_name().into());
    labels
}

/// Labels of every resource owned by one dependency.
#[must_use]
pub fn dependency_labels(project: &str, kind: DependencyKind) -> Labels {
    let mut labels = dependency_selector(project, kind);
    let _ = labels.insert(TIER_LABEL.into(), kind.tier().as_str().into());
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolate_uses_default_syntax() {
        assert_eq!(interpolate("PORT", "3000"), "${PORT:-3000}");
    }

    #[test]
    fn store_names_derive_from_project() {
        assert_eq!(config_store_name("shop"), "shop-config");
        assert_eq!(secret_store_name("shop"), "shop-secret");
        assert_eq!(dependency_secret_name(DependencyKind::Mysql), "mysql-secret");
    }

    #[test]
    fn manifest_file_prefixes_dependencies() {
        assert_eq!(manifest_file(None, "deployment"), "deployment.yml");
        assert_eq!(
            manifest_file(Some(DependencyKind::Redis), "pvc"),
            "redis-pvc.yml"
        );
    }

    #[test]
    fn every_label_set_carries_app() {
        let sets = [
            base_labels("shop"),
            app_labels("shop", "express"),
            dependency_labels("shop", DependencyKind::Postgres),
        ];
        for labels in sets {
            assert_eq!(labels.get(APP_LABEL).map(String::as_str), Some("shop"));
        }
    }

    #[test]
    fn app_and_dependency_selectors_differ() {
        let app = app_selector("shop");
        let db = dependency_selector("shop", DependencyKind::Postgres);
        assert_ne!(app, db);
        assert_eq!(db.get(COMPONENT_LABEL).map(String::as_str), Some("postgres"));
    }
}
