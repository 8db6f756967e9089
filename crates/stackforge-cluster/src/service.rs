//! Network endpoint builders.

use stackforge_common::constants::{APP_PORT, APP_SERVICE_PORT};
use stackforge_common::naming::{self, Labels};
use stackforge_common::types::DependencyKind;

use crate::resources::{ExposureMode, ObjectMeta, Service, ServicePort, ServiceSpec};

fn service(name: String, labels: Labels, mode: ExposureMode, selector: Labels, ports: Vec<ServicePort>) -> Service {
    Service {
        api_version: "v1",
        kind: "Service",
        metadata: ObjectMeta::new(name, labels),
        spec: ServiceSpec {
            service_type: mode,
            selector,
            ports,
        },
    }
}

/// Internal endpoint named `name`.
#[must_use]
pub fn cluster_ip(name: &str, labels: Labels, selector: Labels, ports: Vec<ServicePort>) -> Service {
    service(name.to_string(), labels, ExposureMode::ClusterIP, selector, ports)
}

/// Externally load-balanced endpoint named `<name>-external`.
#[must_use]
pub fn load_balancer(name: &str, labels: Labels, selector: Labels, port: u16, target_port: u16) -> Service {
    service(
        format!("{name}-external"),
        labels,
        ExposureMode::LoadBalancer,
        selector,
        vec![ServicePort::tcp("http", port, target_port)],
    )
}

/// Fixed node-port endpoint named `<name>-nodeport`.
#[must_use]
pub fn node_port(
    name: &str,
    labels: Labels,
    selector: Labels,
    port: u16,
    target_port: u16,
    node_port: u16,
) -> Service {
    let mut mapping = ServicePort::tcp("http", port, target_port);
    mapping.node_port = Some(node_port);
    service(
        format!("{name}-nodeport"),
        labels,
        ExposureMode::NodePort,
        selector,
        vec![mapping],
    )
}

/// The application's internal endpoint: port 80 to the container's 3000.
#[must_use]
pub fn app_service(project: &str) -> Service {
    cluster_ip(
        project,
        naming::app_selector(project),
        naming::app_selector(project),
        vec![ServicePort::tcp("http", APP_SERVICE_PORT, APP_PORT)],
    )
}

/// A dependency's internal endpoint, named after the service so its host
/// name matches the compose document.
#[must_use]
pub fn dependency_service(project: &str, kind: DependencyKind) -> Service {
    let mut ports = vec![ServicePort::tcp(kind.service_name(), kind.port(), kind.port())];
    if let Some(management) = kind.management_port() {
        ports.push(ServicePort::tcp("management", management, management));
    }
    cluster_ip(
        kind.service_name(),
        naming::dependency_labels(project, kind),
        naming::dependency_selector(project, kind),
        ports,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_endpoint_maps_80_to_3000() {
        let svc = app_service("shop");
        assert_eq!(svc.metadata.name, "shop");
        assert_eq!(svc.spec.service_type, ExposureMode::ClusterIP);
        assert_eq!(svc.spec.ports[0].port, 80);
        assert_eq!(svc.spec.ports[0].target_port, 3000);
        assert_eq!(svc.spec.selector["component"], "shop");
    }

    #[test]
    fn dependency_endpoint_keeps_port() {
        let svc = dependency_service("shop", DependencyKind::Mysql);
        assert_eq!(svc.metadata.name, "mysql");
        assert_eq!(svc.metadata.labels["app"], "shop");
        assert_eq!(svc.spec.ports.len(), 1);
        assert_eq!(svc.spec.ports[0].port, 3306);
        assert_eq!(svc.spec.ports[0].target_port, 3306);
        assert_eq!(svc.spec.selector["component"], "mysql");
    }

    #[test]
    fn broker_endpoint_adds_management_port() {
        let svc = dependency_service("shop", DependencyKind::Rabbitmq);
        let names: Vec<&str> = svc.spec.ports.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["rabbitmq", "management"]);
    }

    #[test]
    fn external_variants_are_suffixed() {
        let lb = load_balancer("shop", naming::base_labels("shop"), naming::app_selector("shop"), 80, 3000);
        assert_eq!(lb.metadata.name, "shop-external");
        assert_eq!(lb.spec.service_type, ExposureMode::LoadBalancer);

        let np = node_port("shop", naming::base_labels("shop"), naming::app_selector("shop"), 80, 3000, 30080);
        assert_eq!(np.metadata.name, "shop-nodeport");
        assert_eq!(np.spec.ports[0].node_port, Some(30080));
    }
}
