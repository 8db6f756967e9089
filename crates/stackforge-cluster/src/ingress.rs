//! Ingress route builders.

use stackforge_common::naming::{self, Labels};

use crate::resources::{
    HttpIngressPath, HttpIngressRuleValue, Ingress, IngressRule, IngressSpec, IngressTls, ObjectMeta,
};

const INGRESS_CLASS: &str = "nginx";
const REWRITE_ANNOTATION: &str = "nginx.ingress.kubernetes.io/rewrite-target";

/// One path rule of a multi-path route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePath {
    /// Path prefix.
    pub path: String,
    /// Backend endpoint name.
    pub service: String,
    /// Backend endpoint port.
    pub port: u16,
}

fn ingress(
    project: &str,
    host: &str,
    annotations: Labels,
    paths: Vec<HttpIngressPath>,
    tls: bool,
) -> Ingress {
    let mut metadata = ObjectMeta::new(naming::ingress_name(project), naming::base_labels(project));
    metadata.annotations = annotations;

    let tls = if tls {
        vec![IngressTls {
            hosts: vec![host.to_string()],
            secret_name: naming::tls_secret_name(project),
        }]
    } else {
        Vec::new()
    };

    Ingress {
        api_version: "networking.k8s.io/v1",
        kind: "Ingress",
        metadata,
        spec: IngressSpec {
            ingress_class_name: INGRESS_CLASS.into(),
            rules: vec![IngressRule {
                host: host.to_string(),
                http: HttpIngressRuleValue { paths },
            }],
            tls,
        },
    }
}

/// Route `/` on `host` to one backend, optionally terminating TLS with
/// the `<project>-tls` secret.
#[must_use]
pub fn app_ingress(project: &str, host: &str, service: &str, port: u16, tls: bool) -> Ingress {
    let mut annotations = Labels::new();
    let _ = annotations.insert(REWRITE_ANNOTATION.into(), "/".into());
    ingress(
        project,
        host,
        annotations,
        vec![HttpIngressPath::prefix("/", service, port)],
        tls,
    )
}

/// Route several path prefixes on `host` to different backends.
#[must_use]
pub fn multi_path_ingress(project: &str, host: &str, paths: &[RoutePath]) -> Ingress {
    ingress(
        project,
        host,
        Labels::new(),
        paths
            .iter()
            .map(|p| HttpIngressPath::prefix(&p.path, &p.service, p.port))
            .collect(),
        false,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_route_targets_service() {
        let route = app_ingress("shop", "shop.example.com", "shop", 80, false);
        assert_eq!(route.metadata.name, "shop-ingress");
        assert_eq!(route.metadata.annotations[REWRITE_ANNOTATION], "/");
        assert_eq!(route.spec.ingress_class_name, "nginx");
        let rule = &route.spec.rules[0];
        assert_eq!(rule.host, "shop.example.com");
        let path = &rule.http.paths[0];
        assert_eq!(path.path, "/");
        assert_eq!(path.path_type, "Prefix");
        assert_eq!(path.backend.service.name, "shop");
        assert_eq!(path.backend.service.port.number, 80);
        assert!(route.spec.tls.is_empty());
    }

    #[test]
    fn tls_uses_project_secret() {
        let route = app_ingress("shop", "api.shop.io", "shop", 80, true);
        assert_eq!(route.spec.tls[0].secret_name, "shop-tls");
        assert_eq!(route.spec.tls[0].hosts, vec!["api.shop.io"]);
    }

    #[test]
    fn multi_path_keeps_order() {
        let paths = [
            RoutePath {
                path: "/api".into(),
                service: "api".into(),
                port: 80,
            },
            RoutePath {
                path: "/admin".into(),
                service: "admin".into(),
                port: 8080,
            },
        ];
        let route = multi_path_ingress("shop", "shop.io", &paths);
        let backends: Vec<&str> = route.spec.rules[0]
            .http
            .paths
            .iter()
            .map(|p| p.backend.service.name.as_str())
            .collect();
        assert_eq!(backends, vec!["api", "admin"]);
        assert!(route.metadata.annotations.is_empty());
    }
}
