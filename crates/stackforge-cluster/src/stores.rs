//! Configuration and secret store builders.

use stackforge_common::config::ProjectConfig;
use stackforge_common::constants::SECRET_PLACEHOLDER;
use stackforge_common::naming;
use stackforge_common::types::DependencyKind;

use crate::connection;
use crate::resources::{ConfigMap, ObjectMeta, Secret};

/// The application's configuration store, `<project>-config`.
#[must_use]
pub fn app_config_map(config: &ProjectConfig) -> ConfigMap {
    let project = config.name.as_str();
    ConfigMap::new(
        ObjectMeta::new(naming::config_store_name(project), naming::base_labels(project)),
        connection::config_data(&connection::app_settings(config)),
    )
}

/// The application's secret store, `<project>-secret`.
#[must_use]
pub fn app_secret(config: &ProjectConfig) -> Secret {
    let project = config.name.as_str();
    Secret::new(
        ObjectMeta::new(naming::secret_store_name(project), naming::base_labels(project)),
        connection::secret_data(&connection::app_settings(config)),
    )
}

/// A dependency's own credential store, or `None` for stores that take
/// no password.
#[must_use]
pub fn dependency_secret(project: &str, kind: DependencyKind) -> Option<Secret> {
    if !kind.takes_password() {
        return None;
    }
    Some(Secret::new(
        ObjectMeta::new(
            naming::dependency_secret_name(kind),
            naming::dependency_labels(project, kind),
        ),
        connection::secret_data(&connection::dependency_settings(kind)),
    ))
}

/// Keys of a secret whose value is still a generated placeholder.
#[must_use]
pub fn placeholder_keys(secret: &Secret) -> Vec<&str> {
    secret
        .string_data
        .iter()
        .filter(|(_, value)| value.starts_with(SECRET_PLACEHOLDER))
        .map(|(key, _)| key.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use stackforge_common::config::{MessageQueue, NoSqlDatabase, Preset};

    use super::*;

    #[test]
    fn store_names_follow_project() {
        let config = ProjectConfig::new("shop");
        assert_eq!(app_config_map(&config).metadata.name, "shop-config");
        assert_eq!(app_secret(&config).metadata.name, "shop-secret");
        assert_eq!(app_secret(&config).metadata.labels["app"], "shop");
    }

    #[test]
    fn app_only_config_has_bootstrap_keys() {
        let mut config = ProjectConfig::preset(Preset::Minimal, "solo");
        config.sql_database = None;
        let map = app_config_map(&config);
        let keys: Vec<&str> = map.data.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["log-level", "node-env"]);
        assert!(app_secret(&config).string_data.is_empty());
    }

    #[test]
    fn every_store_kind_contributes_keys() {
        let mut config = ProjectConfig::preset(Preset::Microservices, "mesh");
        config.nosql_databases = vec![NoSqlDatabase::Mongodb, NoSqlDatabase::Redis];
        config.message_queue = Some(MessageQueue::Rabbitmq);
        let map = app_config_map(&config);
        for key in ["postgres-host", "mongodb-database", "redis-port", "rabbitmq-user"] {
            assert!(map.data.contains_key(key), "missing {key}");
        }
        let secret = app_secret(&config);
        for key in ["postgres-password", "mongodb-password", "rabbitmq-password", "jwt-secret"] {
            assert!(secret.string_data.contains_key(key), "missing {key}");
        }
    }

    #[test]
    fn cache_has_no_own_secret() {
        assert!(dependency_secret("shop", DependencyKind::Redis).is_none());
        let secret = dependency_secret("shop", DependencyKind::Postgres).expect("secret");
        assert_eq!(secret.metadata.name, "postgres-secret");
        assert_eq!(secret.secret_type, "Opaque");
        assert_eq!(placeholder_keys(&secret), vec!["password"]);
    }
}
