//! Domain primitive types used across the Stackforge workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A managed dependency the generated application can run alongside.
///
/// Every property here is fixed per kind: the compose catalogue and the
/// cluster compiler both read them from this one table, so a store's host
/// name, port and volume agree in every generated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    /// PostgreSQL relational store.
    Postgres,
    /// MySQL relational store.
    Mysql,
    /// MongoDB document store.
    Mongodb,
    /// Redis cache.
    Redis,
    /// RabbitMQ message broker.
    Rabbitmq,
}

/// The role a managed dependency plays for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreRole {
    /// SQL database.
    Relational,
    /// Document database.
    Document,
    /// Key-value cache.
    Cache,
    /// Message broker.
    Broker,
}

/// Deployment tier label attached to cluster resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// The generated application itself.
    Application,
    /// A persistent store.
    Database,
    /// A cache.
    Cache,
    /// A message broker.
    Messaging,
}

impl Tier {
    /// Returns the label value for this tier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::Database => "database",
            Self::Cache => "cache",
            Self::Messaging => "messaging",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DependencyKind {
    /// Every supported kind, in descriptor emission order.
    pub const ALL: [Self; 5] = [
        Self::Postgres,
        Self::Mysql,
        Self::Mongodb,
        Self::Redis,
        Self::Rabbitmq,
    ];

    /// Service name used as compose key, cluster resource name and host name.
    #[must_use]
    pub const fn service_name(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Mysql => "mysql",
            Self::Mongodb => "mongodb",
            Self::Redis => "redis",
            Self::Rabbitmq => "rabbitmq",
        }
    }

    /// Human-readable product name, used as env-file block header.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Postgres => "PostgreSQL",
            Self::Mysql => "MySQL",
            Self::Mongodb => "MongoDB",
            Self::Redis => "Redis",
            Self::Rabbitmq => "RabbitMQ",
        }
    }

    /// Upper-case prefix of the environment variables describing this store.
    #[must_use]
    pub const fn env_prefix(self) -> &'static str {
        match self {
            Self::Postgres => "POSTGRES",
            Self::Mysql => "MYSQL",
            Self::Mongodb => "MONGODB",
            Self::Redis => "REDIS",
            Self::Rabbitmq => "RABBITMQ",
        }
    }

    /// Pinned image reference.
    #[must_use]
    pub const fn image(self) -> &'static str {
        match self {
            Self::Postgres => "postgres:16-alpine",
            Self::Mysql => "mysql:8.0",
            Self::Mongodb => "mongo:7.0",
            Self::Redis => "redis:7-alpine",
            Self::Rabbitmq => "rabbitmq:3-management-alpine",
        }
    }

    /// Primary port the dependency listens on.
    #[must_use]
    pub const fn port(self) -> u16 {
        match self {
            Self::Postgres => 5432,
            Self::Mysql => 3306,
            Self::Mongodb => 27017,
            Self::Redis => 6379,
            Self::Rabbitmq => 5672,
        }
    }

    /// Secondary management port, if the dependency has one.
    #[must_use]
    pub const fn management_port(self) -> Option<u16> {
        match self {
            Self::Rabbitmq => Some(15672),
            _ => None,
        }
    }

    /// Role the dependency plays.
    #[must_use]
    pub const fn role(self) -> StoreRole {
        match self {
            Self::Postgres | Self::Mysql => StoreRole::Relational,
            Self::Mongodb => StoreRole::Document,
            Self::Redis => StoreRole::Cache,
            Self::Rabbitmq => StoreRole::Broker,
        }
    }

    /// Tier label of the dependency's cluster resources.
    #[must_use]
    pub const fn tier(self) -> Tier {
        match self.role() {
            StoreRole::Relational | StoreRole::Document => Tier::Database,
            StoreRole::Cache => Tier::Cache,
            StoreRole::Broker => Tier::Messaging,
        }
    }

    /// Named compose volume holding the dependency's data.
    #[must_use]
    pub const fn volume_name(self) -> &'static str {
        match self {
            Self::Postgres => "postgres_data",
            Self::Mysql => "mysql_data",
            Self::Mongodb => "mongodb_data",
            Self::Redis => "redis_data",
            Self::Rabbitmq => "rabbitmq_data",
        }
    }

    /// Data directory inside the dependency's container.
    #[must_use]
    pub const fn data_path(self) -> &'static str {
        match self {
            Self::Postgres => "/var/lib/postgresql/data",
            Self::Mysql => "/var/lib/mysql",
            Self::Mongodb => "/data/db",
            Self::Redis => "/data",
            Self::Rabbitmq => "/var/lib/rabbitmq",
        }
    }

    /// Default storage request of the dependency's volume claim.
    #[must_use]
    pub const fn storage_size(self) -> &'static str {
        match self.role() {
            StoreRole::Relational | StoreRole::Document => "10Gi",
            StoreRole::Cache | StoreRole::Broker => "5Gi",
        }
    }

    /// Whether the dependency authenticates clients with a password.
    #[must_use]
    pub const fn takes_password(self) -> bool {
        !matches!(self, Self::Redis)
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.service_name())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn service_names_are_unique() {
        let names: HashSet<&str> = DependencyKind::ALL
            .iter()
            .map(|k| k.service_name())
            .collect();
        assert_eq!(names.len(), DependencyKind::ALL.len());
    }

    #[test]
    fn stores_get_larger_volumes_than_cache() {
        assert_eq!(DependencyKind::Postgres.storage_size(), "10Gi");
        assert_eq!(DependencyKind::Mysql.storage_size(), "10Gi");
        assert_eq!(DependencyKind::Mongodb.storage_size(), "10Gi");
        assert_eq!(DependencyKind::Redis.storage_size(), "5Gi");
    }

    #[test]
    fn only_cache_is_passwordless() {
        let passwordless: Vec<DependencyKind> = DependencyKind::ALL
            .into_iter()
            .filter(|k| !k.takes_password())
            .collect();
        assert_eq!(passwordless, vec![DependencyKind::Redis]);
    }

    #[test]
    fn tier_follows_role() {
        assert_eq!(DependencyKind::Mongodb.tier(), Tier::Database);
        assert_eq!(DependencyKind::Redis.tier(), Tier::Cache);
        assert_eq!(DependencyKind::Rabbitmq.tier(), Tier::Messaging);
        assert_eq!(Tier::Messaging.to_string(), "messaging");
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_string(&DependencyKind::Rabbitmq).expect("serialize");
        assert_eq!(json, "\"rabbitmq\"");
    }
}
