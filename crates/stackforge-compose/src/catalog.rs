//! Service catalogue: configuration in, descriptors out.
//!
//! Always yields exactly one application descriptor, followed by one
//! descriptor per requested managed dependency. Credentials use the
//! `${VAR:-default}` convention so operators can override them from the
//! environment without editing generated files.

use stackforge_common::config::ProjectConfig;
use stackforge_common::constants::{APP_NETWORK, APP_PORT, DEFAULT_DATABASE, HEALTH_PATH};
use stackforge_common::naming::interpolate;
use stackforge_common::types::DependencyKind;

use crate::descriptor::{BuildContext, Origin, ReadinessCondition, RestartPolicy, ServiceDescriptor};
use crate::healthcheck::{self, HealthCheckOptions};

/// Returns the descriptors of every service the configuration requests.
///
/// The application comes first, then the managed dependencies in the
/// order given by [`ProjectConfig::managed_dependencies`].
#[must_use]
pub fn descriptors(config: &ProjectConfig) -> Vec<ServiceDescriptor> {
    let dependencies: Vec<ServiceDescriptor> = config
        .managed_dependencies()
        .into_iter()
        .map(dependency_service)
        .collect();

    let mut services = Vec::with_capacity(dependencies.len() + 1);
    services.push(app_service(config, &dependencies));
    services.extend(dependencies);

    tracing::debug!(count = services.len(), "built service descriptors");
    services
}

/// The application descriptor.
///
/// Its `depends_on` set is derived from the dependency descriptors: a
/// dependency with a health check must be `healthy`, one without only has
/// to be `started`.
#[must_use]
pub fn app_service(config: &ProjectConfig, dependencies: &[ServiceDescriptor]) -> ServiceDescriptor {
    let port = interpolate("PORT", &APP_PORT.to_string());

    let mut service = ServiceDescriptor::new(&config.name, Origin::Build(BuildContext::default()))
        .port(&port, &port)
        .env("NODE_ENV", interpolate("NODE_ENV", "development"))
        .env("PORT", &port)
        .volume(".:/app")
        .volume("/app/node_modules")
        .health_check(healthcheck::http(&port, HEALTH_PATH, HealthCheckOptions::default()))
        .network(APP_NETWORK)
        .restart(RestartPolicy::UnlessStopped);

    for dependency in dependencies {
        let condition = if dependency.health_check.is_some() {
            ReadinessCondition::Healthy
        } else {
            ReadinessCondition::Started
        };
        service = service.depends_on(&dependency.name, condition);
    }

    for kind in config.managed_dependencies() {
        for (key, value) in connection_env(kind) {
            service = service.env(key, value);
        }
    }

    if config.include_auth {
        service = service.env(
            "JWT_SECRET",
            interpolate("JWT_SECRET", "change-me-in-production"),
        );
    }

    service
}

/// Connection variables the application receives for one dependency.
fn connection_env(kind: DependencyKind) -> Vec<(String, String)> {
    let host = kind.service_name().to_string();
    let port = kind.port().to_string();
    let prefix = kind.env_prefix();
    let var = |suffix: &str| format!("{prefix}_{suffix}");

    match kind {
        DependencyKind::Postgres => vec![
            (var("HOST"), host),
            (var("PORT"), port),
            (var("USER"), interpolate("POSTGRES_USER", "postgres")),
            (var("PASSWORD"), interpolate("POSTGRES_PASSWORD", "postgres")),
            (var("DB"), interpolate("POSTGRES_DB", DEFAULT_DATABASE)),
        ],
        DependencyKind::Mysql => vec![
            (var("HOST"), host),
            (var("PORT"), port),
            (var("USER"), interpolate("MYSQL_USER", "user")),
            (var("PASSWORD"), interpolate("MYSQL_PASSWORD", "password")),
            (var("DATABASE"), interpolate("MYSQL_DATABASE", DEFAULT_DATABASE)),
        ],
        DependencyKind::Mongodb => vec![(
            var("URI"),
            format!(
                "mongodb://{host}:{port}/{}",
                interpolate("DB_NAME", DEFAULT_DATABASE)
            ),
        )],
        DependencyKind::Redis => vec![(var("HOST"), host), (var("PORT"), port)],
        DependencyKind::Rabbitmq => vec![
            (var("HOST"), host),
            (var("PORT"), port),
            (var("USER"), interpolate("RABBITMQ_USER", "guest")),
            (var("PASSWORD"), interpolate("RABBITMQ_PASSWORD", "guest")),
        ],
    }
}

/// The descriptor of one managed dependency.
#[must_use]
pub fn dependency_service(kind: DependencyKind) -> ServiceDescriptor {
    let name = kind.service_name();
    let published = interpolate(&format!("{}_PORT", kind.env_prefix()), &kind.port().to_string());

    let mut service = ServiceDescriptor::new(name, Origin::Image(kind.image().into()))
        .port(published, kind.port().to_string())
        .volume(&format!("{}:{}", kind.volume_name(), kind.data_path()))
        .network(APP_NETWORK)
        .restart(RestartPolicy::UnlessStopped);

    let defaults = HealthCheckOptions::default();
    match kind {
        DependencyKind::Postgres => {
            let user = interpolate("POSTGRES_USER", "postgres");
            service = service
                .env("POSTGRES_USER", &user)
                .env("POSTGRES_PASSWORD", interpolate("POSTGRES_PASSWORD", "postgres"))
                .env("POSTGRES_DB", interpolate("POSTGRES_DB", DEFAULT_DATABASE))
                .env("PGDATA", "/var/lib/postgresql/data/pgdata")
                .health_check(healthcheck::postgres(&user, defaults));
        }
        DependencyKind::Mysql => {
            service = service
                .env("MYSQL_ROOT_PASSWORD", interpolate("MYSQL_ROOT_PASSWORD", "root"))
                .env("MYSQL_DATABASE", interpolate("MYSQL_DATABASE", DEFAULT_DATABASE))
                .env("MYSQL_USER", interpolate("MYSQL_USER", "user"))
                .env("MYSQL_PASSWORD", interpolate("MYSQL_PASSWORD", "password"))
                .health_check(healthcheck::mysql(defaults))
                .command("--default-authentication-plugin=mysql_native_password");
        }
        DependencyKind::Mongodb => {
            // No health check: dependents wait for `started` only.
            service = service
                .env("MONGO_INITDB_ROOT_USERNAME", interpolate("MONGODB_USER", "admin"))
                .env(
                    "MONGO_INITDB_ROOT_PASSWORD",
                    interpolate("MONGODB_PASSWORD", "password"),
                );
        }
        DependencyKind::Redis => {
            service = service
                .health_check(healthcheck::redis(defaults))
                .command("redis-server --appendonly yes");
        }
        DependencyKind::Rabbitmq => {
            if let Some(management) = kind.management_port() {
                service = service.port(
                    interpolate("RABBITMQ_MANAGEMENT_PORT", &management.to_string()),
                    management.to_string(),
                );
            }
            service = service
                .env("RABBITMQ_DEFAULT_USER", interpolate("RABBITMQ_USER", "guest"))
                .env("RABBITMQ_DEFAULT_PASS", interpolate("RABBITMQ_PASSWORD", "guest"))
                .health_check(healthcheck::rabbitmq(defaults));
        }
    }

    service
}

#[cfg(test)]
mod tests {
    use stackforge_common::config::{MessageQueue, NoSqlDatabase, SqlDatabase};

    use super::*;

    fn config_with(sql: Option<SqlDatabase>, nosql: Vec<NoSqlDatabase>) -> ProjectConfig {
        let mut config = ProjectConfig::new("my-api");
        config.sql_database = sql;
        config.nosql_databases = nosql;
        config
    }

    #[test]
    fn app_only_yields_single_descriptor() {
        let config = config_with(None, Vec::new());
        let services = descriptors(&config);
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].name, "my-api");
        assert!(services[0].depends_on.is_empty());
        assert!(matches!(services[0].origin, Origin::Build(_)));
    }

    #[test]
    fn postgres_and_redis_are_waited_on_healthy() {
        let config = config_with(Some(SqlDatabase::Postgresql), vec![NoSqlDatabase::Redis]);
        let services = descriptors(&config);
        let names: Vec<&str> = services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["my-api", "postgres", "redis"]);

        let app = &services[0];
        assert_eq!(app.depends_on.get("postgres"), Some(&ReadinessCondition::Healthy));
        assert_eq!(app.depends_on.get("redis"), Some(&ReadinessCondition::Healthy));
        assert_eq!(app.environment.get("POSTGRES_HOST").map(String::as_str), Some("postgres"));
        assert_eq!(app.environment.get("REDIS_PORT").map(String::as_str), Some("6379"));
    }

    #[test]
    fn document_store_is_only_waited_on_started() {
        let config = config_with(None, vec![NoSqlDatabase::Mongodb]);
        let services = descriptors(&config);
        assert_eq!(
            services[0].depends_on.get("mongodb"),
            Some(&ReadinessCondition::Started)
        );
        assert!(services[1].health_check.is_none());
        assert_eq!(
            services[0].environment.get("MONGODB_URI").map(String::as_str),
            Some("mongodb://mongodb:27017/${DB_NAME:-myapp}")
        );
    }

    #[test]
    fn sqlite_yields_no_service_or_dependency() {
        let config = config_with(Some(SqlDatabase::Sqlite), Vec::new());
        let services = descriptors(&config);
        assert_eq!(services.len(), 1);
        assert!(services[0].depends_on.is_empty());
    }

    #[test]
    fn broker_gets_management_port_and_is_a_dependency() {
        let mut config = config_with(None, Vec::new());
        config.include_message_queue = true;
        config.message_queue = Some(MessageQueue::Rabbitmq);
        let services = descriptors(&config);
        let broker = services.iter().find(|s| s.name == "rabbitmq").expect("rabbitmq");
        assert_eq!(broker.ports.len(), 2);
        assert_eq!(broker.ports[1].to_string(), "${RABBITMQ_MANAGEMENT_PORT:-15672}:15672");
        assert_eq!(
            services[0].depends_on.get("rabbitmq"),
            Some(&ReadinessCondition::Healthy)
        );
    }

    #[test]
    fn credentials_use_interpolated_defaults() {
        let pg = dependency_service(DependencyKind::Postgres);
        assert_eq!(
            pg.environment.get("POSTGRES_PASSWORD").map(String::as_str),
            Some("${POSTGRES_PASSWORD:-postgres}")
        );
        assert_eq!(pg.ports[0].to_string(), "${POSTGRES_PORT:-5432}:5432");
        let check = pg.health_check.as_ref().expect("pg health check");
        assert_eq!(check.test[1], "pg_isready -U ${POSTGRES_USER:-postgres}");
    }

    #[test]
    fn dependencies_mount_named_volumes_app_mounts_local() {
        let config = config_with(Some(SqlDatabase::Mysql), vec![NoSqlDatabase::Redis]);
        let services = descriptors(&config);
        assert_eq!(services[0].named_volumes().count(), 0);
        assert_eq!(services[1].named_volumes().collect::<Vec<_>>(), vec!["mysql_data"]);
        assert_eq!(services[2].named_volumes().collect::<Vec<_>>(), vec!["redis_data"]);
    }

    #[test]
    fn auth_adds_token_secret() {
        let mut config = config_with(None, Vec::new());
        config.include_auth = true;
        let app = &descriptors(&config)[0];
        assert!(app.environment.contains_key("JWT_SECRET"));
        config.include_auth = false;
        let app = &descriptors(&config)[0];
        assert!(!app.environment.contains_key("JWT_SECRET"));
    }

    #[test]
    fn every_service_joins_app_network() {
        let config = ProjectConfig::preset(
            stackforge_common::config::Preset::Microservices,
            "mesh",
        );
        for svc in descriptors(&config) {
            assert_eq!(svc.networks, vec!["app-network"], "service {}", svc.name);
            assert_eq!(svc.restart, Some(RestartPolicy::UnlessStopped));
        }
    }
}
