//! Connection settings table.
//!
//! One row per environment variable a workload receives. The config
//! store data, the secret store data and the workload's indirect
//! references are all projected from these rows, so a reference can never
//! name a key its store lacks.

use stackforge_common::config::ProjectConfig;
use stackforge_common::constants::{
    APP_PORT, DEFAULT_DATABASE, JWT_SECRET_PLACEHOLDER, SECRET_PLACEHOLDER,
};
use stackforge_common::naming::Labels;
use stackforge_common::types::DependencyKind;

use crate::resources::EnvVar;

/// Where a setting's value lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Inlined into the workload.
    Literal(String),
    /// A key of the configuration store.
    Config {
        /// Store key.
        key: String,
        /// Stored value.
        value: String,
    },
    /// A key of the secret store.
    Secret {
        /// Store key.
        key: String,
        /// Placeholder value.
        value: String,
    },
}

/// One environment variable and where its value comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
    /// Variable name inside the container.
    pub env: String,
    /// Value source.
    pub source: Source,
}

impl Setting {
    fn literal(env: &str, value: impl Into<String>) -> Self {
        Self {
            env: env.into(),
            source: Source::Literal(value.into()),
        }
    }

    fn config(env: &str, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            env: env.into(),
            source: Source::Config {
                key: key.into(),
                value: value.into(),
            },
        }
    }

    fn secret(env: &str, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            env: env.into(),
            source: Source::Secret {
                key: key.into(),
                value: value.into(),
            },
        }
    }

    /// The workload variable, reading from the given stores.
    #[must_use]
    pub fn env_var(&self, config_store: &str, secret_store: &str) -> EnvVar {
        match &self.source {
            Source::Literal(value) => EnvVar::literal(&self.env, value),
            Source::Config { key, .. } => EnvVar::from_config_map(&self.env, config_store, key),
            Source::Secret { key, .. } => EnvVar::from_secret(&self.env, secret_store, key),
        }
    }
}

/// Settings the application workload receives, in order.
#[must_use]
pub fn app_settings(config: &ProjectConfig) -> Vec<Setting> {
    let mut settings = vec![
        Setting::config("NODE_ENV", "node-env", "production"),
        Setting::literal("PORT", APP_PORT.to_string()),
        Setting::config("LOG_LEVEL", "log-level", "info"),
    ];
    for kind in config.managed_dependencies() {
        settings.extend(app_connection(kind));
    }
    if config.include_auth {
        settings.push(Setting::secret("JWT_SECRET", "jwt-secret", JWT_SECRET_PLACEHOLDER));
    }
    settings
}

/// How the application reaches one dependency.
fn app_connection(kind: DependencyKind) -> Vec<Setting> {
    let prefix = kind.env_prefix();
    let key_prefix = kind.service_name();
    let var = |suffix: &str| format!("{prefix}_{suffix}");
    let key = |suffix: &str| format!("{key_prefix}-{suffix}");

    let mut settings = vec![
        Setting::config(&var("HOST"), key("host"), kind.service_name()),
        Setting::config(&var("PORT"), key("port"), kind.port().to_string()),
    ];
    let (database_var, user) = match kind {
        DependencyKind::Postgres => (Some("DB"), Some("postgres")),
        DependencyKind::Mysql => (Some("DATABASE"), Some("user")),
        DependencyKind::Mongodb => (Some("DATABASE"), Some("admin")),
        DependencyKind::Rabbitmq => (None, Some("guest")),
        DependencyKind::Redis => (None, None),
    };
    if let Some(suffix) = database_var {
        settings.push(Setting::config(&var(suffix), key("database"), DEFAULT_DATABASE));
    }
    if let Some(user) = user {
        settings.push(Setting::config(&var("USER"), key("user"), user));
    }
    if kind.takes_password() {
        settings.push(Setting::secret(&var("PASSWORD"), key("password"), SECRET_PLACEHOLDER));
    }
    settings
}

/// Settings a dependency's own container receives.
///
/// Credentials come from the dependency's own secret store; everything
/// else is inlined.
#[must_use]
pub fn dependency_settings(kind: DependencyKind) -> Vec<Setting> {
    let password = || SECRET_PLACEHOLDER.to_string();
    match kind {
        DependencyKind::Postgres => vec![
            Setting::literal("POSTGRES_USER", "postgres"),
            Setting::literal("POSTGRES_DB", DEFAULT_DATABASE),
            Setting::secret("POSTGRES_PASSWORD", "password", password()),
            Setting::literal("PGDATA", "/var/lib/postgresql/data/pgdata"),
        ],
        DependencyKind::Mysql => vec![
            Setting::literal("MYSQL_DATABASE", DEFAULT_DATABASE),
            Setting::literal("MYSQL_USER", "user"),
            Setting::secret("MYSQL_PASSWORD", "password", password()),
            Setting::secret("MYSQL_ROOT_PASSWORD", "root-password", password()),
        ],
        DependencyKind::Mongodb => vec![
            Setting::literal("MONGO_INITDB_ROOT_USERNAME", "admin"),
            Setting::secret("MONGO_INITDB_ROOT_PASSWORD", "password", password()),
        ],
        DependencyKind::Redis => Vec::new(),
        DependencyKind::Rabbitmq => vec![
            Setting::literal("RABBITMQ_DEFAULT_USER", "guest"),
            Setting::secret("RABBITMQ_DEFAULT_PASS", "password", password()),
        ],
    }
}

/// Config store data projected from settings.
#[must_use]
pub fn config_data(settings: &[Setting]) -> Labels {
    settings
        .iter()
        .filter_map(|s| match &s.source {
            Source::Config { key, value } => Some((key.clone(), value.clone())),
            _ => None,
        })
        .collect()
}

/// Secret store data projected from settings.
#[must_use]
pub fn secret_data(settings: &[Setting]) -> Labels {
    settings
        .iter()
        .filter_map(|s| match &s.source {
            Source::Secret { key, value } => Some((key.clone(), value.clone())),
            _ => None,
        })
        .collect()
}
