//! Project configuration model, validation, presets, and persistence.
//!
//! The compilers only ever see a [`ProjectConfig`] that passed
//! [`ProjectConfig::validate`]; loading and saving both validate.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_PROJECT_NAME_LENGTH, RESERVED_PROJECT_NAMES};
use crate::error::{Result, StackforgeError};
use crate::types::DependencyKind;

/// Backend framework of the generated application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    /// Express.
    #[default]
    Express,
    /// NestJS.
    Nestjs,
}

impl Framework {
    /// Returns the label value for this framework.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Express => "express",
            Self::Nestjs => "nestjs",
        }
    }
}

/// Relational store selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDatabase {
    /// PostgreSQL, run as a managed dependency.
    Postgresql,
    /// MySQL, run as a managed dependency.
    Mysql,
    /// SQLite, embedded in the application process.
    Sqlite,
}

impl SqlDatabase {
    /// The managed dependency backing this store, `None` when embedded.
    #[must_use]
    pub const fn dependency(self) -> Option<DependencyKind> {
        match self {
            Self::Postgresql => Some(DependencyKind::Postgres),
            Self::Mysql => Some(DependencyKind::Mysql),
            Self::Sqlite => None,
        }
    }

    /// Returns the configuration value for this store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Postgresql => "postgresql",
            Self::Mysql => "mysql",
            Self::Sqlite => "sqlite",
        }
    }
}

/// Auxiliary (non-relational) store selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoSqlDatabase {
    /// MongoDB document store.
    Mongodb,
    /// Redis cache.
    Redis,
}

/// Message broker selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageQueue {
    /// RabbitMQ, run as a managed dependency.
    Rabbitmq,
    /// BullMQ, a library riding on the cache; no service of its own.
    Bullmq,
}

/// Named starting points for a new configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Preset {
    /// Express API with PostgreSQL, Redis, auth and container files.
    #[default]
    Default,
    /// Express API backed by PostgreSQL only, no container files.
    Minimal,
    /// NestJS API with BullMQ and cluster manifests.
    Fullstack,
    /// NestJS API with every store, RabbitMQ and cluster manifests.
    Microservices,
}

/// Validated description of the project to scaffold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Project name, the naming root of every generated artifact.
    pub name: String,
    /// Free-form project description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Project author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Backend framework.
    #[serde(default)]
    pub framework: Framework,
    /// Whether token authentication is generated.
    #[serde(default)]
    pub include_auth: bool,
    /// Whether API documentation is generated.
    #[serde(default)]
    pub include_swagger: bool,
    /// Relational store, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_database: Option<SqlDatabase>,
    /// Auxiliary stores.
    #[serde(default)]
    pub nosql_databases: Vec<NoSqlDatabase>,
    /// Whether compose artifacts are generated.
    #[serde(default)]
    pub include_docker: bool,
    /// Whether cluster manifests are generated.
    #[serde(default)]
    pub include_kubernetes: bool,
    /// Whether a message broker is wired in.
    #[serde(default)]
    pub include_message_queue: bool,
    /// Message broker selection, required when `include_message_queue` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_queue: Option<MessageQueue>,
}

impl ProjectConfig {
    /// Creates a configuration from the default preset.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::preset(Preset::Default, name)
    }

    /// Creates a configuration from a named preset.
    #[must_use]
    pub fn preset(preset: Preset, name: impl Into<String>) -> Self {
        let base = Self {
            name: name.into(),
            description: None,
            author: None,
            framework: Framework::Express,
            include_auth: true,
            include_swagger: true,
            sql_database: Some(SqlDatabase::Postgresql),
            nosql_databases: vec![NoSqlDatabase::Redis],
            include_docker: true,
            include_kubernetes: false,
            include_message_queue: false,
            message_queue: None,
        };

        match preset {
            Preset::Default => base,
            Preset::Minimal => Self {
                include_auth: false,
                include_swagger: false,
                nosql_databases: Vec::new(),
                include_docker: false,
                ..base
            },
            Preset::Fullstack => Self {
                framework: Framework::Nestjs,
                include_kubernetes: true,
                include_message_queue: true,
                message_queue: Some(MessageQueue::Bullmq),
                ..base
            },
            Preset::Microservices => Self {
                framework: Framework::Nestjs,
                nosql_databases: vec![NoSqlDatabase::Redis, NoSqlDatabase::Mongodb],
                include_kubernetes: true,
                include_message_queue: true,
                message_queue: Some(MessageQueue::Rabbitmq),
                ..base
            },
        }
    }

    /// Checks the configuration against the schema rules.
    ///
    /// # Errors
    ///
    /// Returns [`StackforgeError::Config`] naming the first violated rule.
    pub fn validate(&self) -> Result<()> {
        validate_project_name(&self.name)?;
        if self.include_message_queue && self.message_queue.is_none() {
            return Err(StackforgeError::config(
                "messageQueue: a broker must be selected when includeMessageQueue is set",
            ));
        }
        // The project name roots the application's service, workload and
        // store names, which share a namespace with the dependencies'.
        if let Some(kind) = self
            .managed_dependencies()
            .into_iter()
            .find(|kind| kind.service_name() == self.name)
        {
            return Err(StackforgeError::config(format!(
                "name: project name \"{}\" collides with the {} service \"{}\"",
                self.name,
                kind.display_name(),
                kind.service_name()
            )));
        }
        Ok(())
    }

    /// Whether the given auxiliary store was requested.
    #[must_use]
    pub fn has_nosql(&self, store: NoSqlDatabase) -> bool {
        self.nosql_databases.contains(&store)
    }

    /// The broker selection, honoured only when the broker flag is set.
    #[must_use]
    pub fn broker(&self) -> Option<MessageQueue> {
        if self.include_message_queue {
            self.message_queue
        } else {
            None
        }
    }

    /// Managed dependencies that run as services of their own, in
    /// emission order: relational store, document store, cache, broker.
    #[must_use]
    pub fn managed_dependencies(&self) -> Vec<DependencyKind> {
        let mut kinds = Vec::new();
        if let Some(kind) = self.sql_database.and_then(SqlDatabase::dependency) {
            kinds.push(kind);
        }
        if self.has_nosql(NoSqlDatabase::Mongodb) {
            kinds.push(DependencyKind::Mongodb);
        }
        if self.has_nosql(NoSqlDatabase::Redis) {
            kinds.push(DependencyKind::Redis);
        }
        if self.broker() == Some(MessageQueue::Rabbitmq) {
            kinds.push(DependencyKind::Rabbitmq);
        }
        kinds
    }

    /// Whether the given managed dependency was requested.
    #[must_use]
    pub fn requests(&self, kind: DependencyKind) -> bool {
        self.managed_dependencies().contains(&kind)
    }

    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::info!(path = %path.display(), "loading project configuration");
        let content = std::fs::read_to_string(path).map_err(|e| StackforgeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates and writes the configuration as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if validation, serialization, or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| StackforgeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::info!(path = %path.display(), "saved project configuration");
        Ok(())
    }
}

/// Validates a project name: 1..=214 chars of `[a-z0-9-_]`, not starting
/// with `.` or `_`, and not a reserved name.
///
/// # Errors
///
/// Returns [`StackforgeError::Config`] describing the violated rule.
pub fn validate_project_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(StackforgeError::config("name: project name is required"));
    }
    if name.len() > MAX_PROJECT_NAME_LENGTH {
        return Err(StackforgeError::config(format!(
            "name: project name must be at most {MAX_PROJECT_NAME_LENGTH} characters"
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err(StackforgeError::config(format!(
            "name: \"{name}\" may only contain lowercase letters, numbers, hyphens, and underscores"
        )));
    }
    if name.starts_with('.') || name.starts_with('_') {
        return Err(StackforgeError::config(
            "name: project name cannot start with . or _",
        ));
    }
    if RESERVED_PROJECT_NAMES.contains(&name) {
        return Err(StackforgeError::config(format!(
            "name: \"{name}\" is a reserved name"
        )));
    }
    Ok(())
}
