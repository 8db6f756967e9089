//! `.env` and `.dockerignore` emission.
//!
//! The env-file key names are a public contract: generated application
//! code reads them by name.

use stackforge_common::config::{ProjectConfig, SqlDatabase};
use stackforge_common::constants::{APP_PORT, DEFAULT_DATABASE};
use stackforge_common::types::DependencyKind;

/// Lines of the generated `.env` file.
///
/// The application block comes first, then one labelled block per enabled
/// dependency. Every block is followed by a blank line.
#[must_use]
pub fn env_file_lines(config: &ProjectConfig) -> Vec<String> {
    let mut lines = Vec::new();
    block(
        &mut lines,
        "Application",
        &[
            ("NODE_ENV", "development".into()),
            ("PORT", APP_PORT.to_string()),
        ],
    );

    match config.sql_database {
        Some(SqlDatabase::Postgresql) => dependency_block(&mut lines, DependencyKind::Postgres),
        Some(SqlDatabase::Mysql) => dependency_block(&mut lines, DependencyKind::Mysql),
        Some(SqlDatabase::Sqlite) | None => {}
    }
    for kind in [
        DependencyKind::Redis,
        DependencyKind::Mongodb,
        DependencyKind::Rabbitmq,
    ] {
        if config.requests(kind) {
            dependency_block(&mut lines, kind);
        }
    }

    if config.include_auth {
        block(
            &mut lines,
            "Authentication",
            &[("JWT_SECRET", "change-me-in-production".into())],
        );
    }
    lines
}

fn dependency_block(lines: &mut Vec<String>, kind: DependencyKind) {
    let host = kind.service_name().to_string();
    let port = kind.port().to_string();
    let entries: Vec<(&str, String)> = match kind {
        DependencyKind::Postgres => vec![
            ("POSTGRES_HOST", host),
            ("POSTGRES_PORT", port),
            ("POSTGRES_USER", "postgres".into()),
            ("POSTGRES_PASSWORD", "postgres".into()),
            ("POSTGRES_DB", DEFAULT_DATABASE.into()),
        ],
        DependencyKind::Mysql => vec![
            ("MYSQL_HOST", host),
            ("MYSQL_PORT", port),
            ("MYSQL_ROOT_PASSWORD", "root".into()),
            ("MYSQL_DATABASE", DEFAULT_DATABASE.into()),
            ("MYSQL_USER", "user".into()),
            ("MYSQL_PASSWORD", "password".into()),
        ],
        DependencyKind::Redis => vec![("REDIS_HOST", host), ("REDIS_PORT", port)],
        DependencyKind::Mongodb => {
            let uri = format!(
                "mongodb://admin:password@{host}:{port}/{DEFAULT_DATABASE}?authSource=admin"
            );
            vec![
                ("MONGODB_HOST", host),
                ("MONGODB_PORT", port),
                ("MONGODB_USER", "admin".into()),
                ("MONGODB_PASSWORD", "password".into()),
                ("MONGODB_URI", uri),
            ]
        }
        DependencyKind::Rabbitmq => vec![
            ("RABBITMQ_HOST", host),
            ("RABBITMQ_PORT", port),
            (
                "RABBITMQ_MANAGEMENT_PORT",
                kind.management_port().unwrap_or_default().to_string(),
            ),
            ("RABBITMQ_USER", "guest".into()),
            ("RABBITMQ_PASSWORD", "guest".into()),
        ],
    };
    block(lines, kind.display_name(), &entries);
}

fn block(lines: &mut Vec<String>, title: &str, entries: &[(&str, String)]) {
    lines.push(format!("# {title}"));
    lines.extend(entries.iter().map(|(key, value)| format!("{key}={value}")));
    lines.push(String::new());
}

/// Lines of the generated `.dockerignore` file. Fixed, not derived from
/// the configuration.
#[must_use]
pub fn dockerignore_lines() -> Vec<String> {
    [
        "node_modules",
        "npm-debug.log",
        ".git",
        ".gitignore",
        ".env",
        ".env.local",
        ".env.*.local",
        "dist",
        "build",
        "coverage",
        ".vscode",
        ".idea",
        "*.log",
        ".DS_Store",
        "Thumbs.db",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
