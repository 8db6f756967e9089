//! Unified error types for the Stackforge workspace.
//!
//! Every failure a generation run can produce is one of these variants.
//! All of them are terminal for the current run: callers report the
//! structured error and decide whether to abort.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum StackforgeError {
    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A service declares a dependency on a service that does not exist.
    #[error("service \"{service}\" depends on \"{dependency}\", which is not defined")]
    MissingDependency {
        /// The dependent service.
        service: String,
        /// The dependency that could not be found.
        dependency: String,
    },

    /// The service dependency graph contains a cycle.
    #[error("circular dependency detected: {}", cycle.join(" -> "))]
    CircularDependency {
        /// The DFS path that closes the loop, first and last entries equal.
        cycle: Vec<String>,
    },

    /// A requested dependency has no known manifest template.
    #[error("unsupported resource \"{kind}\": {reason}")]
    UnsupportedResource {
        /// The requested dependency kind.
        kind: String,
        /// Why no manifest can be produced for it.
        reason: String,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// JSON serialization or deserialization failed.
    #[error("JSON serialization error: {source}")]
    Json {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// YAML serialization failed.
    #[error("YAML serialization error: {source}")]
    Yaml {
        /// Underlying serialization error.
        #[from]
        source: serde_yaml::Error,
    },
}

impl StackforgeError {
    /// Builds a [`StackforgeError::Config`] from any message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, StackforgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circular_dependency_prints_explicit_path() {
        let err = StackforgeError::CircularDependency {
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "circular dependency detected: a -> b -> a");
    }

    #[test]
    fn missing_dependency_names_both_services() {
        let err = StackforgeError::MissingDependency {
            service: "api".into(),
            dependency: "ghost".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("\"api\""), "got: {msg}");
        assert!(msg.contains("\"ghost\""), "got: {msg}");
    }
}
