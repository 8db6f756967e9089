//! One-call generation of every infrastructure artifact of a project.

use std::path::{Path, PathBuf};

use stackforge_cluster::compiler::{self as cluster, ClusterOptions};
use stackforge_cluster::readme;
use stackforge_common::config::ProjectConfig;
use stackforge_common::constants::{
    CLUSTER_DIR, COMPOSE_FILENAME, DOCKERIGNORE_FILENAME, ENV_FILENAME,
};
use stackforge_common::error::Result;
use stackforge_compose::compiler as compose;
use stackforge_compose::descriptor::ServiceDescriptor;
use stackforge_compose::{catalog, graph};

use crate::writer::ManifestWriter;

/// One file ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Path relative to the output root.
    pub path: PathBuf,
    /// File content.
    pub contents: String,
}

impl GeneratedFile {
    fn new(path: impl Into<PathBuf>, contents: String) -> Self {
        Self {
            path: path.into(),
            contents,
        }
    }
}

/// What a generation run handed to the writer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Written paths, relative to the output root, in write order.
    pub written: Vec<PathBuf>,
}

/// Compiles a project's compose and cluster artifacts and writes them.
#[derive(Debug, Clone)]
pub struct Generator {
    config: ProjectConfig,
    cluster_options: ClusterOptions,
}

impl Generator {
    /// Creates a generator for a configuration.
    #[must_use]
    pub fn new(config: ProjectConfig) -> Self {
        Self {
            config,
            cluster_options: ClusterOptions::default(),
        }
    }

    /// Overrides the cluster output options.
    #[must_use]
    pub fn with_cluster_options(mut self, options: ClusterOptions) -> Self {
        self.cluster_options = options;
        self
    }

    /// The configuration being generated.
    #[must_use]
    pub const fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Service descriptors in startup order.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the dependency
    /// graph cannot be resolved.
    pub fn startup_order(&self) -> Result<Vec<ServiceDescriptor>> {
        self.config.validate()?;
        graph::sort_by_dependencies(&catalog::descriptors(&self.config))
    }

    /// Compiles every enabled artifact in memory.
    ///
    /// # Errors
    ///
    /// Returns the first validation or compilation failure.
    pub fn render(&self) -> Result<Vec<GeneratedFile>> {
        self.config.validate()?;
        let mut files = Vec::new();

        if self.config.include_docker {
            let output = compose::compile(&self.config)?;
            files.push(GeneratedFile::new(COMPOSE_FILENAME, output.document.to_yaml()?));
            files.push(GeneratedFile::new(ENV_FILENAME, lines(&output.env_file)));
            files.push(GeneratedFile::new(
                DOCKERIGNORE_FILENAME,
                lines(&output.dockerignore),
            ));
        }

        if self.config.include_kubernetes {
            let documents = cluster::compile_with(&self.config, &self.cluster_options)?;
            let dir = Path::new(CLUSTER_DIR);
            for doc in &documents {
                files.push(GeneratedFile::new(dir.join(&doc.file_name), doc.to_yaml()?));
            }
            files.push(GeneratedFile::new(
                dir.join("README.md"),
                readme::render(&self.config.name, &documents),
            ));
        }

        Ok(files)
    }

    /// Compiles everything, then hands each file to the writer.
    ///
    /// Nothing is written if any compiler fails.
    ///
    /// # Errors
    ///
    /// Returns compilation failures, or the writer's failure unchanged.
    pub fn generate(&self, writer: &mut dyn ManifestWriter) -> Result<GenerationReport> {
        tracing::info!(project = %self.config.name, "generating infrastructure files");
        let files = self.render()?;

        let mut report = GenerationReport::default();
        for file in files {
            writer.write(&file.path, &file.contents)?;
            report.written.push(file.path);
        }
        tracing::info!(count = report.written.len(), "generation complete");
        Ok(report)
    }
}

fn lines(lines: &[String]) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
