//! `stackforge generate`: Write every enabled artifact.

use std::path::PathBuf;

use clap::Args;
use stackforge_cluster::compiler::ClusterOptions;
use stackforge_sdk::generator::Generator;
use stackforge_sdk::writer::DirectoryWriter;

/// Arguments for the `generate` command.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Path to the project configuration.
    #[arg(short, long, default_value_os_t = super::default_config_path())]
    pub config: PathBuf,

    /// Directory the files are written under.
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Host the ingress route answers on.
    #[arg(long, env = "STACKFORGE_INGRESS_HOST")]
    pub ingress_host: Option<String>,

    /// Terminate TLS at the ingress route.
    #[arg(long)]
    pub tls: bool,

    /// Storage class requested by volume claims.
    #[arg(long)]
    pub storage_class: Option<String>,
}

impl GenerateArgs {
    fn cluster_options(&self) -> ClusterOptions {
        ClusterOptions {
            ingress_host: self.ingress_host.clone(),
            tls: self.tls,
            storage_class: self.storage_class.clone(),
        }
    }
}

/// Executes the `generate` command.
///
/// # Errors
///
/// Returns an error if loading, compilation, or writing fails. Nothing
/// is written when compilation fails.
pub fn execute(args: &GenerateArgs) -> anyhow::Result<()> {
    let config = super::load_config(&args.config)?;
    tracing::info!(output = %args.output.display(), "generating project files");

    let mut writer = DirectoryWriter::new(&args.output);
    let report = Generator::new(config)
        .with_cluster_options(args.cluster_options())
        .generate(&mut writer)
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    if report.written.is_empty() {
        println!("Nothing to generate: container files and cluster manifests are both disabled.");
        return Ok(());
    }
    for path in &report.written {
        println!("  wrote {}", writer.root().join(path).display());
    }
    println!();
    println!("{} file(s) generated.", report.written.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use stackforge_common::config::{Preset, ProjectConfig, SqlDatabase};

    use super::*;

    fn args(dir: &std::path::Path) -> GenerateArgs {
        GenerateArgs {
            config: dir.join("stack.json"),
            output: dir.join("out"),
            ingress_host: None,
            tls: false,
            storage_class: None,
        }
    }

    #[test]
    fn writes_files_under_output() {
        let dir = tempfile::tempdir().expect("tempdir");
        ProjectConfig::preset(Preset::Fullstack, "shop")
            .save(&dir.path().join("stack.json"))
            .expect("save");
        execute(&args(dir.path())).expect("should generate");
        assert!(dir.path().join("out/docker-compose.yml").is_file());
        assert!(dir.path().join("out/k8s/README.md").is_file());
    }

    #[test]
    fn unsupported_store_writes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = ProjectConfig::preset(Preset::Fullstack, "shop");
        config.sql_database = Some(SqlDatabase::Sqlite);
        config.save(&dir.path().join("stack.json")).expect("save");
        let err = execute(&args(dir.path())).expect_err("should fail");
        assert!(err.to_string().contains("sqlite"), "got: {err}");
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn missing_config_names_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = execute(&args(dir.path())).expect_err("should fail");
        assert!(err.to_string().contains("stack.json"), "got: {err}");
    }
}
