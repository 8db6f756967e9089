//! CLI command definitions and dispatch.

pub mod generate;
pub mod init;
pub mod plan;
pub mod validate;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use stackforge_common::config::ProjectConfig;
use stackforge_common::constants::{BIN_NAME, CONFIG_FILENAME};

/// Container and cluster manifests from one project file.
#[derive(Parser, Debug)]
#[command(name = BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Log at debug level regardless of `RUST_LOG`.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a new project configuration from a preset.
    Init(init::InitArgs),
    /// Check a project configuration and summarize it.
    Validate(validate::ValidateArgs),
    /// Show the service startup order without writing anything.
    Plan(plan::PlanArgs),
    /// Write compose files and cluster manifests.
    Generate(generate::GenerateArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Init(args) => init::execute(args),
        Command::Validate(args) => validate::execute(&args),
        Command::Plan(args) => plan::execute(&args),
        Command::Generate(args) => generate::execute(&args),
    }
}

/// Default location of the project configuration.
fn default_config_path() -> PathBuf {
    PathBuf::from(CONFIG_FILENAME)
}

/// Loads a configuration file, naming the path on failure.
fn load_config(path: &Path) -> anyhow::Result<ProjectConfig> {
    if !path.exists() {
        anyhow::bail!(
            "configuration not found: {} (run `{BIN_NAME} init` first)",
            path.display()
        );
    }
    ProjectConfig::load(path).map_err(|e| anyhow::anyhow!("{e}"))
}
