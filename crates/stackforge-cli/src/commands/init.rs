//! `stackforge init`: Write a new project configuration.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use stackforge_common::config::{Preset, ProjectConfig};

/// Preset names accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PresetArg {
    /// Express, PostgreSQL, Redis, auth, container files.
    #[default]
    Default,
    /// Express and PostgreSQL only.
    Minimal,
    /// NestJS with BullMQ and cluster manifests.
    Fullstack,
    /// NestJS with every store, RabbitMQ and cluster manifests.
    Microservices,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Default => Self::Default,
            PresetArg::Minimal => Self::Minimal,
            PresetArg::Fullstack => Self::Fullstack,
            PresetArg::Microservices => Self::Microservices,
        }
    }
}

/// Arguments for the `init` command.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Project name.
    pub name: String,

    /// Preset to start from.
    #[arg(short, long, value_enum, default_value_t = PresetArg::Default)]
    pub preset: PresetArg,

    /// Where to write the configuration.
    #[arg(short, long, default_value = stackforge_common::constants::CONFIG_FILENAME)]
    pub output: PathBuf,

    /// Overwrite an existing configuration file.
    #[arg(long)]
    pub force: bool,
}

/// Executes the `init` command.
///
/// # Errors
///
/// Returns an error if the target exists without `--force`, the name is
/// invalid, or the file cannot be written.
pub fn execute(args: InitArgs) -> anyhow::Result<()> {
    if args.output.exists() && !args.force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            args.output.display()
        );
    }

    let config = ProjectConfig::preset(args.preset.into(), args.name);
    config.save(&args.output).map_err(|e| anyhow::anyhow!("{e}"))?;

    println!("Created {} for {}", args.output.display(), config.name);
    crate::output::print_summary(&config);
    Ok(())
}
