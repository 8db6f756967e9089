//! `stackforge validate`: Check a project configuration.

use std::path::PathBuf;

use clap::Args;

/// Arguments for the `validate` command.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the project configuration.
    #[arg(short, long, default_value_os_t = super::default_config_path())]
    pub config: PathBuf,
}

/// Executes the `validate` command.
///
/// Loading already runs the schema checks; on top of that the service
/// graph is resolved so dependency problems surface here too.
///
/// # Errors
///
/// Returns an error if the file is missing, invalid, or describes an
/// unresolvable service graph.
pub fn execute(args: &ValidateArgs) -> anyhow::Result<()> {
    let config = super::load_config(&args.config)?;
    let descriptors = stackforge_compose::catalog::descriptors(&config);
    let _ = stackforge_compose::graph::sort_by_dependencies(&descriptors)
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    println!("{} is valid", args.config.display());
    crate::output::print_summary(&config);
    Ok(())
}
