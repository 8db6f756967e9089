//! `stackforge plan`: Display the service startup order.

use std::path::PathBuf;

use clap::Args;
use stackforge_common::constants::CLUSTER_DIR;
use stackforge_compose::descriptor::Origin;
use stackforge_sdk::generator::Generator;

use crate::output;

/// Arguments for the `plan` command.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Path to the project configuration.
    #[arg(short, long, default_value_os_t = super::default_config_path())]
    pub config: PathBuf,
}

/// Executes the `plan` command.
///
/// Builds the service descriptors, resolves their startup order, and
/// prints each service with what it waits for.
///
/// # Errors
///
/// Returns an error if loading or graph resolution fails.
pub fn execute(args: &PlanArgs) -> anyhow::Result<()> {
    let config = super::load_config(&args.config)?;
    let order = Generator::new(config.clone())
        .startup_order()
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    println!("Startup Plan for: {}", config.name);
    println!("{}", output::rule(35));
    println!();

    for (position, descriptor) in order.iter().enumerate() {
        println!("  {}. {}", position + 1, descriptor.name);
        match &descriptor.origin {
            Origin::Build(build) => println!("      build: {}", build.context),
            Origin::Image(image) => println!("      image: {image}"),
        }
        if !descriptor.ports.is_empty() {
            println!("      ports: {}", output::join(&descriptor.ports));
        }
        for (dependency, condition) in &descriptor.depends_on {
            println!("      waits for: {dependency} ({condition})");
        }
    }

    println!();
    println!("  {} service(s) in startup order.", order.len());
    if config.include_kubernetes {
        println!("  Cluster manifests will be written to {CLUSTER_DIR}/.");
    }
    Ok(())
}
