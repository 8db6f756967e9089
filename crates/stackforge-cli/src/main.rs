//! # stackforge: service stack generator
//!
//! Turns a project configuration into container orchestration and
//! cluster manifests. Single binary for scaffolding, checking, and
//! writing them.

mod commands;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::commands::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    commands::execute(cli)
}
