// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use cookbook::UserConfig;
use std::io;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber for logging
    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "cookbook", &mut io::stdout());
        return Ok(());
    }

    let user = UserConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Cook {
            recipe,
            kitchen,
            cook,
        } => commands::cmd_cook(&recipe, &user, &kitchen, &cook),
        Commands::Taste {
            test_dir,
            package,
            kitchen,
            keep_builddir,
        } => commands::cmd_taste(&test_dir, &package, &user, &kitchen, keep_builddir),
        Commands::Create {
            recipe,
            kitchen,
            cook,
            keep_builddir,
        } => commands::cmd_create(&recipe, &user, &kitchen, &cook, keep_builddir),
        Commands::Version { recipe } => commands::cmd_version(&recipe),
        Commands::Inspect { recipe, json } => commands::cmd_inspect(&recipe, json),
        Commands::Validate { recipe } => commands::cmd_validate(&recipe),
        Commands::Completions { .. } => Ok(()),
    }
}
