// src/cli/mod.rs
//! CLI definitions for cookbook
//!
//! This module contains the command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.
//!
//! - `cook` - Build and stage a package from a recipe
//! - `taste` - Build and run a test package against a staged package
//! - `create` - `cook` followed by `taste` of the recipe's `test_package/`
//! - `version` / `inspect` / `validate` - Read-only recipe queries
//! - `completions` - Shell completion scripts

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cookbook")]
#[command(author = "Cookbook Contributors")]
#[command(version)]
#[command(about = "Build, stage and smoke-test C++ library packages from recipes", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// User config file (default: <config dir>/cookbook/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments shared by every command that builds something
#[derive(Args, Debug, Clone, Default)]
pub struct KitchenArgs {
    /// Setting override, e.g. `-s build_type=Debug` (repeatable)
    #[arg(short, long = "setting", value_name = "KEY=VALUE")]
    pub settings: Vec<String>,

    /// Option override, e.g. `-o shared=true` (repeatable)
    #[arg(short, long = "option", value_name = "NAME=VALUE")]
    pub options: Vec<String>,

    /// Package store root (default: from config or the data directory)
    #[arg(long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Explicit meson executable
    #[arg(long, value_name = "PATH")]
    pub meson: Option<PathBuf>,

    /// Meson cross file, required when the settings target another machine
    #[arg(long, value_name = "PATH")]
    pub cross_file: Option<PathBuf>,
}

/// Switches controlling which cook steps run
#[derive(Args, Debug, Clone, Default)]
pub struct CookArgs {
    /// Run the project's test suite even if the recipe disables it
    #[arg(long, conflicts_with = "no_tests")]
    pub run_tests: bool,

    /// Skip the project's test suite
    #[arg(long)]
    pub no_tests: bool,

    /// Build and verify only, do not stage a package
    #[arg(long)]
    pub no_stage: bool,

    /// Developer mode: use the recipe's local header layout
    #[arg(long)]
    pub local: bool,

    /// Check requirements with pkg-config before building
    #[arg(long)]
    pub check_requirements: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Cook a package: resolve version, configure, build, test and stage
    Cook {
        /// Recipe directory or recipe file
        #[arg(default_value = ".")]
        recipe: PathBuf,

        #[command(flatten)]
        kitchen: KitchenArgs,

        #[command(flatten)]
        cook: CookArgs,
    },

    /// Build a test package against a staged package and run it
    Taste {
        /// Test package directory
        #[arg(default_value = "test_package")]
        test_dir: PathBuf,

        /// Staged package directory (holding cookbook-package.json)
        #[arg(short, long, value_name = "DIR")]
        package: PathBuf,

        #[command(flatten)]
        kitchen: KitchenArgs,

        /// Keep the consumer build directory
        #[arg(long)]
        keep_builddir: bool,
    },

    /// Cook a package, then taste it with the recipe's test_package
    Create {
        /// Recipe directory
        #[arg(default_value = ".")]
        recipe: PathBuf,

        #[command(flatten)]
        kitchen: KitchenArgs,

        #[command(flatten)]
        cook: CookArgs,

        /// Keep the consumer build directory
        #[arg(long)]
        keep_builddir: bool,
    },

    /// Print the resolved package version
    Version {
        /// Recipe directory or recipe file
        #[arg(default_value = ".")]
        recipe: PathBuf,
    },

    /// Show recipe metadata
    Inspect {
        /// Recipe directory or recipe file
        #[arg(default_value = ".")]
        recipe: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse and validate a recipe
    Validate {
        /// Recipe directory or recipe file
        #[arg(default_value = ".")]
        recipe: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
