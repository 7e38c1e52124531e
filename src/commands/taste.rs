// src/commands/taste.rs

//! Taste command - smoke-test a staged package

use super::{kitchen_config, make_kitchen};
use crate::cli::KitchenArgs;
use anyhow::{Context, Result};
use cookbook::UserConfig;
use cookbook::recipe::{TasteResult, load_test_recipe};
use std::path::Path;

pub fn cmd_taste(
    test_dir: &Path,
    package_dir: &Path,
    user: &UserConfig,
    kitchen_args: &KitchenArgs,
    keep_builddir: bool,
) -> Result<()> {
    let mut config = kitchen_config(user, kitchen_args, None)?;
    config.keep_builddir = keep_builddir;
    let kitchen = make_kitchen(config, user, kitchen_args)?;

    let test_recipe = load_test_recipe(test_dir)
        .with_context(|| format!("Failed to read test recipe in {}", test_dir.display()))?;

    let result = kitchen
        .taste(&test_recipe, test_dir, package_dir)
        .with_context(|| format!("Failed to taste package in {}", package_dir.display()))?;
    print_taste(&result);

    Ok(())
}

pub(super) fn print_taste(result: &TasteResult) {
    for warning in &result.warnings {
        println!("Warning: {}", warning);
    }

    if result.run_skipped {
        println!("[SKIPPED] Cross-building: {} was not run", result.command);
    } else {
        if let Some(output) = &result.output {
            let stdout = output.stdout.trim_end();
            if !stdout.is_empty() {
                println!("{}", stdout);
            }
        }
        println!("[OK] {} passed for {}", result.command, result.package);
    }

    if let Some(dir) = &result.build_dir {
        println!("  Build directory kept at {}", dir.display());
    }
}
