// src/commands/cook.rs

//! Cook and create commands - build packages from recipes

use super::{kitchen_config, load_recipe, make_kitchen};
use crate::cli::{CookArgs, KitchenArgs};
use anyhow::{Context, Result};
use cookbook::UserConfig;
use cookbook::recipe::test_package::TEST_PACKAGE_DIR;
use cookbook::recipe::{CookResult, Kitchen, load_test_recipe, validate_recipe};
use std::path::Path;
use tracing::info;

/// Cook a package from a recipe
pub fn cmd_cook(
    recipe_path: &Path,
    user: &UserConfig,
    kitchen_args: &KitchenArgs,
    cook_args: &CookArgs,
) -> Result<()> {
    let config = kitchen_config(user, kitchen_args, Some(cook_args))?;
    let kitchen = make_kitchen(config, user, kitchen_args)?;
    cook_recipe(&kitchen, recipe_path)?;
    Ok(())
}

/// Cook a package and taste it with its test package
pub fn cmd_create(
    recipe_path: &Path,
    user: &UserConfig,
    kitchen_args: &KitchenArgs,
    cook_args: &CookArgs,
    keep_builddir: bool,
) -> Result<()> {
    let mut config = kitchen_config(user, kitchen_args, Some(cook_args))?;
    config.keep_builddir = keep_builddir;
    let kitchen = make_kitchen(config, user, kitchen_args)?;

    let (result, recipe_dir) = cook_recipe(&kitchen, recipe_path)?;

    let Some(package_dir) = result.package_dir else {
        println!("\nNo package was staged, skipping test package");
        return Ok(());
    };

    let test_dir = recipe_dir.join(TEST_PACKAGE_DIR);
    if !test_dir.is_dir() {
        println!("\nNo {} directory, skipping test package", TEST_PACKAGE_DIR);
        return Ok(());
    }

    let test_recipe = load_test_recipe(&test_dir)
        .with_context(|| format!("Failed to read test recipe in {}", test_dir.display()))?;
    println!("\nTasting {} with {}", result.info.reference(), test_dir.display());

    let taste = kitchen
        .taste(&test_recipe, &test_dir, &package_dir)
        .with_context(|| format!("Test package failed for {}", result.info.reference()))?;
    super::taste::print_taste(&taste);

    Ok(())
}

fn cook_recipe(kitchen: &Kitchen, recipe_path: &Path) -> Result<(CookResult, std::path::PathBuf)> {
    println!("Reading recipe: {}", recipe_path.display());
    let (recipe, recipe_dir) = load_recipe(recipe_path)?;

    let warnings = validate_recipe(&recipe).with_context(|| "Recipe validation failed")?;
    for warning in &warnings {
        println!("Warning: {}", warning);
    }

    println!("Cooking {} for {}", recipe.package.name, kitchen.config().settings);

    let result = kitchen.cook(&recipe, &recipe_dir).map_err(|e| {
        let hint = if e.is_config() {
            " (check the recipe, settings and options)"
        } else {
            ""
        };
        anyhow::Error::new(e).context(format!("Failed to cook {}{}", recipe.package.name, hint))
    })?;

    match &result.package_dir {
        Some(dir) => {
            println!("\n[COMPLETE] Cooked: {}", result.info.reference());
            println!("  Package: {}", dir.display());
            println!("  Staged {} file(s)", result.staged.len());
            if !result.info.libs.is_empty() {
                println!("  Libraries: {}", result.info.libs.join(", "));
            }
        }
        None => println!("\n[COMPLETE] Built {} (not staged)", result.info.reference()),
    }
    if result.tested {
        println!("  Tests passed");
    }

    if !result.warnings.is_empty() {
        println!("\nBuild warnings:");
        for warning in &result.warnings {
            println!("  - {}", warning);
        }
    }

    info!("Successfully cooked {}", result.info.reference());
    Ok((result, recipe_dir))
}
