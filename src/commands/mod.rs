// src/commands/mod.rs
//! Command handlers for the cookbook CLI

mod cook;
mod recipe;
mod taste;

pub use cook::{cmd_cook, cmd_create};
pub use recipe::{cmd_inspect, cmd_validate, cmd_version};
pub use taste::cmd_taste;

use crate::cli::{CookArgs, KitchenArgs};
use anyhow::{Context, Result};
use cookbook::UserConfig;
use cookbook::recipe::options::parse_assignment;
use cookbook::recipe::requirements::PkgConfigResolver;
use cookbook::recipe::{Kitchen, KitchenConfig, MesonTool, Recipe, parse_recipe_file};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Read a recipe given its directory or file; returns it with its directory
pub(crate) fn load_recipe(path: &Path) -> Result<(Recipe, PathBuf)> {
    let file = cookbook::recipe::parser::recipe_file(path);
    let recipe = parse_recipe_file(&file)
        .with_context(|| format!("Failed to parse recipe: {}", file.display()))?;

    let dir = match file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((recipe, dir))
}

/// Kitchen configuration: defaults, then the user config, then flags
pub(crate) fn kitchen_config(
    user: &UserConfig,
    args: &KitchenArgs,
    cook: Option<&CookArgs>,
) -> Result<KitchenConfig> {
    let mut config = KitchenConfig::default();
    user.apply(&mut config).context("Invalid user configuration")?;

    for raw in &args.settings {
        let (key, value) = parse_assignment(raw)?;
        config.settings.apply(&key, &value)?;
    }
    for raw in &args.options {
        config.option_overrides.push(parse_assignment(raw)?);
    }
    if let Some(output) = &args.output {
        config.package_root = output.clone();
    }
    if let Some(cross_file) = &args.cross_file {
        config.cross_file = Some(cross_file.clone());
    }

    if let Some(cook) = cook {
        if cook.run_tests {
            config.run_tests = Some(true);
        } else if cook.no_tests {
            config.run_tests = Some(false);
        }
        if cook.no_stage {
            config.stage_artifacts = Some(false);
        }
        config.local = cook.local;
        config.check_requirements |= cook.check_requirements;
    }

    debug!("Kitchen settings: {}", config.settings);
    Ok(config)
}

/// Kitchen driving meson, with a pkg-config resolver when checking
/// requirements
pub(crate) fn make_kitchen(
    config: KitchenConfig,
    user: &UserConfig,
    args: &KitchenArgs,
) -> Result<Kitchen> {
    let tool = match args.meson.as_ref().or(user.meson.as_ref()) {
        Some(program) => MesonTool::new(program),
        None => MesonTool::locate().context("meson is required to cook recipes")?,
    };

    let check = config.check_requirements;
    let mut kitchen = Kitchen::new(config, Box::new(tool));
    if check {
        let resolver =
            PkgConfigResolver::locate().context("pkg-config is required to check requirements")?;
        kitchen.set_resolver(Arc::new(resolver));
    }
    Ok(kitchen)
}
