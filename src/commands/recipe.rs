// src/commands/recipe.rs

//! Read-only recipe commands: version, inspect, validate

use super::load_recipe;
use anyhow::{Context, Result};
use cookbook::recipe::layout::Layout;
use cookbook::recipe::{Recipe, resolve_version, validate_recipe};
use std::path::Path;

/// Version of the recipe's package, resolved against its source tree
fn recipe_version(recipe: &Recipe, recipe_dir: &Path) -> Result<String> {
    let recipe_dir = std::path::absolute(recipe_dir)?;
    let layout = Layout::resolve(recipe, &recipe_dir, false);
    resolve_version(recipe, &layout.source_dir)
        .with_context(|| format!("Failed to resolve version of {}", recipe.package.name))
}

/// Print the resolved package version
pub fn cmd_version(recipe_path: &Path) -> Result<()> {
    let (recipe, recipe_dir) = load_recipe(recipe_path)?;
    println!("{}", recipe_version(&recipe, &recipe_dir)?);
    Ok(())
}

/// Show recipe metadata
pub fn cmd_inspect(recipe_path: &Path, json: bool) -> Result<()> {
    let (recipe, recipe_dir) = load_recipe(recipe_path)?;
    let version = recipe_version(&recipe, &recipe_dir).ok();

    if json {
        let mut value = serde_json::to_value(&recipe)?;
        if let (Some(obj), Some(v)) = (value.as_object_mut(), &version) {
            obj.insert("resolved_version".to_string(), serde_json::json!(v));
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let pkg = &recipe.package;
    println!("Package: {}", pkg.name);
    println!("  Version: {}", version.as_deref().unwrap_or("(unresolved)"));
    if let Some(license) = &pkg.license {
        println!("  License: {}", license);
    }
    if let Some(author) = &pkg.author {
        println!("  Author: {}", author);
    }
    if let Some(url) = &pkg.url {
        println!("  URL: {}", url);
    }
    if let Some(description) = &pkg.description {
        println!("  Description: {}", description);
    }
    if !pkg.topics.is_empty() {
        let topics: Vec<&str> = pkg.topics.iter().map(String::as_str).collect();
        println!("  Topics: {}", topics.join(", "));
    }

    println!("  Settings: {}", recipe.settings.join(", "));
    if !recipe.options.is_empty() {
        println!("  Options:");
        for (name, decl) in &recipe.options {
            let values: Vec<String> = decl.values.iter().map(|v| v.to_string()).collect();
            println!("    {} = {} [{}]", name, decl.default, values.join(", "));
        }
    }
    for req in &recipe.requires.host {
        println!("  Requires: {}", req);
    }
    for req in &recipe.requires.build {
        println!("  Build requires: {}", req);
    }
    if !recipe.generators.is_empty() {
        let generators: Vec<&str> = recipe.generators.iter().map(|g| g.as_str()).collect();
        println!("  Generators: {}", generators.join(", "));
    }
    println!(
        "  Build: {} (tests {}, staging {})",
        recipe.build.tool.as_str(),
        if recipe.build.run_tests { "on" } else { "off" },
        if recipe.build.stage_artifacts { "on" } else { "off" }
    );

    Ok(())
}

/// Parse and validate a recipe
pub fn cmd_validate(recipe_path: &Path) -> Result<()> {
    let (recipe, _) = load_recipe(recipe_path)?;

    let warnings = validate_recipe(&recipe).with_context(|| "Recipe validation failed")?;
    for warning in &warnings {
        println!("Warning: {}", warning);
    }

    println!("Recipe validation passed");
    if warnings.is_empty() {
        println!("[OK] No issues found");
    } else {
        println!("[OK] {} warning(s)", warnings.len());
    }
    Ok(())
}
