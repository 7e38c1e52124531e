// src/recipe/parser.rs

//! Recipe file parsing

use crate::error::{Error, Result};
use crate::recipe::format::Recipe;
use crate::recipe::options::validate_decls;
use crate::settings::SETTING_NAMES;
use std::path::{Path, PathBuf};

/// Default recipe file name inside a recipe directory
pub const RECIPE_FILE: &str = "recipe.toml";

/// Parse a recipe from a TOML string
pub fn parse_recipe(content: &str) -> Result<Recipe> {
    toml::from_str(content).map_err(|e| Error::ParseError(format!("Invalid recipe: {}", e)))
}

/// Parse a recipe from a file
pub fn parse_recipe_file(path: &Path) -> Result<Recipe> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::NotFoundError(format!("Failed to read recipe file {}: {}", path.display(), e))
    })?;

    parse_recipe(&content)
}

/// Locate the recipe file for a path that is either the file or its directory
pub fn recipe_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(RECIPE_FILE)
    } else {
        path.to_path_buf()
    }
}

/// Validate a recipe for completeness and correctness
///
/// Hard errors are returned as `Err`; softer issues come back as warnings.
pub fn validate_recipe(recipe: &Recipe) -> Result<Vec<String>> {
    let mut warnings = Vec::new();

    if recipe.package.name.trim().is_empty() {
        return Err(Error::ConfigError("Recipe package name cannot be empty".to_string()));
    }
    if recipe.package.version_from.trim().is_empty() && recipe.package.version.is_none() {
        return Err(Error::ConfigError(
            "Recipe needs either package.version or package.version_from".to_string(),
        ));
    }

    for setting in &recipe.settings {
        if !SETTING_NAMES.contains(&setting.as_str()) {
            return Err(Error::ConfigError(format!(
                "Unknown setting '{}' (expected one of: {})",
                setting,
                SETTING_NAMES.join(", ")
            )));
        }
    }

    validate_decls(&recipe.options)?;
    recipe.requirements()?;

    for option in recipe.build.definitions.keys() {
        if !recipe.options.contains_key(option) {
            return Err(Error::ConfigError(format!(
                "Build definition refers to undeclared option '{}'",
                option
            )));
        }
    }

    if recipe.package.license.is_none() {
        warnings.push("Missing package license".to_string());
    }
    if recipe.package.author.is_none() {
        warnings.push("Missing package author".to_string());
    }
    if recipe.package.url.is_none() {
        warnings.push("Missing package url".to_string());
    }
    if recipe.package.description.is_none() {
        warnings.push("Missing package description".to_string());
    }
    if recipe.package.topics.is_empty() {
        warnings.push("No topics declared".to_string());
    }
    if !recipe.build.stage_artifacts {
        warnings.push("Artifact staging disabled: cooking only builds and verifies".to_string());
    }

    Ok(warnings)
}
