// src/recipe/version.rs

//! Package version resolution
//!
//! The package version is not written in the recipe. It is read from the
//! project's build description (`meson.build` by default), which must carry
//! a `version: '<value>'` entry.

use crate::error::{Error, Result};
use crate::recipe::format::Recipe;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bversion\s*:\s*'([^']*)'").expect("version pattern is valid"));

/// Extract the version from build description text
///
/// The first `version: '...'` entry wins. The value is trimmed and must not
/// be empty.
pub fn extract_version(content: &str) -> Result<String> {
    let captures = VERSION_RE.captures(content).ok_or_else(|| {
        Error::ConfigError("No version: '<value>' entry found in build description".to_string())
    })?;

    let version = captures[1].trim();
    if version.is_empty() {
        return Err(Error::ConfigError(
            "Build description declares an empty version".to_string(),
        ));
    }

    Ok(version.to_string())
}

/// Resolve the version of a recipe's package
///
/// An explicit `package.version` takes precedence; otherwise the file named
/// by `package.version_from` is read relative to `source_dir`. Never writes.
pub fn resolve_version(recipe: &Recipe, source_dir: &Path) -> Result<String> {
    if let Some(explicit) = &recipe.package.version {
        let explicit = explicit.trim();
        if explicit.is_empty() {
            return Err(Error::ConfigError("Recipe package version cannot be empty".to_string()));
        }
        return Ok(explicit.to_string());
    }

    let path = source_dir.join(&recipe.package.version_from);
    debug!("Reading version from {}", path.display());

    let content = fs::read_to_string(&path).map_err(|e| {
        Error::ConfigError(format!(
            "Failed to read build description {}: {}",
            path.display(),
            e
        ))
    })?;

    extract_version(&content).map_err(|e| match e {
        Error::ConfigError(msg) => Error::ConfigError(format!("{} ({})", msg, path.display())),
        other => other,
    })
}
