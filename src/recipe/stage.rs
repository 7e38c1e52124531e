// src/recipe/stage.rs

//! Artifact staging: copying build outputs into the package tree
//!
//! Each copy rule selects files by a shell-style pattern matched against
//! their path relative to the rule's source directory (`*` also crosses
//! directory separators) and copies them under `dst` in the package,
//! optionally flattening the directory structure.

use crate::error::{Error, Result};
use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// One artifact copy rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyRule {
    /// File pattern, e.g. `*.hpp` or `*.dylib*`
    pub pattern: String,

    /// Destination sub directory inside the package
    pub dst: String,

    /// Source sub directory inside each search root
    #[serde(default)]
    pub src: Option<String>,

    /// Keep the path relative to `src`; false copies to `dst` flat
    #[serde(default = "default_keep_path")]
    pub keep_path: bool,
}

fn default_keep_path() -> bool {
    true
}

impl CopyRule {
    pub fn new(pattern: &str, dst: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            dst: dst.to_string(),
            src: None,
            keep_path: true,
        }
    }

    pub fn from_src(mut self, src: &str) -> Self {
        self.src = Some(src.to_string());
        self
    }

    pub fn flatten(mut self) -> Self {
        self.keep_path = false;
        self
    }
}

/// Standard rules for a C++ library package
///
/// Headers keep their layout under `include`; libraries are flattened into
/// `lib`, except Windows DLLs which go to `bin`.
pub fn default_rules(include_dir: &str) -> Vec<CopyRule> {
    vec![
        CopyRule::new("*.hpp", "include").from_src(include_dir),
        CopyRule::new("*.lib", "lib").flatten(),
        CopyRule::new("*.dll", "bin").flatten(),
        CopyRule::new("*.dylib*", "lib").flatten(),
        CopyRule::new("*.so", "lib").flatten(),
        CopyRule::new("*.a", "lib").flatten(),
    ]
}

/// A directory searched by copy rules
#[derive(Debug, Clone)]
pub struct StageRoot {
    pub path: PathBuf,
    /// Sub tree skipped while walking (the build dir inside a source dir)
    pub exclude: Option<PathBuf>,
}

impl StageRoot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            exclude: None,
        }
    }

    pub fn excluding(mut self, dir: impl Into<PathBuf>) -> Self {
        self.exclude = Some(dir.into());
        self
    }
}

/// Apply copy rules to every root, copying matches into `package_dir`
///
/// Rules matching nothing are skipped. Existing package contents are never
/// removed. Each source file is copied at most once per rule. Returns the
/// staged paths, relative to `package_dir`.
pub fn stage(rules: &[CopyRule], roots: &[StageRoot], package_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(package_dir)?;
    let mut staged = Vec::new();

    for rule in rules {
        let pattern = Pattern::new(&rule.pattern).map_err(|e| {
            Error::ConfigError(format!("Invalid copy pattern '{}': {}", rule.pattern, e))
        })?;
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut matched = 0usize;

        for root in roots {
            let base = match &rule.src {
                Some(src) => root.path.join(src),
                None => root.path.clone(),
            };
            if !base.is_dir() {
                continue;
            }

            for entry in WalkDir::new(&base)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| root.exclude.as_deref() != Some(e.path()))
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                let path = entry.path();
                let relative = match path.strip_prefix(&base) {
                    Ok(r) => r,
                    Err(_) => continue,
                };
                if !pattern.matches_path_with(relative, MATCH_OPTIONS) {
                    continue;
                }

                let canonical = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
                if !seen.insert(canonical) {
                    continue;
                }

                let target_rel = if rule.keep_path {
                    Path::new(&rule.dst).join(relative)
                } else {
                    Path::new(&rule.dst).join(entry.file_name())
                };
                let target = package_dir.join(&target_rel);
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }

                fs::copy(path, &target)?;
                debug!("Staged {} -> {}", path.display(), target_rel.display());
                staged.push(target_rel);
                matched += 1;
            }
        }

        if matched == 0 {
            debug!("Copy rule '{}' matched nothing", rule.pattern);
        }
    }

    info!("Staged {} file(s) into {}", staged.len(), package_dir.display());
    Ok(staged)
}

/// Library names a consumer links against
///
/// Scans `lib/` and `bin/` of a staged package for `.a`, `.lib`, `.so`
/// (also versioned, `libfoo.so.1.2`) and `.dylib` files and strips the
/// `lib` prefix on Unix-style names.
pub fn collect_libs(package_dir: &Path) -> Result<Vec<String>> {
    let mut libs = BTreeSet::new();

    for dir in ["lib", "bin"] {
        let dir = package_dir.join(dir);
        if !dir.is_dir() {
            continue;
        }

        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if let Some(name) = library_name(file_name) {
                libs.insert(name.to_string());
            }
        }
    }

    Ok(libs.into_iter().collect())
}

/// Link name of a library file, `None` for anything else
fn library_name(file_name: &str) -> Option<&str> {
    if let Some((base, _)) = file_name.split_once(".so.") {
        return Some(base.strip_prefix("lib").unwrap_or(base));
    }

    let (stem, ext) = file_name.rsplit_once('.')?;
    match ext {
        "lib" => Some(stem),
        "a" | "so" | "dylib" => Some(stem.strip_prefix("lib").unwrap_or(stem)),
        _ => None,
    }
}
