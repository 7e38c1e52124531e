// src/recipe/layout.rs

//! Resolution of source, build and header directories for a cook

use crate::recipe::format::Recipe;
use std::path::{Component, Path, PathBuf};

/// Absolute directories used by one cook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Directory holding the build description and sources
    pub source_dir: PathBuf,
    /// Build tool output directory
    pub build_dir: PathBuf,
    /// Header directory, relative to `source_dir`
    pub include_dir: String,
}

impl Layout {
    /// Resolve the layout of `recipe` located in `recipe_dir`
    ///
    /// When the build directory would coincide with the source directory a
    /// nested `build` directory is used instead. `local` selects the local
    /// (developer) header directory when the recipe declares one.
    pub fn resolve(recipe: &Recipe, recipe_dir: &Path, local: bool) -> Self {
        let layout = &recipe.layout;

        let source_dir = match &layout.source_subdir {
            Some(sub) => normalize(&recipe_dir.join(sub)),
            None => normalize(recipe_dir),
        };

        let mut build_dir = normalize(&source_dir.join(&layout.build_dir));
        if build_dir == source_dir {
            build_dir = source_dir.join("build");
        }

        let include_dir = match (&layout.local_include_dir, local) {
            (Some(dir), true) => dir.clone(),
            _ => layout.include_dir.clone(),
        };

        Self {
            source_dir,
            build_dir,
            include_dir,
        }
    }
}

/// Lexically normalize a path, dropping `.` and folding `..`
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
