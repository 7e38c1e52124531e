// src/recipe/test_package.rs

//! Test-package recipes
//!
//! A test package is a tiny consumer project shipped next to a recipe
//! (`test_package/`). Its recipe says how to build it against a staged
//! package and which program to run afterwards.
//!
//! ```toml
//! generators = ["pkg_config"]
//!
//! [requires]
//! build = ["fmt/6.2.1"]
//!
//! [run]
//! executable = "main"
//! args = ["Unknown"]
//! ```

use crate::error::{Error, Result};
use crate::recipe::format::{BuildSystem, RequiresSection};
use crate::recipe::generators::Generator;
use crate::recipe::requirements::{Requirement, RequirementKind};
use crate::settings::SETTING_NAMES;
use serde::{Deserialize, Serialize};
use std::path::{MAIN_SEPARATOR, Path};

/// Directory holding the test package, relative to the recipe directory
pub const TEST_PACKAGE_DIR: &str = "test_package";

/// A consumer project used to verify a staged package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRecipe {
    #[serde(default = "default_settings")]
    pub settings: Vec<String>,

    #[serde(default)]
    pub requires: RequiresSection,

    #[serde(default = "default_generators")]
    pub generators: Vec<Generator>,

    #[serde(default)]
    pub build: TestBuildSection,

    #[serde(default)]
    pub run: RunSection,
}

impl Default for TestRecipe {
    fn default() -> Self {
        Self {
            settings: default_settings(),
            requires: RequiresSection::default(),
            generators: default_generators(),
            build: TestBuildSection::default(),
            run: RunSection::default(),
        }
    }
}

impl TestRecipe {
    /// Build-only requirements of the consumer project
    pub fn build_requirements(&self) -> Result<Vec<Requirement>> {
        self.requires
            .build
            .iter()
            .map(|r| Requirement::parse(r, RequirementKind::Build))
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestBuildSection {
    #[serde(default)]
    pub tool: BuildSystem,
}

/// The program run after the consumer project builds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSection {
    /// Executable name inside the build directory
    #[serde(default = "default_executable")]
    pub executable: String,

    #[serde(default = "default_args")]
    pub args: Vec<String>,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            args: default_args(),
        }
    }
}

impl RunSection {
    /// Command line as run from inside the build directory (`./main Unknown`)
    pub fn command_line(&self) -> String {
        let mut line = format!(".{}{}", MAIN_SEPARATOR, self.executable);
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

fn default_settings() -> Vec<String> {
    SETTING_NAMES.iter().map(|s| s.to_string()).collect()
}

fn default_generators() -> Vec<Generator> {
    vec![Generator::PkgConfig]
}

fn default_executable() -> String {
    "main".to_string()
}

fn default_args() -> Vec<String> {
    vec!["Unknown".to_string()]
}

/// Parse a test recipe from a TOML string
pub fn parse_test_recipe(content: &str) -> Result<TestRecipe> {
    let recipe: TestRecipe = toml::from_str(content)
        .map_err(|e| Error::ParseError(format!("Invalid test recipe: {}", e)))?;

    if recipe.run.executable.trim().is_empty() {
        return Err(Error::ConfigError("Test recipe run.executable cannot be empty".to_string()));
    }
    recipe.build_requirements()?;

    Ok(recipe)
}

/// Load the test recipe of a test-package directory
///
/// A directory without `recipe.toml` gets the default test recipe.
pub fn load_test_recipe(test_dir: &Path) -> Result<TestRecipe> {
    let path = test_dir.join(crate::recipe::parser::RECIPE_FILE);
    if !path.exists() {
        return Ok(TestRecipe::default());
    }

    let content = std::fs::read_to_string(&path)?;
    parse_test_recipe(&content)
}
