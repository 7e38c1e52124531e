// src/recipe/format.rs

//! Recipe file format definitions
//!
//! Recipes are TOML files that describe how to package a library built by
//! an external build tool: who the package is, which options and
//! requirements it declares, how the build is driven and which artifacts
//! end up in the package.

use crate::error::Result;
use crate::recipe::generators::Generator;
use crate::recipe::options::OptionDecl;
use crate::recipe::requirements::{Requirement, RequirementKind};
use crate::recipe::stage::{CopyRule, default_rules};
use crate::settings::SETTING_NAMES;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A complete package recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Package identity
    pub package: PackageSection,

    /// Settings exported to consumers
    #[serde(default = "default_settings")]
    pub settings: Vec<String>,

    /// Declared build options
    #[serde(default)]
    pub options: BTreeMap<String, OptionDecl>,

    /// Host and build requirements
    #[serde(default)]
    pub requires: RequiresSection,

    /// Consumer metadata generators
    #[serde(default)]
    pub generators: Vec<Generator>,

    /// How the build tool is driven
    #[serde(default)]
    pub build: BuildSection,

    /// Source/build directory layout
    #[serde(default)]
    pub layout: LayoutSection,

    /// Artifact copy rules (defaults apply when empty)
    #[serde(default)]
    pub copy: Vec<CopyRule>,
}

impl Recipe {
    /// All requirements, host first, in declaration order
    pub fn requirements(&self) -> Result<Vec<Requirement>> {
        let mut reqs = self.host_requirements()?;
        reqs.extend(self.build_requirements()?);
        Ok(reqs)
    }

    /// Requirements propagated to consumers
    pub fn host_requirements(&self) -> Result<Vec<Requirement>> {
        self.requires
            .host
            .iter()
            .map(|r| Requirement::parse(r, RequirementKind::Host))
            .collect()
    }

    /// Build-time only requirements
    pub fn build_requirements(&self) -> Result<Vec<Requirement>> {
        self.requires
            .build
            .iter()
            .map(|r| Requirement::parse(r, RequirementKind::Build))
            .collect()
    }

    /// Copy rules to apply when staging
    ///
    /// `include_dir` is the header source directory relative to the source
    /// root, used by the default header rule.
    pub fn copy_rules(&self, include_dir: &str) -> Vec<CopyRule> {
        if self.copy.is_empty() {
            default_rules(include_dir)
        } else {
            self.copy.clone()
        }
    }
}

/// Package identity section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSection {
    /// Package name
    pub name: String,

    /// Explicit version; normally left out and read from `version_from`
    #[serde(default)]
    pub version: Option<String>,

    /// Build description file scanned for `version: '...'`
    #[serde(default = "default_version_from")]
    pub version_from: String,

    /// License identifier (SPDX)
    #[serde(default)]
    pub license: Option<String>,

    #[serde(default)]
    pub author: Option<String>,

    /// Project URL
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Topic tags
    #[serde(default)]
    pub topics: BTreeSet<String>,
}

fn default_version_from() -> String {
    "meson.build".to_string()
}

fn default_settings() -> Vec<String> {
    SETTING_NAMES.iter().map(|s| s.to_string()).collect()
}

/// Requirement lists
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequiresSection {
    /// Propagated to consumers, e.g. `fmt/[>=7.0.3 <8.0.0]`
    #[serde(default)]
    pub host: Vec<String>,

    /// Needed only while building, e.g. `catch2/[>=2.13.0 <3.0.0]`
    #[serde(default)]
    pub build: Vec<String>,
}

/// External build systems cookbook can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildSystem {
    #[default]
    Meson,
}

impl BuildSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Meson => "meson",
        }
    }
}

/// Build instructions section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSection {
    /// Build system driving configure/build/test
    #[serde(default)]
    pub tool: BuildSystem,

    /// Run the project's test suite as part of every package build
    #[serde(default = "default_true")]
    pub run_tests: bool,

    /// Copy artifacts into the package; when false the cook only builds
    /// and verifies
    #[serde(default = "default_true")]
    pub stage_artifacts: bool,

    /// Option name -> build tool option name
    ///
    /// Boolean options listed here are passed to the tool when enabled,
    /// other values are always passed.
    #[serde(default)]
    pub definitions: BTreeMap<String, String>,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            tool: BuildSystem::default(),
            run_tests: true,
            stage_artifacts: true,
            definitions: BTreeMap::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Directory layout section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutSection {
    /// Sub directory of the recipe dir holding the sources
    #[serde(default)]
    pub source_subdir: Option<String>,

    /// Build directory, relative to the source dir
    #[serde(default = "default_build_dir")]
    pub build_dir: String,

    /// Header directory, relative to the source dir
    #[serde(default = "default_include_dir")]
    pub include_dir: String,

    /// Header directory used for local (developer) builds
    #[serde(default)]
    pub local_include_dir: Option<String>,
}

impl Default for LayoutSection {
    fn default() -> Self {
        Self {
            source_subdir: None,
            build_dir: default_build_dir(),
            include_dir: default_include_dir(),
            local_include_dir: None,
        }
    }
}

fn default_build_dir() -> String {
    "build".to_string()
}

fn default_include_dir() -> String {
    "include".to_string()
}
