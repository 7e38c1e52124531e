// src/recipe/mod.rs

//! Recipe system for packaging libraries built by an external build tool
//!
//! Recipes describe a C++ library package: its identity, settings, options,
//! requirements and how the build tool is driven. The kitchen turns a
//! recipe into a staged package with consumer metadata.
//!
//! # Culinary Terminology
//!
//! - **Recipe**: The package description (`recipe.toml`)
//! - **Kitchen**: Where recipes are cooked, owning the build tool
//! - **Cook**: One run through version, configure, build and test
//! - **Plate**: Stage artifacts and metadata into the package store
//! - **Taste**: Build and run a consumer project against the package
//!
//! # Example Recipe
//!
//! ```toml
//! generators = ["pkg_config"]
//!
//! [package]
//! name = "opzioni"
//! version_from = "meson.build"
//! license = "BSL-1.0"
//!
//! [options.shared]
//! values = [true, false]
//! default = false
//!
//! [requires]
//! host = ["fmt/[>=7.0.3 <8.0.0]"]
//! build = ["catch2/[>=2.13.0 <3.0.0]"]
//! ```

mod format;
pub mod generators;
pub mod kitchen;
pub mod layout;
pub mod options;
pub mod package_info;
pub mod parser;
pub mod requirements;
pub mod stage;
pub mod test_package;
pub mod version;

pub use format::{BuildSection, BuildSystem, LayoutSection, PackageSection, Recipe, RequiresSection};
pub use generators::Generator;
pub use kitchen::{
    BuildTool, ConfigureRequest, Cook, CookResult, CookStep, Kitchen, KitchenConfig, MesonTool,
    TasteResult, ToolOutput,
};
pub use options::{OptionDecl, OptionValue, ResolvedOptions};
pub use package_info::PackageInfo;
pub use parser::{parse_recipe, parse_recipe_file, validate_recipe};
pub use requirements::{Requirement, RequirementResolver, VersionConstraint};
pub use stage::CopyRule;
pub use test_package::{TestRecipe, load_test_recipe};
pub use version::{extract_version, resolve_version};
