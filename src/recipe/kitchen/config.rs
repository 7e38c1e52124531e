// src/recipe/kitchen/config.rs

//! Configuration types for the Kitchen

use crate::recipe::kitchen::cook::CookStep;
use crate::recipe::package_info::PackageInfo;
use crate::recipe::requirements::RequirementReport;
use crate::settings::Settings;
use std::path::PathBuf;

/// Configuration for the Kitchen
///
/// The `Option<bool>` switches override what the recipe itself declares;
/// `None` leaves the recipe's choice in place.
#[derive(Debug, Clone)]
pub struct KitchenConfig {
    /// Root of the local package store
    pub package_root: PathBuf,
    /// Settings to build for
    pub settings: Settings,
    /// Option choices from the user (`name`, `value`)
    pub option_overrides: Vec<(String, String)>,
    /// Run the test suite after building
    pub run_tests: Option<bool>,
    /// Copy artifacts into the package store
    pub stage_artifacts: Option<bool>,
    /// Local (developer) mode: use the local header layout
    pub local: bool,
    /// Check requirements against the configured resolver before building
    pub check_requirements: bool,
    /// Keep the consumer build directory after tasting
    pub keep_builddir: bool,
    /// Build tool cross file; required when the settings target another machine
    pub cross_file: Option<PathBuf>,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        Self {
            package_root: default_package_root(),
            settings: Settings::host(),
            option_overrides: Vec::new(),
            run_tests: None,
            stage_artifacts: None,
            local: false,
            check_requirements: false,
            keep_builddir: false,
            cross_file: None,
        }
    }
}

/// `<data dir>/cookbook/packages`, or `./.cookbook/packages` without one
pub fn default_package_root() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("cookbook").join("packages"))
        .unwrap_or_else(|| PathBuf::from(".cookbook").join("packages"))
}

/// Result of cooking a recipe
#[derive(Debug)]
pub struct CookResult {
    /// Package directory, when artifacts were staged
    pub package_dir: Option<PathBuf>,
    /// Consumer metadata
    pub info: PackageInfo,
    /// Staged files relative to `package_dir`
    pub staged: Vec<PathBuf>,
    /// Whether the test suite ran
    pub tested: bool,
    /// Requirement check outcome (if checking was enabled)
    pub requirements: Option<RequirementReport>,
    /// Build log
    pub log: String,
    /// Warnings generated during the cook
    pub warnings: Vec<String>,
    /// Step the cook ended in
    pub final_step: CookStep,
}
