// src/recipe/kitchen/mod.rs

//! Kitchen: where recipes are cooked and tasted
//!
//! The Kitchen drives a recipe through its build workflow:
//! - Resolving the package version from the project's build description
//! - Configuring, building and testing through a [`BuildTool`]
//! - Staging artifacts and metadata into the local package store
//! - Tasting the result by building and running a consumer project

mod config;
mod cook;
mod taste;
pub mod tool;

pub use config::{CookResult, KitchenConfig, default_package_root};
pub use cook::{Cook, CookStep, package_id};
pub use taste::TasteResult;
pub use tool::{BuildTool, ConfigureRequest, MesonTool, ToolOutput};

use crate::error::{Error, Result};
use crate::recipe::format::Recipe;
use crate::recipe::requirements::{
    Requirement, RequirementReport, RequirementResolver, check_requirements,
};
use crate::settings::Settings;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The Kitchen: where recipes are cooked
pub struct Kitchen {
    pub(crate) config: KitchenConfig,
    tool: Box<dyn BuildTool>,
    /// Optional resolver for requirement checks
    resolver: Option<Arc<dyn RequirementResolver>>,
}

impl Kitchen {
    /// Create a new Kitchen with the given configuration and build tool
    pub fn new(config: KitchenConfig, tool: Box<dyn BuildTool>) -> Self {
        Self {
            config,
            tool,
            resolver: None,
        }
    }

    /// Create a new Kitchen with a requirement resolver
    pub fn with_resolver(
        config: KitchenConfig,
        tool: Box<dyn BuildTool>,
        resolver: Arc<dyn RequirementResolver>,
    ) -> Self {
        Self {
            config,
            tool,
            resolver: Some(resolver),
        }
    }

    /// Set the requirement resolver
    pub fn set_resolver(&mut self, resolver: Arc<dyn RequirementResolver>) {
        self.resolver = Some(resolver);
    }

    pub fn config(&self) -> &KitchenConfig {
        &self.config
    }

    /// Check `requirements` when requirement checking is enabled
    ///
    /// Fails when any of them is missing or outside its constraint.
    pub(crate) fn require(&self, requirements: &[Requirement]) -> Result<Option<RequirementReport>> {
        if !self.config.check_requirements {
            return Ok(None);
        }

        info!("Checking requirements...");
        let report = match &self.resolver {
            Some(resolver) => check_requirements(requirements, resolver.as_ref())?,
            None => {
                debug!("No requirement resolver configured, assuming all requirements are available");
                RequirementReport::default()
            }
        };
        if !report.is_satisfied() {
            return Err(Error::ResolutionError(report.unresolved_summary()));
        }
        Ok(Some(report))
    }

    /// Cross file handed to the build tool
    ///
    /// Settings naming another machine cannot be built without one.
    pub(crate) fn cross_file(&self) -> Result<Option<PathBuf>> {
        let settings = &self.config.settings;
        if settings.is_cross_building(&Settings::host()) && self.config.cross_file.is_none() {
            return Err(Error::ConfigError(format!(
                "Settings {} target another machine than {}; pass a cross file",
                settings,
                Settings::host()
            )));
        }
        Ok(self.config.cross_file.clone())
    }

    /// Cook a recipe located in `recipe_dir`
    ///
    /// ## Cooking Process
    /// 1. **Requirements**: check declared requirements (if enabled)
    /// 2. **Version**: resolve the package version
    /// 3. **Configure**: set up the build directory
    /// 4. **Build**: compile
    /// 5. **Test**: run the project's tests (if enabled)
    /// 6. **Plate**: stage artifacts and write package metadata (if enabled)
    ///
    /// The first failing step aborts the cook; nothing after it runs.
    pub fn cook(&self, recipe: &Recipe, recipe_dir: &Path) -> Result<CookResult> {
        info!("Cooking {}", recipe.package.name);

        if !self.tool.availability() {
            return Err(Error::NotFoundError(format!(
                "build tool {} is not available",
                self.tool.name()
            )));
        }

        let cross_file = self.cross_file()?;
        let requirements = self.require(&recipe.requirements()?)?;

        let run_tests = self.config.run_tests.unwrap_or(recipe.build.run_tests);
        let stage_artifacts = self
            .config
            .stage_artifacts
            .unwrap_or(recipe.build.stage_artifacts);

        let mut cook = Cook::new(self, recipe, recipe_dir)?;
        cook.cross_file = cross_file;

        let outcome = (|| -> Result<()> {
            info!("Resolving version...");
            cook.resolve_version()?;

            info!("Configuring with {}...", self.tool.name());
            cook.configure()?;

            info!("Building...");
            cook.build()?;

            if run_tests {
                info!("Running tests...");
                cook.test()?;
            } else {
                debug!("Tests disabled for this cook");
            }

            if stage_artifacts {
                info!("Plating: staging artifacts...");
                cook.plate()?;
            } else {
                info!("Artifact staging disabled, build verified only");
                cook.warnings
                    .push("Artifact staging disabled: no package was produced".to_string());
            }

            cook.finish()
        })();

        if let Err(e) = outcome {
            let failed_at = cook.step();
            cook.fail();
            warn!("Cook of {} failed after step {}: {}", recipe.package.name, failed_at, e);
            return Err(e);
        }

        let info = match cook.info.take() {
            Some(info) => info,
            None => cook.package_info(Vec::new()),
        };

        info!(
            "Cooked {} ({} file(s) staged)",
            info.reference(),
            cook.staged.len()
        );

        Ok(CookResult {
            package_dir: cook.package_dir,
            info,
            staged: cook.staged,
            tested: cook.tested,
            requirements,
            log: cook.log,
            warnings: cook.warnings,
            final_step: cook.step,
        })
    }
}
