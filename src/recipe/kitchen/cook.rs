// src/recipe/kitchen/cook.rs

//! Cook: the step-by-step packaging of a single recipe
//!
//! A [`Cook`] is the context threaded through every step of one package
//! build. It owns the resolved version, options and layout and enforces the
//! step order:
//!
//! ```text
//! Created -> VersionResolved -> Configured -> Built -> [Tested] -> [Packaged] -> Done
//! ```
//!
//! Any failure moves the cook to `Failed`, which is terminal.

use crate::error::{Error, Result};
use crate::recipe::format::Recipe;
use crate::recipe::generators::{Generator, write_generators};
use crate::recipe::layout::Layout;
use crate::recipe::options::{OptionValue, ResolvedOptions, resolve_options};
use crate::recipe::package_info::PackageInfo;
use crate::recipe::stage::{StageRoot, collect_libs, stage};
use crate::recipe::version::resolve_version;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::Kitchen;
use super::tool::{ConfigureRequest, ToolOutput};

/// Steps of a cook (and of a taste, which has the same shape)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CookStep {
    Created,
    VersionResolved,
    Configured,
    Built,
    Tested,
    Packaged,
    Done,
    Failed,
}

impl CookStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::VersionResolved => "version-resolved",
            Self::Configured => "configured",
            Self::Built => "built",
            Self::Tested => "tested",
            Self::Packaged => "packaged",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Whether `next` may follow this step
    pub fn can_advance_to(&self, next: CookStep) -> bool {
        use CookStep::*;

        match (*self, next) {
            (Done | Failed, _) => false,
            (_, Failed) => true,
            (Created, VersionResolved)
            | (VersionResolved, Configured)
            | (Configured, Built)
            | (Built, Tested | Packaged | Done)
            | (Tested, Packaged | Done)
            | (Packaged, Done) => true,
            _ => false,
        }
    }
}

impl fmt::Display for CookStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check and perform a step transition around some work
///
/// The transition is validated before `work` runs and only recorded if it
/// succeeds.
pub(super) fn transition<T, F>(step: &mut CookStep, next: CookStep, work: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    if !step.can_advance_to(next) {
        return Err(Error::InvalidStateError {
            from: step.as_str(),
            to: next.as_str(),
        });
    }

    let value = work()?;
    debug!("Step {} -> {}", step, next);
    *step = next;
    Ok(value)
}

/// Package id: a short hash of everything that changes the binaries
pub fn package_id(
    name: &str,
    version: &str,
    settings: &BTreeMap<String, String>,
    options: &ResolvedOptions,
    requires: &[String],
) -> String {
    let mut data = String::new();

    data.push_str(&format!("name:{}\nversion:{}\n", name, version));
    for (key, value) in settings {
        data.push_str(&format!("setting:{}={}\n", key, value));
    }
    for (key, value) in options.iter() {
        data.push_str(&format!("option:{}={}\n", key, value));
    }
    let mut requires = requires.to_vec();
    requires.sort();
    for req in requires {
        data.push_str(&format!("requires:{}\n", req));
    }

    let digest = Sha256::digest(data.as_bytes());
    hex::encode(&digest[..16])
}

/// A single cook operation
pub struct Cook<'a> {
    pub(super) kitchen: &'a Kitchen,
    pub(super) recipe: &'a Recipe,
    pub(super) layout: Layout,
    /// Build directory of this configuration, `<layout build dir>/<package id>`
    pub(super) build_dir: PathBuf,
    pub(super) cross_file: Option<PathBuf>,
    pub(super) options: ResolvedOptions,
    pub(super) step: CookStep,
    pub(super) version: Option<String>,
    pub(super) package_id: Option<String>,
    pub(super) package_dir: Option<PathBuf>,
    pub(super) info: Option<PackageInfo>,
    pub(super) staged: Vec<PathBuf>,
    pub(super) tested: bool,
    /// Build log accumulator
    pub(super) log: String,
    pub(super) warnings: Vec<String>,
}

impl<'a> Cook<'a> {
    pub(super) fn new(kitchen: &'a Kitchen, recipe: &'a Recipe, recipe_dir: &Path) -> Result<Self> {
        let options = resolve_options(&recipe.options, &kitchen.config.option_overrides)?;
        let recipe_dir = std::path::absolute(recipe_dir)?;
        let layout = Layout::resolve(recipe, &recipe_dir, kitchen.config.local);

        debug!(
            "Layout: source {} build {}",
            layout.source_dir.display(),
            layout.build_dir.display()
        );

        Ok(Self {
            kitchen,
            recipe,
            build_dir: layout.build_dir.clone(),
            cross_file: None,
            layout,
            options,
            step: CookStep::Created,
            version: None,
            package_id: None,
            package_dir: None,
            info: None,
            staged: Vec::new(),
            tested: false,
            log: String::new(),
            warnings: Vec::new(),
        })
    }

    pub fn step(&self) -> CookStep {
        self.step
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Mark the cook failed; terminal steps are left alone
    pub(super) fn fail(&mut self) {
        if !self.step.is_terminal() {
            self.step = CookStep::Failed;
        }
    }

    fn exported_settings(&self) -> BTreeMap<String, String> {
        self.kitchen.config.settings.exported(&self.recipe.settings)
    }

    /// Step 1: determine the package version
    pub(super) fn resolve_version(&mut self) -> Result<()> {
        let recipe = self.recipe;
        let source_dir = self.layout.source_dir.clone();
        let version = transition(&mut self.step, CookStep::VersionResolved, || {
            resolve_version(recipe, &source_dir)
        })?;

        let id = package_id(
            &recipe.package.name,
            &version,
            &self.exported_settings(),
            &self.options,
            &recipe.requires.host,
        );
        info!("{} version {} (package id {})", recipe.package.name, version, id);
        self.log_line(&format!("Resolved version {}", version));

        self.build_dir = self.layout.build_dir.join(&id);
        self.version = Some(version);
        self.package_id = Some(id);
        Ok(())
    }

    /// Project options passed to the build tool
    ///
    /// Boolean options are only passed when enabled; other values are
    /// always passed.
    pub(super) fn definitions(&self) -> Vec<(String, String)> {
        self.recipe
            .build
            .definitions
            .iter()
            .filter_map(|(option, tool_name)| match self.options.get(option)? {
                OptionValue::Bool(true) => Some((tool_name.clone(), "true".to_string())),
                OptionValue::Bool(false) => None,
                other => Some((tool_name.clone(), other.to_string())),
            })
            .collect()
    }

    /// Step 2: configure the build directory
    pub(super) fn configure(&mut self) -> Result<()> {
        let request = ConfigureRequest {
            source_dir: self.layout.source_dir.clone(),
            build_dir: self.build_dir.clone(),
            definitions: self.definitions(),
            shared: self.options.get("shared").and_then(OptionValue::as_bool),
            build_type: self.kitchen.config.settings.build_type.clone(),
            env: Vec::new(),
            cross_file: self.cross_file.clone(),
        };
        let tool = self.kitchen.tool.as_ref();

        let output = transition(&mut self.step, CookStep::Configured, || {
            fs::create_dir_all(&request.build_dir)?;
            tool.configure(&request)
        })?;
        self.log_build_output("configure", &output);
        Ok(())
    }

    /// Step 3: compile
    pub(super) fn build(&mut self) -> Result<()> {
        let tool = self.kitchen.tool.as_ref();
        let build_dir = &self.build_dir;
        let output = transition(&mut self.step, CookStep::Built, || tool.build(build_dir))?;
        self.log_build_output("build", &output);
        Ok(())
    }

    /// Step 4 (optional): run the test suite
    pub(super) fn test(&mut self) -> Result<()> {
        let tool = self.kitchen.tool.as_ref();
        let build_dir = &self.build_dir;
        let output = transition(&mut self.step, CookStep::Tested, || tool.test(build_dir))?;
        self.log_build_output("test", &output);
        self.tested = true;
        Ok(())
    }

    /// Step 5 (optional): plate - stage artifacts and write metadata
    pub(super) fn plate(&mut self) -> Result<PathBuf> {
        let (version, id) = match (&self.version, &self.package_id) {
            (Some(v), Some(id)) => (v.clone(), id.clone()),
            _ => {
                return Err(Error::InvalidStateError {
                    from: self.step.as_str(),
                    to: CookStep::Packaged.as_str(),
                });
            }
        };

        let package_dir = self
            .kitchen
            .config
            .package_root
            .join(&self.recipe.package.name)
            .join(&version)
            .join(&id);
        let mut step = self.step;
        let (staged, info) = transition(&mut step, CookStep::Packaged, || {
            self.stage_atomically(&package_dir)
        })?;
        self.step = step;

        if staged.is_empty() {
            self.warnings
                .push("No artifacts matched any copy rule".to_string());
        }
        self.log_line(&format!(
            "Staged {} file(s) into {}",
            staged.len(),
            package_dir.display()
        ));

        self.staged = staged;
        self.info = Some(info);
        self.package_dir = Some(package_dir.clone());
        Ok(package_dir)
    }

    /// Stage into a scratch sibling of `package_dir`, then move it into place
    ///
    /// A failed staging leaves no partial package behind; a previous package
    /// with the same id is only replaced once the new one is complete.
    fn stage_atomically(&self, package_dir: &Path) -> Result<(Vec<PathBuf>, PackageInfo)> {
        let parent = package_dir.parent().ok_or_else(|| {
            Error::ConfigError(format!("Invalid package directory {}", package_dir.display()))
        })?;
        fs::create_dir_all(parent)?;

        let scratch = tempfile::Builder::new().prefix(".staging-").tempdir_in(parent)?;
        let staged = self.stage_into(scratch.path(), package_dir)?;

        if package_dir.exists() {
            debug!("Replacing existing package {}", package_dir.display());
            fs::remove_dir_all(package_dir)?;
        }
        fs::rename(scratch.path(), package_dir)?;
        Ok(staged)
    }

    /// Copy artifacts into `target` and write metadata for a package that
    /// will live at `package_dir`
    fn stage_into(&self, target: &Path, package_dir: &Path) -> Result<(Vec<PathBuf>, PackageInfo)> {
        let rules = self.recipe.copy_rules(&self.layout.include_dir);
        let roots = [
            StageRoot::new(&self.layout.source_dir).excluding(&self.layout.build_dir),
            StageRoot::new(&self.build_dir),
        ];

        let mut staged = stage(&rules, &roots, target)?;
        let libs = collect_libs(target)?;
        let info = self.package_info(libs);

        if info.generators.contains(&Generator::PkgConfig) {
            let pc_dir = target.join("lib").join("pkgconfig");
            for path in write_generators(&info, package_dir, &pc_dir, &[Generator::PkgConfig])? {
                if let Ok(rel) = path.strip_prefix(target) {
                    staged.push(rel.to_path_buf());
                }
            }
        }

        info.save(target)?;
        Ok((staged, info))
    }

    /// Final step
    pub(super) fn finish(&mut self) -> Result<()> {
        transition(&mut self.step, CookStep::Done, || Ok(()))
    }

    /// Consumer metadata for the current state of the cook
    pub(super) fn package_info(&self, libs: Vec<String>) -> PackageInfo {
        let pkg = &self.recipe.package;

        PackageInfo {
            name: pkg.name.clone(),
            version: self.version.clone().unwrap_or_default(),
            package_id: self.package_id.clone().unwrap_or_default(),
            license: pkg.license.clone(),
            author: pkg.author.clone(),
            url: pkg.url.clone(),
            description: pkg.description.clone(),
            topics: pkg.topics.clone(),
            settings: self.exported_settings(),
            options: self.options.clone(),
            requires: self.recipe.requires.host.clone(),
            build_requires: self.recipe.requires.build.clone(),
            generators: self.recipe.generators.clone(),
            libs,
            include_dirs: vec!["include".to_string()],
            lib_dirs: vec!["lib".to_string()],
            bin_dirs: vec!["bin".to_string()],
            pkg_config_name: pkg.name.clone(),
            created: Utc::now(),
        }
    }

    pub(super) fn log_line(&mut self, line: &str) {
        self.log.push_str(line);
        self.log.push('\n');
    }

    /// Log build step output (stdout/stderr) with a phase header
    pub(super) fn log_build_output(&mut self, phase: &str, output: &ToolOutput) {
        self.log_line(&format!("=== {} ===", phase));
        if !output.stdout.is_empty() {
            self.log.push_str(&output.stdout);
            self.log.push('\n');
        }
        if !output.stderr.is_empty() {
            self.log.push_str(&output.stderr);
            self.log.push('\n');
        }
    }
}
