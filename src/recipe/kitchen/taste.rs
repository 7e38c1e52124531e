// src/recipe/kitchen/taste.rs

//! Tasting: verify a staged package by building a consumer against it
//!
//! The consumer project is configured and built in a scratch directory with
//! the package's generator files on `PKG_CONFIG_PATH`, then its program is
//! run. When cross-building the program cannot execute on this machine, so
//! the run is skipped.

use crate::error::Result;
use crate::recipe::generators::write_generators;
use crate::recipe::package_info::PackageInfo;
use crate::recipe::test_package::TestRecipe;
use crate::settings::Settings;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::Kitchen;
use super::cook::{CookStep, transition};
use super::tool::{ConfigureRequest, ToolOutput};

/// Result of tasting a package
#[derive(Debug)]
pub struct TasteResult {
    /// `name/version` of the package under test
    pub package: String,
    /// The command run inside the build directory, e.g. `./main Unknown`
    pub command: String,
    /// True when the program was not run because of cross-building
    pub run_skipped: bool,
    /// Output of the program, when it ran
    pub output: Option<ToolOutput>,
    /// Consumer build directory, when kept
    pub build_dir: Option<PathBuf>,
    pub log: String,
    pub warnings: Vec<String>,
    pub final_step: CookStep,
}

impl Kitchen {
    /// Build the test package in `test_dir` against the package staged in
    /// `package_dir` and run its program
    pub fn taste(&self, test: &TestRecipe, test_dir: &Path, package_dir: &Path) -> Result<TasteResult> {
        let test_dir = std::path::absolute(test_dir)?;
        let package_dir = std::path::absolute(package_dir)?;
        let mut step = CookStep::Created;
        let mut log = String::new();
        let mut warnings = Vec::new();

        let info = transition(&mut step, CookStep::VersionResolved, || {
            PackageInfo::load(&package_dir)
        })?;
        info!("Tasting {}", info.reference());

        let cross_file = self.cross_file()?;
        self.require(&test.build_requirements()?)?;

        for name in &test.settings {
            if let (Some(built), Some(wanted)) = (info.settings.get(name), self.config.settings.get(name))
                && built != wanted
            {
                let message = format!(
                    "Package was built with {}={} but tasting with {}={}",
                    name, built, name, wanted
                );
                warn!("{}", message);
                warnings.push(message);
            }
        }

        let workspace = tempfile::Builder::new().prefix("cookbook-taste-").tempdir()?;
        let build_dir = workspace.path().join("build");
        let generators_dir = workspace.path().join("generators");
        let command = test.run.command_line();
        let cross = self.config.settings.is_cross_building(&Settings::host());

        let outcome = (|| -> Result<Option<ToolOutput>> {
            let request = transition(&mut step, CookStep::Configured, || {
                let written = write_generators(&info, &package_dir, &generators_dir, &test.generators)?;
                debug!("Wrote {} generator file(s)", written.len());

                let request = ConfigureRequest {
                    source_dir: test_dir.clone(),
                    build_dir: build_dir.clone(),
                    definitions: Vec::new(),
                    shared: None,
                    build_type: self.config.settings.build_type.clone(),
                    env: vec![("PKG_CONFIG_PATH".to_string(), pkg_config_path(&generators_dir))],
                    cross_file: cross_file.clone(),
                };
                let output = self.tool.configure(&request)?;
                append_output(&mut log, "configure", &output);
                Ok(request)
            })?;

            transition(&mut step, CookStep::Built, || {
                let output = self.tool.build(&request.build_dir)?;
                append_output(&mut log, "build", &output);
                Ok(())
            })?;

            let output = transition(&mut step, CookStep::Tested, || {
                if cross {
                    info!("Cross-building for {}, skipping {}", self.config.settings, command);
                    return Ok(None);
                }

                info!("Running {}", command);
                let program = build_dir.join(executable_name(&test.run.executable));
                let output = self.tool.run(&program, &test.run.args, &build_dir)?;
                append_output(&mut log, &command, &output);
                Ok(Some(output))
            })?;

            transition(&mut step, CookStep::Done, || Ok(()))?;
            Ok(output)
        })();

        let kept = if self.config.keep_builddir {
            let path = workspace.keep();
            info!("Keeping consumer build directory {}", path.display());
            Some(path.join("build"))
        } else {
            None
        };

        match outcome {
            Ok(output) => Ok(TasteResult {
                package: info.reference(),
                command,
                run_skipped: cross,
                output,
                build_dir: kept,
                log,
                warnings,
                final_step: step,
            }),
            Err(e) => {
                warn!("Tasting {} failed after step {}: {}", info.reference(), step, e);
                Err(e)
            }
        }
    }
}

/// `PKG_CONFIG_PATH` with `dir` in front of any inherited value
fn pkg_config_path(dir: &Path) -> String {
    let mut paths = vec![dir.to_path_buf()];
    if let Some(existing) = env::var_os("PKG_CONFIG_PATH") {
        paths.extend(env::split_paths(&existing));
    }
    env::join_paths(paths)
        .unwrap_or_else(|_| OsString::from(dir.as_os_str()))
        .to_string_lossy()
        .to_string()
}

/// Executable file name on this machine (`main` or `main.exe`)
fn executable_name(name: &str) -> String {
    if Path::new(name).extension().is_some() {
        name.to_string()
    } else {
        format!("{}{}", name, env::consts::EXE_SUFFIX)
    }
}

fn append_output(log: &mut String, phase: &str, output: &ToolOutput) {
    log.push_str(&format!("=== {} ===\n", phase));
    for text in [&output.stdout, &output.stderr] {
        if !text.is_empty() {
            log.push_str(text);
            log.push('\n');
        }
    }
}
