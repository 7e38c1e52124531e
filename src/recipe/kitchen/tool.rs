// src/recipe/kitchen/tool.rs

//! External build tool capability
//!
//! The kitchen never shells out directly: configure, build, test and run
//! go through a [`BuildTool`]. Production cooks use [`MesonTool`]; tests
//! inject fakes that record calls and fabricate artifacts.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Captured output of a tool invocation
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Everything the configure step needs
#[derive(Debug, Clone)]
pub struct ConfigureRequest {
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    /// Project options, in order (`build_examples=true`, ...)
    pub definitions: Vec<(String, String)>,
    /// Shared (true) or static (false) libraries, when the recipe declares it
    pub shared: Option<bool>,
    /// Build type setting (`Release`, `Debug`, ...)
    pub build_type: String,
    /// Extra environment for the tool process
    pub env: Vec<(String, String)>,
    /// Target machine description when cross-building
    pub cross_file: Option<PathBuf>,
}

/// Capability to drive an external build system
pub trait BuildTool: Send + Sync {
    /// Tool name for logs
    fn name(&self) -> &str;

    /// Whether the tool can be invoked at all
    fn availability(&self) -> bool {
        true
    }

    /// Configure a build directory. Must be safe to run again on an
    /// already configured directory.
    fn configure(&self, request: &ConfigureRequest) -> Result<ToolOutput>;

    /// Compile everything in a configured build directory
    fn build(&self, build_dir: &Path) -> Result<ToolOutput>;

    /// Run the project's test suite
    fn test(&self, build_dir: &Path) -> Result<ToolOutput>;

    /// Execute a produced program; non-zero exit is a test failure
    fn run(&self, program: &Path, args: &[String], cwd: &Path) -> Result<ToolOutput> {
        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(cwd);
        execute("run", cmd).map_err(|e| match e {
            Error::BuildError { message, .. } => Error::TestError(message),
            other => other,
        })
    }
}

/// Run a command to completion, failing with its stderr on non-zero exit
pub(crate) fn execute(step: &'static str, mut cmd: Command) -> Result<ToolOutput> {
    debug!("Command: {:?}", cmd);

    let output = cmd.output().map_err(|e| Error::BuildError {
        step,
        message: format!("failed to spawn {:?}: {}", cmd.get_program(), e),
    })?;

    let result = ToolOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    };

    if !output.status.success() {
        return Err(Error::BuildError {
            step,
            message: format!(
                "exit code {:?}\nstderr: {}",
                output.status.code(),
                result.stderr
            ),
        });
    }

    Ok(result)
}

/// Meson driver
pub struct MesonTool {
    program: PathBuf,
}

impl MesonTool {
    /// Use a specific meson executable
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Find `meson` on the PATH
    pub fn locate() -> Result<Self> {
        let program =
            which::which("meson").map_err(|e| Error::NotFoundError(format!("meson: {}", e)))?;
        Ok(Self::new(program))
    }

    /// Command-line arguments for `meson setup`
    pub fn setup_args(request: &ConfigureRequest) -> Vec<String> {
        let mut args = vec!["setup".to_string()];

        if request.build_dir.join("meson-private").join("coredata.dat").exists() {
            args.push("--reconfigure".to_string());
        }

        args.push(request.build_dir.to_string_lossy().to_string());
        args.push(request.source_dir.to_string_lossy().to_string());

        if let Some(cross_file) = &request.cross_file {
            args.push("--cross-file".to_string());
            args.push(cross_file.to_string_lossy().to_string());
        }
        args.push(format!("-Dbuildtype={}", meson_buildtype(&request.build_type)));
        if let Some(shared) = request.shared {
            let library = if shared { "shared" } else { "static" };
            args.push(format!("-Ddefault_library={}", library));
        }
        for (key, value) in &request.definitions {
            args.push(format!("-D{}={}", key, value));
        }

        args
    }
}

/// Map a build_type setting onto meson's `buildtype`
pub fn meson_buildtype(build_type: &str) -> &'static str {
    match build_type {
        "Debug" => "debug",
        "RelWithDebInfo" => "debugoptimized",
        "MinSizeRel" => "minsize",
        _ => "release",
    }
}

impl BuildTool for MesonTool {
    fn name(&self) -> &str {
        "meson"
    }

    fn availability(&self) -> bool {
        self.program.is_file() || which::which(&self.program).is_ok()
    }

    fn configure(&self, request: &ConfigureRequest) -> Result<ToolOutput> {
        let mut cmd = Command::new(&self.program);
        cmd.args(Self::setup_args(request))
            .envs(request.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        execute("configure", cmd)
    }

    fn build(&self, build_dir: &Path) -> Result<ToolOutput> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("compile").arg("-C").arg(build_dir);
        execute("build", cmd)
    }

    fn test(&self, build_dir: &Path) -> Result<ToolOutput> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("test").arg("-C").arg(build_dir);
        execute("test", cmd).map_err(|e| match e {
            Error::BuildError { message, .. } => Error::TestError(message),
            other => other,
        })
    }
}
