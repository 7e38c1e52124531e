// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use cookbook::recipe::{BuildTool, ConfigureRequest, ToolOutput};
use cookbook::{Error, KitchenConfig, Result, Settings};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// A call received by [`FakeTool`]
#[derive(Debug, Clone)]
pub enum Call {
    Configure {
        source_dir: PathBuf,
        build_dir: PathBuf,
        definitions: Vec<(String, String)>,
        shared: Option<bool>,
        /// Whether `<name>.pc` was present on PKG_CONFIG_PATH at configure time
        pc_found: bool,
        cross_file: Option<PathBuf>,
    },
    Build,
    Test,
    Run {
        program: PathBuf,
        args: Vec<String>,
        cwd: PathBuf,
    },
}

/// Build tool that records its calls and fabricates build outputs
///
/// `build` writes a static or shared `opzioni` library into the build
/// directory depending on the last configure request. Clones share the
/// call log, so a test can keep one and hand the other to the kitchen.
#[derive(Clone, Default)]
pub struct FakeTool {
    calls: Arc<Mutex<Vec<Call>>>,
    shared: Arc<Mutex<Option<bool>>>,
    fail_step: Option<&'static str>,
}

impl FakeTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// A tool whose `step` (configure, build, test or run) fails
    pub fn failing(step: &'static str) -> Self {
        Self {
            fail_step: Some(step),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn configure_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Configure { .. }))
            .collect()
    }

    pub fn ran_tests(&self) -> bool {
        self.calls().iter().any(|c| matches!(c, Call::Test))
    }

    pub fn runs(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Run { .. }))
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, step: &'static str) -> Result<()> {
        if self.fail_step == Some(step) {
            let message = format!("simulated {} failure", step);
            return Err(if step == "test" || step == "run" {
                Error::TestError(message)
            } else {
                Error::BuildError { step, message }
            });
        }
        Ok(())
    }
}

impl BuildTool for FakeTool {
    fn name(&self) -> &str {
        "fake"
    }

    fn configure(&self, request: &ConfigureRequest) -> Result<ToolOutput> {
        let pc_found = request
            .env
            .iter()
            .find(|(k, _)| k == "PKG_CONFIG_PATH")
            .and_then(|(_, v)| std::env::split_paths(v).next())
            .is_some_and(|dir| dir.join("opzioni.pc").is_file());

        self.record(Call::Configure {
            source_dir: request.source_dir.clone(),
            build_dir: request.build_dir.clone(),
            definitions: request.definitions.clone(),
            shared: request.shared,
            pc_found,
            cross_file: request.cross_file.clone(),
        });
        self.check("configure")?;

        fs::create_dir_all(&request.build_dir)?;
        *self.shared.lock().unwrap() = request.shared;
        Ok(ToolOutput {
            stdout: "configured".to_string(),
            stderr: String::new(),
        })
    }

    fn build(&self, build_dir: &Path) -> Result<ToolOutput> {
        self.record(Call::Build);
        self.check("build")?;

        let out = build_dir.join("src");
        fs::create_dir_all(&out)?;
        fs::write(out.join("opzioni.o"), b"obj")?;
        for name in library_files(self.shared.lock().unwrap().unwrap_or(false)) {
            fs::write(out.join(name), b"lib")?;
        }
        Ok(ToolOutput::default())
    }

    fn test(&self, _build_dir: &Path) -> Result<ToolOutput> {
        self.record(Call::Test);
        self.check("test")?;
        Ok(ToolOutput {
            stdout: "1/1 opzioni tests OK".to_string(),
            stderr: String::new(),
        })
    }

    fn run(&self, program: &Path, args: &[String], cwd: &Path) -> Result<ToolOutput> {
        self.record(Call::Run {
            program: program.to_path_buf(),
            args: args.to_vec(),
            cwd: cwd.to_path_buf(),
        });
        self.check("run")?;
        Ok(ToolOutput {
            stdout: args.join(" "),
            stderr: String::new(),
        })
    }
}

/// Library files the host toolchain would produce for `opzioni`
pub fn library_files(shared: bool) -> Vec<String> {
    let host = Settings::host();
    if shared {
        if host.is_windows() {
            vec!["opzioni.dll".to_string(), "opzioni.lib".to_string()]
        } else {
            vec![format!("libopzioni.{}", host.shared_library_extension())]
        }
    } else if host.static_library_extension() == "lib" {
        vec!["opzioni.lib".to_string()]
    } else {
        vec!["libopzioni.a".to_string()]
    }
}

pub const OPZIONI_RECIPE: &str = r#"generators = ["pkg_config"]

[package]
name = "opzioni"
license = "BSL-1.0"
author = "Gabriel Galli"
url = "https://github.com/ggabriel96/opzioni"
description = "A command line arguments parser library for C++"
topics = ["command-line", "arguments", "parser", "cpp"]

[options.shared]
values = [true, false]
default = false

[options.build_examples]
values = [true, false]
default = false

[requires]
host = ["fmt/[>=7.0.3 <8.0.0]"]
build = ["catch2/[>=2.13.0 <3.0.0]"]

[build.definitions]
build_examples = "build_examples"
"#;

pub const OPZIONI_MESON: &str = r#"project('opzioni', 'cpp',
  version : '0.13.0',
  meson_version : '>=0.55.0',
  default_options : ['cpp_std=c++20'])
"#;

pub const TEST_RECIPE: &str = r#"generators = ["pkg_config"]

[requires]
build = ["fmt/6.2.1"]
"#;

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A recipe directory shaped like the opzioni source checkout
///
/// Returns the TempDir; the recipe lives at its root.
pub fn opzioni_checkout() -> TempDir {
    checkout_with(OPZIONI_RECIPE, Some(OPZIONI_MESON))
}

/// A recipe directory with a custom recipe and optional `meson.build`
pub fn checkout_with(recipe: &str, meson_build: Option<&str>) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    write(&root.join("recipe.toml"), recipe);
    if let Some(meson) = meson_build {
        write(&root.join("meson.build"), meson);
    }
    write(&root.join("include/opzioni.hpp"), "#pragma once\n");
    write(&root.join("include/opzioni/types.hpp"), "#pragma once\n");
    write(&root.join("src/opzioni.cpp"), "int x;\n");
    write(&root.join("src/detail.hpp"), "#pragma once\n");
    write(&root.join("test_package/recipe.toml"), TEST_RECIPE);
    write(&root.join("test_package/main.cpp"), "int main() {}\n");

    dir
}

/// Kitchen config staging into `<store>/packages`
pub fn kitchen_config(store: &Path) -> KitchenConfig {
    KitchenConfig {
        package_root: store.join("packages"),
        ..Default::default()
    }
}

/// Every file under `dir`, relative to it, with `/` separators
pub fn files_under(dir: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(dir)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect();
    files.sort();
    files
}
