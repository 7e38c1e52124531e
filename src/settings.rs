// src/settings.rs
//! Build settings exported to package consumers
//!
//! Settings describe the configuration a package is built for: operating
//! system, compiler, build type and architecture. Names follow the usual
//! C++ packaging vocabulary (`Linux`, `Macos`, `x86_64`, `armv8`, ...) so
//! recipes written for other tools read the same here.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Names of all settings a recipe may export
pub const SETTING_NAMES: [&str; 4] = ["os", "compiler", "build_type", "arch"];

/// A full set of build settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub os: String,
    pub compiler: String,
    pub build_type: String,
    pub arch: String,
}

impl Settings {
    /// Detect settings for the machine cookbook is running on
    pub fn host() -> Self {
        let os = os_name(std::env::consts::OS);
        let compiler = match os.as_str() {
            "Macos" => "apple-clang",
            "Windows" => "msvc",
            _ => "gcc",
        };

        Self {
            os,
            compiler: compiler.to_string(),
            build_type: "Release".to_string(),
            arch: arch_name(std::env::consts::ARCH),
        }
    }

    /// Override a single setting from a `key=value` pair
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        if value.is_empty() {
            return Err(Error::ConfigError(format!("Setting '{}' cannot be empty", key)));
        }

        let slot = match key.trim() {
            "os" => &mut self.os,
            "compiler" => &mut self.compiler,
            "build_type" => &mut self.build_type,
            "arch" => &mut self.arch,
            other => {
                return Err(Error::ConfigError(format!(
                    "Unknown setting '{}' (expected one of: {})",
                    other,
                    SETTING_NAMES.join(", ")
                )));
            }
        };
        *slot = value.to_string();
        Ok(())
    }

    /// Look up a setting by name
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "os" => Some(&self.os),
            "compiler" => Some(&self.compiler),
            "build_type" => Some(&self.build_type),
            "arch" => Some(&self.arch),
            _ => None,
        }
    }

    /// The subset of settings a recipe exports, keyed by name
    pub fn exported(&self, names: &[String]) -> BTreeMap<String, String> {
        names
            .iter()
            .filter_map(|name| self.get(name).map(|v| (name.clone(), v.to_string())))
            .collect()
    }

    /// Whether building for these settings means cross-building from `host`
    ///
    /// Binaries produced for a different os or architecture cannot be
    /// executed on the build machine.
    pub fn is_cross_building(&self, host: &Settings) -> bool {
        self.os != host.os || self.arch != host.arch
    }

    /// Whether the target platform is Windows-like
    pub fn is_windows(&self) -> bool {
        self.os == "Windows"
    }

    /// File extension of shared libraries on the target platform
    pub fn shared_library_extension(&self) -> &'static str {
        match self.os.as_str() {
            "Windows" => "dll",
            "Macos" | "iOS" => "dylib",
            _ => "so",
        }
    }

    /// File extension of static libraries on the target platform
    pub fn static_library_extension(&self) -> &'static str {
        if self.compiler == "msvc" { "lib" } else { "a" }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::host()
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "os={} compiler={} build_type={} arch={}",
            self.os, self.compiler, self.build_type, self.arch
        )
    }
}

fn os_name(os: &str) -> String {
    match os {
        "linux" => "Linux",
        "macos" => "Macos",
        "windows" => "Windows",
        "freebsd" => "FreeBSD",
        "android" => "Android",
        "ios" => "iOS",
        other => other,
    }
    .to_string()
}

fn arch_name(arch: &str) -> String {
    match arch {
        "aarch64" => "armv8",
        "arm" => "armv7",
        "x86" => "x86",
        "x86_64" => "x86_64",
        "powerpc64" => "ppc64",
        other => other,
    }
    .to_string()
}
