// src/config.rs

//! User configuration
//!
//! An optional TOML file (`<config dir>/cookbook/config.toml`) supplies
//! defaults for every cook. Command-line flags override it.
//!
//! ```toml
//! package_root = "/srv/cookbook/packages"
//! run_tests = false
//! meson = "/opt/meson/bin/meson"
//!
//! [settings]
//! build_type = "Debug"
//! ```

use crate::error::{Error, Result};
use crate::recipe::kitchen::KitchenConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an alternate config file
pub const CONFIG_ENV: &str = "COOKBOOK_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserConfig {
    /// Root of the local package store
    #[serde(default)]
    pub package_root: Option<PathBuf>,

    /// Setting overrides (`os`, `compiler`, `build_type`, `arch`)
    #[serde(default)]
    pub settings: BTreeMap<String, String>,

    #[serde(default)]
    pub run_tests: Option<bool>,

    #[serde(default)]
    pub check_requirements: Option<bool>,

    /// Explicit meson executable instead of the one on the PATH
    #[serde(default)]
    pub meson: Option<PathBuf>,

    /// Meson cross file for cross-building
    #[serde(default)]
    pub cross_file: Option<PathBuf>,
}

/// `$COOKBOOK_CONFIG`, else `<config dir>/cookbook/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|d| d.join("cookbook").join("config.toml"))
}

impl UserConfig {
    /// Parse a config from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ParseError(format!("Invalid config: {}", e)))
    }

    /// Load the config file at `path` (or the default location)
    ///
    /// A missing file yields the empty config.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            debug!("No config file at {}", path.display());
            return Ok(Self::default());
        }

        debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(&path)?;
        Self::parse(&content)
    }

    /// Apply these defaults to a kitchen configuration
    pub fn apply(&self, config: &mut KitchenConfig) -> Result<()> {
        if let Some(root) = &self.package_root {
            config.package_root = root.clone();
        }
        for (key, value) in &self.settings {
            config.settings.apply(key, value)?;
        }
        if self.run_tests.is_some() {
            config.run_tests = self.run_tests;
        }
        if let Some(check) = self.check_requirements {
            config.check_requirements = check;
        }
        if self.cross_file.is_some() {
            config.cross_file = self.cross_file.clone();
        }
        Ok(())
    }
}
