// src/recipe/package_info.rs

//! Consumer-facing package metadata
//!
//! Written next to the staged artifacts as `cookbook-package.json`. The
//! test-package step and the generators read it back to learn the package's
//! name, version, libraries and directories.

use crate::error::{Error, Result};
use crate::recipe::generators::Generator;
use crate::recipe::options::ResolvedOptions;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// File name of the manifest inside a package directory
pub const MANIFEST_FILE: &str = "cookbook-package.json";

/// Metadata describing a built package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
    /// Hash of the configuration the package was built for
    pub package_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub topics: BTreeSet<String>,

    /// Exported settings (os, compiler, build_type, arch)
    pub settings: BTreeMap<String, String>,
    pub options: ResolvedOptions,

    /// Requirements propagated to consumers
    #[serde(default)]
    pub requires: Vec<String>,
    /// Requirements used only while building
    #[serde(default)]
    pub build_requires: Vec<String>,

    #[serde(default)]
    pub generators: Vec<Generator>,

    /// Library names to link against
    #[serde(default)]
    pub libs: Vec<String>,
    pub include_dirs: Vec<String>,
    pub lib_dirs: Vec<String>,
    pub bin_dirs: Vec<String>,

    /// Name used for the pkg-config module
    pub pkg_config_name: String,

    pub created: DateTime<Utc>,
}

impl PackageInfo {
    /// Write the manifest into `package_dir`
    pub fn save(&self, package_dir: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(package_dir.join(MANIFEST_FILE), json)?;
        Ok(())
    }

    /// Read the manifest of a staged package
    pub fn load(package_dir: &Path) -> Result<Self> {
        let path = package_dir.join(MANIFEST_FILE);
        if !path.exists() {
            return Err(Error::NotFoundError(format!(
                "No package manifest at {}",
                path.display()
            )));
        }
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content)
            .map_err(|e| Error::ParseError(format!("Invalid package manifest {}: {}", path.display(), e)))
    }

    /// `name/version` reference
    pub fn reference(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}

#[cfg(test)]
pub(crate) fn sample_info() -> PackageInfo {
    PackageInfo {
        name: "opzioni".to_string(),
        version: "0.13.0".to_string(),
        package_id: "abc123".to_string(),
        license: Some("BSL-1.0".to_string()),
        author: None,
        url: None,
        description: Some("A simple command line arguments library for C++".to_string()),
        topics: BTreeSet::new(),
        settings: BTreeMap::new(),
        options: ResolvedOptions::default(),
        requires: vec!["fmt/[>=7.0.3 <8.0.0]".to_string()],
        build_requires: vec!["catch2/[>=2.13.0 <3.0.0]".to_string()],
        generators: vec![Generator::PkgConfig],
        libs: vec!["opzioni".to_string()],
        include_dirs: vec!["include".to_string()],
        lib_dirs: vec!["lib".to_string()],
        bin_dirs: vec!["bin".to_string()],
        pkg_config_name: "opzioni".to_string(),
        created: Utc::now(),
    }
}
