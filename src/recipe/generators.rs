// src/recipe/generators.rs

//! Generators: files that let a consumer's build system find a package

use crate::error::Result;
use crate::recipe::package_info::PackageInfo;
use crate::recipe::requirements::{Requirement, RequirementKind};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the file written by the JSON generator
pub const JSON_DEPS_FILE: &str = "cookbook-deps.json";

/// Supported generators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Generator {
    /// `<name>.pc` for pkg-config
    PkgConfig,
    /// `cookbook-deps.json` with absolute directories
    Json,
}

impl Generator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PkgConfig => "pkg_config",
            Self::Json => "json",
        }
    }
}

/// Render a pkg-config module for a staged package
pub fn render_pkg_config(info: &PackageInfo, package_dir: &Path) -> String {
    let mut out = String::new();

    out.push_str(&format!("prefix={}\n", package_dir.display()));
    for (i, dir) in info.lib_dirs.iter().enumerate() {
        out.push_str(&format!("libdir{}=${{prefix}}/{}\n", suffix(i), dir));
    }
    for (i, dir) in info.include_dirs.iter().enumerate() {
        out.push_str(&format!("includedir{}=${{prefix}}/{}\n", suffix(i), dir));
    }
    out.push('\n');

    out.push_str(&format!("Name: {}\n", info.pkg_config_name));
    out.push_str(&format!(
        "Description: {}\n",
        info.description.as_deref().unwrap_or("Cookbook package")
    ));
    out.push_str(&format!("Version: {}\n", info.version));

    let mut libs: Vec<String> = (0..info.lib_dirs.len())
        .map(|i| format!("-L\"${{libdir{}}}\"", suffix(i)))
        .collect();
    libs.extend(info.libs.iter().map(|l| format!("-l{}", l)));
    out.push_str(&format!("Libs: {}\n", libs.join(" ")));

    let cflags: Vec<String> = (0..info.include_dirs.len())
        .map(|i| format!("-I\"${{includedir{}}}\"", suffix(i)))
        .collect();
    out.push_str(&format!("Cflags: {}\n", cflags.join(" ")));

    let requires: Vec<String> = info
        .requires
        .iter()
        .filter_map(|r| match Requirement::parse(r, RequirementKind::Host) {
            Ok(req) => Some(match req.constraint.lower_bound() {
                Some(v) => format!("{} >= {}", req.name, v),
                None => req.name,
            }),
            Err(e) => {
                warn!("Skipping unparsable requirement in pkg-config output: {}", e);
                None
            }
        })
        .collect();
    if !requires.is_empty() {
        out.push_str(&format!("Requires: {}\n", requires.join(", ")));
    }

    out
}

fn suffix(i: usize) -> String {
    if i == 0 { String::new() } else { (i + 1).to_string() }
}

/// Render the JSON generator output
pub fn render_json(info: &PackageInfo, package_dir: &Path) -> Result<String> {
    let abs = |dirs: &[String]| -> Vec<String> {
        dirs.iter()
            .map(|d| package_dir.join(d).to_string_lossy().to_string())
            .collect()
    };

    let value = serde_json::json!({
        "name": info.name,
        "version": info.version,
        "rootpath": package_dir.to_string_lossy(),
        "libs": info.libs,
        "include_paths": abs(&info.include_dirs),
        "lib_paths": abs(&info.lib_dirs),
        "bin_paths": abs(&info.bin_dirs),
        "requires": info.requires,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Write the requested generator files into `out_dir`
pub fn write_generators(
    info: &PackageInfo,
    package_dir: &Path,
    out_dir: &Path,
    generators: &[Generator],
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)?;
    let mut written = Vec::new();

    for generator in generators {
        let (path, content) = match generator {
            Generator::PkgConfig => (
                out_dir.join(format!("{}.pc", info.pkg_config_name)),
                render_pkg_config(info, package_dir),
            ),
            Generator::Json => (out_dir.join(JSON_DEPS_FILE), render_json(info, package_dir)?),
        };
        fs::write(&path, content)?;
        debug!("Generator {} wrote {}", generator.as_str(), path.display());
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::package_info::sample_info;

    #[test]
    fn test_render_pkg_config() {
        let info = sample_info();
        let pc = render_pkg_config(&info, Path::new("/pkgs/opzioni"));

        assert!(pc.starts_with("prefix=/pkgs/opzioni\n"));
        assert!(pc.contains("libdir=${prefix}/lib\n"));
        assert!(pc.contains("includedir=${prefix}/include\n"));
        assert!(pc.contains("Name: opzioni\n"));
        assert!(pc.contains("Version: 0.13.0\n"));
        assert!(pc.contains("Libs: -L\"${libdir}\" -lopzioni\n"));
        assert!(pc.contains("Cflags: -I\"${includedir}\"\n"));
        assert!(pc.contains("Requires: fmt >= 7.0.3\n"));
    }

    #[test]
    fn test_render_pkg_config_without_requires() {
        let mut info = sample_info();
        info.requires.clear();
        info.description = None;
        let pc = render_pkg_config(&info, Path::new("/p"));
        assert!(!pc.contains("Requires:"));
        assert!(pc.contains("Description: Cookbook package"));
    }

    #[test]
    fn test_render_json() {
        let info = sample_info();
        let json = render_json(&info, Path::new("/pkgs/opzioni")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["name"], "opzioni");
        assert_eq!(value["include_paths"][0], "/pkgs/opzioni/include");
    }

    #[test]
    fn test_write_generators() {
        let out = tempfile::tempdir().unwrap();
        let info = sample_info();
        let written = write_generators(
            &info,
            Path::new("/pkgs/opzioni"),
            out.path(),
            &[Generator::PkgConfig, Generator::Json],
        )
        .unwrap();

        assert_eq!(written.len(), 2);
        assert!(out.path().join("opzioni.pc").exists());
        assert!(out.path().join(JSON_DEPS_FILE).exists());
    }

    #[test]
    fn test_generator_names() {
        let parsed: Vec<Generator> = serde_json::from_str(r#"["pkg_config", "json"]"#).unwrap();
        assert_eq!(parsed, vec![Generator::PkgConfig, Generator::Json]);
        assert_eq!(Generator::PkgConfig.as_str(), "pkg_config");
    }
}
