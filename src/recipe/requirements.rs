// src/recipe/requirements.rs

//! Dependency declarations and their resolution
//!
//! A recipe lists requirements as `name/constraint` references. Host
//! requirements propagate to consumers of the package; build requirements
//! are only needed while building it (test frameworks, code generators).
//!
//! Constraints are either an exact pin (`fmt/6.2.1`) or a bracketed range
//! of space-separated comparators (`fmt/[>=7.0.3 <8.0.0]`).

use crate::error::{Error, Result};
use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::process::Command;
use tracing::{debug, info, warn};

/// Whether a requirement is propagated to consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementKind {
    /// Needed by consumers too (linked or included from public headers)
    Host,
    /// Only needed to build or test the package
    Build,
}

impl RequirementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Build => "build",
        }
    }
}

/// Version constraint of a requirement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionConstraint {
    /// Exactly this version
    Exact(Version),
    /// Any version matching the range
    Range(VersionReq),
}

impl VersionConstraint {
    /// Parse the part after the `/` of a reference
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();

        if let Some(inner) = raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            let comparators: Vec<&str> = inner
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .collect();
            if comparators.is_empty() {
                return Err(Error::ConfigError(format!("Empty version range '{}'", raw)));
            }
            let req = VersionReq::parse(&comparators.join(", ")).map_err(|e| {
                Error::ConfigError(format!("Invalid version range '{}': {}", raw, e))
            })?;
            return Ok(Self::Range(req));
        }

        Version::parse(raw)
            .map(Self::Exact)
            .map_err(|e| Error::ConfigError(format!("Invalid version '{}': {}", raw, e)))
    }

    /// Check whether `version` satisfies this constraint
    pub fn matches(&self, version: &Version) -> bool {
        match self {
            Self::Exact(v) => v == version,
            Self::Range(req) => req.matches(version),
        }
    }

    /// Lowest version admitted by the constraint, when it is explicit
    pub fn lower_bound(&self) -> Option<Version> {
        match self {
            Self::Exact(v) => Some(v.clone()),
            Self::Range(req) => req.comparators.iter().find_map(|c| match c.op {
                semver::Op::GreaterEq | semver::Op::Exact | semver::Op::Caret | semver::Op::Tilde => {
                    Some(Version::new(c.major, c.minor.unwrap_or(0), c.patch.unwrap_or(0)))
                }
                _ => None,
            }),
        }
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(v) => write!(f, "{}", v),
            Self::Range(req) => write!(f, "[{}]", req.to_string().replace(", ", " ")),
        }
    }
}

/// A single declared dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    pub constraint: VersionConstraint,
    pub kind: RequirementKind,
}

impl Requirement {
    /// Parse a `name/constraint` reference
    pub fn parse(reference: &str, kind: RequirementKind) -> Result<Self> {
        let (name, constraint) = reference.trim().split_once('/').ok_or_else(|| {
            Error::ConfigError(format!(
                "Invalid requirement '{}': expected name/version",
                reference
            ))
        })?;

        let name = name.trim();
        if name.is_empty() {
            return Err(Error::ConfigError(format!(
                "Invalid requirement '{}': empty name",
                reference
            )));
        }

        Ok(Self {
            name: name.to_string(),
            constraint: VersionConstraint::parse(constraint)?,
            kind,
        })
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.constraint.matches(version)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.constraint)
    }
}

/// Lenient version parsing for versions reported by external tools
///
/// Accepts `7`, `7.1` and `7.1.0`. Suffixes after `-` or `+` are only kept
/// when the whole string is already valid semver.
pub fn parse_loose_version(raw: &str) -> Option<Version> {
    let raw = raw.trim();
    if let Ok(v) = Version::parse(raw) {
        return Some(v);
    }

    let core = raw.split(['-', '+']).next().unwrap_or(raw);
    let mut parts = core.split('.').map(|p| p.parse::<u64>());
    let major = parts.next()?.ok()?;
    let minor = parts.next().unwrap_or(Ok(0)).ok()?;
    let patch = parts.next().unwrap_or(Ok(0)).ok()?;
    Some(Version::new(major, minor, patch))
}

/// Capability for finding installed versions of requirements
///
/// Keeps the kitchen decoupled from how dependencies are provisioned on the
/// build machine.
pub trait RequirementResolver: Send + Sync {
    /// Version of `name` available to the build, if any
    fn installed_version(&self, name: &str) -> Result<Option<Version>>;
}

/// A resolver that knows of no installed packages
pub struct NoopResolver;

impl RequirementResolver for NoopResolver {
    fn installed_version(&self, _name: &str) -> Result<Option<Version>> {
        Ok(None)
    }
}

/// Resolves requirements through `pkg-config --modversion`
pub struct PkgConfigResolver {
    program: std::path::PathBuf,
}

impl PkgConfigResolver {
    /// Locate `pkg-config` on the PATH
    pub fn locate() -> Result<Self> {
        let program = which::which("pkg-config")
            .map_err(|e| Error::NotFoundError(format!("pkg-config: {}", e)))?;
        Ok(Self { program })
    }
}

impl RequirementResolver for PkgConfigResolver {
    fn installed_version(&self, name: &str) -> Result<Option<Version>> {
        let output = Command::new(&self.program)
            .arg("--modversion")
            .arg(name)
            .output()?;

        if !output.status.success() {
            debug!("pkg-config does not know {}", name);
            return Ok(None);
        }

        let raw = String::from_utf8_lossy(&output.stdout);
        Ok(parse_loose_version(&raw))
    }
}

/// Outcome of checking requirements against a resolver
#[derive(Debug, Default, Clone)]
pub struct RequirementReport {
    /// Requirements with an installed version inside the constraint
    pub satisfied: Vec<(Requirement, Version)>,
    /// Requirements with an installed version outside the constraint
    pub mismatched: Vec<(Requirement, Version)>,
    /// Requirements not installed at all
    pub missing: Vec<Requirement>,
}

impl RequirementReport {
    pub fn is_satisfied(&self) -> bool {
        self.mismatched.is_empty() && self.missing.is_empty()
    }

    /// One-line summary of every unresolved requirement
    pub fn unresolved_summary(&self) -> String {
        let mut parts: Vec<String> = self.missing.iter().map(|r| format!("{} (missing)", r)).collect();
        parts.extend(
            self.mismatched
                .iter()
                .map(|(r, v)| format!("{} (found {})", r, v)),
        );
        parts.join(", ")
    }
}

/// Check requirements against a resolver
pub fn check_requirements(
    requirements: &[Requirement],
    resolver: &dyn RequirementResolver,
) -> Result<RequirementReport> {
    let mut report = RequirementReport::default();

    if requirements.is_empty() {
        debug!("No requirements declared");
        return Ok(report);
    }

    info!(
        "Checking requirements: {}",
        requirements
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );

    for req in requirements {
        match resolver.installed_version(&req.name)? {
            Some(version) if req.matches(&version) => {
                debug!("{} satisfied by {}", req, version);
                report.satisfied.push((req.clone(), version));
            }
            Some(version) => {
                warn!("{} not satisfied by installed {}", req, version);
                report.mismatched.push((req.clone(), version));
            }
            None => {
                warn!("{} is not installed", req);
                report.missing.push(req.clone());
            }
        }
    }

    Ok(report)
}
