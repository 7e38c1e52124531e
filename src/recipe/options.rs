// src/recipe/options.rs

//! Build options declared by a recipe
//!
//! Each option has a closed set of allowed values and a default. Users pick
//! values on the command line (`-o shared=true`); every chosen value must be
//! a member of the declared set.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single option value
///
/// TOML recipes may write `true`, `3` or `"header_only"`; the command line
/// only has strings, which are parsed with [`OptionValue::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl OptionValue {
    /// Parse a command-line value
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.to_ascii_lowercase().as_str() {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }
        match raw.parse::<i64>() {
            Ok(n) => Self::Int(n),
            Err(_) => Self::Text(raw.to_string()),
        }
    }

    /// Get the boolean value, if this is a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Declaration of one option: allowed values and default
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionDecl {
    /// Allowed values
    pub values: Vec<OptionValue>,

    /// Value used when the user does not choose one
    pub default: OptionValue,
}

impl OptionDecl {
    /// Convenience constructor for a boolean option
    pub fn boolean(default: bool) -> Self {
        Self {
            values: vec![OptionValue::Bool(true), OptionValue::Bool(false)],
            default: OptionValue::Bool(default),
        }
    }

    /// Whether `value` is one of the allowed values
    pub fn allows(&self, value: &OptionValue) -> bool {
        self.values.contains(value)
    }

    fn describe_values(&self) -> String {
        self.values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Options after defaults and user choices have been merged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolvedOptions {
    values: BTreeMap<String, OptionValue>,
}

impl ResolvedOptions {
    /// Get the resolved value of an option
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    /// Iterate options in name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &OptionValue)> {
        self.values.iter()
    }
}

/// Merge declared defaults with user overrides
///
/// Fails on overrides naming an undeclared option and on values outside the
/// declared set.
pub fn resolve_options(
    decls: &BTreeMap<String, OptionDecl>,
    overrides: &[(String, String)],
) -> Result<ResolvedOptions> {
    let mut values: BTreeMap<String, OptionValue> = decls
        .iter()
        .map(|(name, decl)| (name.clone(), decl.default.clone()))
        .collect();

    for (name, raw) in overrides {
        let decl = decls.get(name).ok_or_else(|| {
            Error::ConfigError(format!("Unknown option '{}'", name))
        })?;

        let value = OptionValue::parse(raw);
        if !decl.allows(&value) {
            return Err(Error::ConfigError(format!(
                "Invalid value '{}' for option '{}' (allowed: {})",
                raw,
                name,
                decl.describe_values()
            )));
        }
        values.insert(name.clone(), value);
    }

    Ok(ResolvedOptions { values })
}

/// Check that every declaration is internally consistent
pub fn validate_decls(decls: &BTreeMap<String, OptionDecl>) -> Result<()> {
    for (name, decl) in decls {
        if decl.values.is_empty() {
            return Err(Error::ConfigError(format!(
                "Option '{}' declares no allowed values",
                name
            )));
        }
        if !decl.allows(&decl.default) {
            return Err(Error::ConfigError(format!(
                "Default '{}' of option '{}' is not one of: {}",
                decl.default,
                name,
                decl.describe_values()
            )));
        }
    }
    Ok(())
}

/// Split a `key=value` assignment from the command line
pub fn parse_assignment(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| Error::ConfigError(format!("Expected key=value, got '{}'", raw)))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(Error::ConfigError(format!("Missing key in '{}'", raw)));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
