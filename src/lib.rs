// src/lib.rs

//! Cookbook
//!
//! Recipe-driven packaging of C++ libraries built with an external build
//! tool. A recipe declares the package's identity, settings, options and
//! requirements; the kitchen resolves the version, configures, builds and
//! tests the project, stages headers and libraries into a local package
//! store and finally tastes the result with a small consumer project.
//!
//! # Architecture
//!
//! - Recipes: TOML files parsed into strongly typed sections
//! - Kitchen: owns the build tool and drives each cook step in order
//! - Package store: `<root>/<name>/<version>/<package id>/` with a JSON manifest
//! - Generators: pkg-config and JSON files for consumer builds

pub mod config;
mod error;
pub mod recipe;
pub mod settings;

pub use config::UserConfig;
pub use error::{Error, Result};
pub use recipe::{Cook, CookResult, Kitchen, KitchenConfig, Recipe};
pub use settings::Settings;
