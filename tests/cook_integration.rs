// tests/cook_integration.rs

//! Package recipe workflow tests: version, configure, build, test, stage.

mod common;

use common::{Call, FakeTool, checkout_with, files_under, kitchen_config, opzioni_checkout};
use cookbook::recipe::package_info::MANIFEST_FILE;
use cookbook::recipe::{CookStep, PackageInfo, parse_recipe, parse_recipe_file};
use cookbook::{Error, Kitchen, Recipe, Settings};
use std::path::{Path, PathBuf};

fn opzioni_recipe(dir: &Path) -> Recipe {
    parse_recipe_file(&dir.join("recipe.toml")).unwrap()
}

fn has_ext(file: &str, exts: &[&str]) -> bool {
    let name = file.rsplit('/').next().unwrap_or(file);
    exts.iter().any(|ext| {
        name.ends_with(&format!(".{}", ext)) || name.contains(&format!(".{}.", ext))
    })
}

#[test]
fn test_static_build_stages_one_static_library() {
    let checkout = opzioni_checkout();
    let store = tempfile::tempdir().unwrap();
    let tool = FakeTool::new();
    let kitchen = Kitchen::new(kitchen_config(store.path()), Box::new(tool.clone()));

    let result = kitchen
        .cook(&opzioni_recipe(checkout.path()), checkout.path())
        .unwrap();

    assert_eq!(result.final_step, CookStep::Done);
    let package_dir = result.package_dir.clone().unwrap();
    assert!(package_dir.starts_with(store.path().join("packages/opzioni/0.13.0")));

    let files = files_under(&package_dir);
    let shared: Vec<_> = files.iter().filter(|f| has_ext(f, &["dll", "so", "dylib"])).collect();
    let statics: Vec<_> = files.iter().filter(|f| has_ext(f, &["a", "lib"])).collect();
    assert!(shared.is_empty(), "unexpected shared libraries: {:?}", shared);
    assert_eq!(statics.len(), 1, "expected one static library in {:?}", files);
    assert!(statics[0].starts_with("lib/"));

    // Headers keep their layout, sources and objects are not staged
    assert!(files.contains(&"include/opzioni.hpp".to_string()));
    assert!(files.contains(&"include/opzioni/types.hpp".to_string()));
    assert!(!files.iter().any(|f| f.ends_with(".cpp") || f.ends_with(".o")));
    assert!(!files.contains(&"include/detail.hpp".to_string()));

    // Configure was told to build static libraries
    match &tool.configure_calls()[0] {
        Call::Configure { shared, .. } => assert_eq!(*shared, Some(false)),
        other => panic!("unexpected call {:?}", other),
    }
}

#[test]
fn test_package_metadata() {
    let checkout = opzioni_checkout();
    let store = tempfile::tempdir().unwrap();
    let kitchen = Kitchen::new(kitchen_config(store.path()), Box::new(FakeTool::new()));

    let result = kitchen
        .cook(&opzioni_recipe(checkout.path()), checkout.path())
        .unwrap();
    let package_dir = result.package_dir.unwrap();

    assert!(package_dir.join(MANIFEST_FILE).is_file());
    let info = PackageInfo::load(&package_dir).unwrap();
    assert_eq!(info, result.info);
    assert_eq!(info.name, "opzioni");
    assert_eq!(info.version, "0.13.0");
    assert_eq!(info.license.as_deref(), Some("BSL-1.0"));
    assert_eq!(info.libs, vec!["opzioni"]);
    assert_eq!(info.requires, vec!["fmt/[>=7.0.3 <8.0.0]"]);
    assert_eq!(info.build_requires, vec!["catch2/[>=2.13.0 <3.0.0]"]);
    assert!(info.topics.contains("parser"));
    assert_eq!(info.settings.len(), 4);
    assert!(package_dir.ends_with(&info.package_id));

    let pc = std::fs::read_to_string(package_dir.join("lib/pkgconfig/opzioni.pc")).unwrap();
    assert!(pc.contains(&format!("prefix={}\n", package_dir.display())));
    assert!(pc.contains("Version: 0.13.0"));
    assert!(pc.contains("-lopzioni"));
    assert!(pc.contains("Requires: fmt >= 7.0.3"));
}

#[test]
fn test_shared_build_stages_shared_library() {
    let checkout = opzioni_checkout();
    let store = tempfile::tempdir().unwrap();
    let mut config = kitchen_config(store.path());
    config.option_overrides = vec![("shared".to_string(), "true".to_string())];
    let kitchen = Kitchen::new(config, Box::new(FakeTool::new()));

    let result = kitchen
        .cook(&opzioni_recipe(checkout.path()), checkout.path())
        .unwrap();

    let files = files_under(&result.package_dir.unwrap());
    assert!(files.iter().any(|f| has_ext(f, &["dll", "so", "dylib"])));
    assert!(!files.iter().any(|f| has_ext(f, &["a"])));
}

#[test]
fn test_shared_and_static_get_different_package_ids() {
    let checkout = opzioni_checkout();
    let store = tempfile::tempdir().unwrap();
    let recipe = opzioni_recipe(checkout.path());

    let static_kitchen = Kitchen::new(kitchen_config(store.path()), Box::new(FakeTool::new()));
    let static_result = static_kitchen.cook(&recipe, checkout.path()).unwrap();

    let mut config = kitchen_config(store.path());
    config.option_overrides = vec![("shared".to_string(), "true".to_string())];
    let shared_kitchen = Kitchen::new(config, Box::new(FakeTool::new()));
    let shared_result = shared_kitchen.cook(&recipe, checkout.path()).unwrap();

    assert_ne!(static_result.info.package_id, shared_result.info.package_id);
    assert_ne!(static_result.package_dir, shared_result.package_dir);
}

#[test]
fn test_static_after_shared_stages_no_shared_library() {
    let checkout = opzioni_checkout();
    let store = tempfile::tempdir().unwrap();
    let recipe = opzioni_recipe(checkout.path());
    let tool = FakeTool::new();

    let mut config = kitchen_config(store.path());
    config.option_overrides = vec![("shared".to_string(), "true".to_string())];
    Kitchen::new(config, Box::new(tool.clone()))
        .cook(&recipe, checkout.path())
        .unwrap();

    let result = Kitchen::new(kitchen_config(store.path()), Box::new(tool.clone()))
        .cook(&recipe, checkout.path())
        .unwrap();

    let files = files_under(&result.package_dir.unwrap());
    let shared: Vec<_> = files.iter().filter(|f| has_ext(f, &["dll", "so", "dylib"])).collect();
    assert!(shared.is_empty(), "static package holds shared libraries: {:?}", files);
    assert_eq!(result.info.libs, vec!["opzioni"]);

    // Each configuration gets its own build directory under <source>/build
    let build_dirs: Vec<PathBuf> = tool
        .configure_calls()
        .into_iter()
        .map(|c| match c {
            Call::Configure { build_dir, .. } => build_dir,
            other => panic!("unexpected call {:?}", other),
        })
        .collect();
    assert_ne!(build_dirs[0], build_dirs[1]);
    for dir in &build_dirs {
        assert_eq!(dir.parent(), Some(checkout.path().join("build").as_path()));
    }
    assert!(build_dirs[1].ends_with(&result.info.package_id));
}

#[test]
fn test_cross_building_requires_cross_file() {
    let checkout = opzioni_checkout();
    let store = tempfile::tempdir().unwrap();
    let target_arch = if Settings::host().arch == "armv8" { "x86_64" } else { "armv8" };
    let mut config = kitchen_config(store.path());
    config.settings.arch = target_arch.to_string();
    let tool = FakeTool::new();

    let err = Kitchen::new(config.clone(), Box::new(tool.clone()))
        .cook(&opzioni_recipe(checkout.path()), checkout.path())
        .unwrap_err();
    assert!(matches!(err, Error::ConfigError(_)));
    assert!(err.to_string().contains("cross file"));
    assert!(tool.calls().is_empty());
    assert!(!store.path().join("packages").exists());

    let cross_file = checkout.path().join("cross.ini");
    config.cross_file = Some(cross_file.clone());
    let result = Kitchen::new(config, Box::new(tool.clone()))
        .cook(&opzioni_recipe(checkout.path()), checkout.path())
        .unwrap();
    assert_eq!(result.info.settings.get("arch").map(String::as_str), Some(target_arch));
    match &tool.configure_calls()[0] {
        Call::Configure { cross_file: passed, .. } => assert_eq!(passed.as_ref(), Some(&cross_file)),
        other => panic!("unexpected call {:?}", other),
    }
}

#[test]
fn test_failed_staging_keeps_previous_package() {
    let checkout = opzioni_checkout();
    let store = tempfile::tempdir().unwrap();
    let kitchen = Kitchen::new(kitchen_config(store.path()), Box::new(FakeTool::new()));

    let first = kitchen
        .cook(&opzioni_recipe(checkout.path()), checkout.path())
        .unwrap();
    let package_dir = first.package_dir.unwrap();
    let before = files_under(&package_dir);

    // Copy rules do not enter the package id: this restages the same package
    let broken = parse_recipe(&format!(
        "{}\n[[copy]]\npattern = \"*.hpp\"\ndst = \"include\"\nsrc = \"include\"\n\n[[copy]]\npattern = \"[oops\"\ndst = \"lib\"\n",
        common::OPZIONI_RECIPE
    ))
    .unwrap();
    let err = kitchen.cook(&broken, checkout.path()).unwrap_err();
    assert!(matches!(err, Error::ConfigError(_)));

    assert_eq!(files_under(&package_dir), before);
    assert!(PackageInfo::load(&package_dir).is_ok());

    // No scratch directory is left next to the package
    let siblings = std::fs::read_dir(package_dir.parent().unwrap()).unwrap().count();
    assert_eq!(siblings, 1);
}

#[test]
fn test_failed_staging_leaves_no_partial_package() {
    let recipe_text = format!(
        "{}\n[[copy]]\npattern = \"*.hpp\"\ndst = \"include\"\nsrc = \"include\"\n\n[[copy]]\npattern = \"[oops\"\ndst = \"lib\"\n",
        common::OPZIONI_RECIPE
    );
    let checkout = checkout_with(&recipe_text, Some(common::OPZIONI_MESON));
    let store = tempfile::tempdir().unwrap();
    let kitchen = Kitchen::new(kitchen_config(store.path()), Box::new(FakeTool::new()));

    let err = kitchen
        .cook(&opzioni_recipe(checkout.path()), checkout.path())
        .unwrap_err();
    assert!(matches!(err, Error::ConfigError(_)));
    assert!(files_under(&store.path().join("packages")).is_empty());
}

#[test]
fn test_build_examples_flag() {
    let checkout = opzioni_checkout();
    let store = tempfile::tempdir().unwrap();
    let recipe = opzioni_recipe(checkout.path());

    let definitions = |overrides: Vec<(String, String)>| {
        let tool = FakeTool::new();
        let mut config = kitchen_config(store.path());
        config.option_overrides = overrides;
        config.stage_artifacts = Some(false);
        Kitchen::new(config, Box::new(tool.clone()))
            .cook(&recipe, checkout.path())
            .unwrap();
        match tool.configure_calls().remove(0) {
            Call::Configure { definitions, .. } => definitions,
            other => panic!("unexpected call {:?}", other),
        }
    };

    let enabled = definitions(vec![("build_examples".to_string(), "true".to_string())]);
    assert_eq!(enabled, vec![("build_examples".to_string(), "true".to_string())]);

    let disabled = definitions(vec![("build_examples".to_string(), "false".to_string())]);
    assert!(disabled.is_empty());

    let absent = definitions(Vec::new());
    assert!(absent.is_empty());
}

#[test]
fn test_invalid_option_value_fails_before_building() {
    let checkout = opzioni_checkout();
    let store = tempfile::tempdir().unwrap();
    let tool = FakeTool::new();
    let mut config = kitchen_config(store.path());
    config.option_overrides = vec![("shared".to_string(), "maybe".to_string())];
    let kitchen = Kitchen::new(config, Box::new(tool.clone()));

    let err = kitchen
        .cook(&opzioni_recipe(checkout.path()), checkout.path())
        .unwrap_err();
    assert!(err.is_config());
    assert!(tool.calls().is_empty());
}

#[test]
fn test_missing_version_fails_without_building() {
    let checkout = checkout_with(common::OPZIONI_RECIPE, Some("project('opzioni', 'cpp')\n"));
    let store = tempfile::tempdir().unwrap();
    let tool = FakeTool::new();
    let kitchen = Kitchen::new(kitchen_config(store.path()), Box::new(tool.clone()));

    let err = kitchen
        .cook(&opzioni_recipe(checkout.path()), checkout.path())
        .unwrap_err();

    assert!(matches!(err, Error::ConfigError(_)));
    assert!(tool.calls().is_empty());
    assert!(!store.path().join("packages").exists());
}

#[test]
fn test_missing_build_description_fails() {
    let checkout = checkout_with(common::OPZIONI_RECIPE, None);
    let store = tempfile::tempdir().unwrap();
    let kitchen = Kitchen::new(kitchen_config(store.path()), Box::new(FakeTool::new()));

    let err = kitchen
        .cook(&opzioni_recipe(checkout.path()), checkout.path())
        .unwrap_err();
    assert!(err.to_string().contains("meson.build"));
}

#[test]
fn test_version_is_trimmed() {
    let checkout = checkout_with(
        common::OPZIONI_RECIPE,
        Some("project('opzioni', 'cpp', version: ' 1.2.3 ')\n"),
    );
    let store = tempfile::tempdir().unwrap();
    let kitchen = Kitchen::new(kitchen_config(store.path()), Box::new(FakeTool::new()));

    let result = kitchen
        .cook(&opzioni_recipe(checkout.path()), checkout.path())
        .unwrap();
    assert_eq!(result.info.version, "1.2.3");
    assert!(result.package_dir.unwrap().to_string_lossy().contains("1.2.3"));
}

#[test]
fn test_failed_build_stages_nothing() {
    let checkout = opzioni_checkout();
    let store = tempfile::tempdir().unwrap();
    let tool = FakeTool::failing("build");
    let kitchen = Kitchen::new(kitchen_config(store.path()), Box::new(tool.clone()));

    let err = kitchen
        .cook(&opzioni_recipe(checkout.path()), checkout.path())
        .unwrap_err();

    assert!(matches!(err, Error::BuildError { step: "build", .. }));
    assert!(err.to_string().contains("simulated build failure"));
    assert!(!tool.ran_tests());
    assert!(!store.path().join("packages").exists());
}

#[test]
fn test_failed_tests_stage_nothing() {
    let checkout = opzioni_checkout();
    let store = tempfile::tempdir().unwrap();
    let kitchen = Kitchen::new(kitchen_config(store.path()), Box::new(FakeTool::failing("test")));

    let err = kitchen
        .cook(&opzioni_recipe(checkout.path()), checkout.path())
        .unwrap_err();

    assert!(matches!(err, Error::TestError(_)));
    assert!(!store.path().join("packages").exists());
}

#[test]
fn test_run_tests_switch() {
    let checkout = opzioni_checkout();
    let store = tempfile::tempdir().unwrap();
    let recipe = opzioni_recipe(checkout.path());

    let tool = FakeTool::new();
    let result = Kitchen::new(kitchen_config(store.path()), Box::new(tool.clone()))
        .cook(&recipe, checkout.path())
        .unwrap();
    assert!(tool.ran_tests());
    assert!(result.tested);
    assert!(result.log.contains("opzioni tests OK"));

    let tool = FakeTool::new();
    let mut config = kitchen_config(store.path());
    config.run_tests = Some(false);
    let result = Kitchen::new(config, Box::new(tool.clone()))
        .cook(&recipe, checkout.path())
        .unwrap();
    assert!(!tool.ran_tests());
    assert!(!result.tested);
}

#[test]
fn test_recipe_can_disable_tests() {
    let recipe_text = format!("{}\n[build]\nrun_tests = false\n", common::OPZIONI_RECIPE);
    let checkout = checkout_with(&recipe_text, Some(common::OPZIONI_MESON));
    let store = tempfile::tempdir().unwrap();
    let tool = FakeTool::new();

    Kitchen::new(kitchen_config(store.path()), Box::new(tool.clone()))
        .cook(&opzioni_recipe(checkout.path()), checkout.path())
        .unwrap();
    assert!(!tool.ran_tests());
}

#[test]
fn test_staging_disabled_writes_nothing() {
    let checkout = opzioni_checkout();
    let store = tempfile::tempdir().unwrap();
    let mut config = kitchen_config(store.path());
    config.stage_artifacts = Some(false);
    let kitchen = Kitchen::new(config, Box::new(FakeTool::new()));

    let result = kitchen
        .cook(&opzioni_recipe(checkout.path()), checkout.path())
        .unwrap();

    assert_eq!(result.final_step, CookStep::Done);
    assert!(result.package_dir.is_none());
    assert!(result.staged.is_empty());
    assert!(result.info.libs.is_empty());
    assert!(result.warnings.iter().any(|w| w.contains("staging disabled")));
    assert!(!store.path().join("packages").exists());
}

#[test]
fn test_no_dll_is_tolerated() {
    // A static Unix build never produces DLLs; the bin rule matches nothing
    let checkout = opzioni_checkout();
    let store = tempfile::tempdir().unwrap();
    let kitchen = Kitchen::new(kitchen_config(store.path()), Box::new(FakeTool::new()));

    let result = kitchen
        .cook(&opzioni_recipe(checkout.path()), checkout.path())
        .unwrap();
    let files = files_under(&result.package_dir.unwrap());
    assert!(!files.iter().any(|f| f.ends_with(".dll")));
}

#[test]
fn test_cooking_twice_reconfigures_same_package() {
    let checkout = opzioni_checkout();
    let store = tempfile::tempdir().unwrap();
    let recipe = opzioni_recipe(checkout.path());
    let tool = FakeTool::new();
    let kitchen = Kitchen::new(kitchen_config(store.path()), Box::new(tool.clone()));

    let first = kitchen.cook(&recipe, checkout.path()).unwrap();
    let second = kitchen.cook(&recipe, checkout.path()).unwrap();

    assert_eq!(first.package_dir, second.package_dir);
    assert_eq!(tool.configure_calls().len(), 2);
    assert_eq!(first.staged.len(), second.staged.len());
}

#[test]
fn test_build_dir_inside_source_is_not_staged_twice() {
    let checkout = opzioni_checkout();
    let store = tempfile::tempdir().unwrap();
    let tool = FakeTool::new();
    let kitchen = Kitchen::new(kitchen_config(store.path()), Box::new(tool.clone()));

    let result = kitchen
        .cook(&opzioni_recipe(checkout.path()), checkout.path())
        .unwrap();

    match &tool.configure_calls()[0] {
        Call::Configure { source_dir, build_dir, .. } => {
            assert!(build_dir.starts_with(source_dir));
            assert_ne!(build_dir, source_dir);
        }
        other => panic!("unexpected call {:?}", other),
    }
    let libs: Vec<_> = result
        .staged
        .iter()
        .filter(|p| p.starts_with("lib") && p.extension().is_some_and(|e| e == "a" || e == "lib"))
        .collect();
    assert_eq!(libs.len(), 1);
}
