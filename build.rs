// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Positional recipe directory argument
fn recipe_arg() -> Arg {
    Arg::new("recipe")
        .default_value(".")
        .help("Recipe directory or recipe file")
}

/// Arguments shared by every command that builds something
fn kitchen_args() -> [Arg; 5] {
    [
        Arg::new("setting")
            .short('s')
            .long("setting")
            .value_name("KEY=VALUE")
            .action(ArgAction::Append)
            .help("Setting override, e.g. -s build_type=Debug"),
        Arg::new("option")
            .short('o')
            .long("option")
            .value_name("NAME=VALUE")
            .action(ArgAction::Append)
            .help("Option override, e.g. -o shared=true"),
        Arg::new("output")
            .long("output")
            .value_name("DIR")
            .help("Package store root"),
        Arg::new("meson")
            .long("meson")
            .value_name("PATH")
            .help("Explicit meson executable"),
        Arg::new("cross_file")
            .long("cross-file")
            .value_name("PATH")
            .help("Meson cross file, required when the settings target another machine"),
    ]
}

/// Switches controlling which cook steps run
fn cook_args() -> [Arg; 5] {
    [
        Arg::new("run_tests")
            .long("run-tests")
            .action(ArgAction::SetTrue)
            .help("Run the project's test suite even if the recipe disables it"),
        Arg::new("no_tests")
            .long("no-tests")
            .action(ArgAction::SetTrue)
            .help("Skip the project's test suite"),
        Arg::new("no_stage")
            .long("no-stage")
            .action(ArgAction::SetTrue)
            .help("Build and verify only, do not stage a package"),
        Arg::new("local")
            .long("local")
            .action(ArgAction::SetTrue)
            .help("Developer mode: use the recipe's local header layout"),
        Arg::new("check_requirements")
            .long("check-requirements")
            .action(ArgAction::SetTrue)
            .help("Check requirements with pkg-config before building"),
    ]
}

fn keep_builddir_arg() -> Arg {
    Arg::new("keep_builddir")
        .long("keep-builddir")
        .action(ArgAction::SetTrue)
        .help("Keep the consumer build directory")
}

fn build_cli() -> Command {
    Command::new("cookbook")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Cookbook Contributors")
        .about("Build, stage and smoke-test C++ library packages from recipes")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Increase log verbosity"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .global(true)
                .help("User config file"),
        )
        .subcommand(
            Command::new("cook")
                .about("Cook a package: resolve version, configure, build, test and stage")
                .arg(recipe_arg())
                .args(kitchen_args())
                .args(cook_args()),
        )
        .subcommand(
            Command::new("taste")
                .about("Build a test package against a staged package and run it")
                .arg(Arg::new("test_dir").default_value("test_package").help("Test package directory"))
                .arg(
                    Arg::new("package")
                        .short('p')
                        .long("package")
                        .value_name("DIR")
                        .required(true)
                        .help("Staged package directory"),
                )
                .args(kitchen_args())
                .arg(keep_builddir_arg()),
        )
        .subcommand(
            Command::new("create")
                .about("Cook a package, then taste it with the recipe's test_package")
                .arg(recipe_arg())
                .args(kitchen_args())
                .args(cook_args())
                .arg(keep_builddir_arg()),
        )
        .subcommand(
            Command::new("version")
                .about("Print the resolved package version")
                .arg(recipe_arg()),
        )
        .subcommand(
            Command::new("inspect")
                .about("Show recipe metadata")
                .arg(recipe_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("Parse and validate a recipe")
                .arg(recipe_arg()),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completions")
                .arg(Arg::new("shell").required(true).help("Shell to generate completions for")),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("cookbook.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
