use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_docmark")))
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

// -- version --

#[test]
fn version_prints_package_version() {
    cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(format!("docmark {}\n", env!("CARGO_PKG_VERSION")));
}

// -- init --

#[test]
fn init_writes_default_config() {
    let dir = TempDir::new().unwrap();

    cmd()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Config written to: docmark.toml"));

    let written = std::fs::read_to_string(dir.path().join("docmark.toml")).unwrap();
    assert!(written.contains("[build]"));
    assert!(written.contains("ignore_underscore_files = true"));
}

#[test]
fn init_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("custom.toml");
    std::fs::write(&config, "# mine\n").unwrap();

    cmd()
        .args(["init", "--config", config.to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:").and(predicate::str::contains("--force")));
    assert_eq!(std::fs::read_to_string(&config).unwrap(), "# mine\n");

    cmd()
        .args(["init", "--config", config.to_str().unwrap(), "--force"])
        .assert()
        .success();
    assert!(std::fs::read_to_string(&config).unwrap().contains("[render]"));
}

// -- build / clean --

#[test]
fn build_writes_pages() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("docs");

    cmd()
        .current_dir(dir.path())
        .args(["build", &fixture_path("shapes"), "-o", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Generated 5 pages from 1 module roots (0 skipped)",
        ));

    assert!(out.join("shapes/README.md").is_file());
    assert!(out.join("shapes/circle.md").is_file());
    assert!(out.join("shapes/util/mathx.md").is_file());
    assert!(!out.join("shapes/_internal.md").exists());
}

#[test]
fn build_flags_override_filters() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("docs");

    cmd()
        .current_dir(dir.path())
        .args([
            "build",
            &fixture_path("shapes"),
            "-o",
            out.to_str().unwrap(),
            "--no-root-directories",
            "--include-underscore-files",
            "--ignore",
            "util",
        ])
        .assert()
        .success();

    assert!(out.join("README.md").is_file());
    assert!(out.join("_internal.md").is_file());
    assert!(out.join("__init__.md").is_file());
    assert!(!out.join("util").exists());
}

#[test]
fn build_reads_config_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("site");
    let config = format!(
        "[build]\nmodules = [\"{}\"]\noutput_directory = \"{}\"\nbuild_version = false\n",
        fixture_path("shapes/util"),
        out.display()
    );
    std::fs::write(dir.path().join("docmark.toml"), config).unwrap();

    cmd().current_dir(dir.path()).arg("build").assert().success();

    let page = std::fs::read_to_string(out.join("util/mathx.md")).unwrap();
    assert!(page.starts_with("# mathx\n\nSmall math helpers.\n"));
    assert!(!page.contains("Generated by docmark"));
}

#[test]
fn clean_removes_built_pages() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("docs");
    let out_arg = out.to_str().unwrap();

    cmd()
        .current_dir(dir.path())
        .args(["build", &fixture_path("shapes"), "-o", out_arg])
        .assert()
        .success();

    cmd()
        .current_dir(dir.path())
        .args(["clean", &fixture_path("shapes"), "-o", out_arg])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 5 pages"));

    assert!(out.is_dir());
    assert!(!out.join("shapes").exists());
}

#[test]
fn build_without_modules_fails() {
    let dir = TempDir::new().unwrap();

    cmd()
        .current_dir(dir.path())
        .arg("build")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: Config validation error"));
}

#[test]
fn build_missing_module_fails() {
    let dir = TempDir::new().unwrap();

    cmd()
        .current_dir(dir.path())
        .args(["build", "no/such/pkg"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: Path not found"));
}

// -- inspect --

#[test]
fn inspect_prints_module_json() {
    let assert = cmd()
        .args(["inspect", &fixture_path("shapes/circle.py")])
        .assert()
        .success();

    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json["name"], "circle");
    assert_eq!(json["docstring"], "Circles.");
    assert!(output.contains("\"from_diameter\""));
    assert!(output.contains("\"Circle\""));
}

#[test]
fn inspect_missing_file_fails() {
    cmd()
        .args(["inspect", "missing.py"])
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("Error:"));
}
