//! Tests for error handling, suggestions and exit codes.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cmd(dir: &TempDir) -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("archforge");
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join(".config"))
        .env("NO_COLOR", "1")
        .env_remove("ARCHFORGE_TIMESTAMP");
    cmd
}

#[test]
fn test_error_unknown_format_value() {
    let dir = TempDir::new().unwrap();
    cmd(&dir)
        .args(["generate", "shop.yaml", "--format", "pulumi"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("terraform"))
        .stderr(predicate::str::contains("docker-compose"));
}

#[test]
fn test_error_unparseable_architecture() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("broken.json"), "{\"name\": \"shop\", \"components\": [").unwrap();

    cmd(&dir)
        .args(["generate", "broken.json", "--format", "k8s", "--provider", "aws"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid architecture file"))
        .stderr(predicate::str::contains("Suggestions:"));
}

#[test]
fn test_error_unknown_service_type() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("chain.toml"),
        "name = \"ledger\"\n\n[[components]]\nname = \"miner\"\ntype = \"blockchain\"\n",
    )
    .unwrap();

    cmd(&dir)
        .args(["generate", "chain.toml", "--format", "terraform", "--provider", "gcp"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("blockchain"));
}

#[test]
fn test_error_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("shop.xml"), "<architecture/>").unwrap();

    cmd(&dir)
        .args(["generate", "shop.xml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains(".yaml"));
}

#[test]
fn test_error_invalid_config_default() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("shop.json"), r#"{"name": "shop", "components": []}"#).unwrap();

    cmd(&dir)
        .env("ARCHFORGE_DEFAULTS__PROVIDER", "digitalocean")
        .args(["generate", "shop.json", "--format", "k8s"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("invalid default 'digitalocean'"));
}

#[test]
fn test_error_missing_config_file() {
    let dir = TempDir::new().unwrap();
    cmd(&dir)
        .args(["--config", "missing.toml", "formats"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_verbose_error_shows_cause() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("shop.json"), r#"{"name": "shop", "components": []}"#).unwrap();

    cmd(&dir)
        .env("ARCHFORGE_DEFAULTS__FORMAT", "pulumi")
        .args(["-v", "generate", "shop.json", "--provider", "aws"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Caused by: unknown output format: pulumi"))
        .stderr(predicate::str::contains("Use -v / --verbose").not());
}
