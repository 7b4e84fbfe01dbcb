//! CLI integration tests for freeze2nix.
//!
//! Conversions run against a mock index and pass `--tag` so no Python
//! interpreter is needed.

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use freeze2nix_test_utils::{Fixtures, ListedFile, MockIndex, sha256_hex};
use predicates::prelude::*;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Get the freeze2nix binary command.
fn freeze2nix() -> Command {
    let mut cmd = Command::new(cargo_bin!("freeze2nix"));
    cmd.env_remove("PIP_INDEX_URL")
        .env_remove("FREEZE2NIX_CACHE_DIR")
        .env_remove("FREEZE2NIX_PYTHON")
        .env_remove("RUST_LOG");
    cmd
}

/// Run off the async runtime so the mock index keeps serving.
async fn run(mut cmd: Command) -> Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

async fn requests_index() -> MockIndex {
    let index = MockIndex::start().await;
    for (name, file) in [
        ("certifi", "certifi-2023.7.22-py3-none-any.whl"),
        ("charset-normalizer", "charset_normalizer-3.2.0-py3-none-any.whl"),
        ("idna", "idna-3.4-py3-none-any.whl"),
        ("urllib3", "urllib3-2.0.4-py3-none-any.whl"),
    ] {
        index
            .register_project(name, &[ListedFile::new(file, file.as_bytes().to_vec()).with_published_hash()])
            .await;
    }
    index
        .register_project(
            "requests",
            &[ListedFile::new("requests-2.31.0.tar.gz", b"requests sdist".to_vec())],
        )
        .await;
    index
}

// ========== Help and Version Tests ==========

#[test]
fn test_help_output() {
    freeze2nix()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("convert"))
        .stdout(predicate::str::contains("order"))
        .stdout(predicate::str::contains("tags"));
}

#[test]
fn test_version_output() {
    freeze2nix()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("freeze2nix"));
}

#[test]
fn test_convert_help() {
    freeze2nix()
        .args(["convert", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--index-url"))
        .stdout(predicate::str::contains("--cache-dir"))
        .stdout(predicate::str::contains("--tag"));
}

// ========== Order Tests ==========

#[test]
fn test_order_prints_dependencies_first() {
    let (_dir, path) = Fixtures::write_lockfile(Fixtures::requests_lockfile()).unwrap();
    freeze2nix()
        .arg("order")
        .arg(&path)
        .assert()
        .success()
        .stdout(
            "certifi==2023.7.22\ncharset-normalizer==3.2.0\nidna==3.4\nurllib3==2.0.4\nrequests==2.31.0\n",
        );
}

#[test]
fn test_order_json() {
    let (_dir, path) = Fixtures::write_lockfile(Fixtures::requests_lockfile()).unwrap();
    let output = freeze2nix().args(["order", "--json"]).arg(&path).output().unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let last = &parsed[4];
    assert_eq!(last["name"], "requests");
    assert_eq!(last["direct"], true);
    assert_eq!(last["dependencies"].as_array().unwrap().len(), 4);
}

#[test]
fn test_order_reports_cycle() {
    let (_dir, path) = Fixtures::write_lockfile(Fixtures::cyclic_lockfile()).unwrap();
    freeze2nix()
        .arg("order")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("E0103"))
        .stderr(predicate::str::contains("ping, pong"));
}

#[test]
fn test_order_rejects_inline_annotations() {
    let (_dir, path) = Fixtures::write_lockfile(Fixtures::inline_annotation_lockfile()).unwrap();
    freeze2nix()
        .arg("order")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("E0101"))
        .stderr(predicate::str::contains("line 4"));
}

#[test]
fn test_missing_lockfile() {
    let dir = TempDir::new().unwrap();
    freeze2nix()
        .arg("order")
        .arg(dir.path().join("nope.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("E0501"));
}

// ========== Convert Tests ==========

#[tokio::test(flavor = "multi_thread")]
async fn test_convert_writes_nix_next_to_lockfile() {
    let index = requests_index().await;
    let (dir, path) = Fixtures::write_lockfile(Fixtures::requests_lockfile()).unwrap();
    let cache = TempDir::new().unwrap();

    let mut cmd = freeze2nix();
    cmd.arg("convert")
        .arg(&path)
        .args(["--index-url", &index.index_url()])
        .arg("--cache-dir")
        .arg(cache.path())
        .args(["--tag", "py3-none-any"]);
    let output = run(cmd).await;
    output.assert().success().stderr(predicate::str::contains(
        "Processing 5/5 (100.00%) requests",
    ));

    let nix = std::fs::read_to_string(dir.path().join("requirements.nix")).unwrap();
    assert!(nix.starts_with("{ python, nixpkgs }:\nlet\n  certifi = "));
    assert!(nix.ends_with("in\n[\n  requests\n]\n"));
    assert!(nix.contains(&format!("sha256 = \"{}\";", sha256_hex(b"requests sdist"))));
    assert!(nix.contains("format = \"setuptools\";"));
    assert!(nix.contains("      charset-normalizer\n      idna\n"));
    assert!(cache.path().join("requests-2.31.0.tar.gz").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_convert_with_explicit_output_and_env_index() {
    let index = requests_index().await;
    let (dir, path) = Fixtures::write_lockfile(Fixtures::requests_lockfile()).unwrap();
    let out = dir.path().join("python-packages.nix");

    let mut cmd = freeze2nix();
    cmd.arg("-q")
        .arg("convert")
        .arg(&path)
        .arg("-o")
        .arg(&out)
        .args(["--tag", "py3-none-any", "--jobs", "1"])
        .env("PIP_INDEX_URL", index.index_url())
        .env("FREEZE2NIX_CACHE_DIR", dir.path().join("cache"));
    let output = run(cmd).await;
    output.assert().success().stderr(predicate::str::is_empty());

    assert!(out.exists());
    assert!(!dir.path().join("requirements.nix").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_convert_missing_artifact() {
    let index = MockIndex::start().await;
    index
        .register_project("six", &[ListedFile::new("six-1.15.0.tar.gz", b"old".to_vec())])
        .await;
    let (dir, path) = Fixtures::write_lockfile("six==1.16.0\n    # via -r requirements.in\n").unwrap();

    let mut cmd = freeze2nix();
    cmd.arg("convert")
        .arg(&path)
        .args(["--index-url", &index.index_url(), "--tag", "py3-none-any"])
        .arg("--cache-dir")
        .arg(dir.path().join("cache"));
    let output = run(cmd).await;
    output
        .assert()
        .failure()
        .stderr(predicate::str::contains("E0301"))
        .stderr(predicate::str::contains("six==1.16.0"));
    assert!(!dir.path().join("requirements.nix").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_convert_unknown_project() {
    let index = MockIndex::start().await;
    let (dir, path) = Fixtures::write_lockfile("six==1.16.0\n    # via -r requirements.in\n").unwrap();

    let mut cmd = freeze2nix();
    cmd.arg("convert")
        .arg(&path)
        .args(["--index-url", &index.index_url(), "--tag", "py3-none-any"])
        .arg("--cache-dir")
        .arg(dir.path().join("cache"));
    run(cmd)
        .await
        .assert()
        .failure()
        .stderr(predicate::str::contains("E0201"));
}

#[test]
fn test_convert_rejects_bad_tag() {
    let (_dir, path) = Fixtures::write_lockfile(Fixtures::requests_lockfile()).unwrap();
    freeze2nix()
        .arg("convert")
        .arg(&path)
        .args(["--tag", "nonsense", "--index-url", "http://127.0.0.1:9/simple"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E0601"));
}
