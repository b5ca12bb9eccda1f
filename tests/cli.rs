#![allow(deprecated)] // cargo_bin is deprecated but still supported by assert_cmd

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture_manifest() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/Cargo.toml")
}

fn write_binaries(dir: &Path) -> PathBuf {
    let mut entries = Vec::new();
    for (os, name, ext) in [("linux", "myapp", ""), ("windows", "myapp.exe", ".exe")] {
        let bin_dir = dir.join("build").join(format!("{os}_amd64"));
        std::fs::create_dir_all(&bin_dir).unwrap();
        let path = bin_dir.join(name);
        std::fs::write(&path, format!("{os} binary")).unwrap();
        entries.push(json!({
            "type": "binary",
            "name": name,
            "path": path,
            "os": os,
            "arch": "amd64",
            "extra": { "ID": "myapp", "Ext": ext }
        }));
    }

    let artifacts = dir.join("binaries.json");
    std::fs::write(&artifacts, serde_json::to_string_pretty(&entries).unwrap()).unwrap();
    artifacts
}

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("kodegen_bundler_archive").unwrap();
    cmd.env_remove("KODEGEN_DIST").env_remove("KODEGEN_PARALLELISM");
    cmd
}

#[test]
fn packages_fixture_project() {
    let tmp = TempDir::new().unwrap();
    let artifacts = write_binaries(tmp.path());
    let dist = tmp.path().join("out");

    cmd()
        .arg("--manifest-path")
        .arg(fixture_manifest())
        .arg("--artifacts")
        .arg(&artifacts)
        .arg("--dist")
        .arg(&dist)
        .args(["-p", "2"])
        .assert()
        .success();

    assert!(dist.join("myapp_1.0.0_linux_amd64.tar.gz").is_file());
    assert!(dist.join("myapp_1.0.0_windows_amd64.zip").is_file());

    let zip_file = std::fs::File::open(dist.join("myapp_1.0.0_windows_amd64.zip")).unwrap();
    let mut zip = zip::ZipArchive::new(zip_file).unwrap();
    for name in ["README.md", "LICENSE", "docs/usage.md", "myapp.exe"] {
        assert!(zip.by_name(name).is_ok(), "missing {name}");
    }

    let listing: Vec<Value> =
        serde_json::from_str(&std::fs::read_to_string(dist.join("artifacts.json")).unwrap())
            .unwrap();
    let kinds: Vec<_> = listing.iter().map(|a| a["type"].as_str().unwrap()).collect();
    assert_eq!(kinds.iter().filter(|k| **k == "binary").count(), 2);
    assert_eq!(kinds.iter().filter(|k| **k == "uploadable_archive").count(), 2);
}

#[test]
fn missing_artifacts_file_fails() {
    let tmp = TempDir::new().unwrap();

    cmd()
        .arg("--manifest-path")
        .arg(fixture_manifest())
        .arg("--artifacts")
        .arg(tmp.path().join("nope.json"))
        .arg("--dist")
        .arg(tmp.path().join("out"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn zero_parallelism_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let artifacts = write_binaries(tmp.path());

    cmd()
        .arg("--manifest-path")
        .arg(fixture_manifest())
        .arg("--artifacts")
        .arg(&artifacts)
        .args(["-p", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Parallelism must be at least 1"));
}

#[test]
fn binary_format_writes_listing_into_fresh_dist() {
    let tmp = TempDir::new().unwrap();
    let artifacts = write_binaries(tmp.path());
    let manifest = tmp.path().join("Cargo.toml");
    std::fs::write(
        &manifest,
        r#"
[package]
name = "myapp"
version = "1.0.0"

[[package.metadata.release.archives]]
format = "binary"
"#,
    )
    .unwrap();
    let dist = tmp.path().join("out");

    cmd()
        .arg("--manifest-path")
        .arg(&manifest)
        .arg("--artifacts")
        .arg(&artifacts)
        .arg("--dist")
        .arg(&dist)
        .assert()
        .success();

    let listing: Vec<Value> =
        serde_json::from_str(&std::fs::read_to_string(dist.join("artifacts.json")).unwrap())
            .unwrap();
    let names: Vec<_> = listing
        .iter()
        .filter(|a| a["type"] == "uploadable_binary")
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names.len(),
        2,
        "expected one uploadable binary per input: {names:?}"
    );
    assert!(names.contains(&"myapp_1.0.0_linux_amd64"));
    assert!(names.contains(&"myapp_1.0.0_windows_amd64.exe"));
}
