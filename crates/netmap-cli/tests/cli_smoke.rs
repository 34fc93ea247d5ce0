use assert_cmd::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn repo_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .to_path_buf()
}

fn maps_fixture(name: &str) -> String {
    let path = repo_root().join("fixtures").join("maps").join(name);
    assert!(path.exists(), "fixture missing: {}", path.display());
    path.to_string_lossy().into_owned()
}

#[test]
fn cli_renders_svg_with_polls_applied() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let out = tmp.path().join("campus.svg");
    let stencils = maps_fixture("stencils.json");
    let status = maps_fixture("campus.status.json");
    let overlay = maps_fixture("campus.overlay.json");
    let stp = maps_fixture("campus.stp.json");
    let snapshot = maps_fixture("campus.json");

    let exe = assert_cmd::cargo_bin!("netmap-cli");
    Command::new(exe)
        .current_dir(repo_root())
        .args([
            "render",
            "--stencils",
            stencils.as_str(),
            "--status",
            status.as_str(),
            "--overlay",
            overlay.as_str(),
            "--stp",
            stp.as_str(),
            "--id",
            "campus",
            "--out",
            out.to_string_lossy().as_ref(),
            snapshot.as_str(),
        ])
        .assert()
        .success();

    let svg = fs::read_to_string(&out).expect("read svg");
    assert!(svg.starts_with("<svg"), "output is not an SVG");
    assert!(svg.contains(r#"id="campus""#));
    assert!(svg.contains(r#"id="managedobject:1""#));
    assert!(svg.contains("CPU 12%"));
    // The external node is hidden: the map has more links than `max_links`.
    assert!(!svg.contains(r#"id="managedobject:3""#));
}

#[test]
fn cli_prints_payload_json() {
    let stencils = maps_fixture("stencils.json");
    let snapshot = maps_fixture("campus.json");
    let exe = assert_cmd::cargo_bin!("netmap-cli");
    let output = Command::new(exe)
        .current_dir(repo_root())
        .args([
            "payload",
            "--view-all",
            "--stencils",
            stencils.as_str(),
            snapshot.as_str(),
        ])
        .output()
        .expect("run netmap-cli");
    assert!(output.status.success(), "{output:?}");

    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("payload is JSON");
    assert_eq!(payload["nodes"].as_array().map(Vec::len), Some(3));
    assert_eq!(payload["links"].as_array().map(Vec::len), Some(3));
}

#[test]
fn cli_layers_config_files_in_order() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let base = tmp.path().join("base.json");
    let local = tmp.path().join("local.json");
    fs::write(&base, r#"{"icon": {"size": "2x", "width": 48}, "paper": {"padding": 10}}"#)
        .expect("write base");
    fs::write(&local, r#"{"icon": {"size": "4x"}}"#).expect("write local");
    let base = base.to_string_lossy().into_owned();
    let local = local.to_string_lossy().into_owned();
    let stencils = maps_fixture("stencils.json");
    let snapshot = maps_fixture("campus.json");

    let exe = assert_cmd::cargo_bin!("netmap-cli");
    let output = Command::new(exe)
        .current_dir(repo_root())
        .args([
            "render",
            "--config",
            base.as_str(),
            "--config",
            local.as_str(),
            "--stencils",
            stencils.as_str(),
            snapshot.as_str(),
        ])
        .output()
        .expect("run netmap-cli");
    assert!(output.status.success(), "{output:?}");
    let svg = String::from_utf8_lossy(&output.stdout);
    assert!(svg.contains("gf-4x"), "later config wins");
    assert!(!svg.contains("gf-2x"));
}

#[test]
fn cli_reads_the_snapshot_from_stdin() {
    let snapshot = fs::read_to_string(maps_fixture("configured.json")).expect("fixture");
    let exe = assert_cmd::cargo_bin!("netmap-cli");
    assert_cmd::Command::new(exe)
        .current_dir(repo_root())
        .args(["render", "-"])
        .write_stdin(snapshot)
        .assert()
        .success();
}

#[test]
fn cli_fails_on_unknown_stencils() {
    let snapshot = maps_fixture("campus.json");
    let exe = assert_cmd::cargo_bin!("netmap-cli");
    let output = Command::new(exe)
        .current_dir(repo_root())
        .args(["render", snapshot.as_str()])
        .output()
        .expect("run netmap-cli");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown shape: Cisco/router"), "{stderr}");
}

#[test]
fn cli_rejects_bad_arguments() {
    let exe = assert_cmd::cargo_bin!("netmap-cli");
    Command::new(exe)
        .args(["render", "--zoom", "-2"])
        .assert()
        .code(2);
}
