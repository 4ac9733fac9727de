use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::tempdir;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../bbh-meta/tests/fixtures/metadata.txt")
}

fn bbh(args: &[&str]) -> Output {
    bbh_logging(args, "off")
}

fn bbh_logging(args: &[&str], filter: &str) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bbh"))
        .args(args)
        .env("RUST_LOG", filter)
        .output()
        .expect("run bbh")
}

fn path_arg(path: &std::path::Path) -> String {
    path.display().to_string()
}

#[test]
fn show_json_includes_hash_and_derived() {
    let out = bbh(&["show", &path_arg(&fixture()), "--derived"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).expect("json output");
    assert_eq!(json["hash"].as_str().map(str::len), Some(64));
    assert!(json["derived"]["mass_ratio"].as_f64().expect("mass ratio") >= 1.0);
    assert!(json["record"].is_object());
}

#[test]
fn show_csv_lists_key_value_rows() {
    let out = bbh(&["show", &path_arg(&fixture()), "--format", "csv"]);
    assert!(out.status.success());
    let text = String::from_utf8(out.stdout).expect("utf8");
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("key,value"));
    assert!(text.lines().any(|line| line.starts_with("simulation-name,")));
}

#[test]
fn fmt_output_is_a_fixed_point() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("metadata.txt");
    let first = bbh(&["fmt", &path_arg(&fixture())]);
    assert!(first.status.success());
    fs::write(&path, &first.stdout).expect("write");

    let check = bbh(&["fmt", "--check", &path_arg(&path)]);
    assert!(check.status.success(), "{}", String::from_utf8_lossy(&check.stderr));

    let rewrite = bbh(&["fmt", "--write", &path_arg(&path)]);
    assert!(rewrite.status.success());
    assert_eq!(fs::read(&path).expect("read"), first.stdout);
}

#[test]
fn check_walks_directories_and_reports_failures() {
    let dir = tempdir().expect("tempdir");
    let good = dir.path().join("q1").join("metadata.txt");
    let bad = dir.path().join("q4").join("metadata.txt");
    fs::create_dir_all(good.parent().expect("parent")).expect("mkdir");
    fs::create_dir_all(bad.parent().expect("parent")).expect("mkdir");
    fs::copy(fixture(), &good).expect("copy");
    fs::write(&bad, "remnant-velocity = 0.1, 0.2\n").expect("write");
    fs::write(dir.path().join("notes.txt"), "not = metadata = at all\n").expect("write");

    let out = bbh(&["check", &path_arg(&good)]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let out = bbh(&["check", "--json", &path_arg(dir.path())]);
    assert!(!out.status.success());
    let results: serde_json::Value = serde_json::from_slice(&out.stdout).expect("json output");
    let results = results.as_array().expect("array");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["ok"], serde_json::Value::Bool(true));
    assert_eq!(results[1]["ok"], serde_json::Value::Bool(false));
}

#[test]
fn strict_check_fails_on_warnings() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("metadata.txt");
    fs::write(
        &path,
        "object1 = bh\nobject2 = bh\nremnant-dimensionless-spin = 0.0, 0.0, 1.2\n",
    )
    .expect("write");
    assert!(bbh(&["check", &path_arg(&path)]).status.success());
    assert!(!bbh(&["check", "--strict", &path_arg(&path)]).status.success());
}

#[test]
fn config_file_changes_duplicate_policy() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("metadata.txt");
    let config = dir.path().join("parse.yaml");
    fs::write(&path, "remnant-mass = 0.9\nremnant-mass = 0.8\n").expect("write");
    fs::write(&config, "duplicates: last\n").expect("write");

    assert!(!bbh(&["show", &path_arg(&path)]).status.success());
    let out = bbh(&["--config", &path_arg(&config), "show", "--format", "text", &path_arg(&path)]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let text = String::from_utf8(out.stdout).expect("utf8");
    assert!(text.contains("remnant-mass = 0.8"));
}

#[test]
fn keys_and_version_print() {
    let out = bbh(&["keys", "--json"]);
    assert!(out.status.success());
    let keys: serde_json::Value = serde_json::from_slice(&out.stdout).expect("json");
    assert!(keys
        .as_array()
        .expect("array")
        .iter()
        .any(|spec| spec["name"] == "remnant-mass"));

    let out = bbh(&["version"]);
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8(out.stdout).expect("utf8").trim(),
        env!("CARGO_PKG_VERSION")
    );
}

#[test]
fn check_reports_each_warning_once() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("metadata.txt");
    let config = dir.path().join("parse.yaml");
    fs::write(
        &path,
        "object1 = bh\nobject2 = bh\nremnant-dimensionless-spin = 0.0, 0.0, 1.2\n",
    )
    .expect("write");
    fs::write(&config, "validate: true\n").expect("write");

    let out = bbh_logging(
        &["--config", &path_arg(&config), "check", &path_arg(&path)],
        "warn",
    );
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).expect("utf8");
    let stderr = String::from_utf8(out.stderr).expect("utf8");
    assert_eq!(stdout.matches("exceeds 1").count(), 1);
    assert_eq!(stderr.matches("exceeds 1").count(), 0);
}
