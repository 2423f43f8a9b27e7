//! End-to-end CLI tests.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn tkst() -> Command {
    Command::cargo_bin("tkst").expect("binary builds")
}

fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn eval_simple_expression() {
    tkst()
        .args(["eval", "16 * 2px"])
        .assert()
        .success()
        .stdout(predicate::str::contains("32px"));
}

#[test]
fn eval_with_reference_binding() {
    tkst()
        .args(["eval", "{base} + 4px", "--ref", "base=16"])
        .assert()
        .success()
        .stdout(predicate::str::contains("20px"));
}

#[test]
fn eval_failure_exits_nonzero() {
    tkst().args(["eval", "1 / 0"]).assert().failure();
}

#[test]
fn resolve_flat_document() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(
        &dir,
        "tokens.json",
        r#"{"base": "16", "derived": "{base} * 2px"}"#,
    );

    tkst()
        .arg("resolve")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"32px\""));
}

#[test]
fn resolve_reports_per_token_errors() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(&dir, "tokens.json", r#"{"a": "{b}", "b": "{a}", "ok": "1"}"#);

    tkst()
        .arg("resolve")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("circular_dependency"));
}

#[test]
fn resolve_dtcg_document() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_file(
        &dir,
        "tokens.json",
        r#"{"base": {"spacing": {"$value": "8"}}, "gap": {"$value": "{base.spacing} * 2px"}}"#,
    );

    tkst()
        .arg("resolve")
        .arg(&input)
        .args(["--pretty"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"16px\""));
}

#[test]
fn resolve_with_registered_unit_spec() {
    let dir = tempfile::tempdir().unwrap();
    let px = write_file(
        &dir,
        "px.json",
        r#"{"name": "https://specs.tokenscript.dev/unit/px/0/", "keyword": "px", "type": "absolute"}"#,
    );
    let gu = write_file(
        &dir,
        "gu.json",
        r#"{"name": "https://specs.tokenscript.dev/unit/gu/0/", "keyword": "gu", "type": "relative",
            "to_absolute": {"type": "https://specs.tokenscript.dev/unit/px/0/",
                            "script": "{input}.to_number() * 4px"}}"#,
    );
    let input = write_file(&dir, "tokens.json", r#"{"total": "2gu + 4px"}"#);

    tkst()
        .arg("resolve")
        .arg(&input)
        .arg("--unit-spec")
        .arg(&px)
        .arg("--unit-spec")
        .arg(&gu)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"12px\""));
}

#[test]
fn missing_input_file_fails() {
    tkst()
        .args(["resolve", "/nonexistent/tokens.json"])
        .assert()
        .failure();
}
