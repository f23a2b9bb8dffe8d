//! Runs the `loom` binary end to end.

use std::path::Path;
use std::process::{Command, Output};

fn loom(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_loom"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn print_lagce_text() {
    let dir = tempfile::tempdir().unwrap();
    let out = loom(dir.path(), &["print"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.starts_with("; module lagce\n"));
    assert!(text.contains("proc @LAGCE_proc (i1 %CK, i1 %E, i1 %Q) -> (i1 %GCK, i1 %Q) {"));
    assert!(text.contains("    br.cond i1 %0, %ckl, %ckh\n"));
    assert!(text.contains("inst p @LAGCE_proc"));
}

#[test]
fn print_json_from_config() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("loom.toml"), "[output]\nformat = \"json\"\n").unwrap();
    let out = loom(dir.path(), &["print"]);
    assert!(out.status.success());
    let value: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(value["units"][1]["name"], "LAGCE");
}

#[test]
fn verify_clean_design() {
    let dir = tempfile::tempdir().unwrap();
    let out = loom(dir.path(), &["verify", "--color", "never"]);
    assert!(out.status.success());
    assert!(stderr(&out).contains("Result: 0 error(s), 0 warning(s)"));
}

#[test]
fn verify_orphan_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = loom(dir.path(), &["verify", "--design", "lagce-orphan", "--color", "never"]);
    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.contains("error[E305]: block %ckla in @LAGCE_proc is not reachable"));
    assert!(err.contains("--> @LAGCE_proc %ckla"));
}

#[test]
fn verify_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let out = loom(dir.path(), &["verify", "-d", "lagce-orphan", "-f", "json"]);
    assert_eq!(out.status.code(), Some(1));
    let text = stdout(&out);
    let first = text.lines().next().unwrap();
    let diag: serde_json::Value = serde_json::from_str(first).unwrap();
    assert_eq!(diag["severity"], "error");
}

#[test]
fn reduce_inverter() {
    let dir = tempfile::tempdir().unwrap();
    let out = loom(dir.path(), &["reduce", "--design", "inverter", "-q"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("entity @inv.ent (i1 %a) -> (i1 %y) {"));
    assert!(text.contains("    drv i1 %y, i1 %0\n"));
}

#[test]
fn reduce_lagce_declines() {
    let dir = tempfile::tempdir().unwrap();
    let out = loom(dir.path(), &["reduce", "--color", "never"]);
    assert!(out.status.success());
    assert!(stderr(&out).contains("note[E318]"));
    assert!(!stdout(&out).contains(".ent"));
}

#[test]
fn invalid_config_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("loom.toml"), "[output]\nformat = \"xml\"\n").unwrap();
    let out = loom(dir.path(), &["print"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("unknown output format 'xml'"));
}
