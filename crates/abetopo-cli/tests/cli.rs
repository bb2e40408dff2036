use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("abetopo"))
}

fn repo_root() -> std::path::PathBuf {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest
        .parent()
        .and_then(|p| p.parent())
        .expect("repo root")
        .to_path_buf()
}

fn golden_input(case: &str) -> std::path::PathBuf {
    repo_root()
        .join("tests")
        .join("golden")
        .join(case)
        .join("input.bin")
}

fn stdout_json(args: &[&str], input: &std::path::Path) -> Value {
    let assert = cmd()
        .arg("dump")
        .arg(input)
        .arg("--stdout")
        .args(args)
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    serde_json::from_str(&stdout).expect("valid json")
}

#[test]
fn help_supports_dump_and_decode() {
    cmd().arg("dump").arg("--help").assert().success();
    cmd().arg("decode").arg("--help").assert().success();
}

#[test]
fn version_includes_commit() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")).and(contains("commit:")));
}

#[test]
fn missing_input_shows_error_and_hint() {
    let temp = TempDir::new().expect("tempdir");
    let missing = temp.path().join("missing.bin");
    let report = temp.path().join("report.json");

    cmd()
        .arg("dump")
        .arg(missing)
        .arg("-o")
        .arg(report)
        .assert()
        .code(2)
        .stderr(contains("error:").and(contains("hint:")));
}

#[test]
fn stdout_outputs_json() {
    let value = stdout_json(&[], &golden_input("abe_full"));
    assert_eq!(value["report_version"], 1);
    assert_eq!(value["summary"]["blocks_total"], 6);
    assert_eq!(value["blocks"][0]["body"]["kind"], "vendor_firmware");
}

#[test]
fn keep_empty_enum_slots_exports_parallel_lists() {
    let value = stdout_json(&["--keep-empty-enum-slots"], &golden_input("abe_full"));
    let control = &value["blocks"][2]["body"]["controls"][2]["body"]["enumerated"];
    assert_eq!(control["texts"].as_array().expect("texts").len(), 16);
    assert_eq!(control["values"].as_array().expect("values").len(), 16);

    let value = stdout_json(&[], &golden_input("abe_full"));
    let control = &value["blocks"][2]["body"]["controls"][2]["body"]["enumerated"];
    assert_eq!(control["values"]["Off"], 0);
    assert_eq!(control["values"]["On"], 1);
    assert!(control.get("texts").is_none());
}

#[test]
fn wrong_magic_fails_with_offset_hint() {
    cmd()
        .arg("dump")
        .arg(golden_input("abe_full"))
        .arg("--stdout")
        .arg("--magic")
        .arg("ASoC")
        .assert()
        .code(2)
        .stderr(contains("bad block magic").and(contains("hint:")));
}

#[test]
fn magic_must_be_four_chars() {
    cmd()
        .arg("dump")
        .arg(golden_input("abe_full"))
        .arg("--stdout")
        .arg("--magic")
        .arg("CoSAx")
        .assert()
        .failure()
        .stderr(contains("4 characters"));
}

#[test]
fn stdout_and_report_conflict() {
    let temp = TempDir::new().expect("tempdir");
    let report = temp.path().join("report.json");

    cmd()
        .arg("dump")
        .arg(golden_input("abe_full"))
        .arg("--stdout")
        .arg("-o")
        .arg(report)
        .assert()
        .failure()
        .stderr(contains("error:"));
}

#[test]
fn pretty_and_compact_conflict() {
    let temp = TempDir::new().expect("tempdir");
    let report = temp.path().join("report.json");

    cmd()
        .arg("dump")
        .arg(golden_input("abe_full"))
        .arg("-o")
        .arg(report)
        .arg("--pretty")
        .arg("--compact")
        .assert()
        .failure()
        .stderr(contains("error:"));
}

#[test]
fn report_is_written_into_new_directory() {
    let temp = TempDir::new().expect("tempdir");
    let report = temp.path().join("out").join("nested").join("report.json");

    cmd()
        .arg("dump")
        .arg(golden_input("abe_full"))
        .arg("-o")
        .arg(&report)
        .arg("--pretty")
        .assert()
        .success()
        .stderr(contains("OK: report written"));

    let json = std::fs::read_to_string(&report).expect("report written");
    assert!(json.contains("\n  \"report_version\": 1"));
}

#[test]
fn report_path_must_differ_from_input() {
    let temp = TempDir::new().expect("tempdir");
    let input = temp.path().join("abe.bin");
    std::fs::copy(golden_input("abe_full"), &input).expect("copy fixture");

    cmd()
        .arg("dump")
        .arg(&input)
        .arg("-o")
        .arg(&input)
        .assert()
        .code(2)
        .stderr(contains("report path must differ from input"));
}

#[test]
fn quiet_suppresses_ok_message() {
    let temp = TempDir::new().expect("tempdir");
    let report = temp.path().join("report.json");

    cmd()
        .arg("dump")
        .arg(golden_input("unsupported"))
        .arg("-o")
        .arg(report)
        .arg("--quiet")
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stderr(contains("OK:").not().and(contains("WARN").not()));
}

#[test]
fn diagnostics_are_logged_as_warnings() {
    cmd()
        .arg("dump")
        .arg(golden_input("unsupported"))
        .arg("--stdout")
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stderr(contains("WARN").and(contains("SND_SOC_FW_DAI_LINK")));
}

#[test]
fn list_diagnostics_outputs_messages() {
    let temp = TempDir::new().expect("tempdir");
    let report = temp.path().join("report.json");

    cmd()
        .arg("dump")
        .arg(golden_input("unsupported"))
        .arg("-o")
        .arg(report)
        .arg("--list-diagnostics")
        .assert()
        .success()
        .stderr(
            contains("Diagnostics:")
                .and(contains("vendor type 2 not supported"))
                .and(contains("invalid control type CONTROL_EXT (0)")),
        );
}

#[test]
fn strict_fails_when_diagnostics_present() {
    let temp = TempDir::new().expect("tempdir");
    let report = temp.path().join("report.json");

    cmd()
        .arg("dump")
        .arg(golden_input("unsupported"))
        .arg("-o")
        .arg(report)
        .arg("--strict")
        .assert()
        .code(2)
        .stderr(contains("5 decode diagnostic(s) emitted"));
}

#[test]
fn strict_passes_clean_container() {
    cmd()
        .arg("dump")
        .arg(golden_input("abe_full"))
        .arg("--stdout")
        .arg("--strict")
        .assert()
        .success();
}

#[test]
fn glob_must_match_single_file() {
    let pattern = repo_root().join("tests").join("golden").join("*").join("input.bin");
    cmd()
        .arg("dump")
        .arg(pattern)
        .arg("--stdout")
        .assert()
        .code(2)
        .stderr(contains("multiple files match pattern"));

    let single = repo_root()
        .join("tests")
        .join("golden")
        .join("abe_*")
        .join("input.bin");
    cmd().arg("dump").arg(single).arg("--stdout").assert().success();
}

#[test]
fn verbose_flag_enables_debug_logs() {
    cmd()
        .arg("dump")
        .arg(golden_input("abe_full"))
        .arg("--stdout")
        .arg("-v")
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stderr(contains("DEBUG").and(contains("ABE firmware")));
}
