use std::fs;
use std::path::{Path, PathBuf};

use abetopo_core::{DecodeOptions, decode_topology_file};
use serde_json::Value;

fn golden_dir(case: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("tests")
        .join("golden")
        .join(case)
}

fn load_expected_report(case: &str) -> Value {
    let expected_path = golden_dir(case).join("expected_report.json");
    let expected_json = fs::read_to_string(&expected_path).expect("read expected_report.json");
    serde_json::from_str(&expected_json).expect("parse expected report")
}

fn run_golden(case: &str) {
    let input = golden_dir(case).join("input.bin");
    let expected = load_expected_report(case);

    let report = decode_topology_file(&input, &DecodeOptions::default()).expect("decode topology");
    let mut actual = serde_json::to_value(report).expect("serialize actual");
    actual["generated_at"] = expected["generated_at"].clone();
    actual["input"]["path"] = expected["input"]["path"].clone();

    assert_eq!(actual, expected, "golden mismatch in {case}");
}

#[test]
fn golden_abe_full() {
    run_golden("abe_full");
}

#[test]
fn golden_unsupported() {
    run_golden("unsupported");
}

#[test]
fn golden_abe_full_has_every_supported_kind() {
    let report = load_expected_report("abe_full");
    let kinds: Vec<&str> = report["blocks"]
        .as_array()
        .expect("blocks")
        .iter()
        .map(|block| block["body"]["kind"].as_str().expect("kind"))
        .collect();
    assert_eq!(
        kinds,
        [
            "vendor_firmware",
            "vendor_config",
            "mixer",
            "dapm_graph",
            "dapm_widget",
            "coefficients"
        ]
    );
    assert!(report.get("diagnostics").is_none());
}

#[test]
fn golden_unsupported_lists_every_skip() {
    let report = load_expected_report("unsupported");
    let ids: Vec<&str> = report["diagnostics"]
        .as_array()
        .expect("diagnostics")
        .iter()
        .map(|diag| diag["id"].as_str().expect("id"))
        .collect();
    assert_eq!(
        ids,
        [
            "unsupported_tag",
            "unsupported_tag",
            "unsupported_vendor_type",
            "unsupported_control_kind",
            "ignored_coefficient_control"
        ]
    );
}
