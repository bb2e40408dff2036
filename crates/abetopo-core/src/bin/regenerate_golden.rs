use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use abetopo_core::{DecodeOptions, decode_topology_file};

fn main() -> ExitCode {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> Result<(), String> {
    let root = PathBuf::from("tests").join("golden");
    let entries =
        fs::read_dir(&root).map_err(|err| format!("failed to read {}: {}", root.display(), err))?;

    let mut cases = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|err| format!("failed to read entry: {}", err))?
            .path();
        if path.is_dir() && path.join("input.bin").exists() {
            cases.push(path);
        }
    }
    cases.sort();

    for case in cases {
        regenerate_one(&case.join("input.bin"), &case.join("expected_report.json"))?;
    }
    Ok(())
}

fn regenerate_one(input: &Path, output: &Path) -> Result<(), String> {
    let report = decode_topology_file(input, &DecodeOptions::default())
        .map_err(|err| format!("decode failed for {}: {}", input.display(), err))?;
    let json = serde_json::to_string(&report)
        .map_err(|err| format!("JSON serialization failed: {}", err))?;
    fs::write(output, json)
        .map_err(|err| format!("failed to write {}: {}", output.display(), err))?;
    println!("regenerated {}", output.display());
    Ok(())
}
