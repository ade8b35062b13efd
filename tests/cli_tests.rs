//! Tests for the `newsstats` binary

use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn newsstats() -> Command {
    Command::new(env!("CARGO_BIN_EXE_newsstats"))
}

#[test]
fn test_logging_is_up_before_config_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("broken.json");
    fs::write(&config, "{ not json").unwrap();
    let log = dir.path().join("logs").join("run.log");

    let output = newsstats()
        .arg("--config")
        .arg(&config)
        .arg("--log-file")
        .arg(&log)
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load config"), "{stderr}");
    assert!(log.exists(), "log file was not created before the config was read");
}

#[test]
fn test_runs_with_overrides() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("articles.csv");
    fs::write(&input, "id,body\n1,a b c\n2,\"\"\n3,\n").unwrap();
    let out = dir.path().join("out");
    let log = dir.path().join("run.log");

    let output = newsstats()
        .arg("--input")
        .arg(&input)
        .arg("--output-dir")
        .arg(&out)
        .arg("--disable-viz")
        .arg("--log-file")
        .arg(&log)
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        fs::read_to_string(out.join("articles_with_wordcount.csv")).unwrap(),
        "id,body,word_count\n1,a b c,3\n2,,0\n3,,0\n"
    );
    assert!(out.join("analysis_report.md").exists());
    assert!(fs::read_to_string(&log).unwrap().contains("Generating report"));
}
