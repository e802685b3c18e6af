//! CLI end-to-end tests
//!
//! Tests for the flacseek command-line interface.

mod common;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the flacseek binary
#[allow(deprecated)]
fn flacseek_cmd() -> Command {
    Command::cargo_bin("flacseek").unwrap()
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = flacseek_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_flag() {
    let mut cmd = flacseek_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("flacseek"))
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version_command() {
    let mut cmd = flacseek_cmd();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_seek_help() {
    let mut cmd = flacseek_cmd();
    cmd.args(["seek", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Seek to a sample"));
}

#[test]
fn test_cli_info() {
    let dir = tempdir().unwrap();
    let file = common::write_flac(dir.path(), "tone.flac", 10, true);

    let mut cmd = flacseek_cmd();
    cmd.arg("info")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Sample rate: 44100 Hz"))
        .stdout(predicate::str::contains("Total samples: 40960"))
        .stdout(predicate::str::contains("SEEKTABLE"));
}

#[test]
fn test_cli_info_json() {
    let dir = tempdir().unwrap();
    let file = common::write_flac(dir.path(), "tone.flac", 4, false);

    let json = stdout_json(flacseek_cmd().arg("info").arg(&file).arg("--json"));
    assert_eq!(json["info"]["total_samples"], 16384);
    assert_eq!(json["info"]["channels"], 2);
    // signature + STREAMINFO block
    assert_eq!(json["data_start"], 42);
    assert!(json["blocks"].as_array().unwrap().is_empty());
    assert!(json["id3_tag_size"].is_null());
}

#[test]
fn test_cli_frames_limit() {
    let dir = tempdir().unwrap();
    let file = common::write_flac(dir.path(), "tone.flac", 6, false);

    let mut cmd = flacseek_cmd();
    cmd.args(["frames", "--limit", "3"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 frames"))
        .stdout(predicate::str::contains("sample         8192"));

    let mut cmd = flacseek_cmd();
    cmd.arg("frames")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("6 frames"));
}

#[test]
fn test_cli_seek_table_synthesized() {
    let dir = tempdir().unwrap();
    let file = common::write_flac(dir.path(), "tone.flac", 10, false);

    let mut cmd = flacseek_cmd();
    cmd.args(["seek-table", "--size", "4"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("synthesized"))
        .stdout(predicate::str::contains("5 points"));
}

#[test]
fn test_cli_seek_table_embedded_json() {
    let dir = tempdir().unwrap();
    let file = common::write_flac(dir.path(), "tone.flac", 10, true);

    let json = stdout_json(flacseek_cmd().arg("seek-table").arg(&file).arg("--json"));
    assert_eq!(json["source"], "embedded");
    let points = json["points"].as_array().unwrap();
    assert_eq!(points.len(), 10);
    assert_eq!(points[3]["sample_number"], 3 * 4096);
}

#[test]
fn test_cli_seek_floor() {
    let dir = tempdir().unwrap();
    let file = common::write_flac(dir.path(), "tone.flac", 10, false);

    let mut cmd = flacseek_cmd();
    cmd.args(["seek", "--size", "4"])
        .arg(&file)
        .arg("10000")
        .assert()
        .success()
        .stdout(predicate::str::contains("Reached sample: 8192"))
        .stdout(predicate::str::contains("Frame: 4096 samples"));
}

#[test]
fn test_cli_seek_from_end_json() {
    let dir = tempdir().unwrap();
    let file = common::write_flac(dir.path(), "tone.flac", 10, true);

    let json = stdout_json(
        flacseek_cmd()
            .arg("seek")
            .arg(&file)
            .args(["-4096", "--from", "end", "--json"]),
    );
    assert_eq!(json["origin"], "end");
    // 36864 is the last frame's start, so the floor is the frame before it.
    assert_eq!(json["achieved_sample"], 32768);
    assert_eq!(json["frame"]["number"], 8);
}

#[test]
fn test_cli_seek_disabled_synthesis_fails() {
    let dir = tempdir().unwrap();
    let file = common::write_flac(dir.path(), "tone.flac", 3, false);

    let mut cmd = flacseek_cmd();
    cmd.args(["seek", "--size", "0"])
        .arg(&file)
        .arg("100")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to seek"));
}

#[test]
fn test_cli_seek_size_limit() {
    let dir = tempdir().unwrap();
    let file = common::write_flac(dir.path(), "tone.flac", 3, false);

    let mut cmd = flacseek_cmd();
    cmd.args(["seek-table", "--size", "70000"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeds the maximum"));
}

#[test]
fn test_cli_missing_file() {
    let mut cmd = flacseek_cmd();
    cmd.args(["info", "/nonexistent/file.flac"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File does not exist"));
}

#[test]
fn test_cli_not_flac() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("noise.wav");
    fs::write(&file, b"RIFF\x24\x00\x00\x00WAVEfmt ").unwrap();

    let mut cmd = flacseek_cmd();
    cmd.arg("info")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse FLAC stream"));
}

#[test]
fn test_cli_config_seek_table_size() {
    let dir = tempdir().unwrap();
    let file = common::write_flac(dir.path(), "tone.flac", 10, false);
    let config = dir.path().join("flacseek.toml");
    fs::write(&config, "[stream]\nseek_table_size = 2\n").unwrap();

    let mut cmd = flacseek_cmd();
    cmd.arg("--config")
        .arg(&config)
        .arg("seek-table")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 points"));
}

#[test]
fn test_cli_warns_when_synthesis_disabled() {
    let dir = tempdir().unwrap();
    let file = common::write_flac(dir.path(), "tone.flac", 3, false);
    let config = dir.path().join("flacseek.toml");
    fs::write(&config, "[stream]\nseek_table_size = 0\n").unwrap();

    let mut cmd = flacseek_cmd();
    cmd.env_remove("RUST_LOG")
        .arg("--config")
        .arg(&config)
        .arg("seek-table")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("seek_table_size is 0"))
        .stderr(predicate::str::contains("Failed to build seek table"));
}

#[test]
fn test_cli_validate_config() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("flacseek.toml");
    fs::write(
        &config,
        "[stream]\nseek_table_size = 50\nretain_metadata = false\n",
    )
    .unwrap();

    let mut cmd = flacseek_cmd();
    cmd.arg("validate")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("Seek table size: 50"));
}

#[test]
fn test_cli_validate_invalid_config() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("flacseek.toml");
    fs::write(&config, "[logging]\nfilter = \"\"\n").unwrap();

    let mut cmd = flacseek_cmd();
    cmd.arg("validate").arg(&config).assert().failure();
}
