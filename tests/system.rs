use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

#[test]
fn test_help() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_v2torrent"));
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Create BitTorrent v2 and hybrid v1/v2 metainfo files",
        ));
}

#[test]
fn test_create_basic() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source_file = temp_dir.path().join("test.txt");
    fs::write(&source_file, "random data").unwrap();
    let output_file = temp_dir.path().join("test.torrent");

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_v2torrent"));
    cmd.arg(&source_file)
        .arg("--output")
        .arg(&output_file)
        .assert()
        .success()
        .stderr(predicate::str::contains("Created:"))
        .stdout(predicate::str::contains("Info hash v1:"))
        .stdout(predicate::str::contains("Info hash v2:"));

    let bytes = fs::read(&output_file).unwrap();
    assert!(bytes.starts_with(b"d8:announce0:4:infod9:file tree"));
}

#[test]
fn test_hashes_match_written_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let content = temp_dir.path().join("content");
    fs::create_dir(&content).unwrap();
    fs::write(content.join("a.bin"), vec![1u8; 40000]).unwrap();
    fs::write(content.join("b.bin"), vec![2u8; 10]).unwrap();
    let output_file = temp_dir.path().join("out.torrent");

    let mut cmd = Command::new(env!("CARGO_BIN_EXE_v2torrent"));
    let assert = cmd
        .arg(&content)
        .arg("-l")
        .arg("14")
        .arg("-o")
        .arg(&output_file)
        .arg("--json")
        .assert()
        .success();

    let report: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    let written = v2torrent::info_hashes_of(&fs::read(&output_file).unwrap()).unwrap();

    assert_eq!(report["name"], "content");
    assert_eq!(report["piece_length"], 16384);
    assert_eq!(report["total_size"], 40010);
    assert_eq!(report["info_hash_v1"], written.v1.as_str());
    assert_eq!(report["info_hash_v2"], written.v2.as_str());
}

#[test]
fn test_refuses_overwrite_without_force() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source_file = temp_dir.path().join("data.txt");
    fs::write(&source_file, "data").unwrap();
    let output_file = temp_dir.path().join("data.torrent");
    fs::write(&output_file, "existing").unwrap();

    Command::new(env!("CARGO_BIN_EXE_v2torrent"))
        .arg(&source_file)
        .arg("-o")
        .arg(&output_file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("use -f to overwrite"));
    assert_eq!(fs::read(&output_file).unwrap(), b"existing");

    Command::new(env!("CARGO_BIN_EXE_v2torrent"))
        .arg(&source_file)
        .arg("-o")
        .arg(&output_file)
        .arg("-f")
        .assert()
        .success();
    assert_ne!(fs::read(&output_file).unwrap(), b"existing");
}

#[test]
fn test_missing_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    Command::new(env!("CARGO_BIN_EXE_v2torrent"))
        .arg(temp_dir.path().join("non_existent_file.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to create torrent"));
}

#[test]
fn test_piece_length_out_of_range() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source_file = temp_dir.path().join("data.txt");
    fs::write(&source_file, "data").unwrap();

    Command::new(env!("CARGO_BIN_EXE_v2torrent"))
        .arg(&source_file)
        .arg("-l")
        .arg("10")
        .assert()
        .failure();
}
