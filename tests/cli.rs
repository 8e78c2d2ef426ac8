use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn huffham() -> Command {
    Command::cargo_bin("huffham").unwrap()
}

#[test]
fn test_round_trip() {
    let temp = tempdir().unwrap();
    let original = temp.path().join("original.txt");
    let packed = temp.path().join("packed.hh");
    let unpacked = temp.path().join("unpacked.txt");
    let text = "it was the best of times, it was the worst of times\n".repeat(50);
    fs::write(&original, &text).unwrap();

    huffham()
        .arg(&original)
        .arg(&packed)
        .assert()
        .success()
        .stdout(predicate::str::contains("Compressing..."))
        .stdout(predicate::str::contains("Compression complete."));
    assert!(fs::metadata(&packed).unwrap().len() < text.len() as u64);

    huffham()
        .arg("-d")
        .arg(&packed)
        .arg(&unpacked)
        .assert()
        .success()
        .stdout(predicate::str::contains("Decompression complete."));
    assert_eq!(fs::read_to_string(&unpacked).unwrap(), text);
}

#[test]
fn test_flipped_bit_is_repaired() {
    let temp = tempdir().unwrap();
    let original = temp.path().join("original.txt");
    let packed = temp.path().join("packed.hh");
    let unpacked = temp.path().join("unpacked.txt");
    fs::write(&original, "AAAB").unwrap();

    huffham().arg(&original).arg(&packed).assert().success();

    let mut bytes = fs::read(&packed).unwrap();
    bytes[3] ^= 0b0001_0000;
    fs::write(&packed, bytes).unwrap();

    huffham()
        .arg("--decompress")
        .arg(&packed)
        .arg(&unpacked)
        .assert()
        .success()
        .stderr(predicate::str::contains("one bit error was corrected"));
    assert_eq!(fs::read_to_string(&unpacked).unwrap(), "AAAB");
}

#[test]
fn test_two_flipped_bits_fail() {
    let temp = tempdir().unwrap();
    let original = temp.path().join("original.txt");
    let packed = temp.path().join("packed.hh");
    let unpacked = temp.path().join("unpacked.txt");
    fs::write(&original, "AAAB").unwrap();

    huffham().arg(&original).arg(&packed).assert().success();

    let mut bytes = fs::read(&packed).unwrap();
    bytes[2] ^= 0b1000_0001;
    fs::write(&packed, bytes).unwrap();

    huffham()
        .arg("-d")
        .arg(&packed)
        .arg(&unpacked)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("two bit errors detected"));
    assert!(!unpacked.exists());
}

#[test]
fn test_stats_lists_every_symbol() {
    let temp = tempdir().unwrap();
    let original = temp.path().join("original.txt");
    fs::write(&original, "AAAB").unwrap();

    huffham()
        .arg("--stats")
        .arg(&original)
        .arg(temp.path().join("packed.hh"))
        .assert()
        .success()
        .stdout(predicate::str::contains("'A'       0.7500  1"))
        .stdout(predicate::str::contains("'B'       0.2500  0"));
}

#[test]
fn test_missing_source_fails() {
    let temp = tempdir().unwrap();
    let missing = temp.path().join("missing.txt");

    huffham()
        .arg(&missing)
        .arg(temp.path().join("out.hh"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("reading"))
        .stderr(predicate::str::contains("missing.txt"));
}

#[test]
fn test_empty_source_fails() {
    let temp = tempdir().unwrap();
    let empty = temp.path().join("empty.txt");
    let packed = temp.path().join("packed.hh");
    fs::write(&empty, "").unwrap();

    huffham()
        .arg(&empty)
        .arg(&packed)
        .assert()
        .failure()
        .stderr(predicate::str::contains("input is empty"));
    assert!(!packed.exists());
}

#[test]
fn test_max_input_size() {
    let temp = tempdir().unwrap();
    let original = temp.path().join("original.txt");
    fs::write(&original, "more than ten bytes").unwrap();

    huffham()
        .arg("--max-input-size")
        .arg("10")
        .arg(&original)
        .arg(temp.path().join("packed.hh"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeds the limit of 10"));
}

#[test]
fn test_missing_destination_is_a_usage_error() {
    huffham()
        .arg("-d")
        .arg("packed.hh")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_stats_conflicts_with_decompress() {
    huffham()
        .args(["-d", "--stats", "a", "b"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
