//! End-to-end tests for the manta-demo binary.
//!
//! Run offline against the fixture certificates and signed envelope.

use manta_wallet::test_utils::fixtures;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn manta_demo(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_manta-demo"))
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute manta-demo")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn write(dir: &Path, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write fixture");
    path
}

struct Files {
    _dir: TempDir,
    envelope: PathBuf,
    cert: PathBuf,
    ca: PathBuf,
    untrusted_ca: PathBuf,
}

fn fixture_files() -> Files {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let envelope = write(dir.path(), "envelope.json", fixtures::signed_envelope_payload());
    let cert = write(dir.path(), "merchant.pem", fixtures::MERCHANT_CERT_PEM);
    let ca = write(dir.path(), "ca.pem", fixtures::CA_CERT_PEM);
    let untrusted_ca = write(dir.path(), "untrusted.pem", fixtures::UNTRUSTED_CA_PEM);
    Files {
        _dir: dir,
        envelope,
        cert,
        ca,
        untrusted_ca,
    }
}

#[test]
fn test_help_lists_commands() {
    let output = manta_demo(&["--help"]);
    assert!(output.status.success());
    let text = stdout(&output);
    for command in ["parse", "unpack", "verify", "topics"] {
        assert!(text.contains(command), "help should mention {}", command);
    }
}

#[test]
fn test_parse_url() {
    let output = manta_demo(&["parse", "manta://broker.example.com:8883/abc123"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("broker.example.com"));
    assert!(text.contains("8883"));
    assert!(text.contains("abc123"));
}

#[test]
fn test_parse_invalid_url_fails() {
    let output = manta_demo(&["parse", "http://broker.example.com/abc123"]);
    assert!(!output.status.success());
}

#[test]
fn test_topics() {
    let output = manta_demo(&["topics", "manta://localhost/S1", "--crypto", "BTC"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("payment_requests/S1/BTC"));
    assert!(text.contains("acks/S1"));
    assert!(text.contains("payments/S1"));
}

#[test]
fn test_unpack_envelope() {
    let files = fixture_files();
    let output = manta_demo(&["unpack", files.envelope.to_str().unwrap()]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("10.5 EUR"));
    assert!(text.contains("Merchant 1"));
    assert!(text.contains("tb1q3k9kpm5fj7c0kwe2slvx4qkqzk8mjfdlxqejh9"));
}

#[test]
fn test_verify_trusted_chain() {
    let files = fixture_files();
    let output = manta_demo(&[
        "verify",
        files.envelope.to_str().unwrap(),
        "--cert",
        files.cert.to_str().unwrap(),
        "--ca",
        files.ca.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("verified"));
}

#[test]
fn test_verify_untrusted_chain_exits_non_zero() {
    let files = fixture_files();
    let output = manta_demo(&[
        "verify",
        files.envelope.to_str().unwrap(),
        "--cert",
        files.cert.to_str().unwrap(),
        "--ca",
        files.untrusted_ca.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
}

#[test]
fn test_missing_envelope_file_fails() {
    let output = manta_demo(&["unpack", "/nonexistent/envelope.json"]);
    assert!(!output.status.success());
}
