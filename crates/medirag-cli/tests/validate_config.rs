//! CLI configuration validation tests
//!
//! These run the real binary but never reach the network: `--validate-config`
//! exits before any client is constructed.

use assert_cmd::Command;
use predicates::str::contains;

fn medirag() -> Command {
    let mut cmd = Command::cargo_bin("medirag").expect("binary built");
    cmd.env_remove("OPENROUTER_API_KEY")
        .env_remove("MODEL_NAME")
        .env_remove("CHUNK_SIZE")
        .env_remove("CHUNK_OVERLAP")
        .env_remove("TOP_K_RESULTS");
    cmd
}

#[test]
fn validate_config_fails_without_api_key() {
    medirag()
        .arg("--validate-config")
        .assert()
        .failure()
        .stderr(contains("OPENROUTER_API_KEY"));
}

#[test]
fn validate_config_succeeds_with_api_key() {
    medirag()
        .env("OPENROUTER_API_KEY", "test-key")
        .arg("--validate-config")
        .assert()
        .success()
        .stdout(contains("Configuration is valid"));
}

#[test]
fn validate_config_rejects_invalid_numeric_setting() {
    medirag()
        .env("OPENROUTER_API_KEY", "test-key")
        .env("CHUNK_SIZE", "not-a-number")
        .arg("--validate-config")
        .assert()
        .failure()
        .stderr(contains("CHUNK_SIZE"));
}
