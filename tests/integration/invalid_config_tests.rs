//! These tests are for testing some invalid config-file-specific options.

use assert_cmd::prelude::*;
use predicates::prelude::*;

use crate::util::memstat_command;

#[test]
fn test_toml_mismatch_type() {
    memstat_command(&["-C", "./tests/invalid_configs/toml_mismatch_type.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid type"));
}

/// This test isn't really needed as this is technically covered by TOML spec.
/// However, it's worth checking anyways.
#[test]
fn test_duplicate_key() {
    memstat_command(&["-C", "./tests/invalid_configs/duplicate_key.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate key"));
}

#[test]
fn test_unknown_field() {
    memstat_command(&["-C", "./tests/invalid_configs/unknown_field.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown field"));
}

#[test]
fn test_invalid_rate() {
    memstat_command(&["-C", "./tests/invalid_configs/invalid_rate.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'rate' was set with an invalid value"));
}

#[test]
fn test_rate_too_small() {
    memstat_command(&["-C", "./tests/invalid_configs/rate_too_small.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 250 milliseconds"));
}

#[test]
fn test_invalid_prefix() {
    memstat_command(&["-C", "./tests/invalid_configs/invalid_prefix.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'prefix' was set with an invalid value"));
}

#[test]
fn test_invalid_config_overridden_by_args_still_fails() {
    // The file has to parse before any argument gets a say.
    memstat_command(&[
        "-C",
        "./tests/invalid_configs/toml_mismatch_type.toml",
        "-n",
        "1",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Unable to parse or read the config file."));
}
