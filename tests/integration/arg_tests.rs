//! These tests are mostly here just to ensure that invalid results will be caught when passing arguments.

use assert_cmd::prelude::*;
use predicates::prelude::*;

use crate::util::{COLLECTION_SUPPORTED, memstat_command, no_cfg_memstat_command};

#[test]
fn test_help() {
    memstat_command(&["--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sampler Options"))
        .stdout(predicate::str::contains("--config_location"));
}

#[test]
fn test_version() {
    memstat_command(&["-V"])
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_small_rate() {
    no_cfg_memstat_command(&["-r", "249"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "set your update rate to be at least 250 milliseconds.",
        ));
}

#[test]
fn test_invalid_rate() {
    no_cfg_memstat_command(&["-r", "100-1000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'--rate' was set with an invalid value"));
}

#[test]
fn test_invalid_count() {
    no_cfg_memstat_command(&["-n", "three"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'three'"));
}

#[test]
fn test_invalid_prefix() {
    no_cfg_memstat_command(&["--prefix", "9lives"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'--prefix' was set with an invalid value"));
}

#[test]
fn test_missing_config_file() {
    memstat_command(&["-C", "./tests/valid_configs/does_not_exist.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_list_fields() {
    no_cfg_memstat_command(&["--list_fields"])
        .assert()
        .success()
        .stdout(predicate::str::contains("node_memory_bytes_total"))
        .stdout(predicate::str::contains("node_memory_MemTotal"))
        .stdout(predicate::str::contains("node_memory_swapped_out_pages_total"));
}

#[test]
fn test_list_fields_with_prefix() {
    no_cfg_memstat_command(&["--list_fields", "--prefix", "host_"])
        .assert()
        .success()
        .stdout(predicate::str::contains("host_free_bytes_total"))
        .stdout(predicate::str::contains("node_memory_").not());
}

#[test]
fn test_single_cycle() {
    let assert = no_cfg_memstat_command(&["-n", "1"]).assert();

    if COLLECTION_SUPPORTED {
        assert
            .success()
            .stdout(predicate::str::contains("node_memory_bytes_total "))
            .stdout(predicate::str::contains("node_memory_MemFree "));
    } else {
        assert
            .failure()
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("does not support"));
    }
}

#[test]
fn test_snake_case_flags() {
    memstat_command(&[
        "--config_location",
        "./tests/valid_configs/empty_config.toml",
        "--list_fields",
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("node_memory_free_bytes_total"));

    no_cfg_memstat_command(&["--list-fields"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unexpected argument"));
}

#[cfg(not(feature = "logging"))]
#[test]
fn test_log_file_without_logging_feature() {
    let dir = tempfile::tempdir().unwrap();
    let log_file = dir.path().join("memstat.log");
    let log_file_arg = log_file.to_string_lossy().to_string();

    no_cfg_memstat_command(&["-n", "1", "--log_file", log_file_arg.as_str()])
        .assert()
        .stderr(predicate::str::contains("without the 'logging' feature"));

    assert!(!log_file.exists());
}
