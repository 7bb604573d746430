//! Tests config files that should work.

use std::io::Write;

use assert_cmd::prelude::*;
use predicates::prelude::*;

use crate::util::{COLLECTION_SUPPORTED, memstat_command};

#[test]
fn test_empty_config_lists_fields() {
    memstat_command(&[
        "-C",
        "./tests/valid_configs/empty_config.toml",
        "--list_fields",
    ])
    .assert()
    .success();
}

#[test]
fn test_all_options() {
    memstat_command(&[
        "-C",
        "./tests/valid_configs/all_options.toml",
        "--list_fields",
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("node_memory_wired_bytes_total"));
}

#[test]
fn test_custom_prefix() {
    let assert = memstat_command(&["-C", "./tests/valid_configs/custom_prefix.toml"]).assert();

    if COLLECTION_SUPPORTED {
        assert
            .success()
            .stdout(predicate::str::contains("host_memory_MemTotal "))
            .stdout(predicate::str::contains("node_memory_").not());
    } else {
        assert
            .failure()
            .stderr(predicate::str::contains("does not support"));
    }
}

#[test]
fn test_args_override_config_count() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[sampler]\nrate = 250\ncount = 100").unwrap();
    let path = file.path().to_string_lossy().to_string();

    let assert = memstat_command(&["-C", &path, "-n", "2"]).assert();

    if COLLECTION_SUPPORTED {
        assert
            .success()
            .stdout(predicate::str::contains("node_memory_bytes_total ").count(2));
    } else {
        assert
            .failure()
            .stderr(predicate::str::contains("does not support"));
    }
}
