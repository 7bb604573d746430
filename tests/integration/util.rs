use std::process::Command;

/// Whether memstat can collect memory data on the platform under test.
pub const COLLECTION_SUPPORTED: bool = cfg!(any(
    target_os = "macos",
    target_os = "solaris",
    target_os = "illumos"
));

const MEMSTAT_EXE_PATH: &str = env!("CARGO_BIN_EXE_memstat");
const DEFAULT_CFG: [&str; 2] = ["-C", "./tests/valid_configs/empty_config.toml"];

/// Returns the [`Command`] of a binary invocation of memstat. Relative config
/// paths resolve against the package root, where cargo runs integration tests.
pub fn memstat_command(args: &[&str]) -> Command {
    let mut cmd = Command::new(MEMSTAT_EXE_PATH);
    cmd.args(args);

    cmd
}

/// Returns the [`Command`] of a binary invocation of memstat with the default,
/// empty config file, followed by `args`.
pub fn no_cfg_memstat_command(args: &[&str]) -> Command {
    let mut cmd = memstat_command(&DEFAULT_CFG);
    cmd.args(args);

    cmd
}
