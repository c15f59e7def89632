//! Shared test utilities for cluepath-cli integration tests.

use std::path::PathBuf;

use assert_cmd::Command;

/// Get a Command for the cluepath binary.
///
/// The config path points at a file that does not exist so a developer's
/// `~/.cluepath/config.yaml` never leaks into the tests.
#[allow(deprecated)]
pub fn cluepath_cmd() -> Command {
    let mut cmd = Command::cargo_bin("cluepath").expect("cluepath binary should exist");
    cmd.env("CLUEPATH_CONFIG", fixture("no-such-config.yaml"))
        .env_remove("CLUEPATH_VERBOSE")
        .env_remove("CLUEPATH_COLOR")
        .env("NO_COLOR", "1");
    cmd
}

/// Path to a file under `tests/fixtures`.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}
