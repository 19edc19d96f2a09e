use assert_cmd::{Command, cargo::cargo_bin_cmd};
use std::path::Path;

pub const DB_FILENAME: &str = ".sha1sums";

pub fn replisum_cmd() -> Command {
    cargo_bin_cmd!("replisum")
}

/// Runs `replisum check <dir>` answering `y` to any confirmation prompt.
pub fn check_accepting(dir: &Path) {
    let mut cmd = replisum_cmd();
    cmd.arg("check").arg(dir).write_stdin("y\n");
    cmd.assert().success();
}

// Only the replicate-focused integration tests need to read the database
// back; each test file is compiled as its own crate, so this is unused in
// some of them.
#[allow(dead_code)]
pub fn read_db(dir: &Path) -> String {
    std::fs::read_to_string(dir.join(DB_FILENAME)).expect("database file should exist")
}
