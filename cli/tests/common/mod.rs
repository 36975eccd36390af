use assert_cmd::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

/// The binary with every variable it reads from the environment cleared.
pub fn inventory() -> Command {
    let mut cmd = Command::cargo_bin("ec2-inventory").expect("binary is built");
    for var in &[
        "EC2_INVENTORY_VARS",
        "EC2_INVENTORY_CLUSTER",
        "AWS_ACCESS_KEY_ID",
        "AWS_SECRET_ACCESS_KEY",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

pub fn vars_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write vars");
    file
}
