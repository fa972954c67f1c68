#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn fixture(name: &str) -> PathBuf {
    repo_root().join("tests").join("fixtures").join(name)
}

pub fn helper_binary(name: &str) -> PathBuf {
    let path = match name {
        "catalog-check" => env!("CARGO_BIN_EXE_catalog-check"),
        "catalog-query" => env!("CARGO_BIN_EXE_catalog-query"),
        "emit-config-js" => env!("CARGO_BIN_EXE_emit-config-js"),
        other => panic!("unknown helper {other}"),
    };
    PathBuf::from(path)
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}

/// Run a helper without inheriting a config path from the caller's
/// environment.
pub fn helper_command(name: &str, dir: &Path) -> Command {
    let mut cmd = Command::new(helper_binary(name));
    cmd.current_dir(dir);
    cmd.env_remove("CLOUD_CATALOG_CONFIG");
    cmd.env("RUST_LOG", "warn");
    cmd
}
