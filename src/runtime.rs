//! Runtime helpers shared across binaries.
//!
//! Centralizes logging setup and config path resolution so the CLIs behave the
//! same way instead of each re-implementing it.

use anyhow::{Result, bail};
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Environment variable consulted when no `--config` flag is given.
pub const CONFIG_ENV_VAR: &str = "CLOUD_CATALOG_CONFIG";

/// Install a stderr `tracing` subscriber filtered by `RUST_LOG` (default
/// `info`). Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Pick the config path: an explicit flag wins, then `CLOUD_CATALOG_CONFIG`.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    match env::var(CONFIG_ENV_VAR) {
        Ok(value) if !value.trim().is_empty() => Ok(PathBuf::from(value.trim())),
        _ => bail!("no config given; pass --config PATH or set {CONFIG_ENV_VAR}"),
    }
}

/// Split comma- or whitespace-delimited flag values into tokens.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .replace(',', " ")
        .split_whitespace()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let path = resolve_config_path(Some(PathBuf::from("deploy/config.js"))).unwrap();
        assert_eq!(path, PathBuf::from("deploy/config.js"));
    }

    #[test]
    fn split_list_handles_commas_and_spaces() {
        assert_eq!(split_list("ASU, Cornell  IU,,"), vec!["ASU", "Cornell", "IU"]);
        assert!(split_list(" , ").is_empty());
    }
}
