//! Re-emit a deployment config as the script the console loads.
//!
//! Reads a config in any accepted shape, validates it, and writes the
//! canonical `var config = {...};` script to stdout. The analytics beacon is
//! appended only when both `--beacon-url` and `--beacon-site-id` are given.

use anyhow::{Context, Result, bail};
use cloud_catalog::runtime::{init_tracing, resolve_config_path};
use cloud_catalog::{
    AnalyticsBeacon, ConfigSource, DEFAULT_CONFIG_VAR, load_deployment_config,
    render_config_script,
};
use std::env;
use std::path::PathBuf;

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse()?;
    let path = resolve_config_path(args.config)?;
    let config = load_deployment_config(ConfigSource::Path(&path))
        .with_context(|| format!("loading {}", path.display()))?;

    let beacon = match (args.beacon_url, args.beacon_site_id) {
        (Some(url), Some(site)) => Some(AnalyticsBeacon::new(&url, &site)),
        (None, None) => None,
        _ => bail!("--beacon-url and --beacon-site-id must be given together"),
    };
    if beacon.is_some() {
        tracing::debug!("appending analytics beacon");
    }

    let script = render_config_script(&config, &args.var_name, beacon.as_ref())?;
    print!("{script}");
    Ok(())
}

struct CliArgs {
    config: Option<PathBuf>,
    var_name: String,
    beacon_url: Option<String>,
    beacon_site_id: Option<String>,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        let mut args = env::args_os().skip(1);
        let mut config: Option<PathBuf> = None;
        let mut var_name: Option<String> = None;
        let mut beacon_url: Option<String> = None;
        let mut beacon_site_id: Option<String> = None;

        while let Some(arg_os) = args.next() {
            let arg = arg_os
                .into_string()
                .map_err(|_| anyhow::anyhow!("argument is not valid UTF-8"))?;
            match arg.as_str() {
                "--config" => config = Some(PathBuf::from(next_value(&mut args, "--config")?)),
                "--var" => var_name = Some(next_value(&mut args, "--var")?),
                "--beacon-url" => beacon_url = Some(next_value(&mut args, "--beacon-url")?),
                "--beacon-site-id" => {
                    beacon_site_id = Some(next_value(&mut args, "--beacon-site-id")?)
                }
                "--help" | "-h" => {
                    print!("{}", usage());
                    std::process::exit(0);
                }
                other => bail!("unknown flag: {other}\n{}", usage()),
            }
        }

        Ok(CliArgs {
            config,
            var_name: var_name.unwrap_or_else(|| DEFAULT_CONFIG_VAR.to_string()),
            beacon_url,
            beacon_site_id,
        })
    }
}

fn next_value(args: &mut impl Iterator<Item = std::ffi::OsString>, flag: &str) -> Result<String> {
    args.next()
        .map(|os| {
            os.into_string()
                .map_err(|_| anyhow::anyhow!("value for {flag} is not valid UTF-8"))
        })
        .transpose()?
        .ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))
}

fn usage() -> &'static str {
    "Usage: emit-config-js [--config PATH] [--var NAME] [--beacon-url URL --beacon-site-id ID]\n\
Writes the canonical console config script to stdout.\n\
--config defaults to CLOUD_CATALOG_CONFIG.\n"
}
