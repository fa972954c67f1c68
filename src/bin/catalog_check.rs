//! Validate one or more deployment configs.
//!
//! Loads each `--config` file (or every config in `--dir`) through the same
//! loader the console uses and logs a one-line summary per deployment. Exits
//! non-zero on the first malformed config so it can gate a deploy.

use anyhow::{Context, Result, bail};
use cloud_catalog::runtime::{init_tracing, resolve_config_path};
use cloud_catalog::{CatalogRepository, ConfigCatalog, ConfigSource, deployment_key_for};
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
    let mut repo = match &args.dir {
        Some(dir) => CatalogRepository::load_dir(dir)
            .with_context(|| format!("loading configs under {}", dir.display()))?,
        None => CatalogRepository::default(),
    };

    let configs = if args.configs.is_empty() && args.dir.is_none() {
        vec![resolve_config_path(None)?]
    } else {
        args.configs
    };
    for path in configs {
        let catalog = ConfigCatalog::load(ConfigSource::Path(&path))
            .with_context(|| format!("checking {}", path.display()))?;
        let Some(key) = deployment_key_for(&path) else {
            bail!("cannot derive a deployment key from {}", path.display());
        };
        repo.register(key, catalog);
    }

    if repo.is_empty() {
        bail!("no configs found to check");
    }

    for key in repo.keys() {
        let Some(catalog) = repo.get(key) else {
            continue;
        };
        let config = catalog.config();
        let proxied = config
            .clouds
            .iter()
            .filter(|cloud| !cloud.user_app_proxy.is_empty())
            .count();
        tracing::info!(
            deployment = %key,
            app_title = %config.app_title,
            clouds = config.clouds.len(),
            proxied_clouds = proxied,
            sso = config.open_id_connect_login_config.is_some(),
            "config ok"
        );
    }
    Ok(())
}

struct CliArgs {
    configs: Vec<PathBuf>,
    dir: Option<PathBuf>,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        let mut args = env::args_os().skip(1);
        let mut configs = Vec::new();
        let mut dir: Option<PathBuf> = None;

        while let Some(arg_os) = args.next() {
            let arg = arg_os
                .into_string()
                .map_err(|_| anyhow::anyhow!("argument is not valid UTF-8"))?;
            match arg.as_str() {
                "--config" => configs.push(PathBuf::from(next_value(&mut args, "--config")?)),
                "--dir" => {
                    if dir.is_some() {
                        bail!("--dir may only be provided once");
                    }
                    dir = Some(PathBuf::from(next_value(&mut args, "--dir")?));
                }
                "--help" | "-h" => {
                    print!("{}", usage());
                    std::process::exit(0);
                }
                other => bail!("unknown flag: {other}\n{}", usage()),
            }
        }

        Ok(CliArgs { configs, dir })
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
    "Usage: catalog-check [--config PATH]... [--dir PATH]\n\
Loads each deployment config, validates structure and invariants, and logs a summary.\n\
With no flags, checks the file named by CLOUD_CATALOG_CONFIG.\n"
}
