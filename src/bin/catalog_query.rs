//! Answer console lookups against a deployment config.
//!
//! Loads the config, selects a cloud by keystone hostname, and prints compact
//! JSON describing the cloud plus whichever lookups were requested: proxy
//! hostname per region, flavor group per flavor id, primary version per OS
//! choice. Misses print `null` rather than failing, mirroring how the console
//! degrades.

use anyhow::{Context, Result, bail};
use cloud_catalog::runtime::{init_tracing, resolve_config_path, split_list};
use cloud_catalog::{ConfigCatalog, ConfigSource, match_flavor_group};
use serde_json::{Map, Value, json};
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
    let catalog = ConfigCatalog::load(ConfigSource::Path(&path))
        .with_context(|| format!("loading {}", path.display()))?;

    let Some(cloud) = catalog.find_cloud_by_hostname(&args.cloud) else {
        tracing::warn!(cloud = %args.cloud, "cloud not found");
        println!("null");
        return Ok(());
    };

    let mut out = Map::new();
    out.insert(
        "keystoneHostname".to_string(),
        Value::String(cloud.keystone_hostname.0.clone()),
    );
    out.insert(
        "friendlyName".to_string(),
        Value::String(cloud.friendly_name.clone()),
    );

    if args.default_region || !args.regions.is_empty() {
        let mut proxies = Map::new();
        if args.default_region {
            proxies.insert(
                String::new(),
                json!(cloud.resolve_proxy_hostname(None)),
            );
        }
        for region in &args.regions {
            proxies.insert(
                region.clone(),
                json!(cloud.resolve_proxy_hostname(Some(region))),
            );
        }
        out.insert("proxy".to_string(), Value::Object(proxies));
    }

    if !args.flavors.is_empty() {
        let mut groups = Map::new();
        for flavor in &args.flavors {
            let group = match_flavor_group(&cloud.flavor_groups, flavor)
                .map(serde_json::to_value)
                .transpose()?;
            groups.insert(flavor.clone(), group.unwrap_or(Value::Null));
        }
        out.insert("flavorGroup".to_string(), Value::Object(groups));
    }

    if !args.os_choices.is_empty() {
        let mut primaries = Map::new();
        for name in &args.os_choices {
            let primary = cloud
                .os_choice(name)
                .and_then(|choice| choice.primary_version())
                .map(serde_json::to_value)
                .transpose()?;
            primaries.insert(name.clone(), primary.unwrap_or(Value::Null));
        }
        out.insert("primaryVersion".to_string(), Value::Object(primaries));
    }

    println!("{}", serde_json::to_string(&Value::Object(out))?);
    Ok(())
}

struct CliArgs {
    config: Option<PathBuf>,
    cloud: String,
    regions: Vec<String>,
    default_region: bool,
    flavors: Vec<String>,
    os_choices: Vec<String>,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        let mut args = env::args_os().skip(1);
        let mut config: Option<PathBuf> = None;
        let mut cloud: Option<String> = None;
        let mut regions = Vec::new();
        let mut default_region = false;
        let mut flavors = Vec::new();
        let mut os_choices = Vec::new();

        while let Some(arg_os) = args.next() {
            let arg = arg_os
                .into_string()
                .map_err(|_| anyhow::anyhow!("argument is not valid UTF-8"))?;
            match arg.as_str() {
                "--config" => {
                    if config.is_some() {
                        bail!("--config may only be provided once");
                    }
                    config = Some(PathBuf::from(next_value(&mut args, "--config")?));
                }
                "--cloud" => {
                    if cloud.is_some() {
                        bail!("--cloud may only be provided once");
                    }
                    cloud = Some(next_value(&mut args, "--cloud")?);
                }
                "--region" => regions.push(next_value(&mut args, "--region")?),
                "--regions" => regions.extend(split_list(&next_value(&mut args, "--regions")?)),
                "--default-region" => default_region = true,
                "--flavor" => flavors.push(next_value(&mut args, "--flavor")?),
                "--os" => os_choices.push(next_value(&mut args, "--os")?),
                "--help" | "-h" => {
                    print!("{}", usage());
                    std::process::exit(0);
                }
                other => bail!("unknown flag: {other}\n{}", usage()),
            }
        }

        let Some(cloud) = cloud else {
            bail!("--cloud is required\n{}", usage());
        };

        Ok(CliArgs {
            config,
            cloud,
            regions,
            default_region,
            flavors,
            os_choices,
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
    "Usage: catalog-query [--config PATH] --cloud HOSTNAME [--region R]... [--regions R1,R2] [--default-region] [--flavor ID]... [--os NAME]...\n\
Prints compact JSON for the cloud and each requested lookup; misses are null.\n\
--config defaults to CLOUD_CATALOG_CONFIG.\n"
}
