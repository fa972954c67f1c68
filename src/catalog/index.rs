//! Loaded deployment config plus a hostname index.
//!
//! Loading runs in fixed stages: resolve the source to JSON, validate it
//! against the bundled schema, parse the version-tolerant input shapes,
//! normalize, then enforce the cross-entry invariants the schema cannot
//! express. Any failure is a `MalformedConfig`; the result is immutable.

use crate::catalog::identity::KeystoneHostname;
use crate::catalog::model::{CloudEntry, DeploymentConfig, OsChoice};
use crate::catalog::raw::{RawCloudList, RawDeploymentConfig};
use crate::error::{CatalogError, Result};
use crate::schema_loader::{SchemaRoot, validate_against_schema};
use crate::source::ConfigSource;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
/// Deployment config plus a derived index keyed by keystone hostname.
pub struct ConfigCatalog {
    config: DeploymentConfig,
    by_hostname: BTreeMap<KeystoneHostname, usize>,
}

impl ConfigCatalog {
    /// Load and validate a deployment config.
    pub fn load(source: ConfigSource<'_>) -> Result<Self> {
        let config = load_deployment_config(source)?;
        let by_hostname = build_index(&config.clouds)?;
        Ok(Self {
            config,
            by_hostname,
        })
    }

    /// Wrap an already-constructed config, enforcing the same invariants as
    /// [`ConfigCatalog::load`].
    pub fn from_config(config: DeploymentConfig) -> Result<Self> {
        validate_clouds(&config.clouds)?;
        let by_hostname = build_index(&config.clouds)?;
        Ok(Self {
            config,
            by_hostname,
        })
    }

    pub fn config(&self) -> &DeploymentConfig {
        &self.config
    }

    pub fn into_config(self) -> DeploymentConfig {
        self.config
    }

    /// Resolve a cloud by its identity-service hostname.
    ///
    /// Exact and case-sensitive; returns `None` rather than erroring so the
    /// caller can degrade (e.g., hide the cloud) instead of aborting.
    pub fn find_cloud_by_hostname(&self, hostname: &str) -> Option<&CloudEntry> {
        let idx = self
            .by_hostname
            .get(&KeystoneHostname(hostname.to_string()))?;
        self.config.clouds.get(*idx)
    }

    /// Iterates hostnames in stable order.
    pub fn hostnames(&self) -> impl Iterator<Item = &KeystoneHostname> {
        self.by_hostname.keys()
    }

    pub fn clouds(&self) -> &[CloudEntry] {
        &self.config.clouds
    }
}

/// Parse, normalize and validate a deployment config without building the
/// hostname index.
pub fn load_deployment_config(source: ConfigSource<'_>) -> Result<DeploymentConfig> {
    let label = source.describe();
    tracing::debug!(source = %label, "loading deployment config");
    let value = source.into_value()?;
    validate_against_schema(&value, SchemaRoot::DeploymentConfig, &label)?;

    let raw: RawDeploymentConfig = serde_json::from_value(value)
        .map_err(|err| CatalogError::malformed(format!("{label}: {err}")))?;
    let config = raw.normalize()?;
    validate_clouds(&config.clouds)?;

    tracing::info!(
        source = %label,
        app_title = %config.app_title,
        clouds = config.clouds.len(),
        "loaded deployment config"
    );
    Ok(config)
}

/// Load a standalone cloud list (`{ "clouds": [...] }`).
pub fn load_cloud_list(source: ConfigSource<'_>) -> Result<Vec<CloudEntry>> {
    let label = source.describe();
    tracing::debug!(source = %label, "loading cloud list");
    let value = source.into_value()?;
    validate_against_schema(&value, SchemaRoot::CloudList, &label)?;

    let raw: RawCloudList = serde_json::from_value(value)
        .map_err(|err| CatalogError::malformed(format!("{label}: {err}")))?;
    let clouds = raw.normalize()?;
    validate_clouds(&clouds)?;
    tracing::info!(source = %label, clouds = clouds.len(), "loaded cloud list");
    Ok(clouds)
}

fn validate_clouds(clouds: &[CloudEntry]) -> Result<()> {
    let mut hostnames = BTreeSet::new();
    for cloud in clouds {
        let host = &cloud.keystone_hostname;
        if host.0.trim().is_empty() {
            return Err(CatalogError::malformed("encountered cloud with no keystoneHostname"));
        }
        if !hostnames.insert(host.clone()) {
            return Err(CatalogError::malformed(format!(
                "duplicate keystoneHostname {host}"
            )));
        }
        validate_proxies(cloud)?;
        for choice in &cloud.operating_system_choices {
            validate_os_choice(host, choice)?;
        }
    }
    Ok(())
}

fn validate_proxies(cloud: &CloudEntry) -> Result<()> {
    let host = &cloud.keystone_hostname;
    let mut regions = BTreeSet::new();
    let mut has_fallback = false;
    for mapping in &cloud.user_app_proxy {
        if mapping.hostname.trim().is_empty() {
            return Err(CatalogError::malformed(format!(
                "cloud {host} has a userAppProxy entry with an empty hostname"
            )));
        }
        match &mapping.region {
            None => {
                if has_fallback {
                    return Err(CatalogError::malformed(format!(
                        "cloud {host} has more than one userAppProxy entry with a null region"
                    )));
                }
                has_fallback = true;
            }
            Some(region) => {
                if !regions.insert(region.as_str()) {
                    return Err(CatalogError::malformed(format!(
                        "cloud {host} maps region '{region}' to more than one userAppProxy"
                    )));
                }
            }
        }
    }
    Ok(())
}

fn validate_os_choice(host: &KeystoneHostname, choice: &OsChoice) -> Result<()> {
    let mut names = BTreeSet::new();
    let mut primary: Option<&str> = None;
    for version in &choice.versions {
        if !names.insert(version.friendly_name.as_str()) {
            return Err(CatalogError::malformed(format!(
                "cloud {host} OS choice '{}' lists version '{}' more than once",
                choice.friendly_name, version.friendly_name
            )));
        }
        if version.is_primary {
            if let Some(first) = primary {
                return Err(CatalogError::malformed(format!(
                    "cloud {host} OS choice '{}' marks both '{first}' and '{}' as primary",
                    choice.friendly_name, version.friendly_name
                )));
            }
            primary = Some(version.friendly_name.as_str());
        }
    }
    Ok(())
}

fn build_index(clouds: &[CloudEntry]) -> Result<BTreeMap<KeystoneHostname, usize>> {
    let mut map = BTreeMap::new();
    for (idx, cloud) in clouds.iter().enumerate() {
        if map.insert(cloud.keystone_hostname.clone(), idx).is_some() {
            return Err(CatalogError::malformed(format!(
                "duplicate keystoneHostname {}",
                cloud.keystone_hostname
            )));
        }
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn config_with_clouds(clouds: Value) -> Value {
        json!({
            "logo": "assets/img/logo-alt.svg",
            "favicon": "assets/img/favicon.ico",
            "appTitle": "Exosphere",
            "clouds": clouds
        })
    }

    fn load(value: Value) -> Result<ConfigCatalog> {
        ConfigCatalog::load(ConfigSource::Value(value))
    }

    fn ubuntu(versions: Value) -> Value {
        json!([{
            "keystoneHostname": "k.example.org",
            "operatingSystemChoices": [{
                "friendlyName": "Ubuntu",
                "logo": "u.svg",
                "versions": versions
            }]
        }])
    }

    #[test]
    fn finds_cloud_by_exact_hostname_only() {
        let catalog = load(config_with_clouds(json!([
            {"keystoneHostname": "js2.jetstream-cloud.org", "friendlyName": "Jetstream2"},
            {"keystoneHostname": "keystone.rc.nectar.org.au", "friendlyName": "Nectar Cloud"}
        ])))
        .unwrap();
        let cloud = catalog.find_cloud_by_hostname("js2.jetstream-cloud.org").unwrap();
        assert_eq!(cloud.friendly_name, "Jetstream2");
        assert!(catalog.find_cloud_by_hostname("JS2.jetstream-cloud.org").is_none());
        assert!(catalog.find_cloud_by_hostname("jetstream-cloud.org").is_none());
        assert!(catalog.find_cloud_by_hostname("").is_none());
        let hosts: Vec<_> = catalog.hostnames().map(|h| h.0.as_str()).collect();
        assert_eq!(hosts, ["js2.jetstream-cloud.org", "keystone.rc.nectar.org.au"]);
    }

    #[test]
    fn rejects_duplicate_hostnames() {
        let err = load(config_with_clouds(json!([
            {"keystoneHostname": "k.example.org"},
            {"keystoneHostname": "k.example.org"}
        ])))
        .unwrap_err();
        assert!(err.to_string().contains("duplicate keystoneHostname"));
    }

    #[test]
    fn rejects_missing_hostname() {
        let err = load(config_with_clouds(json!([{"friendlyName": "Nameless"}]))).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn rejects_two_primary_versions() {
        let err = load(config_with_clouds(ubuntu(json!([
            {"friendlyName": "22.04", "isPrimary": true},
            {"friendlyName": "20.04", "isPrimary": true}
        ]))))
        .unwrap_err();
        assert!(err.to_string().contains("as primary"));
    }

    #[test]
    fn rejects_duplicate_version_names() {
        let err = load(config_with_clouds(ubuntu(json!([
            {"friendlyName": "22.04", "isPrimary": true},
            {"friendlyName": "22.04"}
        ]))))
        .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn rejects_ambiguous_proxy_regions() {
        let two_fallbacks = load(config_with_clouds(json!([{
            "keystoneHostname": "k.example.org",
            "userAppProxy": [{"region": null, "hostname": "a"}, {"region": null, "hostname": "b"}]
        }])))
        .unwrap_err();
        assert!(two_fallbacks.to_string().contains("null region"));

        let repeated = load(config_with_clouds(json!([{
            "keystoneHostname": "k.example.org",
            "userAppProxy": [{"region": "IU", "hostname": "a"}, {"region": "IU", "hostname": "b"}]
        }])))
        .unwrap_err();
        assert!(repeated.to_string().contains("region 'IU'"));
    }

    #[test]
    fn rejects_invalid_flavor_pattern() {
        let err = load(config_with_clouds(json!([{
            "keystoneHostname": "k.example.org",
            "flavorGroups": [{"matchOn": "m3.(", "title": "Broken"}]
        }])))
        .unwrap_err();
        assert!(err.to_string().contains("invalid flavor group pattern"));
    }

    #[test]
    fn cloud_list_loads_with_same_rules() {
        let clouds = load_cloud_list(ConfigSource::Value(json!({
            "clouds": [{"keystoneHostname": "keystone.rc.nectar.org.au", "friendlyName": "Nectar Cloud",
                        "instanceTypes": [], "flavorGroups": []}]
        })))
        .unwrap();
        assert_eq!(clouds.len(), 1);
        assert!(
            load_cloud_list(ConfigSource::Value(json!({
                "clouds": [{"keystoneHostname": "a"}, {"keystoneHostname": "a"}]
            })))
            .is_err()
        );
    }

    #[test]
    fn from_config_enforces_invariants() {
        let catalog = load(config_with_clouds(json!([{"keystoneHostname": "k.example.org"}]))).unwrap();
        let mut config = catalog.into_config();
        config.clouds.push(config.clouds[0].clone());
        assert!(ConfigCatalog::from_config(config).is_err());
    }
}
