//! On-disk shapes accepted by the loader.
//!
//! Deployments have written the same data several ways over time: a single
//! proxy hostname or a list of region mappings, `instanceTypes` or
//! `operatingSystemChoices`, `filters` or `imageFilters`, clouds with or
//! without a friendly name. Each variant is spelled out here and normalized
//! into the canonical `catalog::model` types, so nothing downstream branches
//! on input history.

use crate::catalog::identity::{KeystoneHostname, LoginView};
use crate::catalog::model::{
    CloudEntry, DeploymentConfig, FlavorGroup, FlavorPattern, ImageExcludeFilter, ImageFilters,
    Localization, OidcLoginConfig, OsChoice, Palette, ProxyMapping, Rgb, VersionEntry,
};
use crate::error::{CatalogError, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawDeploymentConfig {
    #[serde(default)]
    pub show_debug_msgs: bool,
    #[serde(default)]
    pub cloud_cors_proxy_url: Option<String>,
    #[serde(default)]
    pub url_path_prefix: Option<String>,
    #[serde(default)]
    pub palette: Option<RawPalette>,
    pub logo: String,
    pub favicon: String,
    pub app_title: String,
    #[serde(default = "default_true")]
    pub top_bar_show_app_title: bool,
    #[serde(default)]
    pub default_login_view: Option<LoginView>,
    #[serde(default)]
    pub about_app_markdown: Option<String>,
    #[serde(default)]
    pub support_info_markdown: Option<String>,
    #[serde(default)]
    pub user_support_email: Option<String>,
    #[serde(default)]
    pub open_id_connect_login_config: Option<OidcLoginConfig>,
    #[serde(default)]
    pub localization: Option<Localization>,
    #[serde(default)]
    pub clouds: Vec<RawCloud>,
    #[serde(default)]
    pub instance_config_mgt_repo_url: Option<String>,
    #[serde(default)]
    pub instance_config_mgt_repo_checkout: Option<String>,
}

#[derive(Debug, Deserialize)]
/// Standalone list of clouds shipped separately from a deployment config.
pub(crate) struct RawCloudList {
    pub clouds: Vec<RawCloud>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPalette {
    pub primary: RawRgb,
    pub secondary: RawRgb,
}

// Wider than u8 so out-of-range channels get a precise error message.
#[derive(Debug, Deserialize)]
pub(crate) struct RawRgb {
    pub r: i64,
    pub g: i64,
    pub b: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawCloud {
    pub keystone_hostname: String,
    #[serde(default)]
    pub friendly_name: Option<String>,
    #[serde(default)]
    pub friendly_sub_name: Option<String>,
    #[serde(default)]
    pub user_app_proxy: Option<RawUserAppProxy>,
    #[serde(default)]
    pub image_exclude_filter: Option<ImageExcludeFilter>,
    #[serde(default)]
    pub featured_image_name_prefix: Option<String>,
    #[serde(rename = "operatingSystemChoices", alias = "instanceTypes", default)]
    pub operating_system_choices: Vec<RawOsChoice>,
    #[serde(default)]
    pub flavor_groups: Vec<RawFlavorGroup>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
/// `userAppProxy` as either one hostname for the whole cloud or a list of
/// region mappings.
pub(crate) enum RawUserAppProxy {
    Single(String),
    Regions(Vec<ProxyMapping>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawOsChoice {
    pub friendly_name: String,
    #[serde(default)]
    pub description: String,
    pub logo: String,
    #[serde(default)]
    pub versions: Vec<RawVersion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawVersion {
    pub friendly_name: String,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(rename = "imageFilters", alias = "filters", default)]
    pub image_filters: ImageFilters,
    #[serde(default)]
    pub restrict_flavor_ids: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawFlavorGroup {
    pub match_on: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_true() -> bool {
    true
}

impl RawDeploymentConfig {
    pub fn normalize(self) -> Result<DeploymentConfig> {
        let palette = self.palette.map(RawPalette::normalize).transpose()?;
        let clouds = normalize_clouds(self.clouds)?;
        Ok(DeploymentConfig {
            show_debug_msgs: self.show_debug_msgs,
            cloud_cors_proxy_url: self.cloud_cors_proxy_url,
            url_path_prefix: self.url_path_prefix,
            palette,
            logo: self.logo,
            favicon: self.favicon,
            app_title: self.app_title,
            top_bar_show_app_title: self.top_bar_show_app_title,
            default_login_view: self.default_login_view,
            about_app_markdown: self.about_app_markdown,
            support_info_markdown: self.support_info_markdown,
            user_support_email: self.user_support_email,
            open_id_connect_login_config: self.open_id_connect_login_config,
            localization: self.localization.unwrap_or_default(),
            clouds,
            instance_config_mgt_repo_url: self.instance_config_mgt_repo_url,
            instance_config_mgt_repo_checkout: self.instance_config_mgt_repo_checkout,
        })
    }
}

impl RawCloudList {
    pub fn normalize(self) -> Result<Vec<CloudEntry>> {
        normalize_clouds(self.clouds)
    }
}

fn normalize_clouds(clouds: Vec<RawCloud>) -> Result<Vec<CloudEntry>> {
    clouds
        .into_iter()
        .enumerate()
        .map(|(idx, cloud)| cloud.normalize(idx))
        .collect()
}

impl RawPalette {
    fn normalize(self) -> Result<Palette> {
        Ok(Palette {
            primary: self.primary.normalize("palette.primary")?,
            secondary: self.secondary.normalize("palette.secondary")?,
        })
    }
}

impl RawRgb {
    fn normalize(self, field: &str) -> Result<Rgb> {
        Ok(Rgb {
            r: channel(field, "r", self.r)?,
            g: channel(field, "g", self.g)?,
            b: channel(field, "b", self.b)?,
        })
    }
}

fn channel(field: &str, name: &str, value: i64) -> Result<u8> {
    u8::try_from(value).map_err(|_| {
        CatalogError::malformed(format!(
            "{field}.{name} must be within 0..=255, got {value}"
        ))
    })
}

impl RawCloud {
    fn normalize(self, idx: usize) -> Result<CloudEntry> {
        let hostname = self.keystone_hostname;
        if hostname.trim().is_empty() {
            return Err(CatalogError::malformed(format!(
                "clouds[{idx}].keystoneHostname must not be empty"
            )));
        }
        if hostname.trim() != hostname {
            return Err(CatalogError::malformed(format!(
                "clouds[{idx}].keystoneHostname '{hostname}' has leading or trailing whitespace"
            )));
        }
        let keystone_hostname = KeystoneHostname(hostname);

        let friendly_name = match self.friendly_name {
            Some(name) if !name.trim().is_empty() => name,
            _ => {
                tracing::warn!(
                    cloud = %keystone_hostname,
                    "cloud has no friendlyName; using keystone hostname"
                );
                keystone_hostname.0.clone()
            }
        };

        let user_app_proxy = match self.user_app_proxy {
            None => Vec::new(),
            Some(RawUserAppProxy::Single(hostname)) => {
                if hostname.trim().is_empty() {
                    return Err(CatalogError::malformed(format!(
                        "clouds[{idx}].userAppProxy must not be an empty hostname"
                    )));
                }
                vec![ProxyMapping {
                    region: None,
                    hostname,
                }]
            }
            Some(RawUserAppProxy::Regions(mappings)) => mappings,
        };

        let operating_system_choices = self
            .operating_system_choices
            .into_iter()
            .map(RawOsChoice::normalize)
            .collect();

        let flavor_groups = self
            .flavor_groups
            .into_iter()
            .map(RawFlavorGroup::normalize)
            .collect::<Result<Vec<_>>>()?;

        Ok(CloudEntry {
            keystone_hostname,
            friendly_name,
            friendly_sub_name: self.friendly_sub_name,
            user_app_proxy,
            image_exclude_filter: self.image_exclude_filter,
            featured_image_name_prefix: self.featured_image_name_prefix,
            operating_system_choices,
            flavor_groups,
        })
    }
}

impl RawOsChoice {
    fn normalize(self) -> OsChoice {
        OsChoice {
            friendly_name: self.friendly_name,
            description: self.description,
            logo: self.logo,
            versions: self
                .versions
                .into_iter()
                .map(|version| VersionEntry {
                    friendly_name: version.friendly_name,
                    is_primary: version.is_primary,
                    image_filters: version.image_filters,
                    restrict_flavor_ids: version.restrict_flavor_ids,
                })
                .collect(),
        }
    }
}

impl RawFlavorGroup {
    fn normalize(self) -> Result<FlavorGroup> {
        Ok(FlavorGroup {
            match_on: FlavorPattern::new(&self.match_on)?,
            title: self.title,
            description: self.description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cloud(value: serde_json::Value) -> Result<CloudEntry> {
        let raw: RawCloud = serde_json::from_value(value)?;
        raw.normalize(0)
    }

    #[test]
    fn single_proxy_string_becomes_null_region_mapping() {
        let single = cloud(json!({
            "keystoneHostname": "iu.jetstream-cloud.org",
            "userAppProxy": "proxy-j7m-iu.exosphere.app"
        }))
        .unwrap();
        let listed = cloud(json!({
            "keystoneHostname": "iu.jetstream-cloud.org",
            "userAppProxy": [{"region": null, "hostname": "proxy-j7m-iu.exosphere.app"}]
        }))
        .unwrap();
        assert_eq!(single.user_app_proxy, listed.user_app_proxy);
        assert_eq!(
            single.user_app_proxy,
            vec![ProxyMapping {
                region: None,
                hostname: "proxy-j7m-iu.exosphere.app".to_string()
            }]
        );
    }

    #[test]
    fn legacy_os_spellings_match_current() {
        let legacy = cloud(json!({
            "keystoneHostname": "k.example.org",
            "instanceTypes": [{
                "friendlyName": "Ubuntu",
                "description": "",
                "logo": "u.svg",
                "versions": [{"friendlyName": "22.04", "isPrimary": true,
                              "filters": {"name": "Featured-Ubuntu22", "visibility": "public"}}]
            }]
        }))
        .unwrap();
        let current = cloud(json!({
            "keystoneHostname": "k.example.org",
            "operatingSystemChoices": [{
                "friendlyName": "Ubuntu",
                "description": "",
                "logo": "u.svg",
                "versions": [{"friendlyName": "22.04", "isPrimary": true,
                              "imageFilters": {"name": "Featured-Ubuntu22", "visibility": "public"},
                              "restrictFlavorIds": null}]
            }]
        }))
        .unwrap();
        assert_eq!(legacy, current);
    }

    #[test]
    fn missing_friendly_name_falls_back_to_hostname() {
        let entry = cloud(json!({"keystoneHostname": "tacc.jetstream-cloud.org"})).unwrap();
        assert_eq!(entry.friendly_name, "tacc.jetstream-cloud.org");
        assert!(entry.user_app_proxy.is_empty());
        assert!(entry.flavor_groups.is_empty());
    }

    #[test]
    fn empty_hostname_is_malformed() {
        let err = cloud(json!({"keystoneHostname": "  "})).unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("keystoneHostname"));
    }

    #[test]
    fn padded_hostname_is_malformed() {
        let err = cloud(json!({"keystoneHostname": " js2.jetstream-cloud.org "})).unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("whitespace"), "{err}");
    }

    #[test]
    fn palette_channel_out_of_range_is_malformed() {
        let raw: RawPalette = serde_json::from_value(json!({
            "primary": {"r": 256, "g": 0, "b": 0},
            "secondary": {"r": 0, "g": 0, "b": 0}
        }))
        .unwrap();
        let err = raw.normalize().unwrap_err();
        assert!(err.to_string().contains("palette.primary.r"));

        let raw: RawPalette = serde_json::from_value(json!({
            "primary": {"r": 0, "g": 0, "b": 0},
            "secondary": {"r": 0, "g": -1, "b": 0}
        }))
        .unwrap();
        assert!(raw.normalize().unwrap_err().to_string().contains("palette.secondary.g"));
    }
}
