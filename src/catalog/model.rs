//! Canonical, immutable representation of a deployment config.
//!
//! These types are what the rest of the console sees after loading. Every
//! historical input spelling has already been normalized away (see
//! `catalog::raw`), so serializing a loaded config always produces the current
//! shape and reloading it yields an identical structure.

use crate::catalog::identity::{ImageVisibility, KeystoneHostname, LoginView};
use crate::error::{CatalogError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Top-level settings for one hosted instance of the console.
pub struct DeploymentConfig {
    pub show_debug_msgs: bool,
    pub cloud_cors_proxy_url: Option<String>,
    pub url_path_prefix: Option<String>,
    pub palette: Option<Palette>,
    pub logo: String,
    pub favicon: String,
    pub app_title: String,
    pub top_bar_show_app_title: bool,
    pub default_login_view: Option<LoginView>,
    pub about_app_markdown: Option<String>,
    pub support_info_markdown: Option<String>,
    pub user_support_email: Option<String>,
    pub open_id_connect_login_config: Option<OidcLoginConfig>,
    pub localization: Localization,
    pub clouds: Vec<CloudEntry>,
    pub instance_config_mgt_repo_url: Option<String>,
    pub instance_config_mgt_repo_checkout: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
/// Brand colors; each component is a full 0..=255 channel.
pub struct Palette {
    pub primary: Rgb,
    pub secondary: Rgb,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Single sign-on button and federation endpoint.
pub struct OidcLoginConfig {
    pub keystone_auth_url: String,
    pub websso_keystone_endpoint: String,
    pub oidc_login_icon: String,
    pub oidc_login_button_label: String,
    pub oidc_login_button_description: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
/// Display labels for generic domain terms.
///
/// Deployments override only the labels they care about; the rest keep the
/// stock wording from [`Localization::default`].
pub struct Localization {
    pub openstack_with_own_keystone: String,
    pub openstack_sharing_keystone_with_another: String,
    pub unit_of_tenancy: String,
    pub max_resources_per_project: String,
    pub pki_public_key_for_ssh: String,
    pub virtual_computer: String,
    pub virtual_computer_hardware_config: String,
    pub cloud_init_data: String,
    pub command_driven_text_interface: String,
    pub static_representation_of_block_device_contents: String,
    pub block_device: String,
    pub non_floating_ip_address: String,
    pub floating_ip_address: String,
    pub publicly_routable_ip_address: String,
    pub graphical_desktop_environment: String,
}

impl Default for Localization {
    fn default() -> Self {
        Self {
            openstack_with_own_keystone: "cloud".to_string(),
            openstack_sharing_keystone_with_another: "region".to_string(),
            unit_of_tenancy: "project".to_string(),
            max_resources_per_project: "quota".to_string(),
            pki_public_key_for_ssh: "SSH public key".to_string(),
            virtual_computer: "instance".to_string(),
            virtual_computer_hardware_config: "flavor".to_string(),
            cloud_init_data: "boot script".to_string(),
            command_driven_text_interface: "web shell".to_string(),
            static_representation_of_block_device_contents: "image".to_string(),
            block_device: "volume".to_string(),
            non_floating_ip_address: "internal IP address".to_string(),
            floating_ip_address: "floating IP address".to_string(),
            publicly_routable_ip_address: "public IP address".to_string(),
            graphical_desktop_environment: "graphical desktop environment".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
/// One OpenStack cloud the console can target.
pub struct CloudEntry {
    pub keystone_hostname: KeystoneHostname,
    pub friendly_name: String,
    pub friendly_sub_name: Option<String>,
    pub user_app_proxy: Vec<ProxyMapping>,
    pub image_exclude_filter: Option<ImageExcludeFilter>,
    pub featured_image_name_prefix: Option<String>,
    pub operating_system_choices: Vec<OsChoice>,
    pub flavor_groups: Vec<FlavorGroup>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Region → proxy hostname. `region: None` is the cloud-wide fallback.
pub struct ProxyMapping {
    pub region: Option<String>,
    pub hostname: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Image property that hides non-curated images when it matches.
pub struct ImageExcludeFilter {
    pub filter_key: String,
    pub filter_value: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Operating-system family offered when creating an instance.
pub struct OsChoice {
    pub friendly_name: String,
    pub description: String,
    pub logo: String,
    pub versions: Vec<VersionEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionEntry {
    pub friendly_name: String,
    pub is_primary: bool,
    pub image_filters: ImageFilters,
    pub restrict_flavor_ids: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Criteria an image must meet to back a version entry.
pub struct ImageFilters {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub visibility: Option<ImageVisibility>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Display grouping of hardware flavors.
pub struct FlavorGroup {
    pub match_on: FlavorPattern,
    pub title: String,
    pub description: Option<String>,
}

/// Compiled `matchOn` pattern.
///
/// The pattern is a regular expression that must match the whole flavor
/// identifier. Equality and serialization use the source text.
#[derive(Clone)]
pub struct FlavorPattern {
    source: String,
    compiled: Regex,
}

impl FlavorPattern {
    pub fn new(source: &str) -> Result<Self> {
        let compiled = Regex::new(&format!("^(?:{source})$")).map_err(|err| {
            CatalogError::malformed(format!("invalid flavor group pattern '{source}': {err}"))
        })?;
        Ok(Self {
            source: source.to_string(),
            compiled,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, flavor_id: &str) -> bool {
        self.compiled.is_match(flavor_id)
    }
}

impl PartialEq for FlavorPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Debug for FlavorPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FlavorPattern").field(&self.source).finish()
    }
}

impl Serialize for FlavorPattern {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.source)
    }
}

impl DeploymentConfig {
    /// Exact, case-sensitive lookup by identity-service hostname.
    pub fn find_cloud_by_hostname(&self, hostname: &str) -> Option<&CloudEntry> {
        self.clouds
            .iter()
            .find(|cloud| cloud.keystone_hostname.as_str() == hostname)
    }
}

impl CloudEntry {
    /// Proxy hostname for `region`.
    ///
    /// An entry whose region equals `region` wins; otherwise the null-region
    /// entry is used. Clouds with only a default proxy resolve every region to
    /// it, clouds without one report `None` for unmapped regions.
    pub fn resolve_proxy_hostname(&self, region: Option<&str>) -> Option<&str> {
        self.user_app_proxy
            .iter()
            .find(|mapping| mapping.region.as_deref() == region)
            .or_else(|| {
                self.user_app_proxy
                    .iter()
                    .find(|mapping| mapping.region.is_none())
            })
            .map(|mapping| mapping.hostname.as_str())
    }

    pub fn os_choice(&self, friendly_name: &str) -> Option<&OsChoice> {
        self.operating_system_choices
            .iter()
            .find(|choice| choice.friendly_name == friendly_name)
    }
}

impl OsChoice {
    /// The version flagged primary, if any. Fallback display policy belongs
    /// to the caller.
    pub fn primary_version(&self) -> Option<&VersionEntry> {
        self.versions.iter().find(|version| version.is_primary)
    }
}

impl VersionEntry {
    /// Whether `flavor_id` may run this version. Unrestricted versions allow
    /// every flavor.
    pub fn allows_flavor(&self, flavor_id: &str) -> bool {
        match &self.restrict_flavor_ids {
            Some(ids) => ids.iter().any(|id| id == flavor_id),
            None => true,
        }
    }
}

/// First flavor group, in list order, whose pattern matches `flavor_id`.
pub fn match_flavor_group<'a>(
    groups: &'a [FlavorGroup],
    flavor_id: &str,
) -> Option<&'a FlavorGroup> {
    groups.iter().find(|group| group.match_on.is_match(flavor_id))
}
