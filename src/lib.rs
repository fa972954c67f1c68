//! Typed loader for cloud console deployment configs.
//!
//! A deployment config names the clouds a hosted console can target (identity
//! endpoints, per-region proxies, image filters, OS choices, flavor groups)
//! along with branding and help text. This crate parses such configs from any
//! of their historical on-disk shapes into one immutable structure and
//! answers the handful of lookups the console needs: cloud by hostname, proxy
//! by region, primary OS version, flavor group by flavor id.
//!
//! There is no global state. Load a [`ConfigCatalog`] once and pass it around;
//! hosts that reload configs swap the whole catalog.

pub mod beacon;
pub mod catalog;
pub mod error;
pub mod runtime;
mod schema_loader;
pub mod source;

pub use beacon::AnalyticsBeacon;
pub use catalog::{
    CatalogRepository, CloudEntry, ConfigCatalog, DeploymentConfig, DeploymentKey, FlavorGroup,
    FlavorPattern, ImageExcludeFilter, ImageFilters, ImageVisibility, KeystoneHostname,
    Localization, LoginView, OidcLoginConfig, OsChoice, Palette, ProxyMapping, Rgb, VersionEntry,
    deployment_key_for, load_cloud_list, load_deployment_config, match_flavor_group,
};
pub use error::{CatalogError, Result};
pub use source::{ConfigSource, extract_object_literal, parse_config_text};

/// Variable name the console reads its config from.
pub const DEFAULT_CONFIG_VAR: &str = "config";

/// Render a loaded config as the script the console includes
/// (`'use strict'; var <name> = {...};`).
///
/// The output is the canonical shape, so it reloads to an identical
/// structure. `beacon`, when given, is appended after the assignment.
pub fn render_config_script(
    config: &DeploymentConfig,
    var_name: &str,
    beacon: Option<&AnalyticsBeacon>,
) -> Result<String> {
    if var_name.is_empty()
        || !var_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$'))
        || var_name.starts_with(|c: char| c.is_ascii_digit())
    {
        return Err(CatalogError::malformed(format!(
            "'{var_name}' is not a usable JavaScript variable name"
        )));
    }
    let body = serde_json::to_string_pretty(config)?;
    let mut script = format!("'use strict'\n\nvar {var_name} = {body};\n");
    if let Some(beacon) = beacon {
        script.push('\n');
        script.push_str(&beacon.render_script());
    }
    Ok(script)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> DeploymentConfig {
        load_deployment_config(ConfigSource::Value(json!({
            "logo": "assets/img/logo-alt.svg",
            "favicon": "assets/img/favicon.ico",
            "appTitle": "Exosphere",
            "clouds": [{"keystoneHostname": "iu.jetstream-cloud.org",
                        "userAppProxy": "proxy-j7m-iu.exosphere.app"}]
        })))
        .unwrap()
    }

    #[test]
    fn rendered_script_reloads_identically() {
        let config = sample();
        let script = render_config_script(&config, DEFAULT_CONFIG_VAR, None).unwrap();
        assert!(script.starts_with("'use strict'\n\nvar config = {"));
        let reloaded = load_deployment_config(ConfigSource::Text(&script)).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn beacon_is_appended_and_ignored_on_reload() {
        let config = sample();
        let beacon = AnalyticsBeacon::new("//stats.example.org/", "3");
        let script = render_config_script(&config, "config", Some(&beacon)).unwrap();
        assert!(script.contains("setSiteId"));
        let reloaded = load_deployment_config(ConfigSource::Text(&script)).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn rejects_unusable_variable_names() {
        let config = sample();
        assert!(render_config_script(&config, "", None).is_err());
        assert!(render_config_script(&config, "1config", None).is_err());
        assert!(render_config_script(&config, "my-config", None).is_err());
    }
}
