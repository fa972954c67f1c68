//! Deployment config catalog.
//!
//! `raw` holds the historical input shapes, `model` the canonical types and
//! their lookups, `index` the loader and hostname index, and `repository` a
//! keyed set of independent deployment snapshots. Callers normally construct a
//! `ConfigCatalog` once at startup and pass it to whatever needs it.

pub mod identity;
pub mod index;
pub mod model;
mod raw;
pub mod repository;

pub use identity::{DeploymentKey, ImageVisibility, KeystoneHostname, LoginView};
pub use index::{ConfigCatalog, load_cloud_list, load_deployment_config};
pub use model::{
    CloudEntry, DeploymentConfig, FlavorGroup, FlavorPattern, ImageExcludeFilter, ImageFilters,
    Localization, OidcLoginConfig, OsChoice, Palette, ProxyMapping, Rgb, VersionEntry,
    match_flavor_group,
};
pub use repository::{CatalogRepository, deployment_key_for};
