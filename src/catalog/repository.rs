//! Holds several deployment snapshots for lookup by key.
//!
//! Each file is a complete, independent config for one hosted console; the
//! repository never merges them. Keys default to the file stem so a directory
//! of configs (`exosphere.jetstream-cloud.org-config.js`, ...) maps directly.

use crate::catalog::identity::DeploymentKey;
use crate::catalog::index::ConfigCatalog;
use crate::catalog::model::CloudEntry;
use crate::error::{CatalogError, Result};
use crate::source::ConfigSource;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_EXTENSIONS: &[&str] = &["json", "js"];

#[derive(Default, Debug)]
/// In-memory store for deployment catalogs keyed by `DeploymentKey`.
pub struct CatalogRepository {
    catalogs: BTreeMap<DeploymentKey, ConfigCatalog>,
}

impl CatalogRepository {
    /// Register a catalog, replacing any previous snapshot under `key`.
    pub fn register(&mut self, key: DeploymentKey, catalog: ConfigCatalog) {
        if self.catalogs.insert(key.clone(), catalog).is_some() {
            tracing::debug!(deployment = %key, "replaced deployment snapshot");
        }
    }

    /// Load every `.json`/`.js` config in `dir`, in file-name order.
    ///
    /// The first malformed file aborts the whole load, as do two files that
    /// share a stem (`site.js` and `site.json`).
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut repo = Self::default();
        let mut sources: BTreeMap<DeploymentKey, PathBuf> = BTreeMap::new();
        for path in config_files(dir)? {
            let Some(key) = deployment_key_for(&path) else {
                continue;
            };
            if let Some(first) = sources.get(&key) {
                return Err(CatalogError::malformed(format!(
                    "duplicate deployment key '{key}': {} and {}",
                    first.display(),
                    path.display()
                )));
            }
            let catalog = ConfigCatalog::load(ConfigSource::Path(&path))?;
            sources.insert(key.clone(), path);
            repo.register(key, catalog);
        }
        tracing::info!(dir = %dir.display(), deployments = repo.len(), "loaded config directory");
        Ok(repo)
    }

    /// Fetch a catalog by key, if present.
    pub fn get(&self, key: &DeploymentKey) -> Option<&ConfigCatalog> {
        self.catalogs.get(key)
    }

    /// Resolve a cloud inside one registered deployment.
    pub fn find_cloud(&self, key: &DeploymentKey, hostname: &str) -> Option<&CloudEntry> {
        self.get(key)?.find_cloud_by_hostname(hostname)
    }

    pub fn keys(&self) -> impl Iterator<Item = &DeploymentKey> {
        self.catalogs.keys()
    }

    pub fn len(&self) -> usize {
        self.catalogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }
}

/// Key a config file registers under: its file stem.
pub fn deployment_key_for(path: &Path) -> Option<DeploymentKey> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(|stem| DeploymentKey(stem.to_string()))
}

fn config_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let io_err = |source: std::io::Error| CatalogError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if !path.is_file() {
            continue;
        }
        let is_config = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| CONFIG_EXTENSIONS.contains(&ext));
        if is_config {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_file_stem() {
        let key = deployment_key_for(Path::new("configs/exosphere.jetstream-cloud.org-config.js"));
        assert_eq!(
            key,
            Some(DeploymentKey("exosphere.jetstream-cloud.org-config".to_string()))
        );
    }

    #[test]
    fn empty_repository_finds_nothing() {
        let repo = CatalogRepository::default();
        assert!(repo.is_empty());
        let key = DeploymentKey("missing".to_string());
        assert!(repo.get(&key).is_none());
        assert!(repo.find_cloud(&key, "js2.jetstream-cloud.org").is_none());
    }
}
