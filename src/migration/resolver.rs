//! Resolution of per-unit parameters from the registry and global defaults.

use super::config::ResolvedParams;
use super::types::MigrationError;
use crate::config::Settings;
use crate::registry::{HostModules, StaticHostModules, UnitRegistry};
use crate::utils::MAIN_PREFIX;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Global parameters of the main unit, shared defaults for bundles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainUnitSettings {
    pub collection_name: String,
    pub database_name: String,
    pub script_directory: PathBuf,
    pub directory: PathBuf,
    pub namespace: String,
    pub name: String,
}

impl From<&Settings> for MainUnitSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            collection_name: settings.collection_name.clone(),
            database_name: settings.database_name.clone(),
            script_directory: settings.script_dir().to_path_buf(),
            directory: settings.dir_name.clone(),
            namespace: settings.namespace.clone(),
            name: settings.name.clone(),
        }
    }
}

/// Turns a unit alias into fully populated [`ResolvedParams`].
#[derive(Clone)]
pub struct ConfigurationResolver {
    registry: Arc<UnitRegistry>,
    hosts: Arc<dyn HostModules>,
    defaults: MainUnitSettings,
}

impl ConfigurationResolver {
    pub fn new(
        registry: Arc<UnitRegistry>,
        hosts: Arc<dyn HostModules>,
        defaults: MainUnitSettings,
    ) -> Self {
        Self {
            registry,
            hosts,
            defaults,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            Arc::new(UnitRegistry::from_settings(settings)),
            Arc::new(StaticHostModules::from_settings(settings)),
            MainUnitSettings::from(settings),
        )
    }

    pub fn registry(&self) -> &UnitRegistry {
        &self.registry
    }

    /// Resolve parameters for `alias`, or for the main unit when `alias` is
    /// `None` or empty.
    pub fn resolve(&self, alias: Option<&str>) -> Result<ResolvedParams, MigrationError> {
        let alias = match alias.map(str::trim) {
            None | Some("") => return Ok(self.resolve_main()),
            Some(alias) => alias,
        };

        let entry = self
            .registry
            .get(alias)
            .ok_or_else(|| MigrationError::UnknownAlias(alias.to_string()))?;
        let host = self
            .hosts
            .unit_by_alias(alias)
            .ok_or_else(|| MigrationError::HostUnitNotFound(alias.to_string()))?;

        debug!(alias, host = %host.path.display(), "Resolved bundle migration config");

        Ok(ResolvedParams {
            prefix: alias.to_string(),
            collection_name: self.defaults.collection_name.clone(),
            database_name: self.defaults.database_name.clone(),
            script_directory: self.defaults.script_directory.clone(),
            directory: unit_directory(&host.path, &entry.directory),
            namespace: format!("{}\\{}", host.namespace, entry.namespace),
            name: entry.display_name.clone(),
        })
    }

    fn resolve_main(&self) -> ResolvedParams {
        ResolvedParams {
            prefix: MAIN_PREFIX.to_string(),
            collection_name: self.defaults.collection_name.clone(),
            database_name: self.defaults.database_name.clone(),
            script_directory: self.defaults.script_directory.clone(),
            directory: self.defaults.directory.clone(),
            namespace: self.defaults.namespace.clone(),
            name: self.defaults.name.clone(),
        }
    }

    /// Registered aliases whose host module is loaded, in host load order.
    pub fn loaded_aliases(&self) -> Vec<String> {
        self.hosts
            .loaded_units()
            .into_iter()
            .filter(|unit| self.registry.contains(&unit.alias))
            .map(|unit| unit.alias.clone())
            .collect()
    }
}

/// Directory of a bundle's migrations inside its host module.
///
/// The registry directory is always taken relative to the host path, even
/// when written with a leading root.
fn unit_directory(host_path: &Path, directory: &Path) -> PathBuf {
    let relative: PathBuf = directory
        .components()
        .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
        .collect();
    host_path.join(relative)
}
