use crate::config::{BundleSettings, HostSettings};
use std::path::PathBuf;

/// Migration source registered by a bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitRegistryEntry {
    /// Unique key; also the version prefix of the unit
    pub alias: String,
    /// Namespace relative to the host module namespace
    pub namespace: String,
    /// Directory relative to the host module root
    pub directory: PathBuf,
    pub display_name: String,
}

impl From<&BundleSettings> for UnitRegistryEntry {
    fn from(bundle: &BundleSettings) -> Self {
        Self {
            alias: bundle.alias.clone(),
            namespace: bundle.namespace.clone(),
            directory: bundle.dir_name.clone(),
            display_name: bundle.name.clone(),
        }
    }
}

/// Module currently loaded by the host application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostUnit {
    pub alias: String,
    pub namespace: String,
    /// Root directory of the module
    pub path: PathBuf,
}

impl From<&HostSettings> for HostUnit {
    fn from(host: &HostSettings) -> Self {
        Self {
            alias: host.alias.clone(),
            namespace: host.namespace.clone(),
            path: host.path.clone(),
        }
    }
}
