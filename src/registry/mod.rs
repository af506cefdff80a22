//! Static description of the migration units known to the host.
//!
//! The [`UnitRegistry`] holds what bundles *declared* in settings, while
//! [`HostModules`] answers which modules are actually loaded at runtime.
//! Both are built once at startup and passed explicitly to the resolver.

mod types;

pub use types::{HostUnit, UnitRegistryEntry};

use crate::config::Settings;

/// Read-only registry of bundle migration sources, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct UnitRegistry {
    entries: Vec<UnitRegistryEntry>,
}

impl UnitRegistry {
    /// Build a registry from entries. Later duplicates of an alias are ignored.
    pub fn new(entries: impl IntoIterator<Item = UnitRegistryEntry>) -> Self {
        let mut registry = Self::default();
        for entry in entries {
            if registry.get(&entry.alias).is_none() {
                registry.entries.push(entry);
            }
        }
        registry
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.bundles.iter().map(UnitRegistryEntry::from))
    }

    pub fn get(&self, alias: &str) -> Option<&UnitRegistryEntry> {
        self.entries.iter().find(|e| e.alias == alias)
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.get(alias).is_some()
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.alias.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Runtime lookup of the modules loaded by the host.
pub trait HostModules: Send + Sync {
    /// Find a loaded module by alias.
    fn unit_by_alias(&self, alias: &str) -> Option<&HostUnit>;

    /// All loaded modules, in load order.
    fn loaded_units(&self) -> Vec<&HostUnit>;
}

/// Fixed list of loaded modules, usually taken from settings.
#[derive(Debug, Clone, Default)]
pub struct StaticHostModules {
    units: Vec<HostUnit>,
}

impl StaticHostModules {
    pub fn new(units: Vec<HostUnit>) -> Self {
        Self { units }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.hosts.iter().map(HostUnit::from).collect())
    }
}

impl HostModules for StaticHostModules {
    fn unit_by_alias(&self, alias: &str) -> Option<&HostUnit> {
        self.units.iter().find(|u| u.alias == alias)
    }

    fn loaded_units(&self) -> Vec<&HostUnit> {
        self.units.iter().collect()
    }
}
