use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Settings file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Bundle entry #{0} has an empty alias")]
    EmptyAlias(usize),

    #[error("Bundle alias {0} is registered more than once")]
    DuplicateAlias(String),

    #[error("Host module alias {0} is declared more than once")]
    DuplicateHost(String),
}

fn default_collection_name() -> String {
    "migration_versions".to_string()
}

fn default_database_name() -> String {
    "app".to_string()
}

fn default_name() -> String {
    "Application Migrations".to_string()
}

fn default_namespace() -> String {
    "Application\\Migrations".to_string()
}

fn default_dir_name() -> PathBuf {
    PathBuf::from("migrations")
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".migrations")
}

/// Migration settings registered by a bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleSettings {
    pub alias: String,
    /// Namespace relative to the host module's namespace
    pub namespace: String,
    /// Directory relative to the host module's path
    pub dir_name: PathBuf,
    pub name: String,
}

/// A module loaded by the host application
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostSettings {
    pub alias: String,
    pub namespace: String,
    pub path: PathBuf,
}

/// Host settings for migrations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_collection_name")]
    pub collection_name: String,
    #[serde(default = "default_database_name")]
    pub database_name: String,
    /// Directory holding auxiliary scripts; defaults to the main migrations directory
    #[serde(default)]
    pub script_dir_name: Option<PathBuf>,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_dir_name")]
    pub dir_name: PathBuf,
    /// Root of the version journal store
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    #[serde(default)]
    pub bundles: Vec<BundleSettings>,
    #[serde(default)]
    pub hosts: Vec<HostSettings>,
    /// Shared parameters handed to context-aware migrations
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            collection_name: default_collection_name(),
            database_name: default_database_name(),
            script_dir_name: None,
            name: default_name(),
            namespace: default_namespace(),
            dir_name: default_dir_name(),
            store_path: default_store_path(),
            bundles: Vec::new(),
            hosts: Vec::new(),
            parameters: serde_json::Map::new(),
        }
    }
}

impl Settings {
    /// Check alias uniqueness of bundles and host modules
    pub fn validate(&self) -> Result<(), SettingsError> {
        let mut seen = HashSet::new();
        for (index, bundle) in self.bundles.iter().enumerate() {
            if bundle.alias.trim().is_empty() {
                return Err(SettingsError::EmptyAlias(index));
            }
            if !seen.insert(bundle.alias.as_str()) {
                return Err(SettingsError::DuplicateAlias(bundle.alias.clone()));
            }
        }

        let mut hosts = HashSet::new();
        for host in &self.hosts {
            if !hosts.insert(host.alias.as_str()) {
                return Err(SettingsError::DuplicateHost(host.alias.clone()));
            }
        }
        Ok(())
    }

    /// Script directory, falling back to the main migrations directory
    pub fn script_dir(&self) -> &Path {
        self.script_dir_name.as_deref().unwrap_or(&self.dir_name)
    }

    /// Make every relative path absolute against `base`
    fn rebase(&mut self, base: &Path) {
        let rebase = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        rebase(&mut self.dir_name);
        rebase(&mut self.store_path);
        if let Some(dir) = self.script_dir_name.as_mut() {
            rebase(dir);
        }
        for host in &mut self.hosts {
            rebase(&mut host.path);
        }
    }
}

/// Read and validate the settings file.
///
/// Relative paths are resolved against the directory containing the file.
pub async fn read_settings(path: &Path) -> Result<Settings, SettingsError> {
    if !path.exists() {
        return Err(SettingsError::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).await?;
    let mut settings: Settings = serde_json::from_str(&content)?;
    settings.validate()?;

    if let Some(base) = path.parent() {
        settings.rebase(base);
    }
    Ok(settings)
}
