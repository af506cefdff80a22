//! Resolved, per-unit migration configuration.

use super::types::{DefinedMigration, MigrationError};
use crate::engine::{ExecutionEngine, OutputWriter, StoreConnection};
use crate::version::Version;
use once_cell::sync::OnceCell;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Parameters resolved for one unit, before they are applied to a config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedParams {
    /// `"app"` for the main unit, the alias for bundles
    pub prefix: String,
    pub collection_name: String,
    pub database_name: String,
    pub script_directory: PathBuf,
    pub directory: PathBuf,
    pub namespace: String,
    pub name: String,
}

/// Migration configuration for one unit within one run.
///
/// Built by [`ConfigurationBuilder`](super::ConfigurationBuilder), filled by
/// [`configure`](super::configure) and discarded when the run ends.
pub struct MigrationConfig {
    connection: Arc<StoreConnection>,
    output: Arc<dyn OutputWriter>,
    prefix: OnceCell<String>,
    collection_name: String,
    database_name: String,
    script_directory: PathBuf,
    directory: PathBuf,
    namespace: String,
    name: String,
    /// Sorted ascending by version
    migrations: Vec<DefinedMigration>,
    migrated_versions: Option<BTreeSet<Version>>,
}

impl MigrationConfig {
    pub(crate) fn new(connection: Arc<StoreConnection>, output: Arc<dyn OutputWriter>) -> Self {
        Self {
            connection,
            output,
            prefix: OnceCell::new(),
            collection_name: String::new(),
            database_name: String::new(),
            script_directory: PathBuf::new(),
            directory: PathBuf::new(),
            namespace: String::new(),
            name: String::new(),
            migrations: Vec::new(),
            migrated_versions: None,
        }
    }

    /// Write every resolved field. The prefix can only be set once.
    pub(crate) fn apply(&mut self, params: ResolvedParams) -> Result<(), MigrationError> {
        self.prefix
            .set(params.prefix)
            .map_err(MigrationError::AlreadyConfigured)?;
        self.collection_name = params.collection_name;
        self.database_name = params.database_name;
        self.script_directory = params.script_directory;
        self.directory = params.directory;
        self.namespace = params.namespace;
        self.name = params.name;
        Ok(())
    }

    pub(crate) fn register_migrations(&mut self, mut migrations: Vec<DefinedMigration>) {
        migrations.sort_by(|a, b| a.version().cmp(b.version()));
        self.migrations = migrations;
    }

    pub(crate) fn migrations_mut(&mut self) -> &mut [DefinedMigration] {
        &mut self.migrations
    }

    pub fn is_configured(&self) -> bool {
        self.prefix.get().is_some()
    }

    /// Version prefix; empty until the config has been configured.
    pub fn prefix(&self) -> &str {
        self.prefix.get().map(String::as_str).unwrap_or_default()
    }

    pub fn connection(&self) -> &StoreConnection {
        &self.connection
    }

    pub fn output(&self) -> &dyn OutputWriter {
        self.output.as_ref()
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn script_directory(&self) -> &Path {
        &self.script_directory
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn migrations(&self) -> &[DefinedMigration] {
        &self.migrations
    }

    pub fn migration(&self, version: &Version) -> Option<&DefinedMigration> {
        self.migrations.iter().find(|m| m.version() == version)
    }

    /// Versions discovered in the migrations directory, ascending.
    pub fn registered_versions(&self) -> Vec<Version> {
        self.migrations.iter().map(|m| m.version().clone()).collect()
    }

    pub fn latest_version(&self) -> Option<&Version> {
        self.migrations.last().map(|m| m.version())
    }

    /// Versions the engine recorded as applied, fetched on first access.
    pub async fn migrated_versions(
        &mut self,
        engine: &dyn ExecutionEngine,
    ) -> Result<BTreeSet<Version>, MigrationError> {
        if let Some(versions) = &self.migrated_versions {
            return Ok(versions.clone());
        }
        let versions = engine.migrated_versions(self).await?;
        self.migrated_versions = Some(versions.clone());
        Ok(versions)
    }

    /// Applied versions that no longer match a registered migration.
    pub async fn executed_unavailable_versions(
        &mut self,
        engine: &dyn ExecutionEngine,
    ) -> Result<Vec<Version>, MigrationError> {
        let migrated = self.migrated_versions(engine).await?;
        let available = engine.available_versions(self);
        Ok(executed_unavailable(&migrated, &available))
    }

    /// Forget cached applied versions, e.g. after the engine ran.
    pub fn invalidate_migrated_versions(&mut self) {
        self.migrated_versions = None;
    }
}

impl std::fmt::Debug for MigrationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationConfig")
            .field("prefix", &self.prefix())
            .field("name", &self.name)
            .field("database_name", &self.database_name)
            .field("collection_name", &self.collection_name)
            .field("directory", &self.directory)
            .field("namespace", &self.namespace)
            .field("migrations", &self.migrations.len())
            .finish()
    }
}

/// `migrated − available`, in ascending order.
pub fn executed_unavailable(migrated: &BTreeSet<Version>, available: &[Version]) -> Vec<Version> {
    let available: BTreeSet<&Version> = available.iter().collect();
    migrated
        .iter()
        .filter(|v| !available.contains(v))
        .cloned()
        .collect()
}
