//! File-backed execution engine.
//!
//! Applied versions are kept in one JSON journal per (database, collection)
//! pair under the store root: `<root>/<database>/<collection>.json`. Every
//! record carries the unit prefix, so units sharing a collection never see
//! each other's versions.

use super::types::{EngineError, MigrationDirection, MigrationResult};
use super::ExecutionEngine;
use crate::migration::MigrationConfig;
use crate::utils::{now_iso, prefixed_version, JOURNAL_EXTENSION, JOURNAL_SCHEMA_VERSION};
use crate::version::{format_version, Version, VersionTarget};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info};

/// Location of the version journal store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConnection {
    root: PathBuf,
}

impl StoreConnection {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the journal holding `collection` of `database`
    pub fn journal_path(&self, database: &str, collection: &str) -> PathBuf {
        self.root
            .join(database)
            .join(format!("{collection}.{JOURNAL_EXTENSION}"))
    }
}

/// One applied migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    /// Absent on records written before prefixes existed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    pub version: Version,
    pub executed_at: String,
}

impl VersionRecord {
    /// Key the record is stored under (`<prefix>_<version>`)
    pub fn key(&self) -> String {
        match &self.prefix {
            Some(prefix) => prefixed_version(prefix, self.version.as_str()),
            None => self.version.to_string(),
        }
    }
}

/// Contents of one journal file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionJournal {
    pub schema_version: u32,
    pub updated_at: String,
    pub records: Vec<VersionRecord>,
}

impl Default for VersionJournal {
    fn default() -> Self {
        Self {
            schema_version: JOURNAL_SCHEMA_VERSION,
            updated_at: now_iso(),
            records: Vec::new(),
        }
    }
}

impl VersionJournal {
    pub fn versions_for(&self, prefix: &str) -> BTreeSet<Version> {
        self.records
            .iter()
            .filter(|r| r.prefix.as_deref() == Some(prefix))
            .map(|r| r.version.clone())
            .collect()
    }

    fn record(&mut self, prefix: &str, version: &Version) {
        self.records.push(VersionRecord {
            prefix: Some(prefix.to_string()),
            version: version.clone(),
            executed_at: now_iso(),
        });
    }

    fn remove(&mut self, prefix: &str, version: &Version) {
        self.records
            .retain(|r| !(r.prefix.as_deref() == Some(prefix) && &r.version == version));
    }
}

/// Read a journal, returning an empty one when the file does not exist.
pub async fn read_journal(path: &Path) -> Result<VersionJournal, EngineError> {
    if !path.exists() {
        return Ok(VersionJournal::default());
    }

    let content = fs::read_to_string(path).await?;
    serde_json::from_str(&content)
        .map_err(|e| EngineError::CorruptJournal(path.to_path_buf(), e.to_string()))
}

/// Write a journal atomically (temp file + rename).
pub async fn write_journal(path: &Path, journal: &mut VersionJournal) -> Result<(), EngineError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    journal.updated_at = now_iso();
    let temp_path = path.with_extension(format!("{JOURNAL_EXTENSION}.tmp"));
    let content = serde_json::to_string_pretty(journal)?;
    fs::write(&temp_path, &content).await?;
    fs::rename(&temp_path, path).await?;
    Ok(())
}

/// Execution engine keeping applied versions in JSON journals.
#[derive(Debug, Clone, Default)]
pub struct JournalEngine;

impl JournalEngine {
    pub fn new() -> Self {
        Self
    }

    fn journal_path(config: &MigrationConfig) -> PathBuf {
        config
            .connection()
            .journal_path(config.database_name(), config.collection_name())
    }

    /// Stamp unprefixed records whose version is registered for this unit
    /// with the unit prefix. Returns the number of adopted records.
    ///
    /// A legacy record is dropped instead when the unit already has a
    /// prefixed record for the same version.
    pub async fn adopt_legacy_records(&self, config: &MigrationConfig) -> Result<usize, EngineError> {
        let path = Self::journal_path(config);
        let mut journal = read_journal(&path).await?;
        let prefix = config.prefix();
        let registered: BTreeSet<Version> = config.registered_versions().into_iter().collect();
        let mut owned = journal.versions_for(prefix);

        let mut adopted = 0;
        let original_len = journal.records.len();
        let mut records = Vec::with_capacity(original_len);
        for mut record in journal.records.drain(..) {
            if record.prefix.is_none() && registered.contains(&record.version) {
                if !owned.insert(record.version.clone()) {
                    continue;
                }
                record.prefix = Some(prefix.to_string());
                adopted += 1;
            }
            records.push(record);
        }
        journal.records = records;

        if adopted > 0 || journal.records.len() != original_len {
            write_journal(&path, &mut journal).await?;
            info!(unit = prefix, adopted, "Adopted legacy version records");
        }
        Ok(adopted)
    }

    async fn run(
        &self,
        config: &MigrationConfig,
        journal: &mut VersionJournal,
        path: &Path,
        version: &Version,
        direction: MigrationDirection,
    ) -> Result<(), EngineError> {
        let prefix = config.prefix();
        let Some(migration) = config.migration(version) else {
            return Err(EngineError::UnknownVersion {
                unit: prefix.to_string(),
                version: version.clone(),
            });
        };

        let marker = match direction {
            MigrationDirection::Up => "++ migrating",
            MigrationDirection::Down => "-- reverting",
        };
        config.output().write(&format!(
            "  {marker} {} ({version})",
            format_version(version)
        ));

        let result = match direction {
            MigrationDirection::Up => migration.up(config).await,
            MigrationDirection::Down => migration.down(config).await,
        };

        if let Err(e) = result {
            error!(unit = prefix, version = %version, error = %e, "Migration failed");
            return Err(EngineError::MigrationFailed {
                unit: prefix.to_string(),
                version: version.clone(),
                reason: format!("{e:#}"),
            });
        }

        match direction {
            MigrationDirection::Up => journal.record(prefix, version),
            MigrationDirection::Down => journal.remove(prefix, version),
        }
        write_journal(path, journal).await
    }
}

#[async_trait]
impl ExecutionEngine for JournalEngine {
    async fn migrate(
        &self,
        config: &MigrationConfig,
        target: &VersionTarget,
    ) -> Result<MigrationResult, EngineError> {
        let prefix = config.prefix();
        let path = Self::journal_path(config);
        let mut journal = read_journal(&path).await?;
        let migrated = journal.versions_for(prefix);
        let registered = config.registered_versions();

        let target_version = match target {
            VersionTarget::Latest => config.latest_version().cloned(),
            VersionTarget::Specific(version) => {
                if !registered.contains(version) {
                    return Err(EngineError::UnknownVersion {
                        unit: prefix.to_string(),
                        version: version.clone(),
                    });
                }
                Some(version.clone())
            }
        };
        let from_version = migrated.iter().next_back().cloned();

        let Some(to) = target_version else {
            config.output().write("No migrations to execute.");
            return Ok(MigrationResult {
                unit: prefix.to_string(),
                from_version: from_version.clone(),
                to_version: from_version,
                migrations_applied: Vec::new(),
            });
        };

        let mut plan: Vec<(Version, MigrationDirection)> = registered
            .iter()
            .rev()
            .filter(|v| *v > &to && migrated.contains(*v))
            .map(|v| (v.clone(), MigrationDirection::Down))
            .collect();
        plan.extend(
            registered
                .iter()
                .filter(|v| *v <= &to && !migrated.contains(*v))
                .map(|v| (v.clone(), MigrationDirection::Up)),
        );

        info!(unit = prefix, to = %to, count = plan.len(), "Starting migration");

        if plan.is_empty() {
            config.output().write("No migrations to execute.");
        }

        for (version, direction) in &plan {
            self.run(config, &mut journal, &path, version, *direction).await?;
        }

        info!(unit = prefix, to = %to, count = plan.len(), "Migration completed successfully");

        Ok(MigrationResult {
            unit: prefix.to_string(),
            from_version,
            to_version: Some(to),
            migrations_applied: plan,
        })
    }

    async fn migrated_versions(&self, config: &MigrationConfig) -> Result<BTreeSet<Version>, EngineError> {
        let journal = read_journal(&Self::journal_path(config)).await?;
        Ok(journal.versions_for(config.prefix()))
    }
}
