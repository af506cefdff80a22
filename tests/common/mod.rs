#![allow(dead_code)]

use async_trait::async_trait;
use bundle_migrations::engine::{write_journal, VersionJournal, VersionRecord};
use bundle_migrations::{
    BufferedOutput, BundleSettings, EngineError, ExecutionEngine, HostSettings, JournalEngine,
    MigrationConfig, MigrationEnvironment, MigrationResult, Settings, StoreConnection, Version,
    VersionTarget,
};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// A temporary host application with a main unit and some bundles
pub struct Fixture {
    pub dir: TempDir,
    pub settings: Settings,
    pub output: Arc<BufferedOutput>,
}

impl Fixture {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn main_dir(&self) -> PathBuf {
        self.settings.dir_name.clone()
    }

    pub fn bundle_dir(&self, alias: &str) -> PathBuf {
        self.root()
            .join("modules")
            .join(alias)
            .join("Resources/migrations")
    }

    pub fn environment(&self) -> MigrationEnvironment {
        MigrationEnvironment::from_settings(&self.settings, self.output.clone())
    }

    pub fn connection(&self) -> StoreConnection {
        StoreConnection::new(self.settings.store_path.clone())
    }

    /// Journal shared by every unit of the fixture
    pub fn journal_path(&self) -> PathBuf {
        self.connection()
            .journal_path(&self.settings.database_name, &self.settings.collection_name)
    }
}

/// Create a fixture whose `loaded` bundles are also loaded by the host
pub fn create_fixture(registered: &[&str], loaded: &[&str]) -> Fixture {
    let dir = tempfile::tempdir().expect("Should create temp dir");
    let mut settings = Settings {
        dir_name: dir.path().join("app/migrations"),
        store_path: dir.path().join("store"),
        ..Settings::default()
    };

    for alias in registered {
        settings.bundles.push(BundleSettings {
            alias: alias.to_string(),
            namespace: "Migrations".to_string(),
            dir_name: PathBuf::from("Resources/migrations"),
            name: format!("{alias} migrations"),
        });
    }
    for alias in loaded {
        settings.hosts.push(HostSettings {
            alias: alias.to_string(),
            namespace: format!("Acme\\{alias}"),
            path: dir.path().join("modules").join(alias),
        });
    }

    Fixture {
        dir,
        settings,
        output: Arc::new(BufferedOutput::new()),
    }
}

/// Create `Version<id>.js` files in `dir`
pub fn write_versions(dir: &Path, versions: &[&str]) {
    std::fs::create_dir_all(dir).expect("Should create migrations dir");
    for version in versions {
        std::fs::write(dir.join(format!("Version{version}.js")), "// migration")
            .expect("Should write migration file");
    }
}

pub fn version(id: &str) -> Version {
    Version::parse(id).expect("Should be a valid version")
}

/// Pre-populate the journal with applied versions per prefix
pub async fn seed_journal(path: &Path, applied: &[(Option<&str>, &str)]) {
    let mut journal = VersionJournal::default();
    for (prefix, id) in applied {
        journal.records.push(VersionRecord {
            prefix: prefix.map(str::to_string),
            version: version(id),
            executed_at: "2014-08-22T18:57:42+00:00".to_string(),
        });
    }
    write_journal(path, &mut journal)
        .await
        .expect("Should write journal");
}

/// Journal engine that records which units it migrated
#[derive(Default)]
pub struct RecordingEngine {
    inner: JournalEngine,
    calls: Mutex<Vec<String>>,
    fail_for: Option<String>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(prefix: &str) -> Self {
        Self {
            fail_for: Some(prefix.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExecutionEngine for RecordingEngine {
    async fn migrate(
        &self,
        config: &MigrationConfig,
        target: &VersionTarget,
    ) -> Result<MigrationResult, EngineError> {
        self.calls.lock().unwrap().push(config.prefix().to_string());
        if self.fail_for.as_deref() == Some(config.prefix()) {
            return Err(EngineError::MigrationFailed {
                unit: config.prefix().to_string(),
                version: version("0"),
                reason: "boom".to_string(),
            });
        }
        self.inner.migrate(config, target).await
    }

    async fn migrated_versions(&self, config: &MigrationConfig) -> Result<BTreeSet<Version>, EngineError> {
        self.inner.migrated_versions(config).await
    }
}
