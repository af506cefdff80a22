//! Discovery of migration definitions in a unit's directory.
//!
//! A migration definition is any file named `Version<id>.<ext>` directly
//! inside the directory. How the file is turned into a runnable migration
//! is up to the [`MigrationLoader`].

use super::config::MigrationConfig;
use super::types::{DefinedMigration, Migration, MigrationError};
use crate::version::Version;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

static VERSION_FILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Version(\w+)\.[A-Za-z0-9]+$").expect("version file pattern should be valid")
});

/// A migration file found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    pub version: Version,
    pub path: PathBuf,
}

/// Scan `directory` for migration files, sorted by version.
///
/// Two files defining the same version is an error.
pub fn discover_migration_files(
    unit: &str,
    directory: &Path,
) -> Result<Vec<DiscoveredFile>, MigrationError> {
    let mut files: Vec<DiscoveredFile> = Vec::new();

    for entry in WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| MigrationError::DirectoryRead {
            unit: unit.to_string(),
            path: directory.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy();
        let Some(captures) = VERSION_FILE.captures(&file_name) else {
            continue;
        };
        let Ok(version) = Version::parse(&captures[1]) else {
            continue;
        };

        if let Some(existing) = files.iter().find(|f| f.version == version) {
            return Err(MigrationError::DuplicateVersion {
                unit: unit.to_string(),
                version,
                first: existing.path.clone(),
                second: entry.path().to_path_buf(),
            });
        }

        files.push(DiscoveredFile {
            version,
            path: entry.path().to_path_buf(),
        });
    }

    files.sort_by(|a, b| a.version.cmp(&b.version));
    debug!(unit, count = files.len(), dir = %directory.display(), "Discovered migration files");
    Ok(files)
}

/// Turns discovered files into migrations.
pub trait MigrationLoader: Send + Sync {
    fn load(&self, file: &DiscoveredFile, namespace: &str) -> Result<DefinedMigration, MigrationError>;
}

/// Default loader: every file becomes a [`ScriptMigration`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptLoader;

impl MigrationLoader for ScriptLoader {
    fn load(&self, file: &DiscoveredFile, namespace: &str) -> Result<DefinedMigration, MigrationError> {
        Ok(DefinedMigration::Contextless(Box::new(ScriptMigration::new(
            file.version.clone(),
            format!("{namespace}\\Version{}", file.version),
            file.path.clone(),
        ))))
    }
}

/// Migration whose body is an external script file.
///
/// Running it only checks that the script is still in place; the engine
/// owning the data store interprets the script itself.
#[derive(Debug, Clone)]
pub struct ScriptMigration {
    version: Version,
    description: String,
    path: PathBuf,
}

impl ScriptMigration {
    pub fn new(version: Version, description: String, path: PathBuf) -> Self {
        Self {
            version,
            description,
            path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_present(&self) -> anyhow::Result<()> {
        if tokio::fs::metadata(&self.path).await.is_err() {
            anyhow::bail!("migration script {} disappeared", self.path.display());
        }
        Ok(())
    }
}

#[async_trait]
impl Migration for ScriptMigration {
    fn version(&self) -> &Version {
        &self.version
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn up(&self, _config: &MigrationConfig) -> anyhow::Result<()> {
        self.ensure_present().await
    }

    async fn down(&self, _config: &MigrationConfig) -> anyhow::Result<()> {
        self.ensure_present().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_discover_sorted_and_filtered() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("Version20150101000000.rs"), "").unwrap();
        fs::write(temp_dir.path().join("Version20140822185742.rs"), "").unwrap();
        fs::write(temp_dir.path().join("README.md"), "").unwrap();
        fs::create_dir(temp_dir.path().join("Version1.d")).unwrap();

        let files = discover_migration_files("app", temp_dir.path()).unwrap();
        let versions: Vec<&str> = files.iter().map(|f| f.version.as_str()).collect();
        assert_eq!(versions, vec!["20140822185742", "20150101000000"]);
    }

    #[test]
    fn test_discover_duplicate_version() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("Version3.js"), "").unwrap();
        fs::write(temp_dir.path().join("Version3.rs"), "").unwrap();

        let result = discover_migration_files("blog", temp_dir.path());
        match result {
            Err(MigrationError::DuplicateVersion { unit, version, .. }) => {
                assert_eq!(unit, "blog");
                assert_eq!(version.as_str(), "3");
            }
            other => panic!("expected duplicate version error, got {other:?}"),
        }
    }

    #[test]
    fn test_discover_empty_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(discover_migration_files("app", temp_dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_discover_unreadable_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("gone");

        match discover_migration_files("blog", &missing) {
            Err(MigrationError::DirectoryRead { unit, path, .. }) => {
                assert_eq!(unit, "blog");
                assert_eq!(path, missing);
            }
            other => panic!("expected directory read error, got {other:?}"),
        }
    }

    #[test]
    fn test_script_loader_is_contextless() {
        let file = DiscoveredFile {
            version: Version::parse("7").unwrap(),
            path: PathBuf::from("/tmp/Version7.js"),
        };
        let migration = ScriptLoader.load(&file, "Acme\\Migrations").unwrap();
        assert!(!migration.accepts_context());
        assert_eq!(migration.description(), "Acme\\Migrations\\Version7");
    }
}
