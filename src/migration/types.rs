//! Types for the migration system.

use super::config::MigrationConfig;
use crate::engine::EngineError;
use crate::version::Version;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Error types for resolving and orchestrating migrations.
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Bundle with alias {0} has no registered migration configs")]
    UnknownAlias(String),

    #[error("Bundle with alias {0} is registered but not loaded by the host")]
    HostUnitNotFound(String),

    #[error("Options \"include-bundles\" and \"include-bundle\" cannot be specified simultaneously")]
    InvalidSelection,

    #[error("Failed to create migrations directory {} for {unit}: {source}", .path.display())]
    DirectoryCreate {
        unit: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read migrations directory {} for {unit}: {source}", .path.display())]
    DirectoryRead {
        unit: String,
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error(
        "Migration version {version} is defined more than once in {unit} ({} and {})",
        .first.display(),
        .second.display()
    )]
    DuplicateVersion {
        unit: String,
        version: Version,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("{count} previously executed migrations of {unit} are not registered migrations")]
    DriftDetected { unit: String, count: usize },

    #[error("Prefix {0} is used by more than one unit in this run")]
    PrefixCollision(String),

    #[error("Configuration for {0} has already been resolved")]
    AlreadyConfigured(String),

    #[error("Configuration builder is missing its {0}")]
    IncompleteBuilder(&'static str),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Parameters the host shares with context-aware migrations.
#[derive(Debug, Clone, Default)]
pub struct SharedContext {
    parameters: serde_json::Map<String, serde_json::Value>,
}

impl SharedContext {
    pub fn new(parameters: serde_json::Map<String, serde_json::Value>) -> Self {
        Self { parameters }
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.parameters.get(key)
    }

    pub fn parameters(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.parameters
    }
}

/// Trait for a single migration.
///
/// The body of a migration belongs to the host; this crate only discovers,
/// orders and hands migrations to the execution engine.
#[async_trait]
pub trait Migration: Send + Sync {
    /// Version this migration introduces.
    fn version(&self) -> &Version;

    /// Human-readable description of what this migration does.
    fn description(&self) -> &str;

    /// Apply the migration.
    async fn up(&self, config: &MigrationConfig) -> anyhow::Result<()>;

    /// Revert the migration.
    async fn down(&self, config: &MigrationConfig) -> anyhow::Result<()>;
}

/// A migration that needs the host's shared context.
pub trait ContextAwareMigration: Migration {
    fn set_context(&mut self, context: Arc<SharedContext>);
}

/// A discovered migration, tagged with whether it accepts shared context.
pub enum DefinedMigration {
    ContextAware(Box<dyn ContextAwareMigration>),
    Contextless(Box<dyn Migration>),
}

impl DefinedMigration {
    pub fn version(&self) -> &Version {
        match self {
            Self::ContextAware(m) => m.version(),
            Self::Contextless(m) => m.version(),
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::ContextAware(m) => m.description(),
            Self::Contextless(m) => m.description(),
        }
    }

    pub fn accepts_context(&self) -> bool {
        matches!(self, Self::ContextAware(_))
    }

    /// Hand the shared context over. Returns whether it was accepted.
    pub fn set_context(&mut self, context: &Arc<SharedContext>) -> bool {
        match self {
            Self::ContextAware(m) => {
                m.set_context(Arc::clone(context));
                true
            }
            Self::Contextless(_) => false,
        }
    }

    pub async fn up(&self, config: &MigrationConfig) -> anyhow::Result<()> {
        match self {
            Self::ContextAware(m) => m.up(config).await,
            Self::Contextless(m) => m.up(config).await,
        }
    }

    pub async fn down(&self, config: &MigrationConfig) -> anyhow::Result<()> {
        match self {
            Self::ContextAware(m) => m.down(config).await,
            Self::Contextless(m) => m.down(config).await,
        }
    }
}

impl std::fmt::Debug for DefinedMigration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefinedMigration")
            .field("version", self.version())
            .field("accepts_context", &self.accepts_context())
            .finish()
    }
}
