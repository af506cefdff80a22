//! Types shared by execution engines.

use crate::version::Version;
use std::path::PathBuf;
use thiserror::Error;

/// Error types for execution engine operations.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Corrupt version journal {}: {}", .0.display(), .1)]
    CorruptJournal(PathBuf, String),

    #[error("Unknown version {version} for {unit}")]
    UnknownVersion { unit: String, version: Version },

    #[error("Migration {version} of {unit} failed: {reason}")]
    MigrationFailed {
        unit: String,
        version: Version,
        reason: String,
    },
}

/// Direction a single migration was run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationDirection {
    Up,
    Down,
}

/// Result of migrating one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationResult {
    /// Prefix of the unit that was migrated.
    pub unit: String,
    /// Highest applied version before the run.
    pub from_version: Option<Version>,
    /// Version the unit ended at.
    pub to_version: Option<Version>,
    /// Migrations that were run, in order.
    pub migrations_applied: Vec<(Version, MigrationDirection)>,
}
