//! Execution engine collaborator and the sinks it writes to.
//!
//! The orchestrator never applies a migration itself; it hands each
//! configured unit to an [`ExecutionEngine`]. [`JournalEngine`] is the
//! file-backed engine used by the command line tool.

mod journal;
mod output;
mod types;

pub use journal::{
    read_journal, write_journal, JournalEngine, StoreConnection, VersionJournal, VersionRecord,
};
pub use output::{BufferedOutput, ConsoleOutput, OutputWriter};
pub use types::{EngineError, MigrationDirection, MigrationResult};

use crate::migration::MigrationConfig;
use crate::version::{Version, VersionTarget};
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Applies migrations of one configured unit and reports what is applied.
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    /// Migrate the unit up or down to `target`.
    async fn migrate(
        &self,
        config: &MigrationConfig,
        target: &VersionTarget,
    ) -> Result<MigrationResult, EngineError>;

    /// Versions recorded as applied for the unit's prefix.
    async fn migrated_versions(&self, config: &MigrationConfig) -> Result<BTreeSet<Version>, EngineError>;

    /// Versions the engine can run for the unit, ascending.
    fn available_versions(&self, config: &MigrationConfig) -> Vec<Version> {
        config.registered_versions()
    }
}
