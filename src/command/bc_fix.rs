//! Adoption of version records written before prefixes existed.

use super::environment::MigrationEnvironment;
use crate::engine::JournalEngine;
use crate::migration::MigrationError;
use std::sync::Arc;

/// Stamps legacy, unprefixed journal records with the unit prefix.
pub struct BcFixCommand {
    environment: MigrationEnvironment,
    engine: Arc<JournalEngine>,
}

impl BcFixCommand {
    pub fn new(environment: MigrationEnvironment, engine: Arc<JournalEngine>) -> Self {
        Self {
            environment,
            engine,
        }
    }

    /// Returns the number of adopted records.
    pub async fn execute(&self, bundle: Option<&str>) -> Result<usize, MigrationError> {
        let config = self.environment.configuration_for(bundle).await?;
        self.environment.output_header(&config);

        let adopted = self.engine.adopt_legacy_records(&config).await?;
        self.environment.output().write(&format!(
            "Adopted {adopted} legacy version records for prefix {}.",
            config.prefix()
        ));
        Ok(adopted)
    }
}
