//! Builder binding a configuration to a store connection and output sink.

use super::config::MigrationConfig;
use super::types::MigrationError;
use crate::engine::{OutputWriter, StoreConnection};
use std::sync::Arc;

/// Builds an unconfigured [`MigrationConfig`].
///
/// The builder is consumed by [`build`](Self::build); use one per unit.
#[derive(Default)]
pub struct ConfigurationBuilder {
    connection: Option<Arc<StoreConnection>>,
    output: Option<Arc<dyn OutputWriter>>,
}

impl ConfigurationBuilder {
    pub fn create() -> Self {
        Self::default()
    }

    pub fn connection(mut self, connection: Arc<StoreConnection>) -> Self {
        self.connection = Some(connection);
        self
    }

    pub fn output(mut self, output: Arc<dyn OutputWriter>) -> Self {
        self.output = Some(output);
        self
    }

    pub fn build(self) -> Result<MigrationConfig, MigrationError> {
        let connection = self
            .connection
            .ok_or(MigrationError::IncompleteBuilder("connection"))?;
        let output = self
            .output
            .ok_or(MigrationError::IncompleteBuilder("output writer"))?;
        Ok(MigrationConfig::new(connection, output))
    }
}
