//! Single-unit status report.

use super::environment::MigrationEnvironment;
use crate::engine::ExecutionEngine;
use crate::migration::{executed_unavailable, MigrationError};
use crate::version::{format_version, Version};
use std::sync::Arc;

/// Snapshot of one unit's migrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub name: String,
    pub prefix: String,
    pub database_name: String,
    pub collection_name: String,
    pub namespace: String,
    pub directory: String,
    pub current_version: Option<Version>,
    pub latest_version: Option<Version>,
    pub executed: usize,
    pub executed_unavailable: usize,
    pub available: usize,
    pub new: usize,
}

/// Reports the state of the main unit or of one bundle.
pub struct StatusCommand {
    environment: MigrationEnvironment,
    engine: Arc<dyn ExecutionEngine>,
}

impl StatusCommand {
    pub fn new(environment: MigrationEnvironment, engine: Arc<dyn ExecutionEngine>) -> Self {
        Self {
            environment,
            engine,
        }
    }

    pub async fn execute(&self, bundle: Option<&str>) -> Result<StatusReport, MigrationError> {
        let mut config = self.environment.configuration_for(bundle).await?;
        let migrated = config.migrated_versions(self.engine.as_ref()).await?;
        let available = self.engine.available_versions(&config);
        let unavailable = executed_unavailable(&migrated, &available);
        let new = available.iter().filter(|v| !migrated.contains(*v)).count();

        let report = StatusReport {
            name: config.name().to_string(),
            prefix: config.prefix().to_string(),
            database_name: config.database_name().to_string(),
            collection_name: config.collection_name().to_string(),
            namespace: config.namespace().to_string(),
            directory: config.directory().display().to_string(),
            current_version: migrated.iter().next_back().cloned(),
            latest_version: available.last().cloned(),
            executed: migrated.len(),
            executed_unavailable: unavailable.len(),
            available: available.len(),
            new,
        };
        self.write(&report);
        Ok(report)
    }

    fn write(&self, report: &StatusReport) {
        let describe = |version: &Option<Version>| match version {
            Some(v) => format!("{} ({v})", format_version(v)),
            None => "0".to_string(),
        };
        let lines = [
            String::new(),
            " == Configuration".to_string(),
            String::new(),
            format!("    >> Name:                        {}", report.name),
            format!("    >> Prefix:                      {}", report.prefix),
            format!("    >> Database Name:               {}", report.database_name),
            format!("    >> Version Collection Name:     {}", report.collection_name),
            format!("    >> Migrations Namespace:        {}", report.namespace),
            format!("    >> Migrations Directory:        {}", report.directory),
            format!("    >> Current Version:             {}", describe(&report.current_version)),
            format!("    >> Latest Version:              {}", describe(&report.latest_version)),
            format!("    >> Executed Migrations:         {}", report.executed),
            format!("    >> Executed Unavailable:        {}", report.executed_unavailable),
            format!("    >> Available Migrations:        {}", report.available),
            format!("    >> New Migrations:              {}", report.new),
        ];
        let output = self.environment.output();
        for line in &lines {
            output.write(line);
        }
    }
}
