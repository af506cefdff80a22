//! Applying resolved parameters to a built configuration.

use super::config::{MigrationConfig, ResolvedParams};
use super::discovery::{discover_migration_files, MigrationLoader};
use super::types::{MigrationError, SharedContext};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

/// Apply `params` to `config`, discover its migrations and hand the shared
/// context to every context-aware migration.
///
/// The migrations directory is created (with parents) when missing.
pub async fn configure(
    config: &mut MigrationConfig,
    params: ResolvedParams,
    loader: &dyn MigrationLoader,
    context: &Arc<SharedContext>,
) -> Result<(), MigrationError> {
    let unit = params.prefix.clone();

    if !params.directory.is_dir() {
        fs::create_dir_all(&params.directory)
            .await
            .map_err(|source| MigrationError::DirectoryCreate {
                unit: unit.clone(),
                path: params.directory.clone(),
                source,
            })?;
        info!(unit = %unit, dir = %params.directory.display(), "Created migrations directory");
    }

    let directory = params.directory.clone();
    let namespace = params.namespace.clone();
    config.apply(params)?;

    let files = discover_migration_files(&unit, &directory)?;
    let migrations = files
        .iter()
        .map(|file| loader.load(file, &namespace))
        .collect::<Result<Vec<_>, _>>()?;
    config.register_migrations(migrations);

    let mut accepted = 0;
    for migration in config.migrations_mut() {
        if migration.set_context(context) {
            accepted += 1;
        }
    }

    debug!(
        unit = %unit,
        registered = config.migrations().len(),
        context_aware = accepted,
        "Configured migrations"
    );
    Ok(())
}
