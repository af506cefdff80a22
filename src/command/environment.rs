//! Collaborators shared by the commands of one run.

use crate::config::Settings;
use crate::engine::{OutputWriter, StoreConnection};
use crate::migration::{
    configure, ConfigurationBuilder, ConfigurationResolver, MigrationConfig, MigrationError,
    MigrationLoader, ResolvedParams, ScriptLoader, SharedContext,
};
use std::sync::Arc;

/// Everything needed to turn an alias into a configured [`MigrationConfig`].
#[derive(Clone)]
pub struct MigrationEnvironment {
    resolver: ConfigurationResolver,
    loader: Arc<dyn MigrationLoader>,
    context: Arc<SharedContext>,
    connection: Arc<StoreConnection>,
    output: Arc<dyn OutputWriter>,
}

impl MigrationEnvironment {
    pub fn new(
        resolver: ConfigurationResolver,
        loader: Arc<dyn MigrationLoader>,
        context: Arc<SharedContext>,
        connection: Arc<StoreConnection>,
        output: Arc<dyn OutputWriter>,
    ) -> Self {
        Self {
            resolver,
            loader,
            context,
            connection,
            output,
        }
    }

    /// Environment using script migrations and the settings' journal store.
    pub fn from_settings(settings: &Settings, output: Arc<dyn OutputWriter>) -> Self {
        Self::new(
            ConfigurationResolver::from_settings(settings),
            Arc::new(ScriptLoader),
            Arc::new(SharedContext::new(settings.parameters.clone())),
            Arc::new(StoreConnection::new(settings.store_path.clone())),
            output,
        )
    }

    pub fn resolver(&self) -> &ConfigurationResolver {
        &self.resolver
    }

    pub fn output(&self) -> &dyn OutputWriter {
        self.output.as_ref()
    }

    /// Build and configure a config from already resolved parameters.
    pub async fn configure_params(&self, params: ResolvedParams) -> Result<MigrationConfig, MigrationError> {
        let mut config = ConfigurationBuilder::create()
            .connection(Arc::clone(&self.connection))
            .output(Arc::clone(&self.output))
            .build()?;
        configure(&mut config, params, self.loader.as_ref(), &self.context).await?;
        Ok(config)
    }

    /// Resolve, build and configure the unit named by `alias` (main unit on `None`).
    pub async fn configuration_for(&self, alias: Option<&str>) -> Result<MigrationConfig, MigrationError> {
        let params = self.resolver.resolve(alias)?;
        self.configure_params(params).await
    }

    /// Describe the configuration a command is about to work on.
    pub fn output_header(&self, config: &MigrationConfig) {
        let lines = [
            String::new(),
            " == Configuration".to_string(),
            String::new(),
            format!("    >> Name:                     {}", config.name()),
            format!("    >> Prefix:                   {}", config.prefix()),
            format!("    >> Database Name:            {}", config.database_name()),
            format!("    >> Version Collection Name:  {}", config.collection_name()),
            format!("    >> Migrations Namespace:     {}", config.namespace()),
            format!("    >> Migrations Directory:     {}", config.directory().display()),
            String::new(),
        ];
        for line in &lines {
            self.output.write(line);
        }
    }
}
