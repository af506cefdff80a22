//! Per-unit migration configuration.
//!
//! # Overview
//!
//! - [`ConfigurationResolver`] turns a unit alias into [`ResolvedParams`]
//! - [`ConfigurationBuilder`] binds a fresh [`MigrationConfig`] to a store
//!   connection and an output sink
//! - [`configure`] applies the parameters, creates the migrations directory
//!   when needed, discovers `Version<id>.<ext>` files and hands the shared
//!   context to context-aware migrations
//!
//! # Usage
//!
//! ```ignore
//! let params = resolver.resolve(Some("blog"))?;
//! let mut config = ConfigurationBuilder::create()
//!     .connection(connection)
//!     .output(output)
//!     .build()?;
//! configure(&mut config, params, &ScriptLoader, &context).await?;
//! ```

mod builder;
mod config;
mod configure;
mod discovery;
mod resolver;
mod types;

pub use builder::ConfigurationBuilder;
pub use config::{executed_unavailable, MigrationConfig, ResolvedParams};
pub use configure::configure;
pub use discovery::{
    discover_migration_files, DiscoveredFile, MigrationLoader, ScriptLoader, ScriptMigration,
};
pub use resolver::{ConfigurationResolver, MainUnitSettings};
pub use types::{
    ContextAwareMigration, DefinedMigration, Migration, MigrationError, SharedContext,
};
