pub mod command;
pub mod config;
pub mod engine;
pub mod migration;
pub mod registry;
pub mod utils;
pub mod version;

// Re-export commonly used types
pub use command::{
    BcFixCommand, Confirmer, DriftPolicy, MigrateCommand, MigrateRequest, MigrationEnvironment,
    RunOutcome, RunState, ScriptedConfirmer, Selection, StatusCommand, StatusReport,
    StdinConfirmer,
};
pub use config::{read_settings, BundleSettings, HostSettings, Settings, SettingsError};
pub use engine::{
    read_journal, BufferedOutput, ConsoleOutput, EngineError, ExecutionEngine, JournalEngine, MigrationDirection,
    MigrationResult, OutputWriter, StoreConnection,
};
pub use migration::{
    configure, ConfigurationBuilder, ConfigurationResolver, ContextAwareMigration,
    DefinedMigration, MainUnitSettings, Migration, MigrationConfig, MigrationError,
    MigrationLoader, ResolvedParams, ScriptLoader, SharedContext,
};
pub use registry::{HostModules, HostUnit, StaticHostModules, UnitRegistry, UnitRegistryEntry};
pub use version::{format_version, Version, VersionError, VersionTarget};
