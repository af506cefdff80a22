//! Commands exposed by the command line tool.
//!
//! - [`MigrateCommand`] migrates the main unit and any selected bundles
//! - [`StatusCommand`] reports on one unit
//! - [`BcFixCommand`] adopts unprefixed version records for one unit

mod bc_fix;
mod confirm;
mod environment;
mod migrate;
mod selection;
mod status;

pub use bc_fix::BcFixCommand;
pub use confirm::{Confirmer, ScriptedConfirmer, StdinConfirmer};
pub use environment::MigrationEnvironment;
pub use migrate::{DriftPolicy, MigrateCommand, MigrateRequest, RunOutcome, RunState};
pub use selection::Selection;
pub use status::{StatusCommand, StatusReport};
