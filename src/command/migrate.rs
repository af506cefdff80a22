//! The migrate command: selection, resolution, confirmation and execution
//! across the main unit and any selected bundles.
//!
//! A run moves through [`RunState`]s in order:
//!
//! ```text
//! Selecting -> Resolving -> Confirming -> Executing -> Done
//!                               |   ^          |
//!                               |   +----------+   (one round per unit)
//!                               v
//!                            Aborted
//! ```
//!
//! Units are processed one after another, main unit first. Nothing already
//! applied is rolled back when a later unit is declined or fails.

use super::confirm::Confirmer;
use super::environment::MigrationEnvironment;
use super::selection::Selection;
use crate::engine::{ExecutionEngine, MigrationResult};
use crate::migration::{MigrationConfig, MigrationError};
use crate::utils::MAIN_PREFIX;
use crate::version::{format_version, VersionTarget};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

const DATA_LOSS_QUESTION: &str = "WARNING! You are about to execute a database migration that could result in data lost. Are you sure you wish to continue? (y/[n])";
const DRIFT_QUESTION: &str = "Are you sure you wish to continue? (y/[n])";
const CANCELLED: &str = "Migration cancelled!";

/// How drift is handled when nobody can be asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriftPolicy {
    /// Report drift and continue (implicit accept when non-interactive).
    #[default]
    Confirm,
    /// Fail a non-interactive run with [`MigrationError::DriftDetected`].
    Strict,
}

/// Stage of a migrate run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Selecting,
    Resolving,
    Confirming,
    Executing,
    Done,
    Aborted,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Selecting => "selecting",
            Self::Resolving => "resolving",
            Self::Confirming => "confirming",
            Self::Executing => "executing",
            Self::Done => "done",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Input of a migrate run.
#[derive(Debug, Clone, Default)]
pub struct MigrateRequest {
    pub target: VersionTarget,
    pub selection: Selection,
    pub interactive: bool,
    pub drift_policy: DriftPolicy,
}

/// How a run ended.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// `Done` or `Aborted`
    pub state: RunState,
    /// Results of the units that were executed, in order
    pub results: Vec<MigrationResult>,
}

impl RunOutcome {
    pub fn exit_code(&self) -> u8 {
        match self.state {
            RunState::Done => 0,
            _ => 1,
        }
    }
}

/// Orchestrates migrations of the main unit and selected bundles.
pub struct MigrateCommand {
    environment: MigrationEnvironment,
    engine: Arc<dyn ExecutionEngine>,
    confirmer: Arc<dyn Confirmer>,
}

impl MigrateCommand {
    pub fn new(
        environment: MigrationEnvironment,
        engine: Arc<dyn ExecutionEngine>,
        confirmer: Arc<dyn Confirmer>,
    ) -> Self {
        Self {
            environment,
            engine,
            confirmer,
        }
    }

    pub async fn execute(&self, request: MigrateRequest) -> Result<RunOutcome, MigrationError> {
        let mut state = RunState::Selecting;
        debug!(%state, selection = ?request.selection, "Migrate run started");
        let aliases = request.selection.aliases(self.environment.resolver());

        transition(&mut state, RunState::Resolving);
        let mut configs = self.resolve_units(&aliases).await?;

        transition(&mut state, RunState::Confirming);
        if request.interactive && !self.confirmer.confirm(DATA_LOSS_QUESTION) {
            return Ok(self.abort(&mut state, Vec::new()));
        }

        let mut results = Vec::with_capacity(configs.len());
        for config in configs.iter_mut() {
            transition(&mut state, RunState::Confirming);
            self.environment.output_header(config);

            if !self.confirm_drift(config, &request).await? {
                return Ok(self.abort(&mut state, results));
            }

            transition(&mut state, RunState::Executing);
            info!(unit = config.prefix(), target = %request.target, "Migrating unit");
            let result = self.engine.migrate(config, &request.target).await?;
            config.invalidate_migrated_versions();
            results.push(result);
        }

        transition(&mut state, RunState::Done);
        Ok(RunOutcome { state, results })
    }

    /// Resolve every unit before anything is configured, then configure them
    /// in order, main unit first.
    async fn resolve_units(&self, aliases: &[String]) -> Result<Vec<MigrationConfig>, MigrationError> {
        let resolver = self.environment.resolver();
        let mut params = Vec::with_capacity(aliases.len() + 1);
        params.push(resolver.resolve(None)?);
        for alias in aliases {
            params.push(resolver.resolve(Some(alias))?);
        }

        let mut prefixes = HashSet::from([MAIN_PREFIX.to_string()]);
        for unit in params.iter().skip(1) {
            if !prefixes.insert(unit.prefix.clone()) {
                return Err(MigrationError::PrefixCollision(unit.prefix.clone()));
            }
        }

        let mut configs = Vec::with_capacity(params.len());
        for unit in params {
            configs.push(self.environment.configure_params(unit).await?);
        }
        Ok(configs)
    }

    /// Report applied versions that are no longer registered. Returns
    /// whether the run may continue with this unit.
    async fn confirm_drift(
        &self,
        config: &mut MigrationConfig,
        request: &MigrateRequest,
    ) -> Result<bool, MigrationError> {
        let unavailable = config
            .executed_unavailable_versions(self.engine.as_ref())
            .await?;
        if unavailable.is_empty() {
            return Ok(true);
        }

        warn!(unit = config.prefix(), count = unavailable.len(), "Executed migrations are not registered");
        let output = self.environment.output();
        output.write(&format!(
            "WARNING! You have {} previously executed migrations in the database that are not registered migrations.",
            unavailable.len()
        ));
        for version in &unavailable {
            output.write(&format!("    >> {} ({version})", format_version(version)));
        }

        if request.interactive {
            return Ok(self.confirmer.confirm(DRIFT_QUESTION));
        }
        if request.drift_policy == DriftPolicy::Strict {
            return Err(MigrationError::DriftDetected {
                unit: config.prefix().to_string(),
                count: unavailable.len(),
            });
        }
        Ok(true)
    }

    fn abort(&self, state: &mut RunState, results: Vec<MigrationResult>) -> RunOutcome {
        self.environment.output().write(CANCELLED);
        transition(state, RunState::Aborted);
        RunOutcome {
            state: *state,
            results,
        }
    }
}

fn transition(state: &mut RunState, next: RunState) {
    debug!(from = %state, to = %next, "Migrate run state");
    *state = next;
}
