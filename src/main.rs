use bundle_migrations::utils::SETTINGS_FILE;
use bundle_migrations::{
    read_settings, BcFixCommand, Confirmer, ConsoleOutput, DriftPolicy, JournalEngine,
    MigrateCommand, MigrateRequest, MigrationEnvironment, ScriptedConfirmer, Selection,
    StatusCommand, StdinConfirmer, VersionTarget,
};
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Bundle Migrations - migrate an application and its bundles
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the settings file
    #[arg(short, long, env = "BUNDLE_MIGRATIONS_CONFIG", default_value = SETTINGS_FILE)]
    config: PathBuf,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute migrations of the main unit and selected bundles
    Migrate {
        /// Version to migrate to (latest when omitted)
        version: Option<String>,

        /// Alias of a bundle whose migrations should be applied (repeatable)
        #[arg(long = "include-bundle", value_name = "ALIAS")]
        include_bundle: Vec<String>,

        /// Apply migrations of every registered, loaded bundle
        #[arg(long = "include-bundles")]
        include_bundles: bool,

        /// Never prompt; answers every confirmation with yes
        #[arg(short = 'n', long = "no-interaction")]
        no_interaction: bool,

        /// Fail instead of continuing when drift is found without prompting
        #[arg(long)]
        strict_drift: bool,
    },
    /// Show the migration status of one unit
    Status {
        /// Bundle alias (main unit when omitted)
        #[arg(long)]
        bundle: Option<String>,
    },
    /// Stamp legacy, unprefixed version records with the unit prefix
    BcFix {
        /// Bundle alias (main unit when omitted)
        #[arg(long)]
        bundle: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(args: Args) -> anyhow::Result<u8> {
    let engine = Arc::new(JournalEngine::new());

    match args.command {
        Command::Migrate {
            version,
            include_bundle,
            include_bundles,
            no_interaction,
            strict_drift,
        } => {
            let request = MigrateRequest {
                target: VersionTarget::from_arg(version.as_deref())?,
                selection: Selection::from_flags(include_bundles, include_bundle)?,
                interactive: !no_interaction && std::io::stdin().is_terminal(),
                drift_policy: if strict_drift {
                    DriftPolicy::Strict
                } else {
                    DriftPolicy::Confirm
                },
            };
            let confirmer: Arc<dyn Confirmer> = if request.interactive {
                Arc::new(StdinConfirmer)
            } else {
                Arc::new(ScriptedConfirmer::default())
            };
            let environment = load_environment(&args.config).await?;

            let outcome = MigrateCommand::new(environment, engine, confirmer)
                .execute(request)
                .await?;
            Ok(outcome.exit_code())
        }
        Command::Status { bundle } => {
            StatusCommand::new(load_environment(&args.config).await?, engine)
                .execute(bundle.as_deref())
                .await?;
            Ok(0)
        }
        Command::BcFix { bundle } => {
            BcFixCommand::new(load_environment(&args.config).await?, engine)
                .execute(bundle.as_deref())
                .await?;
            Ok(0)
        }
    }
}

/// Read the settings file only once command-line flags have been validated.
async fn load_environment(config: &Path) -> anyhow::Result<MigrationEnvironment> {
    let settings = read_settings(config).await?;
    Ok(MigrationEnvironment::from_settings(
        &settings,
        Arc::new(ConsoleOutput),
    ))
}
