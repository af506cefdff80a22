mod common;

use bundle_migrations::{
    read_journal, DriftPolicy, MigrateCommand, MigrateRequest, MigrationError, RunState,
    ScriptedConfirmer, Selection, VersionTarget,
};
use common::{create_fixture, seed_journal, version, write_versions, RecordingEngine};
use std::sync::Arc;

fn request(selection: Selection, interactive: bool) -> MigrateRequest {
    MigrateRequest {
        target: VersionTarget::Latest,
        selection,
        interactive,
        drift_policy: DriftPolicy::Confirm,
    }
}

#[tokio::test]
async fn test_execution_order_is_main_then_input_order() {
    let fixture = create_fixture(&["alpha", "beta"], &["alpha", "beta"]);
    write_versions(&fixture.main_dir(), &["1"]);
    write_versions(&fixture.bundle_dir("alpha"), &["1"]);
    write_versions(&fixture.bundle_dir("beta"), &["1"]);

    let engine = Arc::new(RecordingEngine::new());
    let command = MigrateCommand::new(
        fixture.environment(),
        engine.clone(),
        Arc::new(ScriptedConfirmer::default()),
    );

    let selection = Selection::Explicit(vec!["beta".to_string(), "alpha".to_string()]);
    let outcome = command.execute(request(selection, false)).await.unwrap();

    assert_eq!(outcome.state, RunState::Done);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(engine.calls(), vec!["app", "beta", "alpha"]);
    assert_eq!(outcome.results.len(), 3);
}

#[tokio::test]
async fn test_all_registered_skips_unloaded_bundles() {
    let fixture = create_fixture(&["alpha", "beta", "ghost"], &["beta", "alpha", "other"]);

    let engine = Arc::new(RecordingEngine::new());
    let command = MigrateCommand::new(
        fixture.environment(),
        engine.clone(),
        Arc::new(ScriptedConfirmer::default()),
    );

    let outcome = command
        .execute(request(Selection::AllRegistered, false))
        .await
        .unwrap();
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(engine.calls(), vec!["app", "beta", "alpha"]);
}

#[tokio::test]
async fn test_conflicting_selection_flags_fail() {
    let result = Selection::from_flags(true, vec!["alpha".to_string()]);
    assert!(matches!(result, Err(MigrationError::InvalidSelection)));

    let result = Selection::from_flags(true, vec!["not-registered".to_string()]);
    assert!(matches!(result, Err(MigrationError::InvalidSelection)));
}

#[tokio::test]
async fn test_unknown_alias_halts_before_any_side_effect() {
    let fixture = create_fixture(&["alpha"], &["alpha"]);
    let engine = Arc::new(RecordingEngine::new());
    let command = MigrateCommand::new(
        fixture.environment(),
        engine.clone(),
        Arc::new(ScriptedConfirmer::default()),
    );

    let selection = Selection::Explicit(vec!["alpha".to_string(), "forum".to_string()]);
    let result = command.execute(request(selection, false)).await;

    assert!(matches!(result, Err(MigrationError::UnknownAlias(a)) if a == "forum"));
    assert!(engine.calls().is_empty());
    assert!(!fixture.main_dir().exists());
    assert!(!fixture.bundle_dir("alpha").exists());
}

#[tokio::test]
async fn test_alias_colliding_with_main_prefix() {
    let fixture = create_fixture(&["app"], &["app"]);
    let command = MigrateCommand::new(
        fixture.environment(),
        Arc::new(RecordingEngine::new()),
        Arc::new(ScriptedConfirmer::default()),
    );

    let result = command
        .execute(request(Selection::Explicit(vec!["app".to_string()]), false))
        .await;
    assert!(matches!(result, Err(MigrationError::PrefixCollision(p)) if p == "app"));
}

#[tokio::test]
async fn test_duplicate_alias_runs_once() {
    let fixture = create_fixture(&["alpha"], &["alpha"]);
    let engine = Arc::new(RecordingEngine::new());
    let command = MigrateCommand::new(
        fixture.environment(),
        engine.clone(),
        Arc::new(ScriptedConfirmer::default()),
    );

    let selection = Selection::Explicit(vec!["alpha".to_string(), "alpha".to_string()]);
    command.execute(request(selection, false)).await.unwrap();
    assert_eq!(engine.calls(), vec!["app", "alpha"]);
}

#[tokio::test]
async fn test_declining_initial_prompt_runs_nothing() {
    let fixture = create_fixture(&["alpha"], &["alpha"]);
    write_versions(&fixture.main_dir(), &["1"]);

    let engine = Arc::new(RecordingEngine::new());
    let confirmer = Arc::new(ScriptedConfirmer::new([false]));
    let command = MigrateCommand::new(fixture.environment(), engine.clone(), confirmer.clone());

    let outcome = command
        .execute(request(Selection::Explicit(vec!["alpha".to_string()]), true))
        .await
        .unwrap();

    assert_eq!(outcome.state, RunState::Aborted);
    assert_eq!(outcome.exit_code(), 1);
    assert!(engine.calls().is_empty());
    assert_eq!(confirmer.questions().len(), 1);
    assert!(confirmer.questions()[0].contains("data lost"));
    assert!(fixture.output.contains("Migration cancelled!"));
}

#[tokio::test]
async fn test_no_drift_means_no_drift_prompt() {
    let fixture = create_fixture(&[], &[]);
    write_versions(&fixture.main_dir(), &["2", "3"]);
    seed_journal(&fixture.journal_path(), &[(Some("app"), "2"), (Some("app"), "3")]).await;

    let confirmer = Arc::new(ScriptedConfirmer::new([true]));
    let command = MigrateCommand::new(
        fixture.environment(),
        Arc::new(RecordingEngine::new()),
        confirmer.clone(),
    );

    let outcome = command.execute(request(Selection::MainOnly, true)).await.unwrap();
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(confirmer.questions().len(), 1);
    assert!(!fixture.output.contains("not registered migrations"));
}

#[tokio::test]
async fn test_drift_is_reported_and_confirmed() {
    let fixture = create_fixture(&[], &[]);
    write_versions(&fixture.main_dir(), &["2", "3", "4"]);
    seed_journal(
        &fixture.journal_path(),
        &[(Some("app"), "1"), (Some("app"), "2"), (Some("app"), "3")],
    )
    .await;

    let confirmer = Arc::new(ScriptedConfirmer::new([true, true]));
    let command = MigrateCommand::new(
        fixture.environment(),
        Arc::new(RecordingEngine::new()),
        confirmer.clone(),
    );

    let outcome = command.execute(request(Selection::MainOnly, true)).await.unwrap();
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(confirmer.questions().len(), 2);
    assert!(fixture
        .output
        .contains("You have 1 previously executed migrations in the database that are not registered migrations."));
    assert!(fixture.output.contains(">> 1 (1)"));

    let journal = read_journal(&fixture.journal_path()).await.unwrap();
    assert!(journal.versions_for("app").contains(&version("4")));
}

#[tokio::test]
async fn test_declining_drift_keeps_earlier_units_and_stops() {
    let fixture = create_fixture(&["alpha"], &["alpha"]);
    write_versions(&fixture.main_dir(), &["1", "2"]);
    write_versions(&fixture.bundle_dir("alpha"), &["5"]);
    // alpha recorded a version that no longer exists on disk
    seed_journal(&fixture.journal_path(), &[(Some("alpha"), "4")]).await;

    let engine = Arc::new(RecordingEngine::new());
    let confirmer = Arc::new(ScriptedConfirmer::new([true, false]));
    let command = MigrateCommand::new(fixture.environment(), engine.clone(), confirmer);

    let outcome = command
        .execute(request(Selection::Explicit(vec!["alpha".to_string()]), true))
        .await
        .unwrap();

    assert_eq!(outcome.state, RunState::Aborted);
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(engine.calls(), vec!["app"]);
    assert_eq!(outcome.results.len(), 1);

    let journal = read_journal(&fixture.journal_path()).await.unwrap();
    assert_eq!(journal.versions_for("app").len(), 2);
    assert!(!journal.versions_for("alpha").contains(&version("5")));
}

#[tokio::test]
async fn test_non_interactive_drift_is_implicitly_accepted() {
    let fixture = create_fixture(&[], &[]);
    write_versions(&fixture.main_dir(), &["2"]);
    seed_journal(&fixture.journal_path(), &[(Some("app"), "1")]).await;

    let engine = Arc::new(RecordingEngine::new());
    let command = MigrateCommand::new(
        fixture.environment(),
        engine.clone(),
        Arc::new(ScriptedConfirmer::default()),
    );

    let outcome = command.execute(request(Selection::MainOnly, false)).await.unwrap();
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(engine.calls(), vec!["app"]);
}

#[tokio::test]
async fn test_strict_drift_fails_non_interactive_run() {
    let fixture = create_fixture(&[], &[]);
    write_versions(&fixture.main_dir(), &["2"]);
    seed_journal(&fixture.journal_path(), &[(Some("app"), "1")]).await;

    let engine = Arc::new(RecordingEngine::new());
    let command = MigrateCommand::new(
        fixture.environment(),
        engine.clone(),
        Arc::new(ScriptedConfirmer::default()),
    );

    let mut strict = request(Selection::MainOnly, false);
    strict.drift_policy = DriftPolicy::Strict;
    let result = command.execute(strict).await;

    assert!(matches!(
        result,
        Err(MigrationError::DriftDetected { unit, count: 1 }) if unit == "app"
    ));
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn test_engine_failure_halts_remaining_units() {
    let fixture = create_fixture(&["alpha", "beta"], &["alpha", "beta"]);
    write_versions(&fixture.main_dir(), &["1"]);

    let engine = Arc::new(RecordingEngine::failing_for("alpha"));
    let command = MigrateCommand::new(
        fixture.environment(),
        engine.clone(),
        Arc::new(ScriptedConfirmer::default()),
    );

    let selection = Selection::Explicit(vec!["alpha".to_string(), "beta".to_string()]);
    let result = command.execute(request(selection, false)).await;

    assert!(matches!(result, Err(MigrationError::Engine(_))));
    assert_eq!(engine.calls(), vec!["app", "alpha"]);

    let journal = read_journal(&fixture.journal_path()).await.unwrap();
    assert!(journal.versions_for("app").contains(&version("1")));
}
