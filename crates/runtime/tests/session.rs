use std::sync::Arc;

use demonbane_content::bundled_catalog;
use demonbane_core::{
    ActionSelection, ContentCatalog, EntityId, GameConfig, MetaProgressionState, RoomId,
    RunOutcome,
};
use demonbane_runtime::{
    AutoPilot, FileMetaRepository, InMemoryMetaRepository, MetaProgressionManager, MetaRepository,
    PatternAi, PlayerInput, RouteChoice, RuntimeError, ScriptedInput, Session, SessionEvent,
};

fn catalog() -> Arc<ContentCatalog> {
    Arc::new(bundled_catalog().expect("bundled content should load"))
}

fn session<I: PlayerInput>(repo: Arc<dyn MetaRepository>, input: I) -> Session<I> {
    let content = catalog();
    let manager = MetaProgressionManager::load(repo, content.clone(), GameConfig::default())
        .expect("manager should load");
    Session::new(manager, input, Arc::new(PatternAi::new(content)))
}

#[tokio::test]
async fn autopilot_runs_replay_identically() {
    let mut first = session(Arc::new(InMemoryMetaRepository::new()), AutoPilot::new());
    let mut second = session(Arc::new(InMemoryMetaRepository::new()), AutoPilot::new());

    let a = first.play_run(42, "crusader", 0).await.expect("run should finish");
    let b = second.play_run(42, "crusader", 0).await.expect("run should finish");

    assert_eq!(a, b);
    assert_ne!(a.outcome, RunOutcome::Abandoned);
    assert_eq!(first.manager().state(), second.manager().state());
}

#[tokio::test]
async fn meta_progression_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    let saved = {
        let repo = Arc::new(FileMetaRepository::new(dir.path()).unwrap());
        let mut session = session(repo, AutoPilot::new());
        let summaries = session.play_runs(7, 2, "crusader", 0).await.unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[1].seed, 8);
        session.manager().state().clone()
    };
    assert_eq!(saved.runs_finished, 2);

    let repo = Arc::new(FileMetaRepository::new(dir.path()).unwrap());
    let manager = MetaProgressionManager::load(repo, catalog(), GameConfig::default()).unwrap();
    assert_eq!(manager.state(), &saved);
}

#[tokio::test]
async fn rejected_routes_abandon_after_the_bound() {
    let repo = Arc::new(InMemoryMetaRepository::new());
    let mut input = ScriptedInput::new();
    for _ in 0..5 {
        input = input.route(RouteChoice::Enter(RoomId(u16::MAX)));
    }
    let mut session = session(repo.clone(), input).with_max_reprompts(3);

    let err = session.play_run(1, "crusader", 0).await.unwrap_err();
    assert!(matches!(err, RuntimeError::TooManyRejections { attempts: 4 }));
    assert_eq!(session.input().rejections(), 4);
    assert_eq!(repo.save_count(), 0);
    assert_eq!(session.manager().state(), &MetaProgressionState::default());
}

#[tokio::test]
async fn rejected_actions_are_reprompted() {
    let input = ScriptedInput::new()
        .action(ActionSelection::basic_attack(EntityId(999)))
        .with_fallback(AutoPilot::new());
    let mut session = session(Arc::new(InMemoryMetaRepository::new()), input);

    let summary = session.play_run(3, "crusader", 0).await.unwrap();
    assert_ne!(summary.outcome, RunOutcome::Abandoned);
    assert_eq!(session.input().rejections(), 1);
}

#[tokio::test]
async fn abandoned_run_changes_nothing() {
    let repo = Arc::new(InMemoryMetaRepository::new());
    let input = ScriptedInput::new().route(RouteChoice::Abandon);
    let mut session = session(repo.clone(), input);

    let summary = session.play_run(9, "crusader", 0).await.unwrap();
    assert_eq!(summary.outcome, RunOutcome::Abandoned);
    assert_eq!(repo.save_count(), 0);
    assert!(!repo.exists());
    assert_eq!(session.manager().state(), &MetaProgressionState::default());
}

#[tokio::test]
async fn rebirth_banks_the_run() {
    let repo = Arc::new(InMemoryMetaRepository::new());
    let input = ScriptedInput::new().route(RouteChoice::Rebirth);
    let mut session = session(repo.clone(), input);

    let summary = session.play_run(9, "crusader", 0).await.unwrap();
    assert_eq!(summary.outcome, RunOutcome::Rebirth);
    assert_eq!(repo.save_count(), 1);
    assert_eq!(session.manager().state().runs_finished, 1);
    assert_eq!(session.manager().state().history.len(), 1);
}

#[tokio::test]
async fn exhausted_script_closes_the_input() {
    let mut session = session(Arc::new(InMemoryMetaRepository::new()), ScriptedInput::new());
    let err = session.play_run(9, "crusader", 0).await.unwrap_err();
    assert!(matches!(err, RuntimeError::InputClosed));
}

#[tokio::test]
async fn locked_class_is_refused_before_the_run_starts() {
    let mut session = session(Arc::new(InMemoryMetaRepository::new()), AutoPilot::new());
    let err = session.play_run(9, "prophet", 0).await.unwrap_err();
    assert!(matches!(err, RuntimeError::ClassLocked { .. }));
}

#[tokio::test]
async fn preview_matches_the_first_layer_of_a_run() {
    let session = session(Arc::new(InMemoryMetaRepository::new()), AutoPilot::new());

    let preview = session.preview_layer(77, 1, 0).await.unwrap();
    let run = session.manager().begin_run(77, "crusader", 0).unwrap();

    assert_eq!(
        hex::encode(preview.digest()),
        hex::encode(run.layer().digest())
    );
}

#[tokio::test]
async fn events_trace_the_run_from_start_to_finish() {
    let mut session =
        session(Arc::new(InMemoryMetaRepository::new()), AutoPilot::new()).with_event_capacity(1 << 16);
    let mut events = session.subscribe();

    let summary = session.play_run(12, "crusader", 0).await.unwrap();

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }

    assert!(matches!(
        received.first(),
        Some(SessionEvent::RunStarted { seed: 12, heat: 0, .. })
    ));
    assert!(matches!(
        received.get(1),
        Some(SessionEvent::LayerEntered { index: 1, .. })
    ));
    assert!(received
        .iter()
        .any(|event| matches!(event, SessionEvent::BattleConcluded(_))));
    assert_eq!(received.last(), Some(&SessionEvent::RunFinished(summary)));
}
