//! Full stage cycles through a [`GameSession`]: countdown, play, stage
//! over, record write-back and restart.

use std::sync::Arc;
use std::time::Duration;

use mirrorplay::core::SharedTunables;
use mirrorplay::shared::{GameConfig, MirrorMode, StageSettings, UserProfile};
use mirrorplay::vision::{AnalysisOutcome, HitMask};
use mirrorplay::{EventBus, EventReceiver, GameSession, MemoryProfileStore, StagePhase, UiEvent};

const TICK: Duration = Duration::from_millis(16);

fn session(store: MemoryProfileStore) -> (GameSession, EventReceiver) {
    let (tx, rx) = EventBus::create_pair(8192);
    let tunables = Arc::new(SharedTunables::new(MirrorMode::Full));
    let session = GameSession::new(
        GameConfig::default(),
        Box::new(store),
        tunables,
        tx,
        (1080.0, 1920.0),
        2024,
    )
    .unwrap();
    (session, rx)
}

/// Ticks until `phase` is reached, collecting events. Panics after `limit` ticks.
fn run_until(session: &mut GameSession, rx: &EventReceiver, phase: StagePhase, limit: usize) -> Vec<UiEvent> {
    let mut events = Vec::new();
    for _ in 0..limit {
        session.tick(TICK);
        events.extend(rx.drain());
        if session.orchestrator().phase() == phase {
            return events;
        }
    }
    panic!("never reached {phase:?}");
}

/// Plays the active phase, touching every visible target ball.
fn play_catching_targets(session: &mut GameSession, rx: &EventReceiver) -> Vec<UiEvent> {
    let target = session.orchestrator().target().unwrap();
    let mut events = Vec::new();
    for _ in 0..2000 {
        session.tick(TICK);
        let points: Vec<_> = session
            .engine()
            .balls()
            .iter()
            .filter(|b| !b.is_hit() && !b.is_mirror() && b.color() == target && b.position().y > 0.0)
            .map(|b| b.position())
            .collect();
        for p in points {
            session.pointer_down(p.x, p.y);
        }
        events.extend(rx.drain());
        if session.orchestrator().phase() != StagePhase::Active {
            return events;
        }
    }
    panic!("stage never ended");
}

#[test]
fn test_countdown_sequence_events() {
    let (mut session, rx) = session(MemoryProfileStore::default());
    // Initial settings announce the mirror mode.
    assert_eq!(rx.drain(), vec![UiEvent::MirrorModeChanged(MirrorMode::MirrorRight)]);

    session.start();
    let mut events = rx.drain();
    events.extend(run_until(&mut session, &rx, StagePhase::Active, 1000));

    let target = session.orchestrator().target().unwrap();
    assert_eq!(
        events,
        vec![
            UiEvent::SequencePhase(StagePhase::Countdown),
            UiEvent::GetReady,
            UiEvent::TargetAnnounced { color: target, prompt: target.target_prompt() },
            UiEvent::Countdown { value: 3 },
            UiEvent::Countdown { value: 2 },
            UiEvent::Countdown { value: 1 },
            UiEvent::Go,
            UiEvent::SequencePhase(StagePhase::Active),
        ]
    );
    assert!(session.engine().is_spawning());
}

#[test]
fn test_full_stage_updates_record_and_loops() {
    let store = MemoryProfileStore::default();
    let handle = store.clone();
    let (mut session, rx) = session(store);

    session.start();
    run_until(&mut session, &rx, StagePhase::Active, 1000);
    let events = play_catching_targets(&mut session, &rx);

    // Exactly ten stage ticks, then the end.
    let ticks: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            UiEvent::StageTick { seconds_remaining } => Some(*seconds_remaining),
            _ => None,
        })
        .collect();
    assert_eq!(ticks, (1..=10).rev().collect::<Vec<_>>());

    let successes = session.orchestrator().stats().successes;
    assert!(successes > 0);
    assert!(events.contains(&UiEvent::StageEnded { final_success_count: successes, new_record: true }));
    let success_events = events.iter().filter(|e| matches!(e, UiEvent::Success { .. })).count();
    assert_eq!(success_events as u32, successes);
    for event in &events {
        if let UiEvent::Success { cue, .. } = event {
            assert!(*cue < 4);
        }
    }

    assert_eq!(session.orchestrator().phase(), StagePhase::StageOver);
    assert!(session.engine().balls().is_empty());
    assert!(!session.engine().is_spawning());
    assert_eq!(handle.snapshot().record, successes);
    assert_eq!(handle.save_count(), 1);

    // Stage-over message runs four seconds, then the next countdown.
    let events = run_until(&mut session, &rx, StagePhase::Countdown, 400);
    assert!(events.contains(&UiEvent::GetReady));
    assert_eq!(session.orchestrator().stats().successes, 0);

    // A stage without catches does not touch the record.
    run_until(&mut session, &rx, StagePhase::Active, 1000);
    let events = run_until(&mut session, &rx, StagePhase::StageOver, 1000);
    assert!(events.contains(&UiEvent::StageEnded { final_success_count: 0, new_record: false }));
    assert_eq!(handle.save_count(), 1);
    assert_eq!(handle.snapshot().record, successes);
}

#[test]
fn test_restart_mid_stage_resets_everything() {
    let (mut session, rx) = session(MemoryProfileStore::default());
    session.start();
    run_until(&mut session, &rx, StagePhase::Active, 1000);
    for _ in 0..120 {
        session.tick(TICK);
    }
    assert!(!session.engine().balls().is_empty());

    session.restart();
    assert_eq!(session.orchestrator().phase(), StagePhase::Countdown);
    assert!(session.engine().balls().is_empty());
    assert!(session.engine().popups().is_empty());
    assert!(!session.engine().is_spawning());
    assert_eq!(session.orchestrator().stats().successes, 0);
    assert_eq!(session.orchestrator().stats().misses, 0);
    assert!(rx.drain().contains(&UiEvent::GetReady));
}

#[test]
fn test_non_target_catch_counts_as_miss() {
    let (mut session, rx) = session(MemoryProfileStore::default());
    session.start();
    run_until(&mut session, &rx, StagePhase::Active, 1000);
    let target = session.orchestrator().target().unwrap();

    let mut misses = 0;
    for _ in 0..600 {
        session.tick(TICK);
        let points: Vec<_> = session
            .engine()
            .balls()
            .iter()
            .filter(|b| !b.is_hit() && b.color() != target && b.position().y > 0.0)
            .map(|b| b.position())
            .collect();
        for p in points {
            misses += session.pointer_down(p.x, p.y).len();
        }
        if session.orchestrator().phase() != StagePhase::Active {
            break;
        }
    }
    assert!(misses > 0);
    let stats = session.orchestrator().stats();
    assert!(stats.misses > 0);
    assert!(rx.drain().iter().any(|e| matches!(e, UiEvent::Miss { .. })));
}

#[test]
fn test_shorter_duration_setting_ends_stage_early() {
    let mut profile = UserProfile::new("short");
    profile.settings.stage_duration_secs = 30;
    let (mut session, rx) = session(MemoryProfileStore::new(profile));
    session.start();
    run_until(&mut session, &rx, StagePhase::Active, 1000);
    for _ in 0..63 {
        session.tick(TICK);
    }

    session.apply_settings(StageSettings { stage_duration_secs: 2, ..StageSettings::default() });
    // 2 s at 16 ms per tick is 125 ticks.
    run_until(&mut session, &rx, StagePhase::StageOver, 130);
}

#[test]
fn test_failed_analysis_clears_mask() {
    let (mut session, _rx) = session(MemoryProfileStore::default());
    let mask = HitMask::from_flags(2, 2, &[true; 4]).unwrap();
    session.on_analysis(AnalysisOutcome { sequence: 1, timestamp: Duration::ZERO, mask: Some(mask) });
    assert!(session.engine().mask().is_some());
    session.on_analysis(AnalysisOutcome { sequence: 2, timestamp: Duration::ZERO, mask: None });
    assert!(session.engine().mask().is_none());
}

#[test]
fn test_auto_orientation_follows_silhouette() {
    let mut profile = UserProfile::new("auto");
    profile.settings.orientation = mirrorplay::shared::Orientation::Auto;
    let (mut session, rx) = session(MemoryProfileStore::new(profile));
    assert_eq!(session.tunables().mirror_mode(), MirrorMode::Full);

    // 40x20 mask, all 400 lit pixels in the left half.
    let flags: Vec<bool> = (0..800).map(|i| i % 40 < 20).collect();
    let mask = HitMask::from_flags(40, 20, &flags).unwrap();
    session.on_analysis(AnalysisOutcome { sequence: 1, timestamp: Duration::ZERO, mask: Some(mask) });

    // One analysis period at 16 ms per tick.
    for _ in 0..63 {
        session.tick(TICK);
    }
    assert_eq!(session.tunables().mirror_mode(), MirrorMode::MirrorLeft);
    assert!(rx.drain().contains(&UiEvent::MirrorModeChanged(MirrorMode::MirrorLeft)));
}
