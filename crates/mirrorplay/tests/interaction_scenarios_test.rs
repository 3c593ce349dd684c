//! End-to-end checks of the interaction engine: physics, spawn placement,
//! mask thresholds, touches and pair groups.

use std::collections::HashSet;
use std::time::Duration;

use mirrorplay::gameplay::{InteractionEngine, SpawnLayout, SpawnPolicy, TapSource};
use mirrorplay::shared::{BallColor, DifficultyParams, GameConfig, MirrorMode, Vec2};
use mirrorplay::vision::{HitMask, SegmentationMask};

const TICK: Duration = Duration::from_millis(16);

fn fixed_speed(velocity: f32) -> DifficultyParams {
    DifficultyParams { min_velocity: velocity, max_velocity: velocity, spawn_interval_ms: 700 }
}

fn engine(view: (f32, f32), velocity: f32) -> InteractionEngine {
    InteractionEngine::new(&GameConfig::default(), fixed_speed(velocity), view, 99)
}

// =============================================================================
// Physics
// =============================================================================

#[test]
fn test_ball_is_purged_once_its_top_passes_the_view() {
    // Spawned at y = -40, falling 10 per tick: y - 40 > 1000 first holds at
    // y = 1050, i.e. on tick 109.
    let mut engine = engine((1080.0, 1000.0), 10.0);
    engine.spawn_now();
    assert_eq!(engine.balls()[0].position().y, -40.0);

    for tick in 1..=108 {
        let taps = engine.tick(TICK);
        assert!(taps.is_empty(), "tick {tick} produced a tap");
    }
    assert_eq!(engine.balls().len(), 1);
    assert_eq!(engine.balls()[0].position().y, 1040.0);
    assert_eq!(engine.balls()[0].top(), 1000.0);

    let taps = engine.tick(TICK);
    assert!(taps.is_empty());
    assert!(engine.balls().is_empty());
}

// =============================================================================
// Spawn placement
// =============================================================================

#[test]
fn test_mirror_left_offset_places_pair_around_center() {
    let mut engine = engine((1080.0, 1920.0), 10.0);
    engine.set_mirror_mode(MirrorMode::MirrorLeft);
    engine.set_target_offset(50.0);
    engine.spawn_now();

    let balls = engine.balls();
    assert_eq!(balls.len(), 2);
    let interactive = balls.iter().find(|b| !b.is_mirror()).unwrap();
    let twin = balls.iter().find(|b| b.is_mirror()).unwrap();
    assert_eq!(interactive.position().x, 490.0);
    assert_eq!(twin.position().x, 590.0);
    assert!(interactive.pair().is_some());
    assert_eq!(interactive.pair(), twin.pair());
    assert_eq!(interactive.color(), twin.color());
}

#[test]
fn test_target_color_frequency_floor() {
    let layout = SpawnLayout { view_width: 1080.0, mirror_mode: MirrorMode::Full, target_offset: 0.0 };
    for seed in 0..50 {
        for target in BallColor::ALL {
            let mut policy = SpawnPolicy::new(seed, fixed_speed(5.0), 40.0, 3);
            policy.set_target(target);
            let mut hits = 0u32;
            for n in 1..=120u32 {
                if policy.spawn(&layout).interactive.color() == target {
                    hits += 1;
                }
                assert!(hits >= n.div_ceil(3), "seed {seed} {target:?}: {hits} of {n}");
            }
        }
    }
}

#[test]
fn test_palette_draws_are_not_all_target() {
    let layout = SpawnLayout { view_width: 1080.0, mirror_mode: MirrorMode::Full, target_offset: 0.0 };
    let mut policy = SpawnPolicy::new(4, fixed_speed(5.0), 40.0, 3);
    policy.set_target(BallColor::Yellow);
    let colors: HashSet<BallColor> = (0..300).map(|_| policy.spawn(&layout).interactive.color()).collect();
    assert_eq!(colors.len(), BallColor::ALL.len());
}

// =============================================================================
// Mask threshold
// =============================================================================

/// 108x192 mask over a 1080x1920 view, uniform confidence.
fn uniform_mask(confidence: f32) -> HitMask {
    let (w, h) = (108u32, 192u32);
    let mask = SegmentationMask::new(w, h, vec![confidence; (w * h) as usize]).unwrap();
    HitMask::from_confidence(&mask, 0.99)
}

#[test]
fn test_mask_confidence_above_threshold_catches_ball() {
    let mut engine = engine((1080.0, 1920.0), 10.0);
    engine.spawn_now();
    engine.update_mask(Some(uniform_mask(0.995)));
    let taps = engine.tick(TICK);
    assert_eq!(taps.len(), 1);
    assert_eq!(taps[0].source, TapSource::Mask);
    assert!(engine.balls()[0].is_hit());
}

#[test]
fn test_mask_confidence_exactly_at_threshold_catches_ball() {
    let mut engine = engine((1080.0, 1920.0), 10.0);
    engine.spawn_now();
    engine.update_mask(Some(uniform_mask(0.99)));
    assert_eq!(engine.tick(TICK).len(), 1);
}

#[test]
fn test_mask_confidence_below_threshold_is_background() {
    let mut engine = engine((1080.0, 1920.0), 10.0);
    engine.spawn_now();
    engine.update_mask(Some(uniform_mask(0.989)));
    for _ in 0..50 {
        assert!(engine.tick(TICK).is_empty());
    }
    assert!(!engine.balls()[0].is_hit());
}

// =============================================================================
// Touches
// =============================================================================

#[test]
fn test_one_press_catches_every_ball_under_it() {
    let mut engine = engine((1080.0, 1920.0), 10.0);
    engine.spawn_now();
    for _ in 0..5 {
        engine.tick(TICK);
    }
    engine.spawn_now();
    // First ball at y = 10, second at y = -40; both within 40 of y = -15.
    let taps = engine.pointer_down(Vec2::new(540.0, -15.0));
    assert_eq!(taps.len(), 2);
    assert_ne!(taps[0].ball, taps[1].ball);
    assert!(engine.balls().iter().all(|b| b.is_hit()));
}

#[test]
fn test_repeated_touches_report_once() {
    let mut engine = engine((1080.0, 1920.0), 10.0);
    engine.spawn_now();
    let p = engine.balls()[0].position();

    assert_eq!(engine.pointer_down(p).len(), 1);
    for _ in 0..10 {
        assert!(engine.pointer_down(p).is_empty());
        engine.tick(TICK);
    }
}

#[test]
fn test_twin_ignores_touch() {
    let mut engine = engine((1080.0, 1920.0), 10.0);
    engine.set_mirror_mode(MirrorMode::MirrorRight);
    engine.set_target_offset(200.0);
    engine.spawn_now();
    let twin = engine.balls().iter().find(|b| b.is_mirror()).unwrap().position();
    assert!(engine.pointer_down(twin).is_empty());
    assert!(engine.balls().iter().all(|b| !b.is_hit()));
}

// =============================================================================
// Pair groups
// =============================================================================

#[test]
fn test_touching_interactive_ball_removes_its_twin() {
    let mut engine = engine((1080.0, 1920.0), 10.0);
    engine.set_mirror_mode(MirrorMode::MirrorLeft);
    engine.set_target_offset(200.0);
    engine.spawn_now();
    engine.spawn_now();
    let first = engine.balls()[0].clone();
    let first_pair = first.pair();

    let taps = engine.pointer_down(first.position());
    // Both interactive balls sit at the same spot.
    assert_eq!(taps.len(), 2);

    engine.set_spawning(false);
    let mut seen_pair_alone = false;
    for _ in 0..30 {
        engine.tick(TICK);
        let members = engine.balls().iter().filter(|b| b.pair() == first_pair).count();
        if members == 1 {
            seen_pair_alone = true;
        }
    }
    assert!(!seen_pair_alone, "a twin outlived its partner");
    assert!(engine.balls().is_empty());
}

#[test]
fn test_mask_on_twin_pops_whole_pair_with_one_tap() {
    let mut engine = engine((1080.0, 1920.0), 10.0);
    engine.set_mirror_mode(MirrorMode::MirrorRight);
    engine.set_target_offset(300.0);
    engine.spawn_now();

    // Interactive at x = 840, twin at x = 240. Light only the left quarter.
    let (w, h) = (108u32, 192u32);
    let flags: Vec<bool> = (0..w * h).map(|i| i % w < 27).collect();
    engine.update_mask(Some(HitMask::from_flags(w, h, &flags).unwrap()));

    let taps = engine.tick(TICK);
    assert_eq!(taps.len(), 1);
    let caught = engine.balls().iter().find(|b| b.id() == taps[0].ball).unwrap();
    assert!(caught.is_mirror());
    assert!(engine.balls().iter().all(|b| b.is_hit()));

    for _ in 0..19 {
        assert!(engine.tick(TICK).is_empty());
    }
    assert!(engine.balls().is_empty());
}
