//! Seek coordination against a real asynchronous backend.

use std::time::{Duration, Instant};

use trimkit_core::MediaSource;
use trimkit_timeline::PlaybackBackend;

use crate::support::{asset, loaded, runtime, session, SETTLE};

// ── Coalescing ─────────────────────────────────────────────────

#[test]
fn scrub_burst_never_overlaps_backend_seeks() {
    let rt = runtime();
    let mut session = loaded(&rt, 20, asset("scrub.mov", 120.0));

    for step in 1..=50 {
        session.set_position(step as f64);
        if step % 10 == 0 {
            std::thread::sleep(Duration::from_millis(5));
            session.pump();
        }
    }
    assert!(session.settle(SETTLE));

    let stats = session.seek_stats();
    assert_eq!(session.backend().overlapping_seeks(), 0);
    assert!(stats.issued < 50, "burst was not coalesced: {:?}", stats);
    assert!(stats.superseded > 0);
    assert_eq!(session.backend().position(), 50.0);
    assert_eq!(session.snapshot().position, 50.0);
}

#[test]
fn latest_target_wins_after_settle() {
    let rt = runtime();
    let mut session = loaded(&rt, 10, asset("jump.mov", 60.0));

    session.set_position(45.0);
    session.set_position(5.0);
    session.set_position(30.0);
    assert!(session.settle(SETTLE));

    assert_eq!(session.backend().position(), 30.0);
    assert_eq!(session.seek_stats().superseded, 1);
}

// ── Range edits during playback ────────────────────────────────

#[test]
fn range_end_edit_stops_playback_and_previews_edge() {
    let rt = runtime();
    let mut session = loaded(&rt, 5, asset("long.mov", 100.0));
    session.set_playing(true);
    assert!(session.backend().is_playing());

    assert!(session.set_range_end(40.0));

    let s = session.snapshot();
    assert!(!s.is_playing);
    assert!(!session.backend().is_playing());
    assert_eq!((s.range_start, s.range_end, s.position), (0.0, 40.0, 40.0));
    assert!(session.settle(SETTLE));
    assert_eq!(session.backend().position(), 40.0);
}

#[test]
fn playback_ticks_advance_position() {
    let rt = runtime();
    let mut session = loaded(&rt, 5, asset("play.mov", 100.0));
    session.set_position(5.0);
    assert!(session.settle(SETTLE));

    session.set_playing(true);
    let deadline = Instant::now() + Duration::from_millis(150);
    while Instant::now() < deadline {
        session.wait_event(Duration::from_millis(20));
    }

    let position = session.snapshot().position;
    assert!(position > 5.0, "position did not move: {}", position);
    assert!(position < 100.0);
}

// ── Reloads ────────────────────────────────────────────────────

#[test]
fn reload_during_seek_recovers() {
    let rt = runtime();
    let mut session = session(&rt, 30);
    session.load_source(asset("first.mov", 50.0));
    session.load_source(asset("second.mov", 20.0));
    assert!(session.settle(SETTLE));

    let stats = session.seek_stats();
    assert_eq!(stats.cancelled, 1);
    assert_eq!(stats.issued, 2);
    assert!(!session.seeks().is_seeking());
    assert_eq!(session.snapshot().duration, 20.0);
    assert_eq!(
        session.backend().current_source().map(|s| s.name().to_string()),
        Some("second.mov".to_string())
    );
}
