//! Slider bindings driven through the session inbox.

use std::time::Duration;

use trimkit_timeline::{RangeControlBinding, SliderControl, TimelineField};

use crate::support::{asset, runtime, session, SETTLE};

struct Sliders {
    start: SliderControl,
    end: SliderControl,
    position: SliderControl,
}

fn sliders(session: &crate::support::Session) -> Sliders {
    let events = session.events();
    Sliders {
        start: SliderControl::new(TimelineField::RangeStart, events.clone()),
        end: SliderControl::new(TimelineField::RangeEnd, events.clone()),
        position: SliderControl::new(TimelineField::Position, events),
    }
}

#[test]
fn load_syncs_controls_without_echo() {
    let rt = runtime();
    let mut session = session(&rt, 5);
    let s = sliders(&session);
    let _binding =
        session.bind_controls(RangeControlBinding::for_sliders(&s.start, &s.end, &s.position));

    session.load_source(asset("clip.mov", 80.0));
    assert!(session.settle(SETTLE));

    assert_eq!(s.end.value(), 80.0);
    for slider in [&s.start, &s.end, &s.position] {
        assert_eq!(slider.maximum(), 80.0);
        assert_eq!(slider.user_edits(), 0);
    }
    // Only the seek completion travelled through the inbox.
    assert_eq!(session.seek_stats().issued, 1);
    assert!(!session.wait_event(Duration::from_millis(20)));
}

#[test]
fn drag_round_trips_through_the_model() {
    let rt = runtime();
    let mut session = session(&rt, 5);
    let s = sliders(&session);
    let _binding =
        session.bind_controls(RangeControlBinding::for_sliders(&s.start, &s.end, &s.position));
    session.load_source(asset("clip.mov", 80.0));
    assert!(session.settle(SETTLE));
    let end_writes = s.end.model_writes();

    s.end.drag_to(64.0);
    assert!(session.settle(SETTLE));

    let snapshot = session.snapshot();
    assert_eq!((snapshot.range_end, snapshot.position), (64.0, 64.0));
    assert_eq!(s.end.model_writes(), end_writes);
    assert_eq!(s.position.value(), 64.0);
    assert_eq!(session.backend().position(), 64.0);
}

#[test]
fn drag_past_the_other_handle_is_clamped() {
    let rt = runtime();
    let mut session = session(&rt, 5);
    let s = sliders(&session);
    let _binding =
        session.bind_controls(RangeControlBinding::for_sliders(&s.start, &s.end, &s.position));
    session.load_source(asset("clip.mov", 80.0));
    assert!(session.settle(SETTLE));

    s.end.drag_to(30.0);
    s.start.drag_to(50.0);
    assert!(session.settle(SETTLE));

    let snapshot = session.snapshot();
    assert!(snapshot.is_consistent());
    assert_eq!(snapshot.range_end, 30.0);
    assert!(snapshot.range_start <= 30.0);
    assert_eq!(s.start.value(), snapshot.range_start);
}

#[test]
fn drag_onto_a_pinned_handle_snaps_back() {
    let rt = runtime();
    let mut session = session(&rt, 5);
    let s = sliders(&session);
    let _binding =
        session.bind_controls(RangeControlBinding::for_sliders(&s.start, &s.end, &s.position));
    session.load_source(asset("clip.mov", 80.0));
    assert!(session.settle(SETTLE));

    s.end.drag_to(30.0);
    s.start.drag_to(30.0);
    assert!(session.settle(SETTLE));
    s.start.drag_to(50.0);
    assert!(session.settle(SETTLE));

    let snapshot = session.snapshot();
    assert_eq!((snapshot.range_start, snapshot.range_end), (30.0, 30.0));
    assert_eq!(s.start.value(), 30.0);
    assert_eq!(s.end.value(), 30.0);
}
