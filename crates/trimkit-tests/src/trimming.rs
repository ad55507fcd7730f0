//! Trim flow with probed-style assets.

use std::sync::Arc;

use trimkit_core::{MediaSource, SourceTrack, TimeRange, TrackKind, TrimError};
use trimkit_media::{MediaAsset, MediaInfo};
use trimkit_timeline::SessionConfig;

use crate::support::{asset, loaded, runtime, SETTLE};

#[test]
fn trim_loads_cut_composition() {
    let rt = runtime();
    let source = asset("interview.mov", 100.0);
    let mut session = loaded(&rt, 5, source);
    session.set_range_start(20.0);
    session.set_range_end(50.0);
    session.set_playing(true);

    let composition = session.trim().unwrap();
    assert!(session.settle(SETTLE));

    assert_eq!(composition.duration(), 30.0);
    assert_eq!(composition.track_count(TrackKind::Video), 1);
    assert_eq!(composition.track_count(TrackKind::Audio), 1);

    let s = session.snapshot();
    assert_eq!((s.duration, s.range_start, s.range_end, s.position), (30.0, 0.0, 30.0, 0.0));
    assert!(!s.is_playing);
    assert_eq!(session.current_source().map(|src| src.id()), Some(composition.id()));
    assert_eq!(session.backend().position(), 0.0);
}

#[test]
fn second_trim_cuts_the_original_media() {
    let rt = runtime();
    let mut session = loaded(&rt, 5, asset("nested.mov", 100.0));
    session.set_range_start(20.0);
    session.set_range_end(60.0);
    session.trim().unwrap();
    assert!(session.settle(SETTLE));

    session.set_range_start(5.0);
    session.set_range_end(10.0);
    let second = session.trim().unwrap();

    assert_eq!(second.duration(), 5.0);
    let segment = second.composition_tracks()[0].segment();
    assert_eq!(segment.source_range, TimeRange::from_seconds_f64(25.0, 30.0, 1000));
    assert!(segment.origin.label().contains("nested.mov"));
}

#[test]
fn video_only_asset_trims_without_audio() {
    let rt = runtime();
    let info = MediaInfo::new("screen.mp4", 30.0).with_stream(TrackKind::Video, "h264");
    let source = Arc::new(MediaAsset::from_info(info).unwrap());
    let mut session = loaded(&rt, 5, source);
    session.set_range_end(12.0);

    let composition = session.trim().unwrap();
    assert_eq!(composition.track_count(TrackKind::Video), 1);
    assert_eq!(composition.track_count(TrackKind::Audio), 0);
    assert_eq!(composition.duration(), 12.0);
}

#[test]
fn short_audio_stream_aborts_trim() {
    let rt = runtime();
    let mut info = MediaInfo::new("drift.mov", 60.0)
        .with_stream(TrackKind::Video, "h264")
        .with_stream(TrackKind::Audio, "aac");
    info.streams[1].duration = Some(40.0);
    let source = Arc::new(MediaAsset::from_info(info).unwrap());
    let mut session = loaded(&rt, 5, source.clone());
    session.set_range_start(30.0);
    session.set_range_end(50.0);

    let err = session.trim().unwrap_err();
    assert!(matches!(
        err,
        TrimError::TrackInsertion {
            kind: TrackKind::Audio,
            ..
        }
    ));
    assert_eq!(session.current_source().map(|s| s.id()), Some(source.id()));
    let s = session.snapshot();
    assert_eq!((s.range_start, s.range_end), (30.0, 50.0));
}

#[test]
fn trim_without_source_is_rejected() {
    let rt = runtime();
    let mut session = crate::support::session(&rt, 5);
    assert!(matches!(session.trim(), Err(TrimError::NoSource)));
}

#[test]
fn full_range_trim_at_coarse_timescale() {
    let rt = runtime();
    let config = SessionConfig {
        seek_timescale: 600,
        ..Default::default()
    };
    let mut session = crate::support::session_with(&rt, config, 5);
    let info = MediaInfo::new("odd.mov", 10.0009).with_stream(TrackKind::Video, "h264");
    session.load_source(Arc::new(MediaAsset::from_info(info).unwrap()));
    assert!(session.settle(SETTLE));

    let composition = session.trim().unwrap();

    assert_eq!(composition.track_count(TrackKind::Video), 1);
    assert!((composition.duration() - 10.0009).abs() < 1e-3);
    assert_eq!(session.snapshot().range_end, composition.duration());
}
