//! Headless trimming session.
//!
//! Drives a session the way a user would: drag the range handles in quick
//! bursts, preview by playing, then commit the trim.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::runtime::Handle;
use trimkit_core::{MediaSource, TrackKind};
use trimkit_media::{MediaAsset, MediaInfo, SimulatedPlayer};
use trimkit_timeline::{
    PlayerSession, RangeControlBinding, SeekStats, SliderControl, TimelineField,
};
use tracing::info;

use crate::config::AppConfig;

const SETTLE_TIMEOUT: Duration = Duration::from_secs(2);

/// What a scripted run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptReport {
    pub source_duration: f64,
    pub range: (f64, f64),
    pub trimmed_duration: f64,
    pub seeks: SeekStats,
    pub control_writes: u64,
}

/// A stand-in asset for runs without an input file.
pub fn demo_asset(duration: f64) -> Result<MediaAsset> {
    let info = MediaInfo::new("demo.mov", duration)
        .with_stream(TrackKind::Video, "h264")
        .with_stream(TrackKind::Audio, "aac");
    Ok(MediaAsset::from_info(info)?)
}

/// Load `source`, drag the handles, preview, and trim to the middle half.
pub fn run(runtime: Handle, config: &AppConfig, source: Arc<dyn MediaSource>, preview: Duration) -> Result<ScriptReport> {
    let player_config = config.player.clone();
    let mut session = PlayerSession::with_backend(config.session.clone(), move |events| {
        SimulatedPlayer::new(runtime, events, player_config)
    });

    let events = session.events();
    let start = SliderControl::new(TimelineField::RangeStart, events.clone());
    let end = SliderControl::new(TimelineField::RangeEnd, events.clone());
    let position = SliderControl::new(TimelineField::Position, events);
    let binding = session.bind_controls(RangeControlBinding::for_sliders(&start, &end, &position));

    let duration = source.duration();
    session.load_source(source);
    if !session.settle(SETTLE_TIMEOUT) {
        bail!("initial seek did not complete");
    }

    let (target_start, target_end) = (duration * 0.25, duration * 0.75);
    drag(&start, 0.0, target_start);
    drag(&end, duration, target_end);
    session.pump();
    if !session.settle(SETTLE_TIMEOUT) {
        bail!("range drag did not settle");
    }
    info!(
        start = session.state().range_start(),
        end = session.state().range_end(),
        "Range set"
    );

    session.set_position(target_start);
    session.set_playing(true);
    let deadline = std::time::Instant::now() + preview;
    while std::time::Instant::now() < deadline {
        session.wait_event(Duration::from_millis(20));
    }
    info!(position = session.state().position(), "Preview done");

    let range = (session.state().range_start(), session.state().range_end());
    let composition = session.trim().context("trim failed")?;
    if !session.settle(SETTLE_TIMEOUT) {
        bail!("seek after trim did not complete");
    }

    let report = ScriptReport {
        source_duration: duration,
        range,
        trimmed_duration: composition.duration(),
        seeks: session.seek_stats(),
        control_writes: binding.borrow().writes(),
    };
    info!(?report, "Session finished");
    Ok(report)
}

/// Move a slider in ten steps, the way a pointer drag reports.
fn drag(slider: &SliderControl, from: f64, to: f64) {
    for step in 1..=10 {
        slider.drag_to(from + (to - from) * step as f64 / 10.0);
    }
}
