//! Shared fixtures.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Runtime;
use trimkit_core::TrackKind;
use trimkit_media::{MediaAsset, MediaInfo, PlayerConfig, SimulatedPlayer};
use trimkit_timeline::{PlayerSession, SessionConfig};

pub const SETTLE: Duration = Duration::from_secs(2);

pub type Session = PlayerSession<SimulatedPlayer>;

pub fn runtime() -> Runtime {
    tokio::runtime::Runtime::new().unwrap()
}

pub fn player_config(seek_latency_ms: u64) -> PlayerConfig {
    PlayerConfig {
        tick_interval_ms: 10,
        seek_latency_ms,
        playback_rate: 1.0,
    }
}

pub fn session(runtime: &Runtime, seek_latency_ms: u64) -> Session {
    session_with(runtime, SessionConfig::default(), seek_latency_ms)
}

pub fn session_with(runtime: &Runtime, config: SessionConfig, seek_latency_ms: u64) -> Session {
    let handle = runtime.handle().clone();
    PlayerSession::with_backend(config, move |events| {
        SimulatedPlayer::new(handle, events, player_config(seek_latency_ms))
    })
}

pub fn asset(name: &str, duration: f64) -> Arc<MediaAsset> {
    let info = MediaInfo::new(name, duration)
        .with_stream(TrackKind::Video, "h264")
        .with_stream(TrackKind::Audio, "aac");
    Arc::new(MediaAsset::from_info(info).unwrap())
}

/// Session with `asset` loaded and its initial seek done.
pub fn loaded(runtime: &Runtime, seek_latency_ms: u64, asset: Arc<MediaAsset>) -> Session {
    let mut session = session(runtime, seek_latency_ms);
    session.load_source(asset);
    assert!(session.settle(SETTLE));
    session
}
