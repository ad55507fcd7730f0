//! Trimkit Media - sources and playback backends
//!
//! This crate handles:
//! - Media file probing through ffprobe
//! - `MediaAsset`, a trimmable source built from probed streams
//! - `SimulatedPlayer`, a tokio-driven playback backend with asynchronous
//!   seeks and a periodic clock

pub mod asset;
pub mod config;
pub mod player;
pub mod probe;

pub use asset::{AssetTrack, MediaAsset};
pub use config::PlayerConfig;
pub use player::SimulatedPlayer;
pub use probe::{MediaInfo, StreamInfo};

/// Log which ffprobe binary will be used (call once at startup).
pub fn init() {
    tracing::info!(
        ffprobe = %ffmpeg_sidecar::ffprobe::ffprobe_path().display(),
        "Trimkit media initialized"
    );
}
