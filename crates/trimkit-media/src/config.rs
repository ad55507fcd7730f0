//! Playback backend configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for [`crate::SimulatedPlayer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Playback clock period in milliseconds.
    pub tick_interval_ms: u64,
    /// Time a seek takes to land, in milliseconds.
    pub seek_latency_ms: u64,
    /// Media seconds per wall-clock second.
    pub playback_rate: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            seek_latency_ms: 40,
            playback_rate: 1.0,
        }
    }
}

impl PlayerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn seek_latency(&self) -> Duration {
        Duration::from_millis(self.seek_latency_ms)
    }

    /// Media time advanced by one tick, in seconds.
    pub fn tick_step(&self) -> f64 {
        let rate = if self.playback_rate.is_finite() && self.playback_rate > 0.0 {
            self.playback_rate
        } else {
            1.0
        };
        self.tick_interval().as_secs_f64() * rate
    }
}
