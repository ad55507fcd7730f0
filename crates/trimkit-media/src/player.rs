//! Simulated playback backend.
//!
//! `SimulatedPlayer` behaves like a real player as far as the session can
//! tell: seeks land after a configurable latency on a runtime thread, and a
//! clock task reports the playhead every tick while playing. It never
//! decodes anything.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, MissedTickBehavior};
use trimkit_core::{MediaSource, RationalTime};
use trimkit_timeline::{PlaybackBackend, SeekCompletion, SessionEvents};
use tracing::{debug, info, warn};

use crate::config::PlayerConfig;

/// Playhead shared between the player and its tasks.
#[derive(Debug, Default)]
struct Clock {
    position: f64,
    duration: f64,
    playing: bool,
    seeks_in_flight: usize,
    /// Bumped on every load; seeks started under an older value are dropped.
    generation: u64,
}

#[derive(Debug, PartialEq)]
enum ClockStep {
    Idle,
    Moved(f64),
    Ended(f64),
}

impl Clock {
    fn advance(&mut self, step: f64) -> ClockStep {
        if !self.playing || self.seeks_in_flight > 0 {
            return ClockStep::Idle;
        }
        self.position += step;
        if self.position >= self.duration {
            self.position = self.duration;
            self.playing = false;
            ClockStep::Ended(self.position)
        } else {
            ClockStep::Moved(self.position)
        }
    }
}

/// A [`PlaybackBackend`] driven by tokio timers.
pub struct SimulatedPlayer {
    runtime: Handle,
    config: PlayerConfig,
    clock: Arc<Mutex<Clock>>,
    source: Option<Arc<dyn MediaSource>>,
    ticker: JoinHandle<()>,
    seeks_started: usize,
    overlapping_seeks: Arc<AtomicUsize>,
}

impl SimulatedPlayer {
    /// Create a player whose tasks run on `runtime` and report to `events`.
    pub fn new(runtime: Handle, events: SessionEvents, config: PlayerConfig) -> Self {
        let clock = Arc::new(Mutex::new(Clock::default()));
        let ticker = runtime.spawn(run_clock(clock.clone(), events, config.clone()));
        Self {
            runtime,
            config,
            clock,
            source: None,
            ticker,
            seeks_started: 0,
            overlapping_seeks: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Current playhead in seconds.
    pub fn position(&self) -> f64 {
        self.clock.lock().position
    }

    pub fn is_playing(&self) -> bool {
        self.clock.lock().playing
    }

    /// Number of seeks handed to this player.
    pub fn seeks_started(&self) -> usize {
        self.seeks_started
    }

    /// Seeks that started while another one was still running.
    pub fn overlapping_seeks(&self) -> usize {
        self.overlapping_seeks.load(Ordering::Relaxed)
    }
}

impl PlaybackBackend for SimulatedPlayer {
    fn load(&mut self, source: Option<Arc<dyn MediaSource>>) {
        let mut clock = self.clock.lock();
        clock.generation += 1;
        clock.playing = false;
        clock.position = 0.0;
        clock.duration = source.as_ref().map_or(0.0, |s| s.duration());
        match &source {
            Some(source) => info!(name = source.name(), duration = clock.duration, "Player loaded source"),
            None => info!("Player unloaded"),
        }
        self.source = source;
    }

    fn seek(&mut self, target: RationalTime, completion: SeekCompletion) {
        self.seeks_started += 1;
        let generation = {
            let mut clock = self.clock.lock();
            if clock.seeks_in_flight > 0 {
                warn!(ticket = %completion.ticket(), "Seek started while another is running");
                self.overlapping_seeks.fetch_add(1, Ordering::Relaxed);
            }
            clock.seeks_in_flight += 1;
            clock.generation
        };

        if self.source.is_none() {
            self.clock.lock().seeks_in_flight -= 1;
            completion.fail("no source loaded");
            return;
        }

        let clock = self.clock.clone();
        let latency = self.config.seek_latency();
        let seconds = target.to_seconds_f64();
        debug!(ticket = %completion.ticket(), seconds, "Seek started");
        self.runtime.spawn(async move {
            sleep(latency).await;
            let landed = {
                let mut clock = clock.lock();
                clock.seeks_in_flight = clock.seeks_in_flight.saturating_sub(1);
                if clock.generation == generation {
                    clock.position = seconds.clamp(0.0, clock.duration);
                    true
                } else {
                    false
                }
            };
            if landed {
                completion.finish();
            } else {
                debug!(ticket = %completion.ticket(), "Source replaced during seek");
                drop(completion);
            }
        });
    }

    fn play(&mut self) {
        let mut clock = self.clock.lock();
        if clock.position >= clock.duration {
            debug!("Play requested at end of media, ignored");
            return;
        }
        clock.playing = true;
    }

    fn pause(&mut self) {
        self.clock.lock().playing = false;
    }

    fn current_source(&self) -> Option<Arc<dyn MediaSource>> {
        self.source.clone()
    }
}

impl Drop for SimulatedPlayer {
    fn drop(&mut self) {
        self.ticker.abort();
    }
}

async fn run_clock(clock: Arc<Mutex<Clock>>, events: SessionEvents, config: PlayerConfig) {
    let step = config.tick_step();
    let mut ticks = interval(config.tick_interval());
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticks.tick().await;

    loop {
        ticks.tick().await;
        let step = clock.lock().advance(step);
        let alive = match step {
            ClockStep::Idle => true,
            ClockStep::Moved(position) => events.tick(position),
            ClockStep::Ended(position) => events.tick(position) && events.reached_end(),
        };
        if !alive {
            debug!("Session gone, stopping player clock");
            break;
        }
    }
}
