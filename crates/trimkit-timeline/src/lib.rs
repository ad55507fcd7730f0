//! Trimkit Timeline - the seek and range synchronization engine
//!
//! Keeps a playback position and an editable trim range consistent while the
//! user drags controls and playback advances in the background:
//! - `SeekCoordinator`: at most one backend seek in flight, latest request wins
//! - `TimelineState`: clamped, change-detecting model with synchronous subscribers
//! - `RangeControlBinding`: echo-free sync between the model and value controls
//! - `CompositionBuilder`: cuts the committed range out of a media source
//! - `PlayerSession`: the single owner that wires the pieces to a backend

pub mod binding;
pub mod composition;
pub mod config;
pub mod playback;
pub mod seek;
pub mod session;
pub mod state;

#[cfg(test)]
mod testing;

pub use binding::{BoundControl, RangeControlBinding, SliderControl, UpdateReason};
pub use composition::{Composition, CompositionBuilder, CompositionTrack};
pub use config::SessionConfig;
pub use playback::{session_channel, PlaybackBackend, SeekCompletion, SessionEvent, SessionEvents};
pub use seek::{SeekCoordinator, SeekDisposition, SeekOutcome, SeekSink, SeekStats, SeekTicket};
pub use session::PlayerSession;
pub use state::{SubscriptionId, TimelineField, TimelineSnapshot, TimelineState, TimelineSubscriber};
