//! Trimkit Core - Foundation types for interactive trimming
//!
//! This crate provides the fundamental types used throughout Trimkit:
//! - Time representation (RationalTime, TimeRange) quantized to a timescale
//! - The error taxonomy shared by every crate
//! - Media source traits consumed by playback and trimming

pub mod error;
pub mod source;
pub mod time;

pub use error::{Result, TrimError};
pub use source::{MediaSource, SourceTrack, TrackKind, TrackSegment};
pub use time::{RationalTime, TimeRange, DEFAULT_TIMESCALE};
