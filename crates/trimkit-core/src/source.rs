//! Media source traits.
//!
//! A media source is whatever the playback backend can play and the trim
//! builder can cut: a probed file, or a composition produced by an earlier
//! trim. Sources are shared between the owner context and backend threads,
//! hence the `Send + Sync` bounds.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::time::{RationalTime, TimeRange};

/// Kind of track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackKind {
    Video,
    Audio,
}

impl TrackKind {
    /// Every kind the trim builder copies, in output order.
    pub const ALL: [TrackKind; 2] = [TrackKind::Video, TrackKind::Audio];
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => f.write_str("video"),
            Self::Audio => f.write_str("audio"),
        }
    }
}

/// A sub-range of a source track, ready to be placed on a new timeline.
#[derive(Clone)]
pub struct TrackSegment {
    /// Kind of the originating track
    pub kind: TrackKind,
    /// Range within the originating track
    pub source_range: TimeRange,
    /// The track the range was cut from
    pub origin: Arc<dyn SourceTrack>,
}

impl fmt::Debug for TrackSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackSegment")
            .field("kind", &self.kind)
            .field("source_range", &self.source_range)
            .field("origin", &self.origin.label())
            .finish()
    }
}

/// One track (video or audio) of a media source.
pub trait SourceTrack: Send + Sync {
    /// Kind of this track.
    fn kind(&self) -> TrackKind;

    /// Human-readable label for logs.
    fn label(&self) -> String;

    /// Readable length of the track.
    fn length(&self) -> RationalTime;

    /// Cut `range` out of this track.
    ///
    /// Fails with [`crate::TrimError::TrackInsertion`] when the range cannot be
    /// read from the track (out of bounds, corrupt stream, ...).
    fn insert_range(self: Arc<Self>, range: TimeRange) -> Result<TrackSegment>;
}

/// Something a playback backend can play and the trim builder can cut.
pub trait MediaSource: Send + Sync + fmt::Debug {
    /// Stable identity, used for logging and to tell sources apart.
    fn id(&self) -> Uuid;

    /// Display name.
    fn name(&self) -> &str;

    /// Total length in seconds.
    fn duration(&self) -> f64;

    /// All tracks of the given kind, in source order.
    fn tracks(&self, kind: TrackKind) -> Vec<Arc<dyn SourceTrack>>;

    /// First track of the given kind, if any.
    fn first_track(&self, kind: TrackKind) -> Option<Arc<dyn SourceTrack>> {
        self.tracks(kind).into_iter().next()
    }
}
