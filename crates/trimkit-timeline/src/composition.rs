//! Trim builder: cut the committed range out of a source.
//!
//! The first video track and the first audio track of the source are each
//! cut to `[range_start, range_end)` and placed at zero on a new timeline.
//! A missing track kind is skipped. Any insertion failure aborts the whole
//! build; there is no partially trimmed result.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;
use trimkit_core::{
    MediaSource, RationalTime, Result, SourceTrack, TimeRange, TrackKind, TrackSegment, TrimError,
    DEFAULT_TIMESCALE,
};
use tracing::{debug, info};
use uuid::Uuid;

/// One track of a composition: a segment of some origin track, starting at zero.
pub struct CompositionTrack {
    segment: TrackSegment,
}

impl CompositionTrack {
    /// Where this track's media comes from.
    pub fn segment(&self) -> &TrackSegment {
        &self.segment
    }

}

impl fmt::Debug for CompositionTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CompositionTrack").field(&self.segment).finish()
    }
}

impl SourceTrack for CompositionTrack {
    fn kind(&self) -> TrackKind {
        self.segment.kind
    }

    fn label(&self) -> String {
        format!(
            "{} {} of {}",
            self.segment.kind,
            self.segment.source_range,
            self.segment.origin.label()
        )
    }

    fn length(&self) -> RationalTime {
        self.segment.source_range.duration
    }

    /// Cutting a composition track cuts the origin track at the mapped range.
    fn insert_range(self: Arc<Self>, range: TimeRange) -> Result<TrackSegment> {
        let local = TimeRange::new(RationalTime::ZERO, self.length());
        if !local.encloses(range) {
            return Err(TrimError::TrackInsertion {
                kind: self.segment.kind,
                reason: format!("{} outside composition track {}", range, local),
            });
        }
        let mapped = range.shifted(self.segment.source_range.start);
        self.segment.origin.clone().insert_range(mapped)
    }
}

/// A new media source made of trimmed segments, all aligned at zero.
#[derive(Debug)]
pub struct Composition {
    id: Uuid,
    name: String,
    duration: RationalTime,
    tracks: SmallVec<[Arc<CompositionTrack>; 2]>,
}

impl Composition {
    /// Number of tracks of the given kind.
    pub fn track_count(&self, kind: TrackKind) -> usize {
        self.tracks.iter().filter(|t| t.kind() == kind).count()
    }

    /// All tracks in output order (video before audio).
    pub fn composition_tracks(&self) -> &[Arc<CompositionTrack>] {
        &self.tracks
    }
}

impl MediaSource for Composition {
    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn duration(&self) -> f64 {
        self.duration.to_seconds_f64()
    }

    fn tracks(&self, kind: TrackKind) -> Vec<Arc<dyn SourceTrack>> {
        self.tracks
            .iter()
            .filter(|t| t.kind() == kind)
            .map(|t| t.clone() as Arc<dyn SourceTrack>)
            .collect()
    }
}

/// Builds compositions from a committed trim range.
#[derive(Debug, Clone, Copy)]
pub struct CompositionBuilder {
    timescale: i64,
}

impl CompositionBuilder {
    /// Range bounds are quantized to `timescale` ticks per second.
    pub fn new(timescale: i64) -> Self {
        Self {
            timescale: timescale.max(1),
        }
    }

    /// Cut `[range_start, range_end)` out of `source`.
    ///
    /// Playback must already be stopped; that is the caller's job.
    pub fn build(&self, source: &dyn MediaSource, range_start: f64, range_end: f64) -> Result<Composition> {
        if !range_start.is_finite() || !range_end.is_finite() || range_start > range_end {
            return Err(TrimError::InvalidParameter(format!(
                "invalid trim range [{}, {})",
                range_start, range_end
            )));
        }
        let range = TimeRange::from_seconds_f64(range_start, range_end, self.timescale);

        let mut tracks: SmallVec<[Arc<CompositionTrack>; 2]> = SmallVec::new();
        for kind in TrackKind::ALL {
            let Some(track) = source.first_track(kind) else {
                debug!(source = source.name(), %kind, "No track of this kind, omitted");
                continue;
            };
            let cut = self.fit_to_track(range, track.length());
            let segment = track.insert_range(cut).map_err(|err| match err {
                TrimError::TrackInsertion { .. } => err,
                other => TrimError::TrackInsertion {
                    kind,
                    reason: other.to_string(),
                },
            })?;
            tracks.push(Arc::new(CompositionTrack { segment }));
        }

        let duration = tracks
            .iter()
            .map(|t| t.length())
            .max()
            .unwrap_or(range.duration);
        let composition = Composition {
            id: Uuid::new_v4(),
            name: format!("{} [{:.1}-{:.1}]", source.name(), range_start, range_end),
            duration,
            tracks,
        };
        info!(
            source = source.name(),
            %range,
            tracks = composition.tracks.len(),
            "Built trimmed composition"
        );
        Ok(composition)
    }

    /// Absorb rounding at the end of a track.
    ///
    /// Track lengths and cut bounds are quantized independently, so a cut
    /// ending at the track's end can land past it by up to one tick of the
    /// coarser timescale. Such a cut ends at the track's end instead.
    fn fit_to_track(&self, range: TimeRange, length: RationalTime) -> TimeRange {
        let end = range.end();
        if end <= length || range.start > length {
            return range;
        }
        let tolerance = RationalTime::new(1, self.timescale.min(DEFAULT_TIMESCALE));
        if end - length <= tolerance {
            debug!(%range, %length, "Cut end rounded past track end, clamped");
            return TimeRange::from_start_end(range.start, length);
        }
        range
    }
}
