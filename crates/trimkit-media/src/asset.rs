//! Probed media files as trimmable sources.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use trimkit_core::{
    MediaSource, RationalTime, Result, SourceTrack, TimeRange, TrackKind, TrackSegment, TrimError,
    DEFAULT_TIMESCALE,
};
use tracing::debug;
use uuid::Uuid;

use crate::probe::{MediaInfo, StreamInfo};

/// One stream of a media asset.
pub struct AssetTrack {
    asset_name: String,
    stream: StreamInfo,
    length: RationalTime,
}

impl fmt::Debug for AssetTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetTrack")
            .field("asset", &self.asset_name)
            .field("stream", &self.stream.index)
            .field("kind", &self.stream.kind)
            .field("length", &self.length)
            .finish()
    }
}

impl SourceTrack for AssetTrack {
    fn kind(&self) -> TrackKind {
        self.stream.kind
    }

    fn label(&self) -> String {
        format!(
            "{} #{} ({}) of {}",
            self.stream.kind, self.stream.index, self.stream.codec, self.asset_name
        )
    }

    fn length(&self) -> RationalTime {
        self.length
    }

    fn insert_range(self: Arc<Self>, range: TimeRange) -> Result<TrackSegment> {
        let readable = TimeRange::new(RationalTime::ZERO, self.length);
        if range.start.is_negative() || !readable.encloses(range) {
            return Err(TrimError::TrackInsertion {
                kind: self.stream.kind,
                reason: format!("{} outside readable range {} of {}", range, readable, self.label()),
            });
        }
        debug!(track = %self.label(), %range, "Cut track range");
        Ok(TrackSegment {
            kind: self.stream.kind,
            source_range: range,
            origin: self,
        })
    }
}

/// A media file described by its probe result.
pub struct MediaAsset {
    id: Uuid,
    name: String,
    path: PathBuf,
    info: MediaInfo,
    tracks: Vec<Arc<AssetTrack>>,
}

impl MediaAsset {
    /// Probe `path` and wrap the result.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let info = MediaInfo::probe(path.as_ref())?;
        Self::from_info(info)
    }

    /// Build from an existing probe result.
    pub fn from_info(info: MediaInfo) -> Result<Self> {
        if !info.duration.is_finite() || info.duration < 0.0 {
            return Err(TrimError::Media(format!(
                "Invalid duration {} for {}",
                info.duration, info.path
            )));
        }

        let path = PathBuf::from(&info.path);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| info.path.clone());

        let tracks = info
            .streams
            .iter()
            .map(|stream| {
                let seconds = stream.duration.unwrap_or(info.duration).min(info.duration);
                Arc::new(AssetTrack {
                    asset_name: name.clone(),
                    stream: stream.clone(),
                    length: RationalTime::from_seconds_f64(seconds, DEFAULT_TIMESCALE),
                })
            })
            .collect();

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            path,
            info,
            tracks,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&self) -> &MediaInfo {
        &self.info
    }
}

impl fmt::Debug for MediaAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaAsset")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("duration", &self.info.duration)
            .field("tracks", &self.tracks.len())
            .finish()
    }
}

impl MediaSource for MediaAsset {
    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn duration(&self) -> f64 {
        self.info.duration
    }

    fn tracks(&self, kind: TrackKind) -> Vec<Arc<dyn SourceTrack>> {
        self.tracks
            .iter()
            .filter(|t| t.kind() == kind)
            .map(|t| t.clone() as Arc<dyn SourceTrack>)
            .collect()
    }
}
