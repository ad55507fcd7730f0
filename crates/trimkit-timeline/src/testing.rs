//! Test doubles shared by the unit tests of this crate.

use std::sync::Arc;

use parking_lot::Mutex;
use trimkit_core::{
    MediaSource, RationalTime, Result, SourceTrack, TimeRange, TrackKind, TrackSegment, TrimError,
};
use uuid::Uuid;

use crate::playback::{PlaybackBackend, SeekCompletion};
use crate::seek::{SeekSink, SeekTicket};

/// Records every seek the coordinator issues.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub issued: Vec<(SeekTicket, RationalTime)>,
}

impl RecordingSink {
    pub fn targets(&self) -> Vec<f64> {
        self.issued.iter().map(|(_, t)| t.to_seconds_f64()).collect()
    }

    pub fn tickets(&self) -> Vec<SeekTicket> {
        self.issued.iter().map(|(t, _)| *t).collect()
    }
}

impl SeekSink for RecordingSink {
    fn issue_seek(&mut self, ticket: SeekTicket, target: RationalTime) {
        self.issued.push((ticket, target));
    }
}

/// Backend that parks seek completions until the test releases them.
#[derive(Default)]
pub struct FakeBackend {
    pub seeks: Vec<f64>,
    pub parked: Vec<SeekCompletion>,
    pub play_calls: usize,
    pub pause_calls: usize,
    pub source: Option<Arc<dyn MediaSource>>,
}

impl FakeBackend {
    /// Complete the oldest parked seek successfully.
    pub fn finish_next(&mut self) -> bool {
        if self.parked.is_empty() {
            return false;
        }
        self.parked.remove(0).finish();
        true
    }
}

impl PlaybackBackend for FakeBackend {
    fn load(&mut self, source: Option<Arc<dyn MediaSource>>) {
        self.source = source;
    }

    fn seek(&mut self, target: RationalTime, completion: SeekCompletion) {
        self.seeks.push(target.to_seconds_f64());
        self.parked.push(completion);
    }

    fn play(&mut self) {
        self.play_calls += 1;
    }

    fn pause(&mut self) {
        self.pause_calls += 1;
    }

    fn current_source(&self) -> Option<Arc<dyn MediaSource>> {
        self.source.clone()
    }
}

/// In-memory track that remembers the ranges cut from it.
pub struct FakeTrack {
    pub kind: TrackKind,
    pub length: RationalTime,
    pub corrupt: bool,
    pub cuts: Mutex<Vec<TimeRange>>,
}

impl SourceTrack for FakeTrack {
    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn label(&self) -> String {
        format!("fake {}", self.kind)
    }

    fn length(&self) -> RationalTime {
        self.length
    }

    fn insert_range(self: Arc<Self>, range: TimeRange) -> Result<TrackSegment> {
        if self.corrupt {
            return Err(TrimError::TrackInsertion {
                kind: self.kind,
                reason: "corrupt sample table".into(),
            });
        }
        if !TimeRange::new(RationalTime::ZERO, self.length).encloses(range) {
            return Err(TrimError::TrackInsertion {
                kind: self.kind,
                reason: format!("{} outside track", range),
            });
        }
        self.cuts.lock().push(range);
        Ok(TrackSegment {
            kind: self.kind,
            source_range: range,
            origin: self,
        })
    }
}

#[derive(Debug)]
pub struct FakeSource {
    pub id: Uuid,
    pub duration: f64,
    pub video: Option<Arc<FakeTrack>>,
    pub audio: Option<Arc<FakeTrack>>,
}

impl std::fmt::Debug for FakeTrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeTrack").field("kind", &self.kind).finish()
    }
}

impl FakeSource {
    pub fn new(duration: f64, video: bool, audio: bool) -> Self {
        let track = |kind| {
            Arc::new(FakeTrack {
                kind,
                length: RationalTime::from_seconds_f64(duration, 1000),
                corrupt: false,
                cuts: Mutex::new(Vec::new()),
            })
        };
        Self {
            id: Uuid::new_v4(),
            duration,
            video: video.then(|| track(TrackKind::Video)),
            audio: audio.then(|| track(TrackKind::Audio)),
        }
    }

    pub fn with_corrupt_audio(mut self) -> Self {
        if let Some(audio) = self.audio.take() {
            self.audio = Some(Arc::new(FakeTrack {
                kind: TrackKind::Audio,
                length: audio.length,
                corrupt: true,
                cuts: Mutex::new(Vec::new()),
            }));
        }
        self
    }
}

impl MediaSource for FakeSource {
    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> &str {
        "fake"
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn tracks(&self, kind: TrackKind) -> Vec<Arc<dyn SourceTrack>> {
        let track = match kind {
            TrackKind::Video => self.video.clone(),
            TrackKind::Audio => self.audio.clone(),
        };
        track
            .into_iter()
            .map(|t| t as Arc<dyn SourceTrack>)
            .collect()
    }
}
