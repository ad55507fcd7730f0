//! Media file probing to get track layout and duration without decoding.

use std::path::Path;
use std::process::Command;

use serde::{Deserialize, Serialize};
use trimkit_core::{Result, TrackKind, TrimError};
use tracing::{debug, info};

/// Information about a media file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// File path
    pub path: String,
    /// Container format
    pub format: String,
    /// Duration in seconds
    pub duration: f64,
    /// Video and audio streams, in container order
    pub streams: Vec<StreamInfo>,
}

/// Information about one playable stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
    pub index: usize,
    pub kind: TrackKind,
    pub codec: String,
    /// Stream duration when the container reports one
    pub duration: Option<f64>,
}

// ffprobe's JSON layout; numbers arrive as strings.
#[derive(Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    format: Option<FfprobeFormat>,
}

#[derive(Deserialize)]
struct FfprobeStream {
    index: usize,
    codec_type: Option<String>,
    codec_name: Option<String>,
    duration: Option<String>,
}

#[derive(Deserialize)]
struct FfprobeFormat {
    format_name: Option<String>,
    duration: Option<String>,
}

impl MediaInfo {
    /// A description with no streams yet.
    pub fn new(path: impl Into<String>, duration: f64) -> Self {
        Self {
            path: path.into(),
            format: String::new(),
            duration,
            streams: Vec::new(),
        }
    }

    /// Append a stream spanning the whole file.
    pub fn with_stream(mut self, kind: TrackKind, codec: impl Into<String>) -> Self {
        self.streams.push(StreamInfo {
            index: self.streams.len(),
            kind,
            codec: codec.into(),
            duration: None,
        });
        self
    }

    /// Probe a media file with ffprobe.
    pub fn probe<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.to_string_lossy().to_string();

        if !path.exists() {
            return Err(TrimError::NotFound(format!("File not found: {}", path_str)));
        }

        let ffprobe = ffmpeg_sidecar::ffprobe::ffprobe_path();
        debug!(ffprobe = %ffprobe.display(), path = %path_str, "Probing media");
        let output = Command::new(&ffprobe)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .output()
            .map_err(|e| TrimError::Media(format!("Failed to spawn ffprobe: {e}")))?;

        if !output.status.success() {
            return Err(TrimError::Media(format!(
                "ffprobe failed on {}: {}",
                path_str,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let info = Self::from_ffprobe_json(&path_str, &output.stdout)?;
        info!(
            path = %path_str,
            duration = info.duration,
            video = info.has_video(),
            audio = info.has_audio(),
            "Probed media"
        );
        Ok(info)
    }

    /// Build from ffprobe's `-print_format json -show_format -show_streams` output.
    pub fn from_ffprobe_json(path: &str, data: &[u8]) -> Result<Self> {
        let raw: FfprobeOutput = serde_json::from_slice(data)
            .map_err(|e| TrimError::Serialization(format!("Invalid ffprobe output: {}", e)))?;

        let streams: Vec<StreamInfo> = raw
            .streams
            .into_iter()
            .filter_map(|s| {
                let kind = match s.codec_type.as_deref() {
                    Some("video") => TrackKind::Video,
                    Some("audio") => TrackKind::Audio,
                    _ => return None,
                };
                Some(StreamInfo {
                    index: s.index,
                    kind,
                    codec: s.codec_name.unwrap_or_else(|| "unknown".to_string()),
                    duration: s.duration.as_deref().and_then(parse_seconds),
                })
            })
            .collect();

        let format = raw.format.as_ref();
        let duration = format
            .and_then(|f| f.duration.as_deref())
            .and_then(parse_seconds)
            .or_else(|| streams.iter().filter_map(|s| s.duration).reduce(f64::max))
            .ok_or_else(|| TrimError::Media(format!("No duration reported for {}", path)))?;

        Ok(Self {
            path: path.to_string(),
            format: format
                .and_then(|f| f.format_name.clone())
                .unwrap_or_default(),
            duration,
            streams,
        })
    }

    /// Check if the file has video.
    pub fn has_video(&self) -> bool {
        self.streams.iter().any(|s| s.kind == TrackKind::Video)
    }

    /// Check if the file has audio.
    pub fn has_audio(&self) -> bool {
        self.streams.iter().any(|s| s.kind == TrackKind::Audio)
    }

    /// Streams of one kind, in container order.
    pub fn streams_of(&self, kind: TrackKind) -> impl Iterator<Item = &StreamInfo> {
        self.streams.iter().filter(move |s| s.kind == kind)
    }
}

fn parse_seconds(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}
