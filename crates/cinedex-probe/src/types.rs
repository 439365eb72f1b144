//! Core types for per-track technical metadata

use serde::{Deserialize, Serialize};

/// Technical facts extracted from a media container.
///
/// Each track type is reported separately; a type with no tracks is an
/// explicit [`TrackSet::Absent`] rather than an empty list. A file that could
/// not be probed reports [`TrackSet::Unprobed`] for every type, so consumers
/// can tell "probed, nothing there" apart from "not probed".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaReport {
    /// Container format (e.g., "Matroska")
    pub container: String,
    /// File size in bytes
    pub file_size: u64,
    /// Duration in milliseconds
    pub duration_ms: Option<u64>,
    /// Video tracks
    pub video: TrackSet,
    /// Audio tracks
    pub audio: TrackSet,
    /// Subtitle tracks
    pub subtitles: TrackSet,
}

/// Tracks of one type, the explicit "no track" marker, or "not probed".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "status", content = "tracks", rename_all = "snake_case")]
pub enum TrackSet {
    /// The container carries no track of this type.
    #[default]
    Absent,
    /// One or more tracks, in container order.
    Present(Vec<TrackFacts>),
    /// The container could not be read, so nothing is known.
    Unprobed,
}

/// Facts about a single track.
///
/// Fields that do not apply to the track type (e.g. `channels` on a video
/// track) are `None`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackFacts {
    /// Track index in the container (0-based)
    pub index: u32,
    /// Display name: the track title if set, otherwise a synthesized label
    pub name: String,
    /// Language code
    pub language: Option<String>,
    /// Raw container codec identifier (e.g., "V_MPEGH/ISO/HEVC", "A_DTS")
    pub codec_id: String,
    /// Human-readable codec name (e.g., "HEVC", "DTS")
    pub codec_name: String,
    /// Width in pixels (video)
    pub pixel_width: Option<u32>,
    /// Height in pixels (video)
    pub pixel_height: Option<u32>,
    /// Frame rate (video)
    pub frame_rate: Option<f64>,
    /// Number of channels (audio)
    pub channels: Option<u8>,
    /// Sample rate in Hz (audio)
    pub sampling_frequency: Option<u32>,
    /// Bit depth (audio)
    pub bit_depth: Option<u8>,
    /// Whether this is the default track
    pub default: bool,
    /// Whether this is a forced track
    pub forced: bool,
}

impl TrackSet {
    /// Build a set from collected tracks, mapping an empty list to `Absent`.
    pub fn from_tracks(tracks: Vec<TrackFacts>) -> Self {
        if tracks.is_empty() {
            Self::Absent
        } else {
            Self::Present(tracks)
        }
    }

    /// Tracks in this set; empty when absent.
    pub fn tracks(&self) -> &[TrackFacts] {
        match self {
            Self::Absent | Self::Unprobed => &[],
            Self::Present(tracks) => tracks,
        }
    }

    /// First track, if any.
    pub fn first(&self) -> Option<&TrackFacts> {
        self.tracks().first()
    }

    /// Whether no track of this type exists.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Whether the file was never successfully probed.
    pub fn is_unprobed(&self) -> bool {
        matches!(self, Self::Unprobed)
    }
}

impl MediaReport {
    /// Report for a file that could not be probed: every track type unprobed.
    pub fn unavailable() -> Self {
        Self {
            container: String::new(),
            file_size: 0,
            duration_ms: None,
            video: TrackSet::Unprobed,
            audio: TrackSet::Unprobed,
            subtitles: TrackSet::Unprobed,
        }
    }

    /// Horizontal resolution of the first video track.
    pub fn resolution(&self) -> Option<u32> {
        self.video.first().and_then(|v| v.pixel_width)
    }

    /// Codec identifier of the first audio track.
    pub fn audio_codec(&self) -> Option<&str> {
        self.audio.first().map(|a| a.codec_id.as_str())
    }
}
