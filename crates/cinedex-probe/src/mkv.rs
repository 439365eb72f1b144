//! Matroska (MKV/WebM) track extraction

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use matroska::{Matroska, Settings, Track, Tracktype};

use crate::error::ProbeError;
use crate::types::{MediaReport, TrackFacts, TrackSet};

/// Probe a Matroska file
pub fn probe(path: &Path) -> Result<MediaReport, ProbeError> {
    let file = File::open(path)?;
    let file_size = file.metadata()?.len();
    let reader = BufReader::new(file);

    let mkv = Matroska::open(reader)
        .map_err(|e| ProbeError::ContainerParse(format!("MKV parse error: {}", e)))?;

    let duration_ms = mkv.info.duration.map(|d| d.as_millis() as u64);

    let mut video = Vec::new();
    let mut audio = Vec::new();
    let mut subtitles = Vec::new();

    for (idx, track) in mkv.tracks.iter().enumerate() {
        let mut facts = base_facts(idx as u32, track);

        match &track.settings {
            Settings::Video(v) => {
                facts.pixel_width = Some(v.pixel_width as u32);
                facts.pixel_height = Some(v.pixel_height as u32);
                facts.frame_rate = track
                    .default_duration
                    .filter(|d| !d.is_zero())
                    .map(|d| 1.0 / d.as_secs_f64());
                video.push(facts);
            }
            Settings::Audio(a) => {
                facts.channels = Some(a.channels as u8);
                facts.sampling_frequency = Some(a.sample_rate as u32);
                facts.bit_depth = a.bit_depth.map(|b| b as u8);
                audio.push(facts);
            }
            Settings::None => {
                if track.tracktype == Tracktype::Subtitle {
                    subtitles.push(facts);
                }
            }
        }
    }

    Ok(MediaReport {
        container: "Matroska".to_string(),
        file_size,
        duration_ms,
        video: TrackSet::from_tracks(video),
        audio: TrackSet::from_tracks(audio),
        subtitles: TrackSet::from_tracks(subtitles),
    })
}

fn base_facts(index: u32, track: &Track) -> TrackFacts {
    let codec_name = codec_id_to_name(&track.codec_id);
    let language = track.language.as_ref().map(|l| l.to_string());

    TrackFacts {
        index,
        name: track
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| display_label(&codec_name, language.as_deref())),
        language,
        codec_id: track.codec_id.clone(),
        codec_name,
        default: track.default,
        forced: track.forced,
        ..Default::default()
    }
}

/// Label for a track without a title, e.g. "DTS (eng)".
fn display_label(codec_name: &str, language: Option<&str>) -> String {
    match language {
        Some(lang) if !lang.is_empty() => format!("{} ({})", codec_name, lang),
        _ => codec_name.to_string(),
    }
}

/// Convert MKV codec ID to human-readable name
pub(crate) fn codec_id_to_name(codec_id: &str) -> String {
    let name = match codec_id {
        "V_MPEG4/ISO/AVC" => "AVC",
        "V_MPEGH/ISO/HEVC" => "HEVC",
        "V_AV1" => "AV1",
        "V_VP8" => "VP8",
        "V_VP9" => "VP9",
        "V_MPEG2" => "MPEG-2",
        "V_MPEG4/ISO/SP" | "V_MPEG4/ISO/ASP" | "V_MPEG4/ISO/AP" => "MPEG-4",

        "A_AAC" | "A_AAC/MPEG2/LC" | "A_AAC/MPEG4/LC" | "A_AAC/MPEG4/LC/SBR" => "AAC",
        "A_AC3" => "AC-3",
        "A_EAC3" => "E-AC-3",
        "A_DTS" => "DTS",
        "A_DTS/LOSSLESS" => "DTS-HD MA",
        "A_TRUEHD" => "TrueHD",
        "A_FLAC" => "FLAC",
        "A_OPUS" => "Opus",
        "A_VORBIS" => "Vorbis",
        "A_PCM/INT/LIT" | "A_PCM/INT/BIG" => "PCM",
        "A_MPEG/L3" => "MP3",

        "S_TEXT/UTF8" => "SRT",
        "S_TEXT/SSA" | "S_TEXT/ASS" => "ASS",
        "S_HDMV/PGS" => "PGS",
        "S_VOBSUB" => "VobSub",
        "S_TEXT/WEBVTT" => "WebVTT",

        other => other
            .strip_prefix("V_")
            .or_else(|| other.strip_prefix("A_"))
            .or_else(|| other.strip_prefix("S_"))
            .unwrap_or(other),
    };
    name.to_string()
}
