//! Local technical-metadata extraction.
//!
//! The pipeline only depends on [`LocalMetadataExtractor`]; the default
//! implementation reads Matroska containers through `cinedex-probe`.

use std::path::Path;

use cinedex_common::{Error, Result};

pub use cinedex_probe::{MediaReport, TrackFacts, TrackSet};

/// Extracts per-track technical facts from a media file.
///
/// Implementations do blocking I/O; async callers should run them on the
/// blocking pool.
pub trait LocalMetadataExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<MediaReport>;
}

/// Extractor for Matroska (`.mkv`) files.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatroskaExtractor;

impl LocalMetadataExtractor for MatroskaExtractor {
    fn extract(&self, path: &Path) -> Result<MediaReport> {
        cinedex_probe::probe_file(path).map_err(|e| Error::probe(e.to_string()))
    }
}

/// Probe a file with the default extractor.
pub fn probe_file(path: &Path) -> Result<MediaReport> {
    MatroskaExtractor.extract(path)
}
