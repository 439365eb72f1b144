//! # cinedex-probe
//!
//! Pure Rust Matroska probing into per-track technical facts.
//!
//! ```no_run
//! let report = cinedex_probe::probe_file("movie.mkv").unwrap();
//!
//! println!("Container: {}", report.container);
//! for video in report.video.tracks() {
//!     println!("Video: {} {:?}x{:?}", video.codec_name, video.pixel_width, video.pixel_height);
//! }
//! if report.subtitles.is_absent() {
//!     println!("No subtitles");
//! }
//! ```

pub mod error;
mod mkv;
pub mod types;

pub use error::ProbeError;
pub use types::*;

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// EBML header magic shared by every Matroska/WebM file.
const EBML_MAGIC: [u8; 4] = [0x1A, 0x45, 0xDF, 0xA3];

/// Probe a media file and extract per-track facts.
///
/// Only Matroska containers are understood; anything else yields
/// [`ProbeError::UnsupportedContainer`].
pub fn probe_file<P: AsRef<Path>>(path: P) -> Result<MediaReport, ProbeError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ProbeError::FileNotFound(path.to_path_buf()));
    }

    if !is_matroska(path)? {
        return Err(ProbeError::UnsupportedContainer(
            "Unable to detect Matroska header".to_string(),
        ));
    }

    mkv::probe(path)
}

fn is_matroska(path: &Path) -> Result<bool, ProbeError> {
    let mut file = File::open(path)?;
    let mut magic = [0u8; 4];
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(magic == EBML_MAGIC),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e.into()),
    }
}
