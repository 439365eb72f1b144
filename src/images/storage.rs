//! Filesystem-level image storage.
//!
//! Every image is decoded and re-encoded to JPEG, then written next to its
//! final location and renamed into place, so readers never observe a
//! half-written file. Paths are deterministic:
//!
//! - movie images: `{base_dir}/{movie_id}_{kind}.jpg`
//! - headshots: `{base_dir}/cast/{person_id}.jpg`

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use cinedex_common::{Error, ImageKind, MovieId, PersonId, Result};
use image::{DynamicImage, ImageFormat};
use tempfile::NamedTempFile;

/// Directory holding cached headshots, relative to the base directory.
const CAST_DIR: &str = "cast";

/// Filesystem manager for cached images.
#[derive(Debug, Clone)]
pub struct ImageStorage {
    base_dir: PathBuf,
}

impl ImageStorage {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Location of a movie image of the given kind.
    pub fn movie_image_path(&self, movie_id: MovieId, kind: ImageKind) -> PathBuf {
        self.base_dir.join(format!("{}_{}.jpg", movie_id, kind))
    }

    /// Location of a person's headshot.
    pub fn headshot_path(&self, person_id: PersonId) -> PathBuf {
        self.base_dir.join(CAST_DIR).join(format!("{}.jpg", person_id))
    }

    /// Re-encode and store a movie image, returning where it landed.
    pub fn store_movie_image(
        &self,
        movie_id: MovieId,
        kind: ImageKind,
        data: &[u8],
    ) -> Result<PathBuf> {
        let target = self.movie_image_path(movie_id, kind);
        write_atomic(&target, &encode_jpeg(data)?)?;
        Ok(target)
    }

    /// Re-encode and store a headshot, replacing any previous file.
    pub fn store_headshot(&self, person_id: PersonId, data: &[u8]) -> Result<PathBuf> {
        let target = self.headshot_path(person_id);
        write_atomic(&target, &encode_jpeg(data)?)?;
        Ok(target)
    }
}

/// Decode arbitrary image bytes and encode them as baseline JPEG.
fn encode_jpeg(data: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory(data)
        .map_err(|e| Error::asset(format!("undecodable image: {}", e)))?;

    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut buf = Cursor::new(Vec::new());
    rgb.write_to(&mut buf, ImageFormat::Jpeg)
        .map_err(|e| Error::asset(format!("failed to encode JPEG: {}", e)))?;
    Ok(buf.into_inner())
}

/// Write `bytes` to a temp file in the target's directory, then rename it over `target`.
fn write_atomic(target: &Path, bytes: &[u8]) -> Result<()> {
    let dir = target
        .parent()
        .ok_or_else(|| Error::internal(format!("no parent directory for {}", target.display())))?;
    std::fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| Error::Io(e.error))?;
    Ok(())
}
