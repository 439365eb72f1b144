//! Image database queries.

use cinedex_common::{Error, ImageKind, MovieId, Result};
use rusqlite::{Connection, OptionalExtension};

use crate::models::ImageAsset;

/// Get the cached image for one (movie, kind) key.
pub fn get_image(conn: &Connection, movie_id: MovieId, kind: ImageKind) -> Result<Option<ImageAsset>> {
    conn.query_row(
        "SELECT movie_id, kind, path FROM images WHERE movie_id = ? AND kind = ?",
        rusqlite::params![movie_id.get() as i64, kind.as_str()],
        ImageAsset::from_row,
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// Get every cached image for a movie, poster first.
pub fn get_images_for_movie(conn: &Connection, movie_id: MovieId) -> Result<Vec<ImageAsset>> {
    let mut stmt = conn
        .prepare(
            "SELECT movie_id, kind, path FROM images
             WHERE movie_id = ?
             ORDER BY CASE kind WHEN 'poster' THEN 0 ELSE 1 END",
        )
        .map_err(|e| Error::database(e.to_string()))?;

    let images = stmt
        .query_map([movie_id.get() as i64], ImageAsset::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(images)
}

/// Record the local file for a (movie, kind) key, replacing any previous path.
pub fn upsert_image(conn: &Connection, image: &ImageAsset) -> Result<()> {
    conn.execute(
        "INSERT INTO images (movie_id, kind, path) VALUES (?, ?, ?)
         ON CONFLICT(movie_id, kind) DO UPDATE SET path = excluded.path",
        rusqlite::params![image.movie_id.get() as i64, image.kind.as_str(), image.path],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(())
}
