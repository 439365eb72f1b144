//! Name index queries: normalized local title to canonical identity.
//!
//! Entries are write-once; recording a title that is already present is a
//! no-op and the first identity wins.

use cinedex_common::{Error, MovieId, Result};
use rusqlite::{Connection, OptionalExtension};

/// Look up the identity previously resolved for a normalized title.
pub fn lookup(conn: &Connection, title: &str) -> Result<Option<MovieId>> {
    conn.query_row(
        "SELECT movie_id FROM name_index WHERE title = ?",
        [title],
        |row| row.get::<_, i64>(0),
    )
    .optional()
    .map(|id| id.map(|id| MovieId::new(id as u64)))
    .map_err(|e| Error::database(e.to_string()))
}

/// Record a title's identity unless the title is already indexed.
///
/// Returns `true` if a new entry was written.
pub fn record(conn: &Connection, title: &str, movie_id: MovieId) -> Result<bool> {
    let rows = conn
        .execute(
            "INSERT OR IGNORE INTO name_index (title, movie_id) VALUES (?, ?)",
            rusqlite::params![title, movie_id.get() as i64],
        )
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(rows > 0)
}
