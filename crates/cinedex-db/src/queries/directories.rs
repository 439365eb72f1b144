//! Directory database queries.
//!
//! Directories are keyed by path: adding a path that already exists updates
//! its flags and keeps its id.

use cinedex_common::{DirectoryId, Error, Result};
use rusqlite::{Connection, OptionalExtension};

use crate::models::Directory;

const DIRECTORY_COLUMNS: &str = "id, path, recursive, depth";

/// Insert a directory or update the flags of an existing one with the same path.
pub fn upsert_directory(
    conn: &Connection,
    path: &str,
    recursive: bool,
    depth: Option<u32>,
) -> Result<Directory> {
    let id = DirectoryId::new();

    conn.execute(
        "INSERT INTO directories (id, path, recursive, depth)
         VALUES (:id, :path, :recursive, :depth)
         ON CONFLICT(path) DO UPDATE SET
            recursive = excluded.recursive,
            depth = excluded.depth",
        rusqlite::named_params! {
            ":id": id.to_string(),
            ":path": path,
            ":recursive": recursive,
            ":depth": depth,
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    get_directory_by_path(conn, path)?
        .ok_or_else(|| Error::internal(format!("directory {} vanished after upsert", path)))
}

/// Get a directory by its path.
pub fn get_directory_by_path(conn: &Connection, path: &str) -> Result<Option<Directory>> {
    conn.query_row(
        &format!("SELECT {} FROM directories WHERE path = ?", DIRECTORY_COLUMNS),
        [path],
        Directory::from_row,
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// List all directories, ordered by path.
pub fn list_directories(conn: &Connection) -> Result<Vec<Directory>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {} FROM directories ORDER BY path",
            DIRECTORY_COLUMNS
        ))
        .map_err(|e| Error::database(e.to_string()))?;

    let directories = stmt
        .query_map([], Directory::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(directories)
}

/// Delete a directory by path.
///
/// Movies that referenced it keep their records with a null back-reference.
/// Returns `false` if no directory had that path.
pub fn delete_directory_by_path(conn: &Connection, path: &str) -> Result<bool> {
    let rows = conn
        .execute("DELETE FROM directories WHERE path = ?", [path])
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(rows > 0)
}
