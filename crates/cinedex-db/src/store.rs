//! The [`Store`] trait and its SQLite implementation.
//!
//! The ingestion pipeline talks to persistence only through this trait, so
//! tests and alternative backends can stand in for SQLite. Every write is an
//! upsert keyed by the collection's id; the only delete is directory removal.

use std::path::Path;

use cinedex_common::{ImageKind, MovieId, PersonId, Result};

use crate::models::{CastMember, Directory, ImageAsset, MovieRecord};
use crate::pool::{get_conn, DbPool};
use crate::queries::{cast, directories, images, movies, name_index};

/// Document store holding movies, directories, images, cast and the name index.
///
/// Implementations must be safe to share across threads (`Send + Sync`).
pub trait Store: Send + Sync {
    /// Add a watched directory, or update the flags of an existing path.
    fn add_directory(&self, path: &str, recursive: bool, depth: Option<u32>) -> Result<Directory>;

    /// Remove a watched directory. Movies found under it are kept.
    fn remove_directory(&self, path: &str) -> Result<bool>;

    /// All watched directories, ordered by path.
    fn list_directories(&self) -> Result<Vec<Directory>>;

    /// The most specific watched directory containing `file`.
    fn find_directory_for_file(&self, file: &Path) -> Result<Option<Directory>> {
        let best = self
            .list_directories()?
            .into_iter()
            .filter(|dir| file.starts_with(&dir.path))
            .max_by_key(|dir| Path::new(&dir.path).components().count());
        Ok(best)
    }

    fn movie_exists(&self, id: MovieId) -> Result<bool>;

    fn get_movie(&self, id: MovieId) -> Result<Option<MovieRecord>>;

    /// Find a movie by the file name or full path of its source file.
    fn find_movie_by_file_name(&self, name: &str) -> Result<Option<MovieRecord>>;

    fn list_movies(&self) -> Result<Vec<MovieRecord>>;

    /// Write the fully built record in one statement.
    fn upsert_movie(&self, movie: &MovieRecord) -> Result<()>;

    fn get_image(&self, movie_id: MovieId, kind: ImageKind) -> Result<Option<ImageAsset>>;

    fn get_images(&self, movie_id: MovieId) -> Result<Vec<ImageAsset>>;

    fn upsert_image(&self, image: &ImageAsset) -> Result<()>;

    fn upsert_cast_member(&self, member: &CastMember) -> Result<()>;

    fn get_cast_member(&self, id: PersonId) -> Result<Option<CastMember>>;

    /// Identity previously resolved for a normalized title.
    fn lookup_name(&self, title: &str) -> Result<Option<MovieId>>;

    /// Record a title's identity; the first write for a title wins.
    fn record_name(&self, title: &str, movie_id: MovieId) -> Result<bool>;
}

/// [`Store`] backed by an r2d2 pool of SQLite connections.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl Store for SqliteStore {
    fn add_directory(&self, path: &str, recursive: bool, depth: Option<u32>) -> Result<Directory> {
        let conn = get_conn(&self.pool)?;
        directories::upsert_directory(&conn, path, recursive, depth)
    }

    fn remove_directory(&self, path: &str) -> Result<bool> {
        let conn = get_conn(&self.pool)?;
        directories::delete_directory_by_path(&conn, path)
    }

    fn list_directories(&self) -> Result<Vec<Directory>> {
        let conn = get_conn(&self.pool)?;
        directories::list_directories(&conn)
    }

    fn movie_exists(&self, id: MovieId) -> Result<bool> {
        let conn = get_conn(&self.pool)?;
        movies::movie_exists(&conn, id)
    }

    fn get_movie(&self, id: MovieId) -> Result<Option<MovieRecord>> {
        let conn = get_conn(&self.pool)?;
        movies::get_movie(&conn, id)
    }

    fn find_movie_by_file_name(&self, name: &str) -> Result<Option<MovieRecord>> {
        let conn = get_conn(&self.pool)?;
        movies::find_movie_by_file_name(&conn, name)
    }

    fn list_movies(&self) -> Result<Vec<MovieRecord>> {
        let conn = get_conn(&self.pool)?;
        movies::list_movies(&conn)
    }

    fn upsert_movie(&self, movie: &MovieRecord) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        movies::upsert_movie(&conn, movie)
    }

    fn get_image(&self, movie_id: MovieId, kind: ImageKind) -> Result<Option<ImageAsset>> {
        let conn = get_conn(&self.pool)?;
        images::get_image(&conn, movie_id, kind)
    }

    fn get_images(&self, movie_id: MovieId) -> Result<Vec<ImageAsset>> {
        let conn = get_conn(&self.pool)?;
        images::get_images_for_movie(&conn, movie_id)
    }

    fn upsert_image(&self, image: &ImageAsset) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        images::upsert_image(&conn, image)
    }

    fn upsert_cast_member(&self, member: &CastMember) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        cast::upsert_cast_member(&conn, member)
    }

    fn get_cast_member(&self, id: PersonId) -> Result<Option<CastMember>> {
        let conn = get_conn(&self.pool)?;
        cast::get_cast_member(&conn, id)
    }

    fn lookup_name(&self, title: &str) -> Result<Option<MovieId>> {
        let conn = get_conn(&self.pool)?;
        name_index::lookup(&conn, title)
    }

    fn record_name(&self, title: &str, movie_id: MovieId) -> Result<bool> {
        let conn = get_conn(&self.pool)?;
        name_index::record(&conn, title, movie_id)
    }
}
