//! Movie database queries.
//!
//! A movie row is the fully assembled record for one canonical identity.
//! It is only ever written whole, by [`upsert_movie`]. The column list is
//! derived from the internal and keyable field tables.

use std::sync::LazyLock;

use cinedex_common::{Error, InternalField, MovieField, MovieId, Result};
use rusqlite::types::{ToSql, Value};
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;

use crate::models::{MovieRecord, ID_COLUMN, UPDATED_AT_COLUMN};

/// Every stored movie column, in select order.
static COLUMNS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    std::iter::once(ID_COLUMN)
        .chain(InternalField::ALL.into_iter().map(InternalField::column))
        .chain(MovieField::KEYABLE.into_iter().filter_map(MovieField::column))
        .chain(std::iter::once(UPDATED_AT_COLUMN))
        .collect()
});

static MOVIE_COLUMNS: LazyLock<String> = LazyLock::new(|| {
    COLUMNS
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ")
});

static UPSERT_MOVIE: LazyLock<String> = LazyLock::new(|| {
    let placeholders = COLUMNS
        .iter()
        .map(|c| format!(":{}", c))
        .collect::<Vec<_>>()
        .join(", ");
    let updates = COLUMNS
        .iter()
        .filter(|c| **c != ID_COLUMN)
        .map(|c| format!("\"{0}\" = excluded.\"{0}\"", c))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO movies ({}) VALUES ({}) ON CONFLICT(\"{}\") DO UPDATE SET {}",
        *MOVIE_COLUMNS, placeholders, ID_COLUMN, updates
    )
});

/// Check whether a record exists for the identity.
pub fn movie_exists(conn: &Connection, id: MovieId) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM movies WHERE id = ?)",
        [id.get() as i64],
        |row| row.get(0),
    )
    .map_err(|e| Error::database(e.to_string()))
}

/// Get a movie by its canonical identity.
pub fn get_movie(conn: &Connection, id: MovieId) -> Result<Option<MovieRecord>> {
    conn.query_row(
        &format!("SELECT {} FROM movies WHERE id = ?", *MOVIE_COLUMNS),
        [id.get() as i64],
        MovieRecord::from_row,
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// Find a movie by the file name (or full path) of its source file.
pub fn find_movie_by_file_name(conn: &Connection, name: &str) -> Result<Option<MovieRecord>> {
    conn.query_row(
        &format!(
            "SELECT {} FROM movies
             WHERE file_path = :name
                OR substr(file_path, -length(:name) - 1) = '/' || :name
             ORDER BY id LIMIT 1",
            *MOVIE_COLUMNS
        ),
        rusqlite::named_params! { ":name": name },
        MovieRecord::from_row,
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// List all movies, ordered by identity.
pub fn list_movies(conn: &Connection) -> Result<Vec<MovieRecord>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {} FROM movies ORDER BY id", *MOVIE_COLUMNS))
        .map_err(|e| Error::database(e.to_string()))?;

    let movies = stmt
        .query_map([], MovieRecord::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(movies)
}

/// Insert or fully replace the record for `movie.id`.
pub fn upsert_movie(conn: &Connection, movie: &MovieRecord) -> Result<()> {
    let values = column_values(movie)?;
    let names: Vec<String> = values
        .iter()
        .map(|(column, _)| format!(":{}", column))
        .collect();
    let params: Vec<(&str, &dyn ToSql)> = names
        .iter()
        .zip(&values)
        .map(|(name, (_, value))| (name.as_str(), value as &dyn ToSql))
        .collect();

    conn.execute(&UPSERT_MOVIE, params.as_slice())
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(())
}

/// Value of every stored column, keyed by column name.
fn column_values(movie: &MovieRecord) -> Result<Vec<(&'static str, Value)>> {
    let mut values = vec![(ID_COLUMN, Value::Integer(movie.id.get() as i64))];

    for field in InternalField::ALL {
        let value = match field {
            InternalField::DirectoryId => movie.directory_id.map(|id| id.to_string()).into(),
            InternalField::FilePath => movie.file_path.clone().into(),
            InternalField::Metadata => to_json(&movie.metadata)?.into(),
            InternalField::VResolution => movie.v_resolution.map(i64::from).into(),
            InternalField::ACodec => movie.a_codec.clone().into(),
            InternalField::Cast => to_json(&movie.cast)?.into(),
            InternalField::MiscInfo => to_json(&movie.misc_info)?.into(),
        };
        values.push((field.column(), value));
    }

    for field in MovieField::KEYABLE {
        let Some(column) = field.column() else {
            continue;
        };
        let value = match field {
            MovieField::Adult => movie.adult.into(),
            MovieField::Genres => to_json(&movie.genres)?.into(),
            MovieField::Title => movie.title.clone().into(),
            MovieField::ReleaseDate => movie.release_date.clone().into(),
            other => {
                return Err(Error::internal(format!(
                    "keyable field {} has no record value",
                    other
                )))
            }
        };
        values.push((column, value));
    }

    values.push((UPDATED_AT_COLUMN, movie.updated_at.to_rfc3339().into()));
    Ok(values)
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CastCredit;
    use crate::pool::init_memory_pool;
    use crate::queries::directories;
    use chrono::Utc;
    use cinedex_common::PersonId;
    use serde_json::json;

    fn record(id: u64, file_path: &str) -> MovieRecord {
        let mut misc = serde_json::Map::new();
        misc.insert("runtime".into(), json!(102));
        MovieRecord {
            id: MovieId::new(id),
            directory_id: None,
            file_path: file_path.to_string(),
            metadata: json!({"video": {"status": "absent"}}),
            v_resolution: Some(1920),
            a_codec: Some("A_AC3".into()),
            adult: Some(false),
            genres: json!([{"id": 18, "name": "Drama"}]),
            title: Some("Heat".into()),
            release_date: Some("1995-12-15".into()),
            misc_info: misc,
            cast: vec![
                CastCredit {
                    person_id: PersonId::new(1158),
                    character: Some("Lt. Vincent Hanna".into()),
                },
                CastCredit {
                    person_id: PersonId::new(380),
                    character: Some("Neil McCauley".into()),
                },
            ],
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_upsert_and_get_round_trips_every_column() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let movie = record(949, "/lib/Heat (1995).mkv");
        upsert_movie(&conn, &movie).unwrap();

        let stored = get_movie(&conn, movie.id).unwrap().unwrap();
        assert_eq!(stored.file_path, movie.file_path);
        assert_eq!(stored.genres, movie.genres);
        assert_eq!(stored.misc_info, movie.misc_info);
        assert_eq!(stored.cast, movie.cast);
        assert_eq!(stored.v_resolution, Some(1920));
        assert!(movie_exists(&conn, movie.id).unwrap());
        assert!(!movie_exists(&conn, MovieId::new(1)).unwrap());
    }

    #[test]
    fn test_columns_follow_field_tables() {
        for field in InternalField::ALL {
            assert!(COLUMNS.contains(&field.column()));
        }
        for field in MovieField::KEYABLE {
            assert!(COLUMNS.contains(&field.column().unwrap()));
        }
        assert!(!COLUMNS.contains(&"runtime"));
        assert!(MOVIE_COLUMNS.contains("\"cast\""));

        let movie = record(949, "/lib/Heat (1995).mkv");
        let bound: Vec<_> = column_values(&movie)
            .unwrap()
            .into_iter()
            .map(|(column, _)| column)
            .collect();
        assert_eq!(bound, *COLUMNS);
    }

    #[test]
    fn test_upsert_is_idempotent_and_replaces() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let mut movie = record(949, "/lib/Heat (1995).mkv");
        upsert_movie(&conn, &movie).unwrap();
        upsert_movie(&conn, &movie).unwrap();

        movie.file_path = "/other/Heat (1995).mkv".into();
        upsert_movie(&conn, &movie).unwrap();

        let all = list_movies(&conn).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].file_path, "/other/Heat (1995).mkv");
    }

    #[test]
    fn test_find_by_file_name() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        upsert_movie(&conn, &record(949, "/lib/Heat (1995).mkv")).unwrap();
        upsert_movie(&conn, &record(950, "/lib/Not Heat (1995).mkv")).unwrap();

        let found = find_movie_by_file_name(&conn, "Heat (1995).mkv")
            .unwrap()
            .unwrap();
        assert_eq!(found.id, MovieId::new(949));

        let by_path = find_movie_by_file_name(&conn, "/lib/Not Heat (1995).mkv")
            .unwrap()
            .unwrap();
        assert_eq!(by_path.id, MovieId::new(950));

        assert!(find_movie_by_file_name(&conn, "eat (1995).mkv")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_directory_removal_nulls_back_reference() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let dir = directories::upsert_directory(&conn, "/lib", false, Some(0)).unwrap();
        let mut movie = record(949, "/lib/Heat (1995).mkv");
        movie.directory_id = Some(dir.id);
        upsert_movie(&conn, &movie).unwrap();

        directories::delete_directory_by_path(&conn, "/lib").unwrap();

        let stored = get_movie(&conn, movie.id).unwrap().unwrap();
        assert_eq!(stored.directory_id, None);
        assert_eq!(stored.title.as_deref(), Some("Heat"));
    }
}
