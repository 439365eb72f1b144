//! Internal Rust models matching the database schema.
//!
//! Each model has a `from_row` constructor. Directories and images expect the
//! column order of their query module; movies and cast members are read by
//! the column names of their field tables.

use chrono::{DateTime, Utc};
use cinedex_common::{
    CastField, DirectoryId, ImageKind, InternalField, MovieField, MovieId, PersonId,
};
use rusqlite::types::Type;
use rusqlite::Row;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A watched directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Directory {
    pub id: DirectoryId,
    pub path: String,
    pub recursive: bool,
    /// Maximum levels below `path` to descend when `recursive` is set.
    /// `None` means unbounded.
    pub depth: Option<u32>,
}

impl Directory {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_uuid(row, 0)?.into(),
            path: row.get(1)?,
            recursive: row.get(2)?,
            depth: row.get(3)?,
        })
    }
}

/// One credited role on a movie: the person and the character they play.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CastCredit {
    pub person_id: PersonId,
    pub character: Option<String>,
}

/// A fully built movie record, written in a single upsert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRecord {
    pub id: MovieId,
    pub directory_id: Option<DirectoryId>,
    pub file_path: String,
    /// Per-track technical report, stored as JSON.
    pub metadata: Value,
    pub v_resolution: Option<u32>,
    pub a_codec: Option<String>,
    pub adult: Option<bool>,
    pub genres: Value,
    pub title: Option<String>,
    pub release_date: Option<String>,
    /// Remote detail fields without a dedicated column.
    pub misc_info: Map<String, Value>,
    /// Credits in billing order.
    pub cast: Vec<CastCredit>,
    pub updated_at: DateTime<Utc>,
}

impl MovieRecord {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let internal = |field: InternalField| column_index(row, field.column());
        let keyable = |field: MovieField| column_index(row, stored_column(field.column()));

        let directory_idx = internal(InternalField::DirectoryId)?;
        let directory_id = row
            .get::<_, Option<String>>(directory_idx)?
            .map(|s| {
                Uuid::parse_str(&s)
                    .map(DirectoryId::from)
                    .map_err(|e| conversion_error(directory_idx, e))
            })
            .transpose()?;

        Ok(Self {
            id: MovieId::new(row.get::<_, i64>(ID_COLUMN)? as u64),
            directory_id,
            file_path: row.get(internal(InternalField::FilePath)?)?,
            metadata: json_column(row, internal(InternalField::Metadata)?)?,
            v_resolution: row.get(internal(InternalField::VResolution)?)?,
            a_codec: row.get(internal(InternalField::ACodec)?)?,
            adult: row.get(keyable(MovieField::Adult)?)?,
            genres: json_column(row, keyable(MovieField::Genres)?)?,
            title: row.get(keyable(MovieField::Title)?)?,
            release_date: row.get(keyable(MovieField::ReleaseDate)?)?,
            misc_info: json_column(row, internal(InternalField::MiscInfo)?)?,
            cast: json_column(row, internal(InternalField::Cast)?)?,
            updated_at: parse_timestamp(row, column_index(row, UPDATED_AT_COLUMN)?)?,
        })
    }
}

/// A cached image for one (movie, kind) key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageAsset {
    pub movie_id: MovieId,
    pub kind: ImageKind,
    /// Local file reference.
    pub path: String,
}

impl ImageAsset {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let kind: String = row.get(1)?;
        Ok(Self {
            movie_id: MovieId::new(row.get::<_, i64>(0)? as u64),
            kind: kind
                .parse()
                .map_err(|e: String| conversion_error(1, std::io::Error::other(e)))?,
            path: row.get(2)?,
        })
    }
}

/// A cast member shared by every movie that credits them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastMember {
    pub id: PersonId,
    pub adult: Option<bool>,
    pub gender: Option<i64>,
    pub known_for: Option<String>,
    pub name_now: Option<String>,
    pub name_before: Option<String>,
    pub popularity: Option<f64>,
    pub headshot_path: Option<String>,
}

impl CastMember {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let column = |field: CastField| column_index(row, stored_column(field.column()));

        Ok(Self {
            id: PersonId::new(row.get::<_, i64>(column(CastField::Id)?)? as u64),
            adult: row.get(column(CastField::Adult)?)?,
            gender: row.get(column(CastField::Gender)?)?,
            known_for: row.get(column(CastField::KnownForDepartment)?)?,
            name_now: row.get(column(CastField::Name)?)?,
            name_before: row.get(column(CastField::OriginalName)?)?,
            popularity: row.get(column(CastField::Popularity)?)?,
            headshot_path: row.get(column(CastField::ProfilePath)?)?,
        })
    }
}

/// Primary key of the movies table.
pub(crate) const ID_COLUMN: &str = "id";
/// Write timestamp of the movies table.
pub(crate) const UPDATED_AT_COLUMN: &str = "updated_at";

/// Name of a field's own column. Fields without one map to an empty name,
/// which no statement selects, so reading them fails as an unknown column.
pub(crate) fn stored_column(column: Option<&'static str>) -> &'static str {
    column.unwrap_or_default()
}

fn column_index(row: &Row<'_>, name: &str) -> rusqlite::Result<usize> {
    row.as_ref().column_index(name)
}

fn parse_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let s: String = row.get(idx)?;
    Uuid::parse_str(&s).map_err(|e| conversion_error(idx, e))
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let s: String = row.get(idx)?;
    serde_json::from_str(&s).map_err(|e| conversion_error(idx, e))
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}
