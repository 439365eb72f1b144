//! Cast member database queries.
//!
//! Columns are the stored subset of the credits field table.

use std::sync::LazyLock;

use cinedex_common::{CastField, Error, PersonId, Result};
use rusqlite::types::{ToSql, Value};
use rusqlite::{Connection, OptionalExtension};

use crate::models::{stored_column, CastMember};

/// Stored cast columns, in field-table order.
static COLUMNS: LazyLock<Vec<&'static str>> =
    LazyLock::new(|| CastField::ALL.into_iter().filter_map(CastField::column).collect());

static SELECT_CAST: LazyLock<String> = LazyLock::new(|| {
    format!(
        "SELECT {} FROM cast_members WHERE {} = ?",
        COLUMNS.join(", "),
        stored_column(CastField::Id.column())
    )
});

static UPSERT_CAST: LazyLock<String> = LazyLock::new(|| {
    let id = stored_column(CastField::Id.column());
    let headshot = stored_column(CastField::ProfilePath.column());
    let placeholders = COLUMNS
        .iter()
        .map(|c| format!(":{}", c))
        .collect::<Vec<_>>()
        .join(", ");
    // A failed headshot download keeps the previously cached file.
    let updates = COLUMNS
        .iter()
        .filter(|c| **c != id)
        .map(|c| {
            if *c == headshot {
                format!("{0} = COALESCE(excluded.{0}, cast_members.{0})", c)
            } else {
                format!("{0} = excluded.{0}", c)
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO cast_members ({}) VALUES ({}) ON CONFLICT({}) DO UPDATE SET {}",
        COLUMNS.join(", "),
        placeholders,
        id,
        updates
    )
});

/// Insert a cast member or refresh every column of an existing one.
pub fn upsert_cast_member(conn: &Connection, member: &CastMember) -> Result<()> {
    let values = column_values(member);
    let names: Vec<String> = values
        .iter()
        .map(|(column, _)| format!(":{}", column))
        .collect();
    let params: Vec<(&str, &dyn ToSql)> = names
        .iter()
        .zip(&values)
        .map(|(name, (_, value))| (name.as_str(), value as &dyn ToSql))
        .collect();

    conn.execute(&UPSERT_CAST, params.as_slice())
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(())
}

/// Get a cast member by person id.
pub fn get_cast_member(conn: &Connection, id: PersonId) -> Result<Option<CastMember>> {
    conn.query_row(&SELECT_CAST, [id.get() as i64], CastMember::from_row)
        .optional()
        .map_err(|e| Error::database(e.to_string()))
}

/// Value of every stored column, keyed by column name.
fn column_values(member: &CastMember) -> Vec<(&'static str, Value)> {
    CastField::ALL
        .into_iter()
        .filter_map(|field| {
            let value: Value = match field {
                CastField::Id => Value::Integer(member.id.get() as i64),
                CastField::Adult => member.adult.into(),
                CastField::Gender => member.gender.into(),
                CastField::KnownForDepartment => member.known_for.clone().into(),
                CastField::Name => member.name_now.clone().into(),
                CastField::OriginalName => member.name_before.clone().into(),
                CastField::Popularity => member.popularity.into(),
                CastField::ProfilePath => member.headshot_path.clone().into(),
                CastField::Character => return None,
            };
            field.column().map(|column| (column, value))
        })
        .collect()
}
