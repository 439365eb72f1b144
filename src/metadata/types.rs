//! Structured data returned by metadata providers.

use std::collections::BTreeMap;

use cinedex_common::{ImageKind, MovieField, MovieId, PersonId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A movie-detail payload, kept as the raw JSON object.
///
/// Only the fields named by [`MovieField`] are interpreted; everything else
/// passes through to the misc bag untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieDetail(Map<String, Value>);

/// The detail fields promoted to their own store columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyableInfo {
    pub adult: Option<bool>,
    pub genres: Value,
    pub title: Option<String>,
    pub release_date: Option<String>,
}

impl MovieDetail {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Raw value of a known field.
    pub fn get(&self, field: MovieField) -> Option<&Value> {
        self.0.get(field.wire_name())
    }

    pub fn id(&self) -> Option<MovieId> {
        self.get(MovieField::Id)
            .and_then(Value::as_u64)
            .map(MovieId::new)
    }

    pub fn title(&self) -> Option<&str> {
        self.get(MovieField::Title).and_then(Value::as_str)
    }

    /// Remove the poster and backdrop paths from the payload.
    ///
    /// A kind whose path is null or missing maps to `None`.
    pub fn take_image_paths(&mut self) -> BTreeMap<ImageKind, Option<String>> {
        ImageKind::ALL
            .into_iter()
            .map(|kind| {
                let path = self
                    .0
                    .remove(kind.source_field().wire_name())
                    .and_then(|v| v.as_str().map(String::from))
                    .filter(|p| !p.is_empty());
                (kind, path)
            })
            .collect()
    }

    /// Split into the keyable subset and the misc bag holding everything else.
    pub fn into_parts(mut self) -> (KeyableInfo, Map<String, Value>) {
        let mut take = |field: MovieField| self.0.remove(field.wire_name());

        let keyable = KeyableInfo {
            adult: take(MovieField::Adult).and_then(|v| v.as_bool()),
            genres: take(MovieField::Genres).unwrap_or_else(|| Value::Array(Vec::new())),
            title: take(MovieField::Title).and_then(|v| v.as_str().map(String::from)),
            release_date: take(MovieField::ReleaseDate)
                .and_then(|v| v.as_str().map(String::from))
                .filter(|d| !d.is_empty()),
        };

        (keyable, self.0)
    }
}

/// One entry of a title search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: MovieId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

/// One cast entry of a credits response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastHit {
    pub id: PersonId,
    #[serde(default)]
    pub adult: Option<bool>,
    #[serde(default)]
    pub gender: Option<i64>,
    #[serde(default)]
    pub known_for_department: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub character: Option<String>,
}
