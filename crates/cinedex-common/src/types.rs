//! Closed field tables and small shared enums.
//!
//! Every field the pipeline reads from the remote payload, or writes to the
//! store, is named by a variant here. Each table maps variants to their wire
//! name and, where the field is stored in its own column, to that column.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of artwork cached per movie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    /// Portrait poster.
    Poster,
    /// Landscape backdrop.
    Backdrop,
}

impl ImageKind {
    /// All kinds, in caching order.
    pub const ALL: [ImageKind; 2] = [ImageKind::Poster, ImageKind::Backdrop];

    /// Lowercase name used in file names and store rows.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Poster => "poster",
            Self::Backdrop => "backdrop",
        }
    }

    /// Movie-detail field that carries the remote path for this kind.
    pub fn source_field(self) -> MovieField {
        match self {
            Self::Poster => MovieField::PosterPath,
            Self::Backdrop => MovieField::BackdropPath,
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ImageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "poster" => Ok(Self::Poster),
            "backdrop" => Ok(Self::Backdrop),
            _ => Err(format!("Invalid image kind: {}", s)),
        }
    }
}

/// Fields of a remote movie-detail payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovieField {
    Adult,
    BackdropPath,
    BelongsToCollection,
    Budget,
    Genres,
    Homepage,
    Id,
    ImdbId,
    OriginalLanguage,
    OriginalTitle,
    Title,
    Overview,
    Popularity,
    PosterPath,
    ProductionCompanies,
    ProductionCountries,
    ReleaseDate,
    Revenue,
    Runtime,
    SpokenLanguages,
    Status,
    Tagline,
    VoteAverage,
    VoteCount,
}

impl MovieField {
    /// Every known movie field.
    pub const ALL: [MovieField; 24] = [
        Self::Adult,
        Self::BackdropPath,
        Self::BelongsToCollection,
        Self::Budget,
        Self::Genres,
        Self::Homepage,
        Self::Id,
        Self::ImdbId,
        Self::OriginalLanguage,
        Self::OriginalTitle,
        Self::Title,
        Self::Overview,
        Self::Popularity,
        Self::PosterPath,
        Self::ProductionCompanies,
        Self::ProductionCountries,
        Self::ReleaseDate,
        Self::Revenue,
        Self::Runtime,
        Self::SpokenLanguages,
        Self::Status,
        Self::Tagline,
        Self::VoteAverage,
        Self::VoteCount,
    ];

    /// Fields promoted to their own store columns.
    pub const KEYABLE: [MovieField; 4] =
        [Self::Adult, Self::Genres, Self::Title, Self::ReleaseDate];

    /// Key of this field in the remote JSON payload.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Adult => "adult",
            Self::BackdropPath => "backdrop_path",
            Self::BelongsToCollection => "belongs_to_collection",
            Self::Budget => "budget",
            Self::Genres => "genres",
            Self::Homepage => "homepage",
            Self::Id => "id",
            Self::ImdbId => "imdb_id",
            Self::OriginalLanguage => "original_language",
            Self::OriginalTitle => "original_title",
            Self::Title => "title",
            Self::Overview => "overview",
            Self::Popularity => "popularity",
            Self::PosterPath => "poster_path",
            Self::ProductionCompanies => "production_companies",
            Self::ProductionCountries => "production_countries",
            Self::ReleaseDate => "release_date",
            Self::Revenue => "revenue",
            Self::Runtime => "runtime",
            Self::SpokenLanguages => "spoken_languages",
            Self::Status => "status",
            Self::Tagline => "tagline",
            Self::VoteAverage => "vote_average",
            Self::VoteCount => "vote_count",
        }
    }

    /// Store column for keyable fields; `None` for fields kept in misc.
    pub fn column(self) -> Option<&'static str> {
        match self {
            Self::Adult => Some("adult"),
            Self::Genres => Some("genres"),
            Self::Title => Some("title"),
            Self::ReleaseDate => Some("release_date"),
            _ => None,
        }
    }
}

impl fmt::Display for MovieField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl std::str::FromStr for MovieField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.wire_name() == s)
            .ok_or_else(|| format!("Unknown movie field: {}", s))
    }
}

/// Fields of a remote credits entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastField {
    Id,
    Adult,
    Gender,
    KnownForDepartment,
    Name,
    OriginalName,
    Popularity,
    ProfilePath,
    Character,
}

impl CastField {
    /// Every known cast field.
    pub const ALL: [CastField; 9] = [
        Self::Id,
        Self::Adult,
        Self::Gender,
        Self::KnownForDepartment,
        Self::Name,
        Self::OriginalName,
        Self::Popularity,
        Self::ProfilePath,
        Self::Character,
    ];

    /// Key of this field in the remote JSON payload.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Adult => "adult",
            Self::Gender => "gender",
            Self::KnownForDepartment => "known_for_department",
            Self::Name => "name",
            Self::OriginalName => "original_name",
            Self::Popularity => "popularity",
            Self::ProfilePath => "profile_path",
            Self::Character => "character",
        }
    }

    /// Column in `cast_members`. The character name is per-movie and lives
    /// in the movie's cast list instead.
    pub fn column(self) -> Option<&'static str> {
        match self {
            Self::Id => Some("id"),
            Self::Adult => Some("adult"),
            Self::Gender => Some("gender"),
            Self::KnownForDepartment => Some("known_for"),
            Self::Name => Some("name_now"),
            Self::OriginalName => Some("name_before"),
            Self::Popularity => Some("popularity"),
            Self::ProfilePath => Some("headshot_path"),
            Self::Character => None,
        }
    }
}

impl fmt::Display for CastField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl std::str::FromStr for CastField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.wire_name() == s)
            .ok_or_else(|| format!("Unknown cast field: {}", s))
    }
}

/// Movie columns that do not come from the remote payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InternalField {
    DirectoryId,
    FilePath,
    Metadata,
    VResolution,
    ACodec,
    Cast,
    MiscInfo,
}

impl InternalField {
    pub const ALL: [InternalField; 7] = [
        Self::DirectoryId,
        Self::FilePath,
        Self::Metadata,
        Self::VResolution,
        Self::ACodec,
        Self::Cast,
        Self::MiscInfo,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Self::DirectoryId => "directory_id",
            Self::FilePath => "file_path",
            Self::Metadata => "metadata",
            Self::VResolution => "v_resolution",
            Self::ACodec => "a_codec",
            Self::Cast => "cast",
            Self::MiscInfo => "misc_info",
        }
    }
}

impl fmt::Display for InternalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl std::str::FromStr for InternalField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.column() == s)
            .ok_or_else(|| format!("Unknown internal field: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_kind_serialization() {
        let json = serde_json::to_string(&ImageKind::Backdrop).unwrap();
        assert_eq!(json, r#""backdrop""#);

        let kind: ImageKind = "poster".parse().unwrap();
        assert_eq!(kind, ImageKind::Poster);
        assert!("logo".parse::<ImageKind>().is_err());
    }

    #[test]
    fn test_image_kind_source_field() {
        assert_eq!(ImageKind::Poster.source_field().wire_name(), "poster_path");
        assert_eq!(
            ImageKind::Backdrop.source_field().wire_name(),
            "backdrop_path"
        );
    }

    #[test]
    fn test_movie_field_round_trip() {
        for field in MovieField::ALL {
            assert_eq!(field.wire_name().parse::<MovieField>().unwrap(), field);
        }
        assert!("nonsense".parse::<MovieField>().is_err());
    }

    #[test]
    fn test_keyable_fields_have_columns() {
        let keyable: Vec<_> = MovieField::ALL
            .into_iter()
            .filter(|f| f.column().is_some())
            .collect();
        assert_eq!(keyable, MovieField::KEYABLE.to_vec());
    }

    #[test]
    fn test_cast_field_round_trip() {
        for field in CastField::ALL {
            assert_eq!(field.wire_name().parse::<CastField>().unwrap(), field);
        }
        assert_eq!(CastField::Name.column(), Some("name_now"));
        assert_eq!(CastField::Character.column(), None);
    }

    #[test]
    fn test_internal_field_round_trip() {
        for field in InternalField::ALL {
            assert_eq!(field.column().parse::<InternalField>().unwrap(), field);
        }
        assert_eq!(InternalField::VResolution.to_string(), "v_resolution");
    }
}
