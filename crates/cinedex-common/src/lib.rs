//! Cinedex-Common: Shared types, constants, and utilities.
//!
//! This crate provides common functionality used across cinedex:
//!
//! - **Typed IDs**: `MovieId`, `PersonId` (remote integer ids) and `DirectoryId`
//! - **Field Tables**: closed enums naming every remote and store field
//! - **Path Utilities**: supported-extension and partial-download checks
//! - **Error Handling**: the unified error type and result alias
//!
//! # Examples
//!
//! ```
//! use cinedex_common::{MovieId, MovieField, Error, Result};
//! use cinedex_common::paths::has_extension;
//! use std::path::Path;
//!
//! let id = MovieId::new(12345);
//! assert_eq!(id.to_string(), "12345");
//!
//! assert_eq!(MovieField::ReleaseDate.wire_name(), "release_date");
//! assert!(has_extension(Path::new("movie.MKV"), &["mkv"]));
//!
//! fn example() -> Result<()> {
//!     Err(Error::resolution("no parseable title"))
//! }
//! ```

pub mod error;
pub mod ids;
pub mod paths;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
