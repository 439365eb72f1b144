//! Database query modules.
//!
//! One module per collection:
//! - directories: watched directory management
//! - movies: movie records keyed by canonical identity
//! - images: cached artwork per (movie, kind)
//! - cast: cast members shared across movies
//! - name_index: normalized title to identity cache

pub mod cast;
pub mod directories;
pub mod images;
pub mod movies;
pub mod name_index;
