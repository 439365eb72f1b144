//! Trait definition for metadata providers.
//!
//! The resolver, asset cache and coordinator only see this trait, so the
//! pipeline is independent of the concrete remote service.

use async_trait::async_trait;
use cinedex_common::{MovieId, Result};

use super::types::{CastHit, MovieDetail, SearchHit};

/// Async trait that every metadata backend implements.
///
/// Implementations pace their own outbound calls; callers may invoke any
/// method from many tasks at once.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Short, lowercase identifier for this provider (e.g. `"tmdb"`).
    fn name(&self) -> &'static str;

    /// Fetch the full detail payload for a movie.
    async fn fetch_movie(&self, id: MovieId) -> Result<MovieDetail>;

    /// Search for movies by title, optionally constrained by release year.
    ///
    /// An empty list is a successful answer, not an error.
    async fn search_movie(&self, title: &str, year: Option<u16>) -> Result<Vec<SearchHit>>;

    /// Fetch the cast of a movie, in billing order.
    async fn fetch_credits(&self, id: MovieId) -> Result<Vec<CastHit>>;

    /// Download the raw bytes of an image at the given size segment.
    async fn download_image(&self, path: &str, size: &str) -> Result<Vec<u8>>;
}
