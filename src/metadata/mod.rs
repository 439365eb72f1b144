//! Remote metadata: provider seam, TMDB client, rate limiting and identity
//! resolution.
//!
//! # Module layout
//!
//! - [`provider`] -- The [`MetadataProvider`] trait.
//! - [`types`] -- Detail, search and credits payloads.
//! - [`providers`] -- Concrete providers (TMDB).
//! - [`rate_limit`] -- The shared minimum-interval limiter.
//! - [`identity`] -- Filename to canonical identity resolution.

pub mod identity;
pub mod provider;
pub mod providers;
pub mod rate_limit;
pub mod types;

pub use identity::{IdentityResolver, ParsedName, Resolution, ResolutionSource};
pub use provider::MetadataProvider;
pub use providers::TmdbClient;
pub use rate_limit::RateLimiter;
pub use types::{CastHit, KeyableInfo, MovieDetail, SearchHit};
