//! Local image storage and the download-once asset cache.
//!
//! [`ImageStorage`] owns the on-disk layout; [`AssetCache`] decides what to
//! download and records the results in the store.

mod cache;
mod storage;

pub use cache::AssetCache;
pub use storage::ImageStorage;
