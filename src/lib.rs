//! cinedex - media library ingestion
//!
//! Scans watched directories for media files, identifies each one against
//! TMDB, caches posters, backdrops and cast headshots locally, and stores a
//! merged movie record per identity.
//!
//! This library crate exposes the pipeline for the binary and for
//! integration tests.

pub mod config;
pub mod images;
pub mod ingest;
pub mod metadata;
pub mod probe;
pub mod scanner;
