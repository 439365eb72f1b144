use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub images: ImagesConfig,

    #[serde(default)]
    pub tmdb: TmdbConfig,

    #[serde(default)]
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite database file
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./cinedex.db")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImagesConfig {
    /// Directory holding posters, backdrops and `cast/` headshots
    #[serde(default = "default_images_dir")]
    pub dir: PathBuf,

    /// TMDB size segment used for posters and backdrops
    #[serde(default = "default_poster_size")]
    pub poster_size: String,

    /// TMDB size segment used for cast headshots
    #[serde(default = "default_profile_size")]
    pub profile_size: String,
}

fn default_images_dir() -> PathBuf {
    PathBuf::from("./data/images")
}
fn default_poster_size() -> String {
    "original".to_string()
}
fn default_profile_size() -> String {
    "w185".to_string()
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            dir: default_images_dir(),
            poster_size: default_poster_size(),
            profile_size: default_profile_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbConfig {
    /// v3 API key; `TMDB_API_KEY` overrides an empty value
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,

    /// Ceiling on outbound calls per second, shared by every task
    #[serde(default = "default_rate")]
    pub requests_per_second: f64,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_language() -> String {
    "en-US".to_string()
}
fn default_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}
fn default_image_base_url() -> String {
    "https://image.tmdb.org/t/p".to_string()
}
fn default_rate() -> f64 {
    30.0
}
fn default_timeout() -> u64 {
    30
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            language: default_language(),
            base_url: default_base_url(),
            image_base_url: default_image_base_url(),
            requests_per_second: default_rate(),
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanConfig {
    /// File extensions to ingest (without the dot)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Files ingested at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_extensions() -> Vec<String> {
    cinedex_common::paths::DEFAULT_EXTENSIONS
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_concurrency() -> usize {
    4
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            concurrency: default_concurrency(),
        }
    }
}

impl Config {
    /// Non-fatal problems worth reporting to the user.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.tmdb.api_key.trim().is_empty() {
            warnings.push(
                "No TMDB API key configured; set tmdb.api_key or TMDB_API_KEY".to_string(),
            );
        }

        if self.tmdb.requests_per_second > 40.0 {
            warnings.push(format!(
                "tmdb.requests_per_second = {} exceeds TMDB's published limit",
                self.tmdb.requests_per_second
            ));
        }

        warnings
    }
}
