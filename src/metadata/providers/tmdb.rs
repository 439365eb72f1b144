//! TMDB (The Movie Database) metadata provider.
//!
//! Implements [`MetadataProvider`] against the TMDB v3 REST API.
//!
//! - Every request, retries included, waits on the shared [`RateLimiter`].
//! - HTTP 429 is retried with `Retry-After` support (max 3 retries).
//! - Network errors and non-2xx answers surface as `RemoteUnavailable`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cinedex_common::{Error, MovieId, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::TmdbConfig;
use crate::metadata::provider::MetadataProvider;
use crate::metadata::rate_limit::RateLimiter;
use crate::metadata::types::{CastHit, MovieDetail, SearchHit};

const MAX_RETRIES: u32 = 3;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct CreditsResponse {
    #[serde(default)]
    cast: Vec<CastHit>,
}

/// TMDB metadata client.
///
/// Holds the HTTP connection pool and a handle to the shared limiter; no
/// per-call state.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use cinedex::config::TmdbConfig;
/// use cinedex::metadata::{RateLimiter, TmdbClient};
///
/// let config = TmdbConfig::default();
/// let limiter = Arc::new(RateLimiter::new(config.requests_per_second).unwrap());
/// let client = TmdbClient::new(&config, limiter).unwrap();
/// ```
pub struct TmdbClient {
    client: reqwest::Client,
    api_key: String,
    language: String,
    base_url: String,
    image_base_url: String,
    limiter: Arc<RateLimiter>,
}

impl TmdbClient {
    /// Create a client from configuration, pacing calls through `limiter`.
    pub fn new(config: &TmdbConfig, limiter: Arc<RateLimiter>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            language: config.language.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            image_base_url: config.image_base_url.trim_end_matches('/').to_string(),
            limiter,
        })
    }

    /// Create a client with its own limiter at the configured rate.
    pub fn from_config(config: &TmdbConfig) -> Result<Self> {
        let limiter = Arc::new(RateLimiter::new(config.requests_per_second)?);
        Self::new(config, limiter)
    }

    /// Issue a GET with rate limiting and 429-retry logic.
    async fn send(
        &self,
        endpoint: &str,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<reqwest::Response> {
        let mut retries = 0u32;
        loop {
            self.limiter.wait().await;

            let resp = self
                .client
                .get(url)
                .query(params)
                .send()
                .await
                .map_err(|e| Error::remote(endpoint, redacted(e)))?;

            let status = resp.status();
            if status == StatusCode::TOO_MANY_REQUESTS && retries < MAX_RETRIES {
                retries += 1;
                let wait = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(1);
                warn!(
                    endpoint,
                    retry = retries,
                    wait_secs = wait,
                    "TMDB returned 429, backing off"
                );
                tokio::time::sleep(Duration::from_secs(wait)).await;
                continue;
            }

            if !status.is_success() {
                return Err(Error::remote(endpoint, format!("HTTP {}", status)));
            }

            return Ok(resp);
        }
    }

    /// GET an API path and decode the JSON body.
    async fn get<T: DeserializeOwned>(&self, path: &str, extra: &[(&str, String)]) -> Result<T> {
        let mut params = vec![
            ("api_key", self.api_key.clone()),
            ("language", self.language.clone()),
        ];
        params.extend(extra.iter().cloned());

        let url = format!("{}{}", self.base_url, path);
        debug!(endpoint = path, "TMDB request");

        self.send(path, &url, &params)
            .await?
            .json()
            .await
            .map_err(|e| Error::remote(path, format!("invalid response body: {}", redacted(e))))
    }
}

/// Render a transport error without its request URL, which carries the API key.
fn redacted(err: reqwest::Error) -> String {
    err.without_url().to_string()
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    fn name(&self) -> &'static str {
        "tmdb"
    }

    async fn fetch_movie(&self, id: MovieId) -> Result<MovieDetail> {
        self.get(&format!("/movie/{}", id), &[]).await
    }

    async fn search_movie(&self, title: &str, year: Option<u16>) -> Result<Vec<SearchHit>> {
        let mut params = vec![("query", title.to_string())];
        if let Some(year) = year {
            params.push(("year", year.to_string()));
        }

        let body: SearchResponse = self.get("/search/movie", &params).await?;
        Ok(body.results)
    }

    async fn fetch_credits(&self, id: MovieId) -> Result<Vec<CastHit>> {
        let body: CreditsResponse = self.get(&format!("/movie/{}/credits", id), &[]).await?;
        Ok(body.cast)
    }

    async fn download_image(&self, path: &str, size: &str) -> Result<Vec<u8>> {
        let url = format!("{}/{}{}", self.image_base_url, size, path);
        debug!(path, size, "TMDB image download");

        let bytes = self
            .send(path, &url, &[])
            .await?
            .bytes()
            .await
            .map_err(|e| Error::remote(path, redacted(e)))?;

        Ok(bytes.to_vec())
    }
}
