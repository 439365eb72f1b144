//! Filename to canonical identity resolution.
//!
//! Resolution order:
//! 1. an id embedded in the filename (`tmdbid=N`, `tmdb-N`, `[tmdbid-N]`, `[N]`;
//!    a bare `[N]` that reads as a year or a resolution is ignored),
//! 2. the persistent name index,
//! 3. a remote title search, retried once when empty.
//!
//! A successful search is written to the name index so later files with the
//! same normalized title never search again.

use std::path::Path;
use std::sync::{Arc, LazyLock};

use cinedex_common::paths::file_name_string;
use cinedex_common::{MovieId, Result};
use cinedex_db::Store;
use dashmap::DashMap;
use regex::Regex;
use tracing::{debug, info};

use super::provider::MetadataProvider;

static EMBEDDED_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)tmdb(?:id)?[=-](\d+)|\[(\d+)\]").expect("embedded id regex should compile")
});
static PAREN_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d{4})\)").expect("year regex should compile"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex should compile"));

/// Vertical resolutions commonly written in brackets, e.g. `[2160]`.
const RESOLUTION_TAGS: [u64; 7] = [480, 576, 720, 1080, 1440, 2160, 4320];

/// Extract an id embedded in a file name, if any.
pub fn embedded_id(file_name: &str) -> Option<MovieId> {
    EMBEDDED_ID.captures_iter(file_name).find_map(|caps| {
        if let Some(tagged) = caps.get(1) {
            return tagged.as_str().parse().ok();
        }
        let bare: u64 = caps.get(2)?.as_str().parse().ok()?;
        let tag = looks_like_year(bare) || RESOLUTION_TAGS.contains(&bare);
        (!tag).then_some(MovieId::new(bare))
    })
}

fn looks_like_year(n: u64) -> bool {
    (1870..=2100).contains(&n)
}

/// Title and optional year parsed from a file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    /// Normalized title in its original case; used as the search query.
    pub title: String,
    pub year: Option<u16>,
}

impl ParsedName {
    /// Parse `Title (Year) ...` style names.
    ///
    /// The title is the text before the first `(`. Names without a
    /// parenthesized block, or with nothing before it, do not parse.
    pub fn parse(file_name: &str) -> Option<Self> {
        let (raw_title, rest) = file_name.split_once('(')?;

        let separated = raw_title.replace(['.', '_'], " ");
        let title = WHITESPACE.replace_all(separated.trim(), " ").into_owned();
        if title.is_empty() {
            return None;
        }

        let rest = format!("({}", rest);
        let year = PAREN_YEAR
            .captures(&rest)
            .and_then(|caps| caps[1].parse().ok());

        Some(Self { title, year })
    }

    /// Key under which the name index stores this title.
    pub fn cache_key(&self) -> String {
        match self.year {
            Some(year) => format!("{} ({})", self.title.to_lowercase(), year),
            None => self.title.to_lowercase(),
        }
    }
}

/// Where a resolved identity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    Embedded,
    NameIndex,
    Search,
}

/// Outcome of resolving one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved {
        id: MovieId,
        source: ResolutionSource,
    },
    Unresolved {
        reason: String,
    },
}

impl Resolution {
    pub fn id(&self) -> Option<MovieId> {
        match self {
            Self::Resolved { id, .. } => Some(*id),
            Self::Unresolved { .. } => None,
        }
    }
}

/// Turns file names into canonical identities.
///
/// Searches are single-flight per name index key: concurrent files with the
/// same normalized title wait for the first search and then read its answer
/// from the index.
pub struct IdentityResolver {
    provider: Arc<dyn MetadataProvider>,
    store: Arc<dyn Store>,
    searching: DashMap<String, Arc<tokio::sync::Mutex<()>>>,
}

impl IdentityResolver {
    pub fn new(provider: Arc<dyn MetadataProvider>, store: Arc<dyn Store>) -> Self {
        Self {
            provider,
            store,
            searching: DashMap::new(),
        }
    }

    /// Resolve the identity of a media file from its name.
    ///
    /// Remote failures during search are errors; an empty search answer is
    /// [`Resolution::Unresolved`].
    pub async fn resolve(&self, path: &Path) -> Result<Resolution> {
        self.resolve_name(&file_name_string(path)).await
    }

    pub async fn resolve_name(&self, file_name: &str) -> Result<Resolution> {
        if let Some(id) = embedded_id(file_name) {
            debug!(file_name, movie_id = %id, "Identity embedded in file name");
            return Ok(Resolution::Resolved {
                id,
                source: ResolutionSource::Embedded,
            });
        }

        let Some(parsed) = ParsedName::parse(file_name) else {
            return Ok(Resolution::Unresolved {
                reason: format!("no parseable title in {:?}", file_name),
            });
        };

        let key = parsed.cache_key();
        if let Some(resolution) = self.indexed(file_name, &key)? {
            return Ok(resolution);
        }

        let lock = self.searching.entry(key.clone()).or_default().clone();
        let _guard = lock.lock().await;
        if let Some(resolution) = self.indexed(file_name, &key)? {
            return Ok(resolution);
        }

        let mut hits = self.provider.search_movie(&parsed.title, parsed.year).await?;
        if hits.is_empty() {
            debug!(title = %parsed.title, year = ?parsed.year, "Empty search, retrying once");
            hits = self.provider.search_movie(&parsed.title, parsed.year).await?;
        }

        let Some(first) = hits.into_iter().next() else {
            return Ok(Resolution::Unresolved {
                reason: format!("no search results for {:?}", parsed.title),
            });
        };

        self.store.record_name(&key, first.id)?;
        info!(file_name, movie_id = %first.id, "Identity resolved by search");

        Ok(Resolution::Resolved {
            id: first.id,
            source: ResolutionSource::Search,
        })
    }

    fn indexed(&self, file_name: &str, key: &str) -> Result<Option<Resolution>> {
        Ok(self.store.lookup_name(key)?.map(|id| {
            debug!(file_name, movie_id = %id, "Identity found in name index");
            Resolution::Resolved {
                id,
                source: ResolutionSource::NameIndex,
            }
        }))
    }
}
