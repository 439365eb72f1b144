//! Download-once cache for movie images and cast records.
//!
//! Movie images are keyed by `(movie_id, kind)` in the store and never
//! downloaded twice. Headshots are keyed by person id and downloaded at most
//! once per [`AssetCache`] instance, which lives for one ingestion run.

use std::collections::BTreeMap;
use std::sync::Arc;

use cinedex_common::{Error, ImageKind, MovieId, PersonId, Result};
use cinedex_db::models::{CastCredit, CastMember, ImageAsset};
use cinedex_db::Store;
use dashmap::DashMap;
use futures::future::join_all;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::storage::ImageStorage;
use crate::config::ImagesConfig;
use crate::metadata::{CastHit, MetadataProvider};

/// Caches remote images and cast records locally.
pub struct AssetCache {
    provider: Arc<dyn MetadataProvider>,
    store: Arc<dyn Store>,
    storage: ImageStorage,
    image_size: String,
    profile_size: String,
    headshots: DashMap<PersonId, Arc<OnceCell<Option<String>>>>,
}

impl AssetCache {
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        store: Arc<dyn Store>,
        config: &ImagesConfig,
    ) -> Self {
        Self {
            provider,
            store,
            storage: ImageStorage::new(config.dir.clone()),
            image_size: config.poster_size.clone(),
            profile_size: config.profile_size.clone(),
            headshots: DashMap::new(),
        }
    }

    /// Cache the movie images named in `paths`, returning the local path per kind.
    ///
    /// Kinds with no remote path, and kinds whose download or decode failed,
    /// are missing from the result. Only store failures are errors.
    pub async fn cache_images(
        &self,
        movie_id: MovieId,
        paths: BTreeMap<ImageKind, Option<String>>,
    ) -> Result<BTreeMap<ImageKind, String>> {
        let mut cached = BTreeMap::new();

        for (kind, remote) in paths {
            let Some(remote) = remote else {
                continue;
            };

            if let Some(existing) = self.store.get_image(movie_id, kind)? {
                debug!(movie_id = %movie_id, kind = %kind, "Image already cached");
                cached.insert(kind, existing.path);
                continue;
            }

            match self.fetch_movie_image(movie_id, kind, &remote).await {
                Ok(path) => {
                    self.store.upsert_image(&ImageAsset {
                        movie_id,
                        kind,
                        path: path.clone(),
                    })?;
                    cached.insert(kind, path);
                }
                Err(e) => {
                    warn!(movie_id = %movie_id, kind = %kind, error = %e, "Image unavailable");
                }
            }
        }

        Ok(cached)
    }

    /// Upsert a cast member per hit and return the credits in input order.
    ///
    /// Headshots for the whole list download concurrently; a missing or
    /// failed headshot leaves `headshot_path` unset.
    pub async fn cache_cast(&self, hits: Vec<CastHit>) -> Result<Vec<CastCredit>> {
        let headshots = join_all(
            hits.iter()
                .map(|hit| self.headshot(hit.id, hit.profile_path.as_deref())),
        )
        .await;

        let mut credits = Vec::with_capacity(hits.len());
        for (hit, headshot_path) in hits.into_iter().zip(headshots) {
            let member = CastMember {
                id: hit.id,
                adult: hit.adult,
                gender: hit.gender,
                known_for: hit.known_for_department,
                name_now: hit.name,
                name_before: hit.original_name,
                popularity: hit.popularity,
                headshot_path,
            };
            self.store.upsert_cast_member(&member)?;

            credits.push(CastCredit {
                person_id: member.id,
                character: hit.character,
            });
        }

        Ok(credits)
    }

    async fn headshot(&self, person_id: PersonId, remote: Option<&str>) -> Option<String> {
        let remote = remote.filter(|p| !p.is_empty())?;
        let cell = Arc::clone(&self.headshots.entry(person_id).or_default());

        cell.get_or_init(|| async {
            match self.fetch_headshot(person_id, remote).await {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!(person_id = %person_id, error = %e, "Headshot unavailable");
                    None
                }
            }
        })
        .await
        .clone()
    }

    async fn fetch_movie_image(
        &self,
        movie_id: MovieId,
        kind: ImageKind,
        remote: &str,
    ) -> Result<String> {
        let bytes = self.provider.download_image(remote, &self.image_size).await?;
        let storage = self.storage.clone();
        let path = tokio::task::spawn_blocking(move || {
            storage.store_movie_image(movie_id, kind, &bytes)
        })
        .await
        .map_err(|e| Error::internal(format!("image task failed: {}", e)))??;

        debug!(movie_id = %movie_id, kind = %kind, path = %path.display(), "Image cached");
        Ok(path.to_string_lossy().into_owned())
    }

    async fn fetch_headshot(&self, person_id: PersonId, remote: &str) -> Result<String> {
        let bytes = self
            .provider
            .download_image(remote, &self.profile_size)
            .await?;
        let storage = self.storage.clone();
        let path = tokio::task::spawn_blocking(move || storage.store_headshot(person_id, &bytes))
            .await
            .map_err(|e| Error::internal(format!("headshot task failed: {}", e)))??;

        Ok(path.to_string_lossy().into_owned())
    }
}
