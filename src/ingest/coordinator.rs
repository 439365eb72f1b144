//! Drives the per-file pipeline and batches of files.

use std::path::Path;
use std::pin::pin;
use std::sync::Arc;

use chrono::Utc;
use cinedex_common::{Error, MovieId, Result};
use cinedex_db::models::{Directory, MovieRecord};
use cinedex_db::Store;
use dashmap::DashMap;
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{BatchReport, IngestFailure, IngestOutcome, IngestStage};
use crate::config::Config;
use crate::images::AssetCache;
use crate::metadata::{IdentityResolver, MetadataProvider, Resolution, TmdbClient};
use crate::probe::{LocalMetadataExtractor, MatroskaExtractor, MediaReport};
use crate::scanner::{DirectoryScanner, MediaFile};

/// Orchestrates resolution, enrichment and persistence of media files.
///
/// One coordinator is one ingestion run: it owns the HTTP client (through
/// the provider) and the per-run headshot cache.
pub struct IngestionCoordinator {
    store: Arc<dyn Store>,
    provider: Arc<dyn MetadataProvider>,
    extractor: Arc<dyn LocalMetadataExtractor>,
    resolver: IdentityResolver,
    assets: AssetCache,
    scanner: DirectoryScanner,
    concurrency: usize,
    /// Held while an identity is between its existence check and its upsert.
    in_flight: DashMap<MovieId, Arc<tokio::sync::Mutex<()>>>,
}

impl IngestionCoordinator {
    pub fn new(
        config: &Config,
        provider: Arc<dyn MetadataProvider>,
        store: Arc<dyn Store>,
        extractor: Arc<dyn LocalMetadataExtractor>,
    ) -> Self {
        Self {
            resolver: IdentityResolver::new(provider.clone(), store.clone()),
            assets: AssetCache::new(provider.clone(), store.clone(), &config.images),
            scanner: DirectoryScanner::new(config.scan.extensions.clone()),
            concurrency: config.scan.concurrency.max(1),
            in_flight: DashMap::new(),
            store,
            provider,
            extractor,
        }
    }

    /// Build a coordinator talking to TMDB and probing Matroska files.
    pub fn from_config(config: &Config, store: Arc<dyn Store>) -> Result<Self> {
        let provider = Arc::new(TmdbClient::from_config(&config.tmdb)?);
        Ok(Self::new(
            config,
            provider,
            store,
            Arc::new(MatroskaExtractor),
        ))
    }

    pub fn scanner(&self) -> &DirectoryScanner {
        &self.scanner
    }

    /// Ingest a path outside of a scan; its watched directory is looked up.
    pub async fn ingest_path(
        &self,
        path: &Path,
        force: bool,
    ) -> std::result::Result<IngestOutcome, IngestFailure> {
        self.ingest(&MediaFile::new(path.to_path_buf(), None), force)
            .await
    }

    /// Run the full pipeline for one file.
    pub async fn ingest(
        &self,
        file: &MediaFile,
        force: bool,
    ) -> std::result::Result<IngestOutcome, IngestFailure> {
        let path = file.path.as_path();

        let id = match self
            .resolver
            .resolve(path)
            .await
            .map_err(failed(path, IngestStage::Resolve))?
        {
            Resolution::Resolved { id, source } => {
                debug!(path = %path.display(), movie_id = %id, ?source, "Identity resolved");
                id
            }
            Resolution::Unresolved { reason } => {
                warn!(path = %path.display(), %reason, "Could not identify file");
                return Err(IngestFailure::new(
                    path,
                    IngestStage::Resolve,
                    Error::resolution(reason),
                ));
            }
        };

        let guard = Arc::clone(&self.in_flight.entry(id).or_default());
        let _held = guard.lock().await;

        if !force
            && self
                .store
                .movie_exists(id)
                .map_err(failed(path, IngestStage::Lookup))?
        {
            debug!(path = %path.display(), movie_id = %id, "Already ingested");
            return Ok(IngestOutcome::AlreadyPresent(id));
        }

        let report = self.extract(path).await;

        let (mut detail, credits) =
            tokio::try_join!(self.provider.fetch_movie(id), self.provider.fetch_credits(id))
                .map_err(failed(path, IngestStage::Fetch))?;

        let image_paths = detail.take_image_paths();
        let images = self
            .assets
            .cache_images(id, image_paths)
            .await
            .map_err(failed(path, IngestStage::Assets))?;
        let cast = self
            .assets
            .cache_cast(credits)
            .await
            .map_err(failed(path, IngestStage::Assets))?;

        let directory_id = match file.directory_id {
            Some(directory_id) => Some(directory_id),
            None => self
                .store
                .find_directory_for_file(path)
                .map_err(failed(path, IngestStage::Persist))?
                .map(|dir| dir.id),
        };

        let metadata = serde_json::to_value(&report)
            .map_err(|e| Error::internal(format!("failed to encode media report: {}", e)))
            .map_err(failed(path, IngestStage::Persist))?;

        let (keyable, misc_info) = detail.into_parts();
        let record = MovieRecord {
            id,
            directory_id,
            file_path: path.to_string_lossy().into_owned(),
            v_resolution: report.resolution(),
            a_codec: report.audio_codec().map(String::from),
            metadata,
            adult: keyable.adult,
            genres: keyable.genres,
            title: keyable.title,
            release_date: keyable.release_date,
            misc_info,
            cast,
            updated_at: Utc::now(),
        };

        self.store
            .upsert_movie(&record)
            .map_err(failed(path, IngestStage::Persist))?;

        info!(
            path = %path.display(),
            movie_id = %id,
            title = record.title.as_deref().unwrap_or(""),
            images = images.len(),
            cast = record.cast.len(),
            "Movie persisted"
        );
        Ok(IngestOutcome::Persisted(id))
    }

    /// Ingest many files with bounded concurrency.
    ///
    /// Once `cancel` fires no new file is started; files already in flight
    /// run to completion and are part of the report.
    pub async fn ingest_batch<I>(
        &self,
        files: I,
        force: bool,
        cancel: CancellationToken,
    ) -> BatchReport
    where
        I: IntoIterator<Item = MediaFile>,
    {
        let stop = cancel.clone();
        let mut results = pin!(stream::iter(files)
            .take_until(async move { stop.cancelled().await })
            .map(move |file| async move { self.ingest(&file, force).await })
            .buffer_unordered(self.concurrency));

        let mut report = BatchReport::default();
        while let Some(result) = results.next().await {
            if let Err(failure) = &result {
                debug!(%failure, "File not ingested");
            }
            report.record(result);
        }

        report.cancelled = cancel.is_cancelled();
        report.sort();
        report
    }

    /// Scan one watched directory and ingest what it holds.
    pub async fn ingest_directory(
        &self,
        directory: &Directory,
        force: bool,
        cancel: CancellationToken,
    ) -> BatchReport {
        info!(path = %directory.path, recursive = directory.recursive, "Ingesting directory");
        let report = self
            .ingest_batch(self.scanner.scan(directory), force, cancel)
            .await;
        info!(path = %directory.path, %report, "Directory done");
        report
    }

    /// Scan every watched directory and ingest all files as one batch.
    pub async fn ingest_all(&self, force: bool, cancel: CancellationToken) -> Result<BatchReport> {
        let directories = self.store.list_directories()?;
        if directories.is_empty() {
            warn!("No watched directories configured");
        }

        let files = directories
            .iter()
            .flat_map(|directory| self.scanner.scan(directory));
        let report = self.ingest_batch(files, force, cancel).await;

        info!(directories = directories.len(), %report, "Ingestion finished");
        Ok(report)
    }

    /// End the run, releasing the HTTP client and per-run caches.
    pub fn close(self) {
        debug!(provider = self.provider.name(), "Closing ingestion coordinator");
    }

    async fn extract(&self, path: &Path) -> MediaReport {
        let extractor = Arc::clone(&self.extractor);
        let owned = path.to_path_buf();
        let result = tokio::task::spawn_blocking(move || extractor.extract(&owned))
            .await
            .unwrap_or_else(|e| Err(Error::internal(format!("probe task failed: {}", e))));

        match result {
            Ok(report) => report,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Probe failed, ingesting without technical metadata");
                MediaReport::unavailable()
            }
        }
    }
}

fn failed(path: &Path, stage: IngestStage) -> impl FnOnce(Error) -> IngestFailure + '_ {
    move |error| IngestFailure::new(path, stage, error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{CastHit, MovieDetail, SearchHit};
    use async_trait::async_trait;
    use cinedex_common::PersonId;
    use cinedex_db::pool::init_memory_pool;
    use cinedex_db::SqliteStore;
    use cinedex_probe::{TrackFacts, TrackSet};
    use parking_lot::Mutex;
    use serde_json::json;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Provider serving one fixed movie and counting calls per endpoint.
    #[derive(Default)]
    struct FakeRemote {
        fail_details: bool,
        delay: Duration,
        details: AtomicUsize,
        credits: AtomicUsize,
        searches: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MetadataProvider for FakeRemote {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn fetch_movie(&self, id: MovieId) -> Result<MovieDetail> {
            self.details.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if self.fail_details {
                return Err(Error::remote(format!("/movie/{}", id), "HTTP 503"));
            }
            Ok(serde_json::from_value(json!({
                "id": id.get(),
                "title": "Heat",
                "adult": false,
                "genres": [{"id": 80, "name": "Crime"}],
                "release_date": "1995-12-15",
                "poster_path": null,
                "backdrop_path": null,
                "runtime": 170
            }))
            .unwrap())
        }

        async fn search_movie(&self, title: &str, _year: Option<u16>) -> Result<Vec<SearchHit>> {
            self.searches.lock().push(title.to_string());
            tokio::time::sleep(self.delay).await;
            Ok(vec![SearchHit {
                id: MovieId::new(949),
                title: Some(title.to_string()),
                release_date: None,
            }])
        }

        async fn fetch_credits(&self, _id: MovieId) -> Result<Vec<CastHit>> {
            self.credits.fetch_add(1, Ordering::SeqCst);
            Ok(vec![CastHit {
                id: PersonId::new(1158),
                adult: None,
                gender: None,
                known_for_department: None,
                name: Some("Al Pacino".into()),
                original_name: None,
                popularity: None,
                profile_path: None,
                character: Some("Vincent Hanna".into()),
            }])
        }

        async fn download_image(&self, path: &str, _size: &str) -> Result<Vec<u8>> {
            Err(Error::remote(path, "HTTP 404"))
        }
    }

    /// Extractor returning a fixed report, or failing for every file.
    struct FakeExtractor {
        fail: bool,
    }

    impl LocalMetadataExtractor for FakeExtractor {
        fn extract(&self, _path: &Path) -> Result<MediaReport> {
            if self.fail {
                return Err(Error::probe("not a Matroska file"));
            }
            Ok(MediaReport {
                container: "Matroska".into(),
                file_size: 10,
                duration_ms: Some(1000),
                video: TrackSet::from_tracks(vec![TrackFacts {
                    codec_id: "V_MPEGH/ISO/HEVC".into(),
                    pixel_width: Some(3840),
                    ..TrackFacts::default()
                }]),
                audio: TrackSet::from_tracks(vec![TrackFacts {
                    codec_id: "A_DTS".into(),
                    ..TrackFacts::default()
                }]),
                subtitles: TrackSet::Absent,
            })
        }
    }

    struct Harness {
        coordinator: IngestionCoordinator,
        remote: Arc<FakeRemote>,
        store: Arc<SqliteStore>,
        _images: tempfile::TempDir,
    }

    fn harness(remote: FakeRemote, probe_fails: bool) -> Harness {
        let images = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.images.dir = images.path().to_path_buf();

        let remote = Arc::new(remote);
        let store = Arc::new(SqliteStore::new(init_memory_pool().unwrap()));
        let coordinator = IngestionCoordinator::new(
            &config,
            remote.clone(),
            store.clone(),
            Arc::new(FakeExtractor { fail: probe_fails }),
        );
        Harness {
            coordinator,
            remote,
            store,
            _images: images,
        }
    }

    fn file(name: &str) -> MediaFile {
        MediaFile::new(PathBuf::from("/lib").join(name), None)
    }

    #[tokio::test]
    async fn persists_merged_record() {
        let h = harness(FakeRemote::default(), false);

        let outcome = h
            .coordinator
            .ingest(&file("Heat (1995) [949].mkv"), false)
            .await
            .unwrap();
        assert_eq!(outcome, IngestOutcome::Persisted(MovieId::new(949)));

        let movie = h.store.get_movie(MovieId::new(949)).unwrap().unwrap();
        assert_eq!(movie.title.as_deref(), Some("Heat"));
        assert_eq!(movie.v_resolution, Some(3840));
        assert_eq!(movie.a_codec.as_deref(), Some("A_DTS"));
        assert_eq!(movie.misc_info["runtime"], 170);
        assert!(!movie.misc_info.contains_key("poster_path"));
        assert_eq!(movie.cast.len(), 1);
        assert_eq!(movie.cast[0].character.as_deref(), Some("Vincent Hanna"));
        assert_eq!(movie.metadata["subtitles"]["status"], "absent");
    }

    #[tokio::test]
    async fn second_ingest_is_a_no_op() {
        let h = harness(FakeRemote::default(), false);
        let f = file("Heat (1995) [949].mkv");

        h.coordinator.ingest(&f, false).await.unwrap();
        let second = h.coordinator.ingest(&f, false).await.unwrap();

        assert_eq!(second, IngestOutcome::AlreadyPresent(MovieId::new(949)));
        assert_eq!(h.remote.details.load(Ordering::SeqCst), 1);
        assert_eq!(h.remote.credits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn force_refetches() {
        let h = harness(FakeRemote::default(), false);
        let f = file("Heat (1995) [949].mkv");

        h.coordinator.ingest(&f, false).await.unwrap();
        let again = h.coordinator.ingest(&f, true).await.unwrap();

        assert_eq!(again, IngestOutcome::Persisted(MovieId::new(949)));
        assert_eq!(h.remote.details.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unresolved_file_is_reported() {
        let h = harness(FakeRemote::default(), false);

        let failure = h
            .coordinator
            .ingest(&file("home_video.mkv"), false)
            .await
            .unwrap_err();

        assert_eq!(failure.stage, IngestStage::Resolve);
        assert!(failure.is_unresolved());
        assert_eq!(h.remote.details.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn fetch_failure_writes_nothing() {
        let h = harness(
            FakeRemote {
                fail_details: true,
                ..FakeRemote::default()
            },
            false,
        );

        let failure = h
            .coordinator
            .ingest(&file("Heat (1995) [949].mkv"), false)
            .await
            .unwrap_err();

        assert_eq!(failure.stage, IngestStage::Fetch);
        assert!(failure.error.is_remote());
        assert!(!h.store.movie_exists(MovieId::new(949)).unwrap());
    }

    #[tokio::test]
    async fn probe_failure_still_persists() {
        let h = harness(FakeRemote::default(), true);

        h.coordinator
            .ingest(&file("Heat (1995) [949].mkv"), false)
            .await
            .unwrap();

        let movie = h.store.get_movie(MovieId::new(949)).unwrap().unwrap();
        assert_eq!(movie.v_resolution, None);
        assert_eq!(movie.a_codec, None);
        assert_eq!(movie.metadata["video"]["status"], "unprobed");
    }

    #[tokio::test]
    async fn concurrent_duplicates_fetch_once() {
        let h = harness(
            FakeRemote {
                delay: Duration::from_millis(50),
                ..FakeRemote::default()
            },
            false,
        );

        let report = h
            .coordinator
            .ingest_batch(
                vec![
                    file("Heat (1995) [949].mkv"),
                    file("Heat (1995) [949] copy.mkv"),
                ],
                false,
                CancellationToken::new(),
            )
            .await;

        assert_eq!(report.persisted, vec![MovieId::new(949)]);
        assert_eq!(report.already_present, vec![MovieId::new(949)]);
        assert_eq!(h.remote.details.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_same_title_searches_once() {
        let h = harness(
            FakeRemote {
                delay: Duration::from_millis(50),
                ..FakeRemote::default()
            },
            false,
        );

        let report = h
            .coordinator
            .ingest_batch(
                vec![file("Heat (1995).mkv"), file("Heat (1995) Extended.mkv")],
                false,
                CancellationToken::new(),
            )
            .await;

        assert_eq!(report.persisted, vec![MovieId::new(949)]);
        assert_eq!(report.already_present, vec![MovieId::new(949)]);
        assert_eq!(*h.remote.searches.lock(), vec!["Heat".to_string()]);
        assert_eq!(h.remote.details.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn batch_collects_failures_without_aborting() {
        let h = harness(FakeRemote::default(), false);

        let report = h
            .coordinator
            .ingest_batch(
                vec![file("no title here.mkv"), file("Heat (1995).mkv")],
                false,
                CancellationToken::new(),
            )
            .await;

        assert_eq!(report.persisted, vec![MovieId::new(949)]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.unresolved(), 1);
        assert_eq!(*h.remote.searches.lock(), vec!["Heat".to_string()]);
    }

    #[tokio::test]
    async fn cancelled_batch_dispatches_nothing() {
        let h = harness(FakeRemote::default(), false);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = h
            .coordinator
            .ingest_batch(vec![file("Heat (1995) [949].mkv")], false, cancel)
            .await;

        assert!(report.cancelled);
        assert_eq!(report.processed(), 0);
        assert_eq!(h.remote.details.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn directory_back_reference_is_looked_up() {
        let h = harness(FakeRemote::default(), false);
        let dir = h.store.add_directory("/lib", false, None).unwrap();

        h.coordinator
            .ingest_path(Path::new("/lib/Heat (1995) [949].mkv"), false)
            .await
            .unwrap();

        let movie = h.store.get_movie(MovieId::new(949)).unwrap().unwrap();
        assert_eq!(movie.directory_id, Some(dir.id));
    }
}
