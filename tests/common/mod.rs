//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which stands up a fake TMDB server, a scratch
//! media library, a scratch image directory and an in-memory store, and
//! builds [`IngestionCoordinator`]s wired to all of them.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use cinedex::config::Config;
use cinedex::ingest::IngestionCoordinator;
use cinedex::metadata::TmdbClient;
use cinedex::probe::MatroskaExtractor;
use cinedex_db::models::Directory;
use cinedex_db::pool::init_memory_pool;
use cinedex_db::{SqliteStore, Store};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "integration-key";

/// Fake TMDB plus scratch directories and an in-memory store.
pub struct TestHarness {
    pub server: MockServer,
    pub store: Arc<SqliteStore>,
    pub config: Config,
    pub library: TempDir,
    pub images: TempDir,
}

impl TestHarness {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let library = tempfile::tempdir().expect("failed to create library dir");
        let images = tempfile::tempdir().expect("failed to create images dir");

        let mut config = Config::default();
        config.tmdb.api_key = API_KEY.to_string();
        config.tmdb.base_url = server.uri();
        config.tmdb.image_base_url = format!("{}/t/p", server.uri());
        config.tmdb.requests_per_second = 1000.0;
        config.images.dir = images.path().to_path_buf();

        let store = Arc::new(SqliteStore::new(
            init_memory_pool().expect("failed to create in-memory pool"),
        ));

        Self {
            server,
            store,
            config,
            library,
            images,
        }
    }

    /// A coordinator for one ingestion run against the fake server.
    pub fn coordinator(&self) -> IngestionCoordinator {
        let client = TmdbClient::from_config(&self.config.tmdb).expect("failed to build client");
        IngestionCoordinator::new(
            &self.config,
            Arc::new(client),
            self.store.clone(),
            Arc::new(MatroskaExtractor),
        )
    }

    /// Create a placeholder media file in the library.
    pub fn add_file(&self, name: &str) -> PathBuf {
        let path = self.library.path().join(name);
        std::fs::write(&path, b"not really matroska").expect("failed to write media file");
        path
    }

    /// Watch the library root, top level only.
    pub fn watch_library(&self) -> Directory {
        self.store
            .add_directory(&self.library.path().to_string_lossy(), false, Some(0))
            .expect("failed to add directory")
    }
}

/// A small valid JPEG.
pub fn jpeg() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(4, 6, image::Rgb([30, 60, 90]));
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageFormat::Jpeg)
        .expect("failed to encode test JPEG");
    buf.into_inner()
}

/// Movie detail payload with the given images.
pub fn movie_detail(id: u64, title: &str, poster: Option<&str>, backdrop: Option<&str>) -> Value {
    json!({
        "id": id,
        "adult": false,
        "title": title,
        "original_title": title,
        "release_date": "2022-03-01",
        "genres": [{"id": 27, "name": "Horror"}],
        "poster_path": poster,
        "backdrop_path": backdrop,
        "runtime": 97,
        "overview": "A long night.",
        "vote_average": 7.1
    })
}

/// One credits entry.
pub fn cast_entry(id: u64, name: &str, character: &str, profile: Option<&str>) -> Value {
    json!({
        "id": id,
        "adult": false,
        "gender": 1,
        "known_for_department": "Acting",
        "name": name,
        "original_name": name,
        "popularity": 3.2,
        "profile_path": profile,
        "character": character
    })
}

pub async fn mount_detail(server: &MockServer, id: u64, body: Value, times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/movie/{}", id)))
        .and(query_param("api_key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(times)
        .mount(server)
        .await;
}

pub async fn mount_credits(server: &MockServer, id: u64, cast: Vec<Value>, times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/movie/{}/credits", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": id, "cast": cast})))
        .expect(times)
        .mount(server)
        .await;
}

pub async fn mount_search(server: &MockServer, query: &str, results: Vec<Value>, times: u64) {
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .and(query_param("query", query))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": results})))
        .expect(times)
        .mount(server)
        .await;
}

/// Serve an image at `{image_base}/{size}{image_path}`, optionally delayed.
pub async fn mount_image(server: &MockServer, size: &str, image_path: &str, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(format!("/t/p/{}{}", size, image_path)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(jpeg())
                .set_delay(delay),
        )
        .mount(server)
        .await;
}
