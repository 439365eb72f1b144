mod cli;

use cinedex::{config, ingest::IngestOutcome, ingest::IngestionCoordinator, probe};
use cinedex_common::MovieId;
use cinedex_db::models::MovieRecord;
use cinedex_db::pool::init_pool;
use cinedex_db::{SqliteStore, Store};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "cinedex=trace,cinedex_db=debug,cinedex_common=debug,cinedex_probe=debug".to_string()
        } else {
            "cinedex=info,cinedex_db=info,cinedex_probe=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Scan { force } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(scan(config_path, force))
        }
        Commands::Ingest { file, force } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(ingest_file(config_path, &file, force))
        }
        Commands::AddDir {
            path,
            recursive,
            depth,
        } => add_dir(config_path, &path, recursive, depth),
        Commands::RemoveDir { path } => remove_dir(config_path, &path),
        Commands::ListDirs => list_dirs(config_path),
        Commands::Show { movie, json } => show_movie(config_path, &movie, json),
        Commands::Probe { file, json } => probe_file(&file, json),
        Commands::Validate {
            config: validate_path,
        } => {
            let path = validate_path.or_else(|| config_path.map(Path::to_path_buf));
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("cinedex {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn open_store(config: &config::Config) -> Result<Arc<SqliteStore>> {
    let db_path = &config.database.path;
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
    }

    tracing::debug!("Opening database at {}", db_path.display());
    let pool = init_pool(&db_path.to_string_lossy())
        .with_context(|| format!("Failed to open database: {:?}", db_path))?;
    Ok(Arc::new(SqliteStore::new(pool)))
}

/// Absolute form of a user-supplied path, falling back to the path as given.
fn absolute(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

async fn scan(config_path: Option<&Path>, force: bool) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let store = open_store(&config)?;
    let coordinator = IngestionCoordinator::from_config(&config, store)?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted; letting in-flight files finish");
            on_signal.cancel();
        }
    });

    let report = coordinator.ingest_all(force, cancel).await?;
    coordinator.close();

    println!("Scan complete: {}", report);
    for failure in &report.failures {
        println!("  ✗ {}", failure);
    }

    Ok(())
}

async fn ingest_file(config_path: Option<&Path>, file: &Path, force: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = config::load_config_or_default(config_path)?;
    let store = open_store(&config)?;
    let coordinator = IngestionCoordinator::from_config(&config, store)?;

    let result = coordinator.ingest_path(&absolute(file), force).await;
    coordinator.close();

    match result? {
        IngestOutcome::Persisted(id) => println!("✓ Stored movie {}", id),
        IngestOutcome::AlreadyPresent(id) => {
            println!("Movie {} is already stored (use --force to refresh)", id)
        }
    }

    Ok(())
}

fn add_dir(
    config_path: Option<&Path>,
    path: &Path,
    recursive: bool,
    depth: Option<u32>,
) -> Result<()> {
    if !path.is_dir() {
        anyhow::bail!("Not a directory: {:?}", path);
    }

    let config = config::load_config_or_default(config_path)?;
    let store = open_store(&config)?;
    let directory = store.add_directory(&absolute(path).to_string_lossy(), recursive, depth)?;

    println!("✓ Watching {}", directory.path);
    Ok(())
}

fn remove_dir(config_path: Option<&Path>, path: &Path) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let store = open_store(&config)?;

    if store.remove_directory(&absolute(path).to_string_lossy())? {
        println!("✓ Stopped watching {}", path.display());
    } else {
        println!("{} was not being watched", path.display());
    }
    Ok(())
}

fn list_dirs(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let store = open_store(&config)?;
    let directories = store.list_directories()?;

    if directories.is_empty() {
        println!("No watched directories");
        return Ok(());
    }

    for dir in directories {
        let scope = match (dir.recursive, dir.depth) {
            (false, _) => "top level".to_string(),
            (true, None) => "recursive".to_string(),
            (true, Some(depth)) => format!("recursive, depth {}", depth),
        };
        println!("{} ({})", dir.path, scope);
    }
    Ok(())
}

fn show_movie(config_path: Option<&Path>, movie: &str, json: bool) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let store = open_store(&config)?;

    let record = match movie.parse::<MovieId>() {
        Ok(id) => store.get_movie(id)?,
        Err(_) => store.find_movie_by_file_name(movie)?,
    };
    let Some(record) = record else {
        anyhow::bail!("No stored movie matches {:?}", movie);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_movie(&record, &store.get_images(record.id)?);
    }
    Ok(())
}

fn print_movie(record: &MovieRecord, images: &[cinedex_db::models::ImageAsset]) {
    println!(
        "{} [{}]",
        record.title.as_deref().unwrap_or("(untitled)"),
        record.id
    );
    if let Some(ref date) = record.release_date {
        println!("Released: {}", date);
    }
    println!("File: {}", record.file_path);
    if let Some(width) = record.v_resolution {
        println!("Video width: {}", width);
    }
    if let Some(ref codec) = record.a_codec {
        println!("Audio codec: {}", codec);
    }
    for image in images {
        println!("{}: {}", image.kind, image.path);
    }
    println!("Cast: {}", record.cast.len());
    for credit in record.cast.iter().take(10) {
        println!(
            "  {} as {}",
            credit.person_id,
            credit.character.as_deref().unwrap_or("?")
        );
    }
    println!("Updated: {}", record.updated_at.to_rfc3339());
}

fn probe_file(file: &Path, json: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let report = probe::probe_file(file)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("File: {}", file.display());
    println!("Container: {}", report.container);
    println!("Size: {} bytes", report.file_size);
    if let Some(ms) = report.duration_ms {
        let secs = ms / 1000;
        let mins = secs / 60;
        let hours = mins / 60;
        println!("Duration: {:02}:{:02}:{:02}", hours, mins % 60, secs % 60);
    }

    for (label, set) in [
        ("Video", &report.video),
        ("Audio", &report.audio),
        ("Subtitle", &report.subtitles),
    ] {
        if set.is_absent() {
            println!("\n{} Tracks: none", label);
            continue;
        }
        println!("\n{} Tracks: {}", label, set.tracks().len());
        for track in set.tracks() {
            print!("  [{}] {} ({})", track.index, track.name, track.codec_id);
            if let (Some(w), Some(h)) = (track.pixel_width, track.pixel_height) {
                print!(" {}x{}", w, h);
            }
            if let Some(channels) = track.channels {
                print!(" {}ch", channels);
            }
            if track.default {
                print!(" [default]");
            }
            if track.forced {
                print!(" [forced]");
            }
            println!();
        }
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            config::load_config(p)?
        }
        None => {
            println!("No config file specified, searching default locations");
            config::load_config_or_default(None)?
        }
    };

    println!("✓ Configuration is valid");
    println!("  Database: {}", config.database.path.display());
    println!("  Images: {}", config.images.dir.display());
    println!("  TMDB rate: {} req/s", config.tmdb.requests_per_second);
    println!("  Extensions: {}", config.scan.extensions.join(", "));
    println!("  Concurrency: {}", config.scan.concurrency);
    for warning in config.warnings() {
        println!("  ! {}", warning);
    }

    Ok(())
}
