use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cinedex")]
#[command(author, version, about = "Media library ingestion and TMDB enrichment")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest every file under every watched directory
    Scan {
        /// Re-fetch movies that are already stored
        #[arg(long)]
        force: bool,
    },

    /// Ingest a single file
    Ingest {
        /// Media file to ingest
        #[arg(required = true)]
        file: PathBuf,

        /// Re-fetch even if the movie is already stored
        #[arg(long)]
        force: bool,
    },

    /// Add a watched directory, or update its flags
    AddDir {
        /// Directory to watch
        #[arg(required = true)]
        path: PathBuf,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Maximum levels below the root when recursive (0 = top level only)
        #[arg(long)]
        depth: Option<u32>,
    },

    /// Stop watching a directory (stored movies are kept)
    RemoveDir {
        #[arg(required = true)]
        path: PathBuf,
    },

    /// List watched directories
    ListDirs,

    /// Show a stored movie by TMDB id or file name
    Show {
        /// TMDB id, file name or full path
        #[arg(required = true)]
        movie: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Probe a media file and display its tracks
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
