//! The ingestion pipeline.
//!
//! Per file: resolve identity, skip if already stored, extract local
//! technical metadata, fetch remote detail and credits, cache assets, then
//! write the merged movie record in one upsert. Failures are per file and
//! collected into a [`BatchReport`].

mod coordinator;

use std::fmt;
use std::path::{Path, PathBuf};

use cinedex_common::{Error, MovieId};

pub use coordinator::IngestionCoordinator;

/// The step of the per-file pipeline a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    /// Mapping the file name to an identity.
    Resolve,
    /// Checking whether the identity is already stored.
    Lookup,
    /// Fetching detail and credits from the remote service.
    Fetch,
    /// Caching images and cast records.
    Assets,
    /// Writing the movie record.
    Persist,
}

impl IngestStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resolve => "resolve",
            Self::Lookup => "lookup",
            Self::Fetch => "fetch",
            Self::Assets => "assets",
            Self::Persist => "persist",
        }
    }
}

impl fmt::Display for IngestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state of a file that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// A fresh record was written.
    Persisted(MovieId),
    /// A record already existed and `force` was not set; nothing was fetched.
    AlreadyPresent(MovieId),
}

impl IngestOutcome {
    pub fn movie_id(&self) -> MovieId {
        match self {
            Self::Persisted(id) | Self::AlreadyPresent(id) => *id,
        }
    }
}

/// A file that stopped before being persisted.
#[derive(Debug, thiserror::Error)]
#[error("{} failed at {}: {}", .path.display(), .stage, .error)]
pub struct IngestFailure {
    pub path: PathBuf,
    pub stage: IngestStage,
    #[source]
    pub error: Error,
}

impl IngestFailure {
    pub fn new(path: &Path, stage: IngestStage, error: Error) -> Self {
        Self {
            path: path.to_path_buf(),
            stage,
            error,
        }
    }

    /// True when the file was skipped because it could not be identified.
    pub fn is_unresolved(&self) -> bool {
        matches!(self.error, Error::Resolution(_))
    }
}

/// Accumulated result of a batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub persisted: Vec<MovieId>,
    pub already_present: Vec<MovieId>,
    pub failures: Vec<IngestFailure>,
    /// The batch was cancelled before every file was dispatched.
    pub cancelled: bool,
}

impl BatchReport {
    pub fn record(&mut self, result: Result<IngestOutcome, IngestFailure>) {
        match result {
            Ok(IngestOutcome::Persisted(id)) => self.persisted.push(id),
            Ok(IngestOutcome::AlreadyPresent(id)) => self.already_present.push(id),
            Err(failure) => self.failures.push(failure),
        }
    }

    /// Number of files that reached a terminal state.
    pub fn processed(&self) -> usize {
        self.persisted.len() + self.already_present.len() + self.failures.len()
    }

    pub fn unresolved(&self) -> usize {
        self.failures.iter().filter(|f| f.is_unresolved()).count()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }

    pub(crate) fn sort(&mut self) {
        self.persisted.sort();
        self.already_present.sort();
        self.failures.sort_by(|a, b| a.path.cmp(&b.path));
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} persisted, {} already present, {} failed ({} unresolved)",
            self.persisted.len(),
            self.already_present.len(),
            self.failures.len(),
            self.unresolved()
        )?;
        if self.cancelled {
            f.write_str(", cancelled")?;
        }
        Ok(())
    }
}
