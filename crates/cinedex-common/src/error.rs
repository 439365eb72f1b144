//! Common error types used throughout cinedex.
//!
//! One error type covers the failure classes of the ingestion pipeline:
//! identity resolution, the remote metadata service, asset downloads,
//! persistence, probing and configuration.

/// Common error type for cinedex.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A file could not be mapped to a canonical identity.
    #[error("Resolution failed: {0}")]
    Resolution(String),

    /// The remote metadata service could not be reached or answered with a
    /// non-success status.
    #[error("Remote unavailable ({endpoint}): {message}")]
    RemoteUnavailable { endpoint: String, message: String },

    /// An image could not be downloaded or decoded.
    #[error("Asset unavailable: {0}")]
    AssetUnavailable(String),

    /// A store operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Local technical metadata could not be extracted.
    #[error("Probe error: {0}")]
    Probe(String),

    /// Invalid input or configuration was provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new Resolution error.
    pub fn resolution<S: Into<String>>(msg: S) -> Self {
        Self::Resolution(msg.into())
    }

    /// Create a new RemoteUnavailable error.
    pub fn remote<E: Into<String>, M: Into<String>>(endpoint: E, message: M) -> Self {
        Self::RemoteUnavailable {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a new AssetUnavailable error.
    pub fn asset<S: Into<String>>(msg: S) -> Self {
        Self::AssetUnavailable(msg.into())
    }

    /// Create a new Database error.
    pub fn database<S: Into<String>>(msg: S) -> Self {
        Self::Database(msg.into())
    }

    /// Create a new Probe error.
    pub fn probe<S: Into<String>>(msg: S) -> Self {
        Self::Probe(msg.into())
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the error came from the remote service.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteUnavailable { .. })
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
