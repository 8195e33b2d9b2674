//! Error types for govserv-catalog

use thiserror::Error;

/// Errors that can occur in the catalog engine
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No identifier could be resolved for a record
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Persisted record with a missing or invalid field
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// Both the local cache and the remote source failed
    #[error("Load failed (local: {local}; remote: {remote})")]
    LoadFailure {
        local: Box<CatalogError>,
        remote: Box<CatalogError>,
    },

    /// Embedding provider or vector index not configured/reachable
    #[error("Semantic search unavailable: {0}")]
    SemanticSearchUnavailable(String),

    /// Remote source query error
    #[error("Remote source error: {0}")]
    RemoteSource(String),

    /// Embedding generation error
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector index error
    #[error("Vector index error: {0}")]
    VectorIndex(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    /// Create an invalid identifier error
    pub fn invalid_identifier(msg: impl Into<String>) -> Self {
        Self::InvalidIdentifier(msg.into())
    }

    /// Create a malformed record error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedRecord(msg.into())
    }

    /// Create a semantic-search-unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::SemanticSearchUnavailable(msg.into())
    }

    /// Create a remote source error
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::RemoteSource(msg.into())
    }

    /// Create an embedding error
    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::Embedding(msg.into())
    }

    /// Create a vector index error
    pub fn vector_index(msg: impl Into<String>) -> Self {
        Self::VectorIndex(msg.into())
    }
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;
