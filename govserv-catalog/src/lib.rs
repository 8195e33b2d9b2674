//! GovServ Catalog
//!
//! In-memory catalog of public government service descriptions with
//! keyword and semantic search over a cache-then-remote load pipeline.
//!
//! ## Features
//!
//! - **Cache-first loading** - Local JSON cache with SPARQL endpoint fallback and write-back
//! - **Keyword ranking** - Literal substring scoring across name, description and tags
//! - **Semantic search** - Fingerprint-tracked embedding cache over an HNSW vector index
//! - **Graceful degradation** - Keyword search stays available when embeddings are unconfigured
//!
//! ## Example
//!
//! ```ignore
//! use govserv_catalog::{Catalog, LoadCoordinator, SparqlSource, rank};
//!
//! let mut catalog = Catalog::new();
//! let mut coordinator = LoadCoordinator::new("services.json", SparqlSource::default());
//! coordinator.load(&mut catalog)?;
//!
//! let keywords = vec!["passport".to_string()];
//! let hits = rank::rank(&catalog.all(), &keywords, rank::DEFAULT_LIMIT);
//! ```

pub mod catalog;
pub mod embedding;
pub mod error;
pub mod loader;
pub mod persist;
pub mod rank;
pub mod record;
pub mod remote;

// Re-exports for convenience
pub use catalog::Catalog;
pub use embedding::{
    CachingProvider, EmbeddingCache, EmbeddingProvider, EmbeddingStatistics, HnswVectorIndex,
    RefreshReport, VectorIndex,
};
pub use error::{CatalogError, Result};
pub use loader::{LoadCoordinator, LoadOutcome, LoadSource, LoadState, RawRecord, RemoteSource};
pub use rank::DEFAULT_LIMIT;
pub use record::ServiceRecord;
pub use remote::SparqlSource;

#[cfg(feature = "fastembed")]
pub use embedding::FastEmbedProvider;
