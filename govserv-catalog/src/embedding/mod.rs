//! Embedding cache and semantic search collaborators

mod cache;
#[cfg(feature = "fastembed")]
mod fastembed;
mod index;
mod provider;

pub use cache::{EmbeddingCache, EmbeddingEntry, EmbeddingStatistics, RefreshReport};
#[cfg(feature = "fastembed")]
pub use self::fastembed::FastEmbedProvider;
pub use index::{cosine_similarity, HnswVectorIndex, VectorIndex};
pub use provider::{CachingProvider, EmbeddingProvider};
