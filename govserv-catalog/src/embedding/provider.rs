//! Embedding provider interface
//!
//! The provider maps text to a fixed-length vector. Implementations live at
//! the system boundary (local model, remote API); the cache only sees this
//! trait.

use dashmap::DashMap;

use crate::error::Result;

/// Maps text to a fixed-dimension embedding vector
pub trait EmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Vector length produced by [`embed`](Self::embed)
    fn dimension(&self) -> usize;
}

/// Memoizing wrapper around any provider
///
/// Repeated lookups for the same text hit the in-memory cache instead of the
/// underlying model.
pub struct CachingProvider<P> {
    inner: P,
    cache: DashMap<String, Vec<f32>>,
}

impl<P: EmbeddingProvider> CachingProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
        }
    }

    /// Number of memoized texts
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    /// Drop all memoized vectors
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

impl<P: EmbeddingProvider> EmbeddingProvider for CachingProvider<P> {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(cached) = self.cache.get(text) {
            return Ok(cached.clone());
        }

        let vector = self.inner.embed(text)?;
        self.cache.insert(text.to_string(), vector.clone());
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }
}
