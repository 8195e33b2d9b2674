//! FastEmbed-backed embedding provider
//!
//! Local ONNX embeddings (BGE-Small-EN-v1.5, 384 dimensions). Model weights
//! are fetched on first use, so construction can fail on machines without
//! network access; that surfaces as `SemanticSearchUnavailable`.

use ::fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use crate::embedding::provider::EmbeddingProvider;
use crate::error::{CatalogError, Result};

/// Embedding provider over a local fastembed model
pub struct FastEmbedProvider {
    model: TextEmbedding,
    dimension: usize,
}

impl FastEmbedProvider {
    /// Load the default model (BGE-Small-EN-v1.5)
    pub fn new() -> Result<Self> {
        Self::with_model(EmbeddingModel::BGESmallENV15)
    }

    /// Load a specific fastembed model
    pub fn with_model(model: EmbeddingModel) -> Result<Self> {
        let model = TextEmbedding::try_new(
            InitOptions::new(model).with_show_download_progress(false),
        )
        .map_err(|e| {
            CatalogError::unavailable(format!("failed to load embedding model: {e}"))
        })?;

        // Probe the dimension with a test encode, as the model reports none.
        let probe = model
            .embed(vec!["dimension probe"], None)
            .map_err(|e| CatalogError::unavailable(format!("model probe failed: {e}")))?;
        let dimension = probe.first().map(Vec::len).unwrap_or(0);

        tracing::info!("FastEmbed provider ready ({dimension}d)");
        Ok(Self { model, dimension })
    }
}

impl EmbeddingProvider for FastEmbedProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self
            .model
            .embed(vec![text], None)
            .map_err(|e| CatalogError::embedding(format!("failed to encode text: {e}")))?;
        vectors
            .pop()
            .ok_or_else(|| CatalogError::embedding("model returned no vector"))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
