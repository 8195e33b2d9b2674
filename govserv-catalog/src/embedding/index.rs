//! Vector index interface and HNSW implementation
//!
//! `HnswVectorIndex` keeps vectors in memory and rebuilds an
//! instant-distance HNSW graph lazily on the first query after a mutation.
//! Small sets are answered with a linear scan instead of building a graph.

use instant_distance::{Builder, HnswMap, Point, Search};
use parking_lot::RwLock;

use crate::error::Result;

/// Threshold below which a linear scan beats building an HNSW graph
const LINEAR_SCAN_THRESHOLD: usize = 16;

/// Nearest-neighbor lookup over stored vectors, keyed by identifier
pub trait VectorIndex {
    /// Store or replace the vector for an identifier
    fn upsert(&mut self, identifier: &str, vector: Vec<f32>) -> Result<()>;

    /// Identifiers of the `limit` nearest stored vectors, most similar first
    fn query_nearest(&self, vector: &[f32], limit: usize) -> Result<Vec<String>>;
}

/// HNSW point with cosine distance
#[derive(Clone)]
struct IndexPoint(Vec<f32>);

impl Point for IndexPoint {
    fn distance(&self, other: &Self) -> f32 {
        // Cosine distance = 1 - similarity (HNSW finds minimum)
        1.0 - cosine_similarity(&self.0, &other.0)
    }
}

/// In-process HNSW vector index
#[derive(Default)]
pub struct HnswVectorIndex {
    entries: Vec<(String, Vec<f32>)>,
    built: RwLock<Option<HnswMap<IndexPoint, String>>>,
}

impl HnswVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored vectors
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn linear_scan(&self, vector: &[f32], limit: usize) -> Vec<String> {
        let mut results: Vec<(&str, f32)> = self
            .entries
            .iter()
            .map(|(id, stored)| (id.as_str(), cosine_similarity(vector, stored)))
            .collect();

        results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);
        results.into_iter().map(|(id, _)| id.to_string()).collect()
    }
}

impl VectorIndex for HnswVectorIndex {
    fn upsert(&mut self, identifier: &str, vector: Vec<f32>) -> Result<()> {
        match self.entries.iter_mut().find(|(id, _)| id == identifier) {
            Some((_, stored)) => *stored = vector,
            None => self.entries.push((identifier.to_string(), vector)),
        }
        // Invalidate; the graph is rebuilt on the next query.
        *self.built.write() = None;
        Ok(())
    }

    fn query_nearest(&self, vector: &[f32], limit: usize) -> Result<Vec<String>> {
        if self.entries.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        if self.entries.len() < LINEAR_SCAN_THRESHOLD {
            return Ok(self.linear_scan(vector, limit));
        }

        let mut built = self.built.write();
        let map = built.get_or_insert_with(|| {
            let points: Vec<IndexPoint> = self
                .entries
                .iter()
                .map(|(_, v)| IndexPoint(v.clone()))
                .collect();
            let ids: Vec<String> = self.entries.iter().map(|(id, _)| id.clone()).collect();
            Builder::default().ef_construction(100).build(points, ids)
        });
        let query = IndexPoint(vector.to_vec());
        let mut search = Search::default();

        Ok(map
            .search(&query, &mut search)
            .take(limit)
            .map(|item| item.value.clone())
            .collect())
    }
}

/// Calculate cosine similarity between two vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
