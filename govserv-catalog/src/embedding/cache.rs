//! Embedding cache with fingerprint-based staleness
//!
//! Tracks, per record, whether a content-derived embedding is current.
//! Staleness is detected by comparing the stored fingerprint against the
//! live record's content hash, so `refresh` converges after any catalog
//! mutation without redundant provider calls.

use std::collections::{HashMap, HashSet};

use crate::catalog::Catalog;
use crate::embedding::index::VectorIndex;
use crate::embedding::provider::EmbeddingProvider;
use crate::error::{CatalogError, Result};
use crate::record::ServiceRecord;

/// Per-record embedding bookkeeping
#[derive(Debug, Clone)]
pub struct EmbeddingEntry {
    /// Content hash at the time the vector was computed
    pub fingerprint: String,
    /// True once a vector has been stored for this fingerprint
    pub has_vector: bool,
}

/// Outcome of a [`EmbeddingCache::refresh`] pass
#[derive(Debug, Default)]
pub struct RefreshReport {
    /// Records embedded during this pass
    pub embedded: usize,
    /// Records whose entry was already current
    pub skipped: usize,
    /// Identifiers whose embed or store failed; the pass continued past them
    pub failed: Vec<String>,
}

/// Coverage numbers for the embedded record set
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingStatistics {
    pub total_records: usize,
    pub embedded_records: usize,
    pub coverage_percent: f64,
}

/// Embedding cache over external provider and index collaborators
///
/// Both collaborators are optional; an unconfigured cache keeps keyword
/// search fully usable and reports `SemanticSearchUnavailable` for semantic
/// operations.
pub struct EmbeddingCache {
    provider: Option<Box<dyn EmbeddingProvider>>,
    index: Option<Box<dyn VectorIndex>>,
    entries: HashMap<String, EmbeddingEntry>,
}

impl EmbeddingCache {
    /// Create a cache with configured collaborators
    pub fn new(provider: Box<dyn EmbeddingProvider>, index: Box<dyn VectorIndex>) -> Self {
        Self {
            provider: Some(provider),
            index: Some(index),
            entries: HashMap::new(),
        }
    }

    /// Create a cache with no collaborators; semantic operations fail with
    /// `SemanticSearchUnavailable`
    pub fn unconfigured() -> Self {
        Self {
            provider: None,
            index: None,
            entries: HashMap::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some() && self.index.is_some()
    }

    /// Bookkeeping entry for an identifier, if any
    pub fn entry(&self, identifier: &str) -> Option<&EmbeddingEntry> {
        self.entries.get(identifier)
    }

    /// Converge the cache to the given record set
    ///
    /// Records whose fingerprint already has a stored vector are skipped;
    /// stale or missing entries are re-embedded and upserted into the index.
    /// A failure on one record is recorded in the report and the pass moves
    /// on. Entries for identifiers absent from `records` are pruned.
    pub fn refresh(&mut self, records: &[ServiceRecord]) -> Result<RefreshReport> {
        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| CatalogError::unavailable("no embedding provider configured"))?;
        let index = self
            .index
            .as_mut()
            .ok_or_else(|| CatalogError::unavailable("no vector index configured"))?;

        let live: HashSet<&str> = records.iter().map(|r| r.identifier()).collect();
        self.entries.retain(|id, _| live.contains(id.as_str()));

        let mut report = RefreshReport::default();
        for record in records {
            let identifier = record.identifier();
            let fingerprint = record.fingerprint();

            let current = self
                .entries
                .get(identifier)
                .is_some_and(|entry| entry.has_vector && entry.fingerprint == fingerprint);
            if current {
                report.skipped += 1;
                continue;
            }

            let stored = provider
                .embed(&record.searchable_text())
                .and_then(|vector| index.upsert(identifier, vector));
            match stored {
                Ok(()) => {
                    self.entries.insert(
                        identifier.to_string(),
                        EmbeddingEntry {
                            fingerprint,
                            has_vector: true,
                        },
                    );
                    report.embedded += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to embed record {identifier}: {e}");
                    // Drop the entry so the next refresh retries this record.
                    self.entries.remove(identifier);
                    report.failed.push(identifier.to_string());
                }
            }
        }

        tracing::debug!(
            embedded = report.embedded,
            skipped = report.skipped,
            failed = report.failed.len(),
            "Embedding refresh complete"
        );
        Ok(report)
    }

    /// Similarity search over the stored vectors
    ///
    /// Returns catalog records in the index's similarity order. Identifiers
    /// the catalog no longer holds are skipped without backfilling; zero
    /// matches is a valid empty result.
    pub fn search(
        &self,
        catalog: &Catalog,
        query_text: &str,
        limit: usize,
    ) -> Result<Vec<ServiceRecord>> {
        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| CatalogError::unavailable("no embedding provider configured"))?;
        let index = self
            .index
            .as_ref()
            .ok_or_else(|| CatalogError::unavailable("no vector index configured"))?;

        let query_vector = provider.embed(query_text)?;
        let identifiers = index.query_nearest(&query_vector, limit)?;

        Ok(identifiers
            .iter()
            .filter_map(|id| catalog.get(id))
            .cloned()
            .collect())
    }

    /// Coverage of the live catalog by current embedding entries
    pub fn statistics(&self, catalog: &Catalog) -> EmbeddingStatistics {
        let total_records = catalog.count();
        let embedded_records = catalog
            .all()
            .iter()
            .filter(|record| {
                self.entries
                    .get(record.identifier())
                    .is_some_and(|entry| {
                        entry.has_vector && entry.fingerprint == record.fingerprint()
                    })
            })
            .count();

        let coverage_percent = if total_records == 0 {
            0.0
        } else {
            embedded_records as f64 / total_records as f64 * 100.0
        };

        EmbeddingStatistics {
            total_records,
            embedded_records,
            coverage_percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::index::cosine_similarity;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Deterministic provider that counts calls and can be told to fail on a
    /// specific text
    struct StubProvider {
        calls: Rc<Cell<usize>>,
        fail_on: Option<String>,
    }

    impl StubProvider {
        fn counting(calls: Rc<Cell<usize>>) -> Self {
            Self {
                calls,
                fail_on: None,
            }
        }
    }

    impl EmbeddingProvider for StubProvider {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.set(self.calls.get() + 1);
            if self.fail_on.as_deref().is_some_and(|f| text.contains(f)) {
                return Err(CatalogError::embedding("stub failure"));
            }
            // Term-count vector over a tiny fixed vocabulary; exact and
            // deterministic so ordering assertions hold.
            let vocab = ["passport", "tax", "vote", "health"];
            Ok(vocab
                .iter()
                .map(|term| text.matches(term).count() as f32)
                .collect())
        }

        fn dimension(&self) -> usize {
            4
        }
    }

    /// Linear-scan index used to keep test ordering exact
    #[derive(Default)]
    struct StubIndex {
        vectors: Vec<(String, Vec<f32>)>,
    }

    impl VectorIndex for StubIndex {
        fn upsert(&mut self, identifier: &str, vector: Vec<f32>) -> Result<()> {
            match self.vectors.iter_mut().find(|(id, _)| id == identifier) {
                Some((_, stored)) => *stored = vector,
                None => self.vectors.push((identifier.to_string(), vector)),
            }
            Ok(())
        }

        fn query_nearest(&self, vector: &[f32], limit: usize) -> Result<Vec<String>> {
            let mut scored: Vec<(&str, f32)> = self
                .vectors
                .iter()
                .map(|(id, v)| (id.as_str(), cosine_similarity(vector, v)))
                .collect();
            scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
            Ok(scored
                .into_iter()
                .take(limit)
                .map(|(id, _)| id.to_string())
                .collect())
        }
    }

    fn record(id: &str, description: &str, tags: &[&str]) -> ServiceRecord {
        ServiceRecord::with_identifier(
            id,
            format!("https://gov.example.com/services/{id}"),
            format!("Service {id}"),
            description,
            tags.iter().map(|t| t.to_string()).collect(),
        )
        .unwrap()
    }

    fn cache_with_counter() -> (EmbeddingCache, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let cache = EmbeddingCache::new(
            Box::new(StubProvider::counting(calls.clone())),
            Box::new(StubIndex::default()),
        );
        (cache, calls)
    }

    #[test]
    fn test_unconfigured_cache_reports_unavailable() {
        let mut cache = EmbeddingCache::unconfigured();
        let catalog = Catalog::new();
        assert!(!cache.is_configured());
        assert!(matches!(
            cache.refresh(&[]),
            Err(CatalogError::SemanticSearchUnavailable(_))
        ));
        assert!(matches!(
            cache.search(&catalog, "anything", 5),
            Err(CatalogError::SemanticSearchUnavailable(_))
        ));
    }

    #[test]
    fn test_refresh_embeds_every_record_once() {
        let (mut cache, calls) = cache_with_counter();
        let records = vec![record("a", "first", &[]), record("b", "second", &[])];

        let report = cache.refresh(&records).unwrap();
        assert_eq!(report.embedded, 2);
        assert_eq!(report.skipped, 0);
        assert!(report.failed.is_empty());
        assert_eq!(calls.get(), 2);
        assert!(cache.entry("a").unwrap().has_vector);
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let (mut cache, calls) = cache_with_counter();
        let records = vec![record("a", "first", &[]), record("b", "second", &[])];

        cache.refresh(&records).unwrap();
        let before = calls.get();

        let report = cache.refresh(&records).unwrap();
        assert_eq!(report.embedded, 0);
        assert_eq!(report.skipped, 2);
        assert_eq!(calls.get(), before);
    }

    #[test]
    fn test_changed_record_is_the_only_one_reembedded() {
        let (mut cache, calls) = cache_with_counter();
        let records = vec![
            record("a", "first", &["tag"]),
            record("b", "second", &[]),
            record("c", "third", &[]),
        ];
        cache.refresh(&records).unwrap();
        let before_fp = cache.entry("b").unwrap().fingerprint.clone();
        let before_calls = calls.get();

        // Replace "b" with changed tags (as Catalog::add replacement would).
        let changed = vec![
            record("a", "first", &["tag"]),
            record("b", "second", &["new-tag"]),
            record("c", "third", &[]),
        ];
        let report = cache.refresh(&changed).unwrap();

        assert_eq!(report.embedded, 1);
        assert_eq!(report.skipped, 2);
        assert_eq!(calls.get(), before_calls + 1);
        assert_ne!(cache.entry("b").unwrap().fingerprint, before_fp);
    }

    #[test]
    fn test_refresh_continues_past_failures() {
        let calls = Rc::new(Cell::new(0));
        let provider = StubProvider {
            calls: calls.clone(),
            fail_on: Some("second".to_string()),
        };
        let mut cache = EmbeddingCache::new(Box::new(provider), Box::new(StubIndex::default()));
        let records = vec![
            record("a", "first", &[]),
            record("b", "second", &[]),
            record("c", "third", &[]),
        ];

        let report = cache.refresh(&records).unwrap();
        assert_eq!(report.embedded, 2);
        assert_eq!(report.failed, vec!["b".to_string()]);
        assert!(cache.entry("b").is_none());

        // The failed record is retried next pass; the others are not.
        let report = cache.refresh(&records).unwrap();
        assert_eq!(report.skipped, 2);
        assert_eq!(report.failed, vec!["b".to_string()]);
    }

    #[test]
    fn test_refresh_prunes_removed_records() {
        let (mut cache, _calls) = cache_with_counter();
        cache
            .refresh(&[record("a", "first", &[]), record("b", "second", &[])])
            .unwrap();

        cache.refresh(&[record("a", "first", &[])]).unwrap();
        assert!(cache.entry("b").is_none());
        assert!(cache.entry("a").is_some());
    }

    #[test]
    fn test_search_resolves_in_index_order() {
        let (mut cache, _calls) = cache_with_counter();
        let records = vec![
            record("renew-passport", "passport renewal travel", &[]),
            record("file-taxes", "income tax filing", &[]),
        ];
        let mut catalog = Catalog::new();
        catalog.add_many(records.clone());
        cache.refresh(&records).unwrap();

        let results = cache
            .search(&catalog, "passport renewal travel", 2)
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].identifier(), "renew-passport");
    }

    #[test]
    fn test_search_skips_unresolvable_identifiers() {
        let (mut cache, _calls) = cache_with_counter();
        let records = vec![
            record("kept", "passport renewal", &[]),
            record("deleted", "passport renewal too", &[]),
        ];
        let mut catalog = Catalog::new();
        catalog.add_many(records.clone());
        cache.refresh(&records).unwrap();

        // Record removed after embedding; its identifier is still in the index.
        catalog.clear();
        catalog.add(records[0].clone());

        let results = cache.search(&catalog, "passport renewal", 5).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].identifier(), "kept");
    }

    #[test]
    fn test_statistics() {
        let (mut cache, _calls) = cache_with_counter();
        let mut catalog = Catalog::new();

        let stats = cache.statistics(&catalog);
        assert_eq!(stats.total_records, 0);
        assert_eq!(stats.coverage_percent, 0.0);

        let records = vec![record("a", "first", &[]), record("b", "second", &[])];
        catalog.add_many(records.clone());
        cache.refresh(&records).unwrap();

        let stats = cache.statistics(&catalog);
        assert_eq!(stats.total_records, 2);
        assert_eq!(stats.embedded_records, 2);
        assert!((stats.coverage_percent - 100.0).abs() < f64::EPSILON);

        // A replaced record's stale entry no longer counts as covered.
        catalog.add(record("a", "first edited", &[]));
        let stats = cache.statistics(&catalog);
        assert_eq!(stats.embedded_records, 1);
        assert!((stats.coverage_percent - 50.0).abs() < f64::EPSILON);
    }
}
