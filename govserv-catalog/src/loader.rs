//! Local/remote load fallback state machine
//!
//! `load()` fully replaces the catalog from the local JSON cache, falling
//! back to the remote source when the cache is missing or unusable. A
//! successful remote load is written back to the cache best-effort. The
//! state machine is an explicit enum with pure transitions so the composite
//! failure case stays testable in isolation.

use std::path::{Path, PathBuf};

use crate::catalog::Catalog;
use crate::embedding::EmbeddingCache;
use crate::error::{CatalogError, Result};
use crate::persist;
use crate::record::ServiceRecord;

/// Load progress states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Empty,
    LoadingLocal,
    LoadingRemote,
    Populated,
    Failed,
}

impl LoadState {
    /// Transition after the local-cache attempt
    ///
    /// Local errors fall back to the remote source; they never fail the load
    /// outright.
    pub fn after_local(self, ok: bool) -> Self {
        debug_assert_eq!(self, Self::LoadingLocal);
        if ok {
            Self::Populated
        } else {
            Self::LoadingRemote
        }
    }

    /// Transition after the remote attempt
    pub fn after_remote(self, ok: bool) -> Self {
        debug_assert_eq!(self, Self::LoadingRemote);
        if ok {
            Self::Populated
        } else {
            Self::Failed
        }
    }
}

/// Raw record tuple as returned by the remote source
///
/// The remote never supplies identifiers; derivation always runs over
/// `source_uri` during construction.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub source_uri: String,
    pub name: String,
    pub description: String,
}

/// The remote query source collaborator
pub trait RemoteSource {
    /// Fetch the full raw record set
    fn fetch_all(&self) -> Result<Vec<RawRecord>>;
}

/// Which source ultimately populated the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    LocalCache,
    Remote,
}

/// Outcome of a successful [`LoadCoordinator::load`]
#[derive(Debug)]
pub struct LoadOutcome {
    pub source: LoadSource,
    /// Records added to the catalog
    pub loaded: usize,
    /// Records dropped to per-record construction/deserialization errors
    pub skipped: usize,
}

/// Orchestrates catalog population from cache-then-remote sources
pub struct LoadCoordinator<S> {
    cache_path: PathBuf,
    remote: S,
    state: LoadState,
}

impl<S: RemoteSource> LoadCoordinator<S> {
    pub fn new(cache_path: impl Into<PathBuf>, remote: S) -> Self {
        Self {
            cache_path: cache_path.into(),
            remote,
            state: LoadState::Empty,
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Fully replace the catalog from the local cache or the remote source
    ///
    /// The catalog is cleared first and is either fully repopulated or left
    /// empty alongside a `LoadFailure` naming both underlying causes.
    pub fn load(&mut self, catalog: &mut Catalog) -> Result<LoadOutcome> {
        if !catalog.is_empty() {
            catalog.clear();
        }

        self.state = LoadState::LoadingLocal;
        let local_err = match persist::read_cache(&self.cache_path) {
            Ok(contents) => {
                self.state = self.state.after_local(true);
                let loaded = contents.records.len();
                catalog.add_many(contents.records);
                tracing::info!("Loaded {loaded} records from local cache");
                return Ok(LoadOutcome {
                    source: LoadSource::LocalCache,
                    loaded,
                    skipped: contents.skipped,
                });
            }
            Err(e) => {
                tracing::debug!("Local cache unusable, falling back to remote: {e}");
                self.state = self.state.after_local(false);
                e
            }
        };

        match self.load_remote() {
            Ok((records, skipped)) => {
                self.state = self.state.after_remote(true);
                let loaded = records.len();
                self.write_back(&records);
                catalog.add_many(records);
                tracing::info!(
                    "Loaded {loaded} records from remote source ({skipped} skipped)"
                );
                Ok(LoadOutcome {
                    source: LoadSource::Remote,
                    loaded,
                    skipped,
                })
            }
            Err(remote_err) => {
                self.state = self.state.after_remote(false);
                Err(CatalogError::LoadFailure {
                    local: Box::new(local_err),
                    remote: Box::new(remote_err),
                })
            }
        }
    }

    /// [`load`](Self::load), then refresh the embedding cache
    ///
    /// A refresh failure degrades semantic search but never reverts the
    /// populated catalog; keyword search stays usable.
    pub fn load_and_refresh(
        &mut self,
        catalog: &mut Catalog,
        embeddings: &mut EmbeddingCache,
    ) -> Result<LoadOutcome> {
        let outcome = self.load(catalog)?;

        match embeddings.refresh(&catalog.all()) {
            Ok(report) if !report.failed.is_empty() => {
                tracing::warn!(
                    "Embedding refresh left {} records unembedded",
                    report.failed.len()
                );
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Embedding refresh failed, semantic search degraded: {e}");
            }
        }

        Ok(outcome)
    }

    fn load_remote(&self) -> Result<(Vec<ServiceRecord>, usize)> {
        let raw = self.remote.fetch_all()?;

        let mut records = Vec::with_capacity(raw.len());
        let mut skipped = 0;
        for tuple in raw {
            match ServiceRecord::new(tuple.source_uri, tuple.name, tuple.description, Vec::new())
            {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("Skipping remote record: {e}");
                    skipped += 1;
                }
            }
        }

        if records.is_empty() {
            return Err(CatalogError::remote(format!(
                "remote source yielded no usable records ({skipped} skipped)"
            )));
        }
        Ok((records, skipped))
    }

    /// Best-effort write-back; failure is reported, never escalated
    fn write_back(&self, records: &[ServiceRecord]) {
        if let Err(e) = persist::write_cache(&self.cache_path, records) {
            tracing::warn!(
                "Failed to write cache {}: {e}",
                self.cache_path.display()
            );
        }
    }
}
