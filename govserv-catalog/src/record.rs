//! Service record type and identifier resolution
//!
//! A `ServiceRecord` is the validated unit of catalog data. Records are
//! immutable value types: fields are fixed at construction and replacement
//! goes through [`crate::Catalog::add`].

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{CatalogError, Result};

/// A validated government-service entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    identifier: String,
    source_uri: String,
    name: String,
    description: String,
    tags: Vec<String>,
}

impl ServiceRecord {
    /// Construct a record, deriving the identifier from `source_uri`
    ///
    /// The identifier is the URI fragment when present and non-empty,
    /// otherwise the last non-empty path segment. Fails with
    /// `InvalidIdentifier` when neither yields anything.
    pub fn new(
        source_uri: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        tags: Vec<String>,
    ) -> Result<Self> {
        let source_uri = source_uri.into();
        let identifier = derive_identifier(&source_uri).ok_or_else(|| {
            CatalogError::invalid_identifier(format!(
                "no identifier could be derived from URI {source_uri:?}"
            ))
        })?;
        Self::with_identifier(identifier, source_uri, name, description, tags)
    }

    /// Construct a record with an explicit identifier
    pub fn with_identifier(
        identifier: impl Into<String>,
        source_uri: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        tags: Vec<String>,
    ) -> Result<Self> {
        let identifier = identifier.into();
        let source_uri = source_uri.into();
        let name = name.into();
        let description = description.into();

        if identifier.is_empty() {
            return Err(CatalogError::invalid_identifier(
                "identifier must not be empty",
            ));
        }
        if source_uri.is_empty() {
            return Err(CatalogError::malformed("source URI must not be empty"));
        }
        if name.is_empty() {
            return Err(CatalogError::malformed("name must not be empty"));
        }
        if description.is_empty() {
            return Err(CatalogError::malformed("description must not be empty"));
        }

        Ok(Self {
            identifier,
            source_uri,
            name,
            description,
            tags,
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn source_uri(&self) -> &str {
        &self.source_uri
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Get the searchable text for this record
    pub fn searchable_text(&self) -> String {
        format!(
            "{} {} {}",
            self.name,
            self.description,
            self.tags.join(" ")
        )
    }

    /// Stable content hash over name, description, and tags
    ///
    /// Used by the embedding cache to detect stale entries: a stored
    /// fingerprint that no longer matches means the record's content changed
    /// since its vector was computed.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.name.as_bytes());
        hasher.update([0x1f]);
        hasher.update(self.description.as_bytes());
        for tag in &self.tags {
            hasher.update([0x1f]);
            hasher.update(tag.as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

/// Derive an identifier from a Linked-Data URI
///
/// Priority: fragment, then last non-empty path segment. Returns `None` when
/// the URI carries neither (e.g. a bare authority like `https://gov.example.com/`).
fn derive_identifier(uri: &str) -> Option<String> {
    let uri = uri.trim();
    if uri.is_empty() {
        return None;
    }

    let (rest, fragment) = match uri.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (uri, None),
    };
    if let Some(fragment) = fragment {
        let fragment = fragment.trim();
        if !fragment.is_empty() {
            return Some(fragment.to_string());
        }
    }

    let rest = rest.split_once('?').map_or(rest, |(path, _)| path);
    let path = match rest.split_once("://") {
        // Skip the authority; a URI with no path after it has no segments.
        Some((_, after_scheme)) => after_scheme.split_once('/')?.1,
        None => rest,
    };

    path.rsplit('/')
        .map(str::trim)
        .find(|segment| !segment.is_empty())
        .map(String::from)
}
