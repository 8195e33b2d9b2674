//! Local cache file codec
//!
//! The persisted form is a JSON array of records with required string fields
//! `id`, `uri`, `name`, `description` and an optional `keywords` array
//! (absent or `null` reads as empty). Elements are decoded independently so
//! one malformed record is skipped, not fatal to the whole file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::record::ServiceRecord;

#[derive(Debug, Serialize, Deserialize)]
struct PersistedRecord {
    id: String,
    uri: String,
    name: String,
    description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    keywords: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<Vec<String>> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

/// Outcome of reading a cache file
#[derive(Debug)]
pub struct CacheContents {
    pub records: Vec<ServiceRecord>,
    /// Records skipped because a field was missing or invalid
    pub skipped: usize,
}

/// Read the persisted cache
///
/// Fails when the file is missing, is not a JSON array, or yields zero
/// usable records; individual malformed elements are counted and skipped.
pub fn read_cache(path: &Path) -> Result<CacheContents> {
    let text = fs::read_to_string(path)?;
    let elements: Vec<serde_json::Value> = serde_json::from_str(&text)?;

    let mut records = Vec::with_capacity(elements.len());
    let mut skipped = 0;
    for element in elements {
        match decode_element(element) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Skipping malformed cached record: {e}");
                skipped += 1;
            }
        }
    }

    if records.is_empty() {
        return Err(CatalogError::malformed(format!(
            "cache file {} contained no usable records ({skipped} skipped)",
            path.display()
        )));
    }

    Ok(CacheContents { records, skipped })
}

fn decode_element(element: serde_json::Value) -> Result<ServiceRecord> {
    let persisted: PersistedRecord = serde_json::from_value(element)
        .map_err(|e| CatalogError::malformed(e.to_string()))?;
    ServiceRecord::with_identifier(
        persisted.id,
        persisted.uri,
        persisted.name,
        persisted.description,
        persisted.keywords,
    )
}

/// Write records to the cache file, creating parent directories
pub fn write_cache(path: &Path, records: &[ServiceRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let persisted: Vec<PersistedRecord> = records
        .iter()
        .map(|record| PersistedRecord {
            id: record.identifier().to_string(),
            uri: record.source_uri().to_string(),
            name: record.name().to_string(),
            description: record.description().to_string(),
            keywords: record.tags().to_vec(),
        })
        .collect();

    fs::write(path, serde_json::to_string_pretty(&persisted)?)?;
    Ok(())
}
