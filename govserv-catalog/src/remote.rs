//! SPARQL-backed remote record source
//!
//! Queries a government register's SPARQL endpoint for the full service
//! list. Response decoding is split from transport so the bindings parser
//! is testable without a live endpoint.

use serde::Deserialize;

use crate::error::{CatalogError, Result};
use crate::loader::{RawRecord, RemoteSource};

/// Default public endpoint of the Czech registry of rights and duties
pub const DEFAULT_ENDPOINT: &str = "https://rpp-opendata.egon.gov.cz/odrpp/sparql";

// The class lives in the legislativní vocabulary, the name/description
// properties in the agendový one.
const SERVICE_QUERY: &str = "\
PREFIX rppl: <https://slovník.gov.cz/legislativní/sbírka/111/2009/pojem/>
PREFIX rppa: <https://slovník.gov.cz/agendový/104/pojem/>
SELECT ?uri ?name ?description WHERE {
  ?uri a rppl:služba-veřejné-správy ;
       rppa:má-název-služby ?name ;
       rppa:má-popis-služby ?description .
}";

/// Fetches service records over SPARQL (blocking HTTP)
pub struct SparqlSource {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl SparqlSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::blocking::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for SparqlSource {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl RemoteSource for SparqlSource {
    fn fetch_all(&self) -> Result<Vec<RawRecord>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("query", SERVICE_QUERY)])
            .header("Accept", "application/sparql-results+json")
            .send()
            .map_err(|e| CatalogError::remote(format!("SPARQL request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::remote(format!(
                "SPARQL endpoint returned {status}"
            )));
        }

        let body = response
            .text()
            .map_err(|e| CatalogError::remote(format!("failed to read SPARQL response: {e}")))?;
        parse_bindings(&body)
    }
}

#[derive(Deserialize)]
struct SparqlResponse {
    results: SparqlResults,
}

#[derive(Deserialize)]
struct SparqlResults {
    bindings: Vec<Binding>,
}

#[derive(Deserialize)]
struct Binding {
    uri: Option<BoundValue>,
    name: Option<BoundValue>,
    description: Option<BoundValue>,
}

#[derive(Deserialize)]
struct BoundValue {
    value: String,
}

/// Decode a SPARQL results-JSON document into raw record tuples
///
/// Bindings missing `uri` or `name` are dropped; a missing `description`
/// becomes an empty string and is caught later by record validation.
fn parse_bindings(body: &str) -> Result<Vec<RawRecord>> {
    let response: SparqlResponse = serde_json::from_str(body)
        .map_err(|e| CatalogError::remote(format!("malformed SPARQL response: {e}")))?;

    let records = response
        .results
        .bindings
        .into_iter()
        .filter_map(|binding| {
            Some(RawRecord {
                source_uri: binding.uri?.value,
                name: binding.name?.value,
                description: binding.description.map(|v| v.value).unwrap_or_default(),
            })
        })
        .collect();
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_uses_registry_vocabularies() {
        // The service class and its properties come from two different
        // vocabularies; collapsing them onto one namespace produces IRIs the
        // registry does not know and an empty result set.
        assert!(SERVICE_QUERY
            .contains("PREFIX rppl: <https://slovník.gov.cz/legislativní/sbírka/111/2009/pojem/>"));
        assert!(SERVICE_QUERY.contains("PREFIX rppa: <https://slovník.gov.cz/agendový/104/pojem/>"));
        assert!(SERVICE_QUERY.contains("a rppl:služba-veřejné-správy"));
        assert!(SERVICE_QUERY.contains("rppa:má-název-služby"));
        assert!(SERVICE_QUERY.contains("rppa:má-popis-služby"));
    }

    #[test]
    fn test_parse_bindings() {
        let body = r#"{
            "head": {"vars": ["uri", "name", "description"]},
            "results": {"bindings": [
                {
                    "uri": {"type": "uri", "value": "https://gov.example.com/services/passport"},
                    "name": {"type": "literal", "value": "Passport Renewal"},
                    "description": {"type": "literal", "value": "Renew your passport online"}
                },
                {
                    "uri": {"type": "uri", "value": "https://gov.example.com/services/tax"},
                    "name": {"type": "literal", "value": "Tax Filing"}
                }
            ]}
        }"#;

        let records = parse_bindings(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].source_uri,
            "https://gov.example.com/services/passport"
        );
        assert_eq!(records[0].name, "Passport Renewal");
        assert_eq!(records[0].description, "Renew your passport online");
        assert_eq!(records[1].description, "");
    }

    #[test]
    fn test_parse_bindings_drops_incomplete_rows() {
        let body = r#"{
            "results": {"bindings": [
                {"name": {"type": "literal", "value": "No URI"}},
                {
                    "uri": {"type": "uri", "value": "https://gov.example.com/services/ok"},
                    "name": {"type": "literal", "value": "Kept"}
                }
            ]}
        }"#;

        let records = parse_bindings(body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Kept");
    }

    #[test]
    fn test_parse_bindings_rejects_malformed_json() {
        let result = parse_bindings("not json");
        assert!(matches!(result, Err(CatalogError::RemoteSource(_))));
    }

    #[test]
    fn test_parse_bindings_rejects_missing_results() {
        let result = parse_bindings(r#"{"head": {}}"#);
        assert!(matches!(result, Err(CatalogError::RemoteSource(_))));
    }

    #[test]
    fn test_empty_bindings_yield_empty_set() {
        let records = parse_bindings(r#"{"results": {"bindings": []}}"#).unwrap();
        assert!(records.is_empty());
    }
}
