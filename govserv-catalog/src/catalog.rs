//! Identifier-keyed, insertion-ordered record store
//!
//! The mapping and the order vector always hold the same identifiers.
//! Re-adding an existing identifier replaces the record in place without
//! moving it in iteration order.

use std::collections::HashMap;

use crate::record::ServiceRecord;

/// The owning collection of service records
///
/// All operations are synchronous and the catalog carries no locking of its
/// own; callers mutating one instance from multiple threads must serialize
/// access themselves.
#[derive(Debug, Default)]
pub struct Catalog {
    records: HashMap<String, ServiceRecord>,
    order: Vec<String>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record by identifier
    pub fn add(&mut self, record: ServiceRecord) {
        let identifier = record.identifier().to_string();
        if self.records.insert(identifier.clone(), record).is_none() {
            self.order.push(identifier);
        }
    }

    /// Add records in order
    pub fn add_many(&mut self, records: impl IntoIterator<Item = ServiceRecord>) {
        for record in records {
            self.add(record);
        }
    }

    /// Look up a record by identifier
    pub fn get(&self, identifier: &str) -> Option<&ServiceRecord> {
        self.records.get(identifier)
    }

    /// All records in insertion order (defensive copies)
    pub fn all(&self) -> Vec<ServiceRecord> {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id))
            .cloned()
            .collect()
    }

    /// Number of records
    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Membership test by identifier
    pub fn contains(&self, identifier: &str) -> bool {
        self.records.contains_key(identifier)
    }

    /// Remove all records
    pub fn clear(&mut self) {
        self.records.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ServiceRecord;

    fn record(id: &str, name: &str) -> ServiceRecord {
        ServiceRecord::with_identifier(
            id,
            format!("https://gov.example.com/services/{id}"),
            name,
            format!("{name} description"),
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn test_add_and_get() {
        let mut catalog = Catalog::new();
        let r = record("passport-renewal", "Passport Renewal");
        catalog.add(r.clone());

        assert_eq!(catalog.count(), 1);
        assert!(catalog.contains("passport-renewal"));
        assert_eq!(catalog.get("passport-renewal"), Some(&r));
    }

    #[test]
    fn test_get_missing_is_none() {
        let catalog = Catalog::new();
        assert_eq!(catalog.get("unicorn-license"), None);
        assert!(!catalog.contains("unicorn-license"));
    }

    #[test]
    fn test_add_many_preserves_order() {
        let mut catalog = Catalog::new();
        catalog.add_many(vec![record("a", "A"), record("b", "B"), record("c", "C")]);

        let ids: Vec<_> = catalog.all().iter().map(|r| r.identifier().to_string()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut catalog = Catalog::new();
        catalog.add_many(vec![record("a", "A"), record("b", "B"), record("c", "C")]);

        catalog.add(record("b", "B updated"));

        assert_eq!(catalog.count(), 3);
        let ids: Vec<_> = catalog.all().iter().map(|r| r.identifier().to_string()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(catalog.get("b").unwrap().name(), "B updated");
    }

    #[test]
    fn test_all_is_a_defensive_copy() {
        let mut catalog = Catalog::new();
        catalog.add(record("a", "A"));

        let mut copy = catalog.all();
        copy.clear();

        assert_eq!(catalog.count(), 1);
        assert_eq!(catalog.all().len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut catalog = Catalog::new();
        catalog.add_many(vec![record("a", "A"), record("b", "B")]);
        catalog.clear();

        assert!(catalog.is_empty());
        assert_eq!(catalog.count(), 0);
        assert!(catalog.all().is_empty());
    }
}
