//! Read-only schema snapshot consumed by the detection engine.
//!
//! A snapshot is produced by an external introspection step (live database,
//! static file, or test fixture) and is immutable for the duration of one
//! detection call. Table names are kept sorted so that serialization and
//! fingerprinting are deterministic regardless of insertion order.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

/// One foreign-key style relationship between two tables.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    pub from_table: String,
    pub to_table: String,
    pub column_name: String,
}

impl Relationship {
    pub fn new(
        from_table: impl Into<String>,
        to_table: impl Into<String>,
        column_name: impl Into<String>,
    ) -> Self {
        Self {
            from_table: from_table.into(),
            to_table: to_table.into(),
            column_name: column_name.into(),
        }
    }
}

/// Immutable view of an introspected schema: table names plus the
/// relationships between them. Relationship order is preserved as supplied;
/// table names are deduplicated and sorted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaSnapshot {
    tables: BTreeSet<String>,
    relationships: Vec<Relationship>,
}

impl SchemaSnapshot {
    pub fn new<I, S>(tables: I, relationships: Vec<Relationship>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tables: tables.into_iter().map(Into::into).collect(),
            relationships,
        }
    }

    /// A snapshot with no tables and no relationships.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.relationships.is_empty()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Exact-match lookup. Pattern rules match case-insensitively via regex;
    /// this is for callers that already know the canonical name.
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains(name)
    }

    /// Table names in sorted order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(String::as_str)
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Column names appearing in relationships, in relationship order.
    /// This is the only column information a snapshot carries.
    pub fn relationship_columns(&self) -> impl Iterator<Item = &str> {
        self.relationships.iter().map(|r| r.column_name.as_str())
    }

    /// Deterministic fingerprint of the schema structure.
    ///
    /// Two snapshots with the same table set and the same relationship list
    /// (in the same order) produce the same fingerprint; any structural
    /// change produces a different one. Used by the result cache to detect
    /// that a stored classification belongs to a stale schema.
    pub fn fingerprint(&self) -> String {
        // BTreeSet serializes in sorted order, so the JSON form is canonical.
        let canonical = serde_json::to_vec(self).unwrap_or_default();
        format!("{:016x}", xxh3_64(&canonical))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_snapshot() -> SchemaSnapshot {
        SchemaSnapshot::new(
            ["accounts", "posts"],
            vec![Relationship::new("accounts", "posts", "account_id")],
        )
    }

    #[test]
    fn test_tables_deduplicated_and_sorted() {
        let snapshot = SchemaSnapshot::new(["posts", "accounts", "posts"], vec![]);
        let names: Vec<&str> = snapshot.table_names().collect();
        assert_eq!(names, vec!["accounts", "posts"]);
        assert_eq!(snapshot.table_count(), 2);
    }

    #[test]
    fn test_fingerprint_ignores_insertion_order() {
        let a = SchemaSnapshot::new(["accounts", "posts"], vec![]);
        let b = SchemaSnapshot::new(["posts", "accounts"], vec![]);
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_fingerprint_changes_on_new_table() {
        let before = make_snapshot();
        let after = SchemaSnapshot::new(
            ["accounts", "posts", "teams"],
            before.relationships().to_vec(),
        );
        assert_ne!(before.fingerprint(), after.fingerprint());
    }

    #[test]
    fn test_fingerprint_changes_on_relationship_change() {
        let before = make_snapshot();
        let after = SchemaSnapshot::new(
            ["accounts", "posts"],
            vec![Relationship::new("accounts", "posts", "owner_id")],
        );
        assert_ne!(before.fingerprint(), after.fingerprint());
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = SchemaSnapshot::empty();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.relationships().len(), 0);
        // Fingerprinting an empty snapshot is still well-defined.
        assert_eq!(snapshot.fingerprint().len(), 16);
    }

    #[test]
    fn test_relationship_columns() {
        let snapshot = make_snapshot();
        let columns: Vec<&str> = snapshot.relationship_columns().collect();
        assert_eq!(columns, vec!["account_id"]);
    }
}
