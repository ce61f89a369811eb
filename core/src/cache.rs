//! In-memory schema cache keyed by database identifier.
//!
//! The cache is an explicit value handed to every operation that needs a
//! schema, so its scope is whatever the caller decides (one CLI invocation,
//! one request, one session). It never expires entries and has no size bound.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use serde_json::Value;
use tracing::debug;

use crate::schema::DatabaseSchema;

/// Maps database identifiers to resolved schemas.
///
/// Holds at most one [`DatabaseSchema`] per identifier. A schema, once
/// stored, is never re-fetched until [`clear`](SchemaCache::clear).
///
/// # Examples
///
/// ```
/// use notion_kanban_core::SchemaCache;
/// use serde_json::json;
///
/// let mut cache = SchemaCache::new();
/// let mut fetches = 0;
/// for _ in 0..2 {
///     let schema = cache
///         .resolve("db1", |_| {
///             fetches += 1;
///             Ok::<_, std::convert::Infallible>(json!({"properties": {}}))
///         })
///         .unwrap();
///     assert_eq!(schema.database_id(), "db1");
/// }
/// assert_eq!(fetches, 1);
/// ```
#[derive(Debug, Default)]
pub struct SchemaCache {
    schemas: HashMap<String, DatabaseSchema>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the schema for `database_id`, calling `fetch` only if it is
    /// not cached yet.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `fetch`; nothing is stored in that
    /// case.
    pub fn resolve<F, E>(&mut self, database_id: &str, fetch: F) -> Result<&DatabaseSchema, E>
    where
        F: FnOnce(&str) -> Result<Value, E>,
    {
        match self.schemas.entry(database_id.to_string()) {
            Entry::Occupied(entry) => {
                debug!(database_id, "Schema cache hit");
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                debug!(database_id, "Schema cache miss, fetching");
                let raw = fetch(database_id)?;
                Ok(entry.insert(DatabaseSchema::from_value(database_id, raw)))
            }
        }
    }

    /// Returns the cached schema without fetching.
    pub fn get(&self, database_id: &str) -> Option<&DatabaseSchema> {
        self.schemas.get(database_id)
    }

    /// Removes every cached schema.
    pub fn clear(&mut self) {
        self.schemas.clear();
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn raw_schema() -> Value {
        json!({"properties": {"Stage": {"type": "status", "status": {"options": []}}}})
    }

    #[test]
    fn test_resolve_fetches_once_per_database() {
        let mut cache = SchemaCache::new();
        let mut calls = Vec::new();

        for id in ["a", "a", "b", "a"] {
            cache
                .resolve(id, |db| {
                    calls.push(db.to_string());
                    Ok::<_, String>(raw_schema())
                })
                .unwrap();
        }

        assert_eq!(calls, vec!["a", "b"]);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_failed_fetch_is_not_cached() {
        let mut cache = SchemaCache::new();
        let err = cache
            .resolve("a", |_| Err::<Value, _>("boom".to_string()))
            .unwrap_err();
        assert_eq!(err, "boom");
        assert!(cache.get("a").is_none());

        let schema = cache.resolve("a", |_| Ok::<_, String>(raw_schema())).unwrap();
        assert_eq!(schema.status_property_name(), Some("Stage"));
    }

    #[test]
    fn test_clear_forces_refetch() {
        let mut cache = SchemaCache::new();
        let mut fetches = 0;
        cache
            .resolve("a", |_| {
                fetches += 1;
                Ok::<_, String>(raw_schema())
            })
            .unwrap();
        cache.clear();
        assert!(cache.is_empty());
        cache
            .resolve("a", |_| {
                fetches += 1;
                Ok::<_, String>(raw_schema())
            })
            .unwrap();
        assert_eq!(fetches, 2);
    }
}
