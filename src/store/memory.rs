//! In-memory [`RecordStore`] used by the tests and the CLI's offline
//! mode. Supports the small filter subset the app issues: equality
//! comparisons joined with `&&`.

use crate::error::ProposalError;
use crate::store::{ListOptions, RecordPage, RecordStore};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    collections: HashMap<String, Vec<Value>>,
    next_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in a collection, for test assertions.
    pub fn len(&self, collection: &str) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.collections.get(collection).map_or(0, Vec::len)
    }
}

impl RecordStore for MemoryStore {
    fn list(
        &self,
        collection: &str,
        page: u32,
        per_page: u32,
        options: &ListOptions,
    ) -> Result<RecordPage, ProposalError> {
        let inner = self.inner.lock().unwrap();
        let records = inner.collections.get(collection);
        let mut matched: Vec<Value> = records
            .into_iter()
            .flatten()
            .filter(|r| matches_filter(r, options.filter.as_deref()))
            .cloned()
            .collect();

        // Insertion order stands in for creation time.
        if options.sort.as_deref() == Some("-created") {
            matched.reverse();
        }

        let total = matched.len() as u64;
        let start = ((page.max(1) - 1) * per_page) as usize;
        let items: Vec<Value> = matched
            .into_iter()
            .skip(start)
            .take(per_page as usize)
            .collect();

        Ok(RecordPage {
            page,
            per_page,
            total_items: total,
            items,
        })
    }

    fn create(&self, collection: &str, body: &Value) -> Result<Value, ProposalError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = format!("rec{}", inner.next_id);
        let mut record = body.clone();
        if let Value::Object(map) = &mut record {
            map.insert("id".to_string(), Value::String(id));
        }
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    fn update(&self, collection: &str, id: &str, body: &Value) -> Result<Value, ProposalError> {
        let mut inner = self.inner.lock().unwrap();
        let records = inner
            .collections
            .get_mut(collection)
            .ok_or_else(|| ProposalError::NotFound(format!("{}/{}", collection, id)))?;
        let record = records
            .iter_mut()
            .find(|r| r.get("id").and_then(Value::as_str) == Some(id))
            .ok_or_else(|| ProposalError::NotFound(format!("{}/{}", collection, id)))?;

        if let (Value::Object(existing), Value::Object(updates)) = (&mut *record, body) {
            for (k, v) in updates {
                existing.insert(k.clone(), v.clone());
            }
        }
        Ok(record.clone())
    }
}

/// Evaluate a filter of the form `field = "value" && field2="value2"`.
/// A missing filter matches everything; an unparsable clause matches
/// nothing, which is the safe direction for tests.
fn matches_filter(record: &Value, filter: Option<&str>) -> bool {
    let Some(filter) = filter else { return true };
    filter.split("&&").all(|clause| {
        let Some((field, expected)) = parse_clause(clause) else {
            return false;
        };
        record.get(field).and_then(Value::as_str) == Some(expected)
    })
}

fn parse_clause(clause: &str) -> Option<(&str, &str)> {
    let (field, value) = clause.split_once('=')?;
    let value = value.trim();
    let value = value.strip_prefix('"')?.strip_suffix('"')?;
    Some((field.trim(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_assigns_ids() {
        let store = MemoryStore::new();
        let a = store.create("proposals", &json!({"proposalNumber": "PRO-001"})).unwrap();
        let b = store.create("proposals", &json!({"proposalNumber": "PRO-002"})).unwrap();
        assert_ne!(a["id"], b["id"]);
        assert_eq!(store.len("proposals"), 2);
    }

    #[test]
    fn test_update_merges_fields() {
        let store = MemoryStore::new();
        let rec = store.create("proposals", &json!({"a": 1, "b": 2})).unwrap();
        let id = rec["id"].as_str().unwrap();
        let updated = store.update("proposals", id, &json!({"b": 3})).unwrap();
        assert_eq!(updated["a"], json!(1));
        assert_eq!(updated["b"], json!(3));
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let store = MemoryStore::new();
        store.create("proposals", &json!({})).unwrap();
        assert!(matches!(
            store.update("proposals", "nope", &json!({})),
            Err(ProposalError::NotFound(_))
        ));
    }

    #[test]
    fn test_filter_equality_and_conjunction() {
        let store = MemoryStore::new();
        store.create("subscriptions", &json!({"user": "u1", "status": "active"})).unwrap();
        store.create("subscriptions", &json!({"user": "u1", "status": "inactive"})).unwrap();
        store.create("subscriptions", &json!({"user": "u2", "status": "active"})).unwrap();

        let opts = ListOptions {
            filter: Some("user=\"u1\" && status=\"active\"".to_string()),
            sort: None,
        };
        let page = store.list("subscriptions", 1, 50, &opts).unwrap();
        assert_eq!(page.total_items, 1);
        assert_eq!(page.items[0]["user"], json!("u1"));
    }

    #[test]
    fn test_filter_with_spaces_around_equals() {
        let store = MemoryStore::new();
        store.create("proposals", &json!({"user": "u1"})).unwrap();
        let opts = ListOptions {
            filter: Some("user = \"u1\"".to_string()),
            sort: None,
        };
        assert_eq!(store.list("proposals", 1, 50, &opts).unwrap().total_items, 1);
    }

    #[test]
    fn test_sort_created_desc_reverses_insertion_order() {
        let store = MemoryStore::new();
        store.create("proposals", &json!({"n": 1})).unwrap();
        store.create("proposals", &json!({"n": 2})).unwrap();
        let opts = ListOptions {
            filter: None,
            sort: Some("-created".to_string()),
        };
        let page = store.list("proposals", 1, 50, &opts).unwrap();
        assert_eq!(page.items[0]["n"], json!(2));
    }

    #[test]
    fn test_pagination_window() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store.create("proposals", &json!({"n": i})).unwrap();
        }
        let page = store.list("proposals", 2, 2, &ListOptions::default()).unwrap();
        assert_eq!(page.total_items, 5);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0]["n"], json!(2));
    }
}
