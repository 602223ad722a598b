//! Mock backend
//!
//! An in-memory stand-in for a live REST API that reproduces the same
//! hierarchical path addressing: records are keyed by their full computed
//! path (`parentPath/type/id`) and ids are allocated from one monotonically
//! increasing counter per resource-type name. The counter is global per type
//! name, not scoped per parent, so sibling collections never produce
//! colliding ids within a type.
//!
//! The store is an explicit handle, not a process-wide singleton: construct
//! one with [`MockStore::new`] and clone it into whoever needs mock
//! semantics. Internals sit behind a mutex because id allocation plus insert
//! is a check-then-act sequence.

use crate::error::ExplorerError;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use url::Url;

#[derive(Default)]
struct StoreInner {
    /// Full path -> record, in insertion order.
    records: IndexMap<String, Map<String, Value>>,
    /// Resource-type name -> last allocated id.
    counters: HashMap<String, u64>,
}

/// In-memory resource store addressed by URL paths.
#[derive(Clone, Default)]
pub struct MockStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// List every record in the collection the URL addresses, in insertion
    /// order, wrapped in the `{ "results": [...] }` envelope.
    pub fn list(&self, url: &str) -> Result<Value, ExplorerError> {
        let segments = path_segments(url)?;
        let (resource_type, parent_path) = split_collection(&segments);

        let inner = self.inner.lock().expect("mock store lock poisoned");
        let results: Vec<Value> = inner
            .records
            .iter()
            .filter(|(path, _)| {
                let parts: Vec<&str> = path.split('/').collect();
                // Record paths end with `<type>/<id>`.
                parts.len() >= 2
                    && parts[parts.len() - 2] == resource_type
                    && parts[..parts.len() - 2].join("/") == parent_path
            })
            .map(|(_, record)| Value::Object(record.clone()))
            .collect();

        let mut envelope = Map::new();
        envelope.insert("results".to_string(), Value::Array(results));
        Ok(Value::Object(envelope))
    }

    /// Fetch the record at the URL's path. Absence is a hard failure.
    pub fn get(&self, url: &str) -> Result<Value, ExplorerError> {
        let path = record_path(url)?;
        let inner = self.inner.lock().expect("mock store lock poisoned");
        inner
            .records
            .get(&path)
            .map(|record| Value::Object(record.clone()))
            .ok_or(ExplorerError::NotFound(path))
    }

    /// Store a new record under the collection the URL addresses, assigning
    /// the next id for its resource-type name. The generated `id` and `path`
    /// always win over fields of the same name in the body.
    pub fn create(&self, url: &str, body: &Map<String, Value>) -> Result<Value, ExplorerError> {
        let segments = path_segments(url)?;
        let (resource_type, parent_path) = split_collection(&segments);

        let mut inner = self.inner.lock().expect("mock store lock poisoned");
        let next = inner.counters.entry(resource_type.to_string()).or_insert(0);
        *next += 1;
        let id = next.to_string();

        let path = [parent_path.as_str(), resource_type, id.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("/");

        let mut record = body.clone();
        record.insert("id".to_string(), Value::String(id));
        record.insert("path".to_string(), Value::String(path.clone()));

        inner.records.insert(path, record.clone());
        Ok(Value::Object(record))
    }

    /// Merge a partial body over the record at the URL's path. The original
    /// `id` and `path` are re-asserted so a patch body cannot relocate the
    /// record.
    pub fn update(&self, url: &str, body: &Map<String, Value>) -> Result<Value, ExplorerError> {
        let path = record_path(url)?;
        let mut inner = self.inner.lock().expect("mock store lock poisoned");
        let record = inner
            .records
            .get_mut(&path)
            .ok_or_else(|| ExplorerError::NotFound(path.clone()))?;

        let id = record.get("id").cloned();
        let original_path = record.get("path").cloned();
        for (key, value) in body {
            record.insert(key.clone(), value.clone());
        }
        if let Some(id) = id {
            record.insert("id".to_string(), id);
        }
        if let Some(original_path) = original_path {
            record.insert("path".to_string(), original_path);
        }

        Ok(Value::Object(record.clone()))
    }

    /// Remove the record at the URL's path. Absence is a hard failure and
    /// leaves the store untouched.
    pub fn delete(&self, url: &str) -> Result<(), ExplorerError> {
        let path = record_path(url)?;
        let mut inner = self.inner.lock().expect("mock store lock poisoned");
        inner
            .records
            .shift_remove(&path)
            .map(|_| ())
            .ok_or(ExplorerError::NotFound(path))
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("mock store lock poisoned").records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every record and counter. Fresh handles are preferable for test
    /// isolation; this exists for long-lived handles.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("mock store lock poisoned");
        inner.records.clear();
        inner.counters.clear();
    }
}

/// Non-empty path segments of a URL. Query strings and trailing slashes are
/// tolerated and ignored.
fn path_segments(url: &str) -> Result<Vec<String>, ExplorerError> {
    let parsed = Url::parse(url).map_err(|e| ExplorerError::InvalidUrl {
        url: url.to_string(),
        cause: e.to_string(),
    })?;
    Ok(parsed
        .path()
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect())
}

/// Collection URL -> (resource-type name, parent path).
fn split_collection(segments: &[String]) -> (&str, String) {
    match segments.split_last() {
        Some((last, parents)) => (last.as_str(), parents.join("/")),
        None => ("resource", String::new()),
    }
}

/// Instance URL -> store key.
fn record_path(url: &str) -> Result<String, ExplorerError> {
    Ok(path_segments(url)?.join("/"))
}
