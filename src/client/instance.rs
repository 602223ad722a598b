//! Resource instances
//!
//! One concrete record of a resource, as returned by list/get. Instances are
//! never mutated in place; update fetches fresh server state instead.

use crate::schema::Resource;
use serde_json::{Map, Value};

/// A concrete record with its identifier, full hierarchical path, property
/// bag, and the owning [`Resource`] (used to compute the record's own CRUD
/// URLs).
#[derive(Debug, Clone)]
pub struct ResourceInstance {
    pub id: String,
    pub path: String,
    pub properties: Map<String, Value>,
    pub resource: Resource,
}

impl ResourceInstance {
    /// Wrap a property bag returned by a backend. The `id` and `path` fields
    /// are lifted out of the bag; numbers are accepted for `id` since some
    /// servers return numeric identifiers.
    pub fn from_bag(resource: &Resource, bag: Map<String, Value>) -> Self {
        Self {
            id: field_as_string(&bag, "id"),
            path: field_as_string(&bag, "path"),
            properties: bag,
            resource: resource.clone(),
        }
    }

    /// Fully-resolved URL of this record: `<server_url>/<path>`.
    pub fn url(&self) -> String {
        format!("{}/{}", self.resource.server_url, self.path)
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}

fn field_as_string(bag: &Map<String, Value>, field: &str) -> String {
    match bag.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}
