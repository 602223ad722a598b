//! Property trees flattened out of schema objects.

use super::document::SchemaObject;
use indexmap::IndexMap;

/// Primitive kind of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
}

impl PropertyKind {
    /// Map an OpenAPI `type` string; anything unrecognized is a string.
    pub fn from_type(kind: Option<&str>) -> Self {
        match kind {
            Some("integer") => Self::Integer,
            Some("number") => Self::Number,
            Some("boolean") => Self::Boolean,
            Some("object") => Self::Object,
            Some("array") => Self::Array,
            _ => Self::String,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }
}

/// One named, typed property. Object properties own their own subtree;
/// array properties record the item kind.
#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub kind: PropertyKind,
    pub read_only: bool,
    /// Nested properties when `kind == Object`.
    pub children: Vec<Property>,
    /// Required names among `children` when `kind == Object`.
    pub required: Vec<String>,
    /// Item kind when `kind == Array`.
    pub item_kind: Option<PropertyKind>,
}

/// Flatten a schema's `properties` map into `Property` values, preserving
/// declaration order and recursing through nested objects.
pub fn flatten(properties: &IndexMap<String, SchemaObject>) -> Vec<Property> {
    properties
        .iter()
        .map(|(name, schema)| from_schema(name, schema))
        .collect()
}

fn from_schema(name: &str, schema: &SchemaObject) -> Property {
    let kind = PropertyKind::from_type(schema.kind.as_deref());
    Property {
        name: name.to_string(),
        kind,
        read_only: schema.read_only,
        children: if kind == PropertyKind::Object {
            flatten(&schema.properties)
        } else {
            Vec::new()
        },
        required: schema.required.clone(),
        item_kind: schema
            .items
            .as_ref()
            .map(|items| PropertyKind::from_type(items.kind.as_deref())),
    }
}
