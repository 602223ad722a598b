//! OpenAPI document model
//!
//! Deserializes the subset of an OpenAPI 3.x document the explorer cares
//! about: `components.schemas` entries (with their `x-aep-resource`
//! extension), `servers`, and the `paths` table (used only to discover AEP
//! custom methods). Parsing is atomic; a malformed document yields a wrapped
//! error and no partial result.

use crate::error::ExplorerError;
use indexmap::IndexMap;
use serde::Deserialize;

/// Resource extension carried by annotated schema entries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AepResource {
    pub singular: Option<String>,
    pub plural: Option<String>,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub parents: Vec<String>,
}

/// A schema object, recursive through `properties` and `items`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaObject {
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub format: Option<String>,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(rename = "readOnly", default)]
    pub read_only: bool,
    pub items: Option<Box<SchemaObject>>,
    #[serde(default)]
    pub properties: IndexMap<String, SchemaObject>,
    #[serde(rename = "x-aep-resource")]
    pub aep_resource: Option<AepResource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaType {
    #[serde(default)]
    pub schema: SchemaObject,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

/// One HTTP method entry under a path. Responses and parameters are accepted
/// but ignored; only the request body matters for custom-method discovery.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MethodInfo {
    #[serde(rename = "requestBody")]
    pub request_body: Option<RequestBody>,
}

impl MethodInfo {
    /// JSON request schema, if the method declares one.
    pub fn json_schema(&self) -> Option<&SchemaObject> {
        self.request_body
            .as_ref()
            .and_then(|body| body.content.get("application/json"))
            .map(|media| &media.schema)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, SchemaObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub url: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub version: String,
}

/// Parsed OpenAPI document.
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub openapi: String,
    #[serde(default)]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub info: Info,
    /// Path template -> lowercase HTTP verb -> method info.
    #[serde(default)]
    pub paths: IndexMap<String, IndexMap<String, MethodInfo>>,
    #[serde(default)]
    pub components: Components,
}

impl Document {
    /// Parse a JSON document.
    pub fn from_json(text: &str) -> Result<Self, ExplorerError> {
        serde_json::from_str(text).map_err(|e| ExplorerError::Parse(e.to_string()))
    }

    /// Parse a YAML document.
    pub fn from_yaml(text: &str) -> Result<Self, ExplorerError> {
        serde_yaml::from_str(text).map_err(|e| ExplorerError::Parse(e.to_string()))
    }

    /// Parse a document in either syntax. JSON documents start with `{`;
    /// everything else goes through the YAML parser.
    pub fn parse(text: &str) -> Result<Self, ExplorerError> {
        if text.trim_start().starts_with('{') {
            Self::from_json(text)
        } else {
            Self::from_yaml(text)
        }
    }

    /// Base URL of the first declared server, without a trailing slash.
    pub fn server_url(&self) -> String {
        self.servers
            .first()
            .map(|s| s.url.trim_end_matches('/').to_string())
            .unwrap_or_default()
    }
}
