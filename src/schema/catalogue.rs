//! Resource catalogue
//!
//! Builds the typed [`Resource`] catalogue out of a parsed [`Document`]:
//! every `components.schemas` entry carrying the `x-aep-resource` marker
//! becomes one catalogue entry with its property tree, URL patterns, parent
//! declarations, and any custom methods discovered in the `paths` table.

use super::document::{Document, SchemaObject};
use super::property::{flatten, Property};
use super::ParentParameters;
use crate::error::ExplorerError;
use crate::template;

/// An AEP custom method (`POST /publishers/{publisher}/books/{book}:archive`).
#[derive(Debug, Clone)]
pub struct CustomMethod {
    pub name: String,
    /// Uppercase HTTP verb.
    pub method: String,
    /// JSON request schema, when the path entry declares one.
    pub request: Option<SchemaObject>,
}

/// A named, schema-backed resource type.
///
/// Immutable once parsed, except for `bindings`: the graph navigator hands
/// out copies whose parent-parameter map is pre-seeded so they are directly
/// usable for further list/get calls.
#[derive(Debug, Clone)]
pub struct Resource {
    pub singular: String,
    pub plural: String,
    patterns: Vec<String>,
    parents: Vec<String>,
    properties: Vec<Property>,
    required: Vec<String>,
    custom_methods: Vec<CustomMethod>,
    pub server_url: String,
    /// Parent-parameter bindings accumulated while navigating; keys match the
    /// `{name}` tokens of the URL patterns.
    pub bindings: ParentParameters,
}

impl Resource {
    /// Canonical URL pattern (first declared).
    pub fn pattern(&self) -> &str {
        &self.patterns[0]
    }

    /// Collection URL template: the canonical pattern with its final path
    /// segment (the instance id token) stripped.
    pub fn base_url(&self) -> String {
        let pattern = self.pattern();
        match pattern.rsplit_once('/') {
            Some((collection, _id_segment)) if !collection.is_empty() => collection.to_string(),
            _ => pattern.to_string(),
        }
    }

    /// Fully-resolved collection URL (`<server_url>` + substituted base).
    pub fn collection_url(&self) -> Result<String, ExplorerError> {
        let path = template::substitute(&self.base_url(), &self.bindings)?;
        Ok(format!("{}{}", self.server_url, path))
    }

    /// Fully-resolved URL for one instance.
    pub fn instance_url(&self, id: &str) -> Result<String, ExplorerError> {
        Ok(format!("{}/{}", self.collection_url()?, id))
    }

    /// Declared properties in declaration order. `readOnly` entries are part
    /// of the model; consumers exclude them from forms and submissions.
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Names of required top-level properties.
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Declared parent singular names; empty for a root resource.
    pub fn parent_resources(&self) -> &[String] {
        &self.parents
    }

    pub fn custom_methods(&self) -> &[CustomMethod] {
        &self.custom_methods
    }

    /// Whether create may carry a caller-assigned identifier (`?id=`): the
    /// schema declares an `id` property that is not read-only.
    pub fn has_user_settable_id(&self) -> bool {
        self.properties
            .iter()
            .any(|p| p.name == "id" && !p.read_only)
    }
}

/// The full set of resources parsed from one document.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    resources: Vec<Resource>,
}

impl Catalogue {
    /// Build the catalogue. Fails atomically: one bad resource entry means
    /// no catalogue at all.
    pub fn from_document(doc: &Document) -> Result<Self, ExplorerError> {
        let server_url = doc.server_url();
        let mut resources = Vec::new();

        for (name, schema) in &doc.components.schemas {
            let Some(ext) = &schema.aep_resource else {
                continue;
            };

            if ext.patterns.is_empty() {
                return Err(ExplorerError::Parse(format!(
                    "resource \"{name}\" declares no URL patterns"
                )));
            }

            let singular = ext
                .singular
                .clone()
                .unwrap_or_else(|| name.to_lowercase());
            let plural = ext
                .plural
                .clone()
                .unwrap_or_else(|| format!("{singular}s"));

            resources.push(Resource {
                singular,
                plural,
                patterns: ext.patterns.clone(),
                parents: ext.parents.clone(),
                properties: flatten(&schema.properties),
                required: schema.required.clone(),
                custom_methods: discover_custom_methods(doc, &ext.patterns[0]),
                server_url: server_url.clone(),
                bindings: ParentParameters::new(),
            });
        }

        Ok(Self { resources })
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Exact plural-name lookup; no partial or fuzzy matching.
    pub fn resource_for_name(&self, plural: &str) -> Result<&Resource, ExplorerError> {
        self.resources
            .iter()
            .find(|r| r.plural == plural)
            .ok_or_else(|| ExplorerError::UnknownResource(plural.to_string()))
    }

    /// Replace every resource's server base URL (CLI `--server` override).
    pub fn set_server_url(&mut self, server_url: &str) {
        let server_url = server_url.trim_end_matches('/');
        for resource in &mut self.resources {
            resource.server_url = server_url.to_string();
        }
    }
}

/// Scan the document's paths for `<instance pattern>:<name>` entries.
fn discover_custom_methods(doc: &Document, pattern: &str) -> Vec<CustomMethod> {
    let mut methods = Vec::new();
    for (path, verbs) in &doc.paths {
        let Some((base, name)) = path.rsplit_once(':') else {
            continue;
        };
        if base != pattern {
            continue;
        }
        for (verb, info) in verbs {
            methods.push(CustomMethod {
                name: name.to_string(),
                method: verb.to_uppercase(),
                request: info.json_schema().cloned(),
            });
        }
    }
    methods
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOKSTORE: &str = r#"{
        "openapi": "3.1.0",
        "info": {"title": "Bookstore", "version": "1.0"},
        "servers": [{"url": "http://localhost:8080"}],
        "paths": {
            "/publishers/{publisher}/books/{book}:archive": {
                "post": {}
            }
        },
        "components": {
            "schemas": {
                "Publisher": {
                    "type": "object",
                    "properties": {
                        "id": {"type": "string"},
                        "path": {"type": "string", "readOnly": true},
                        "name": {"type": "string"}
                    },
                    "x-aep-resource": {
                        "singular": "publisher",
                        "plural": "publishers",
                        "patterns": ["/publishers/{publisher}"]
                    }
                },
                "Book": {
                    "type": "object",
                    "required": ["title"],
                    "properties": {
                        "title": {"type": "string"},
                        "pages": {"type": "integer"}
                    },
                    "x-aep-resource": {
                        "singular": "book",
                        "plural": "books",
                        "patterns": ["/publishers/{publisher}/books/{book}"],
                        "parents": ["publisher"]
                    }
                }
            }
        }
    }"#;

    fn catalogue() -> Catalogue {
        let doc = Document::parse(BOOKSTORE).unwrap();
        Catalogue::from_document(&doc).unwrap()
    }

    #[test]
    fn test_base_url_strips_one_trailing_segment() {
        let catalogue = catalogue();
        let books = catalogue.resource_for_name("books").unwrap();
        assert_eq!(books.base_url(), "/publishers/{publisher}/books");
    }

    #[test]
    fn test_resource_for_name_is_exact() {
        let catalogue = catalogue();
        assert!(catalogue.resource_for_name("books").is_ok());

        let err = catalogue.resource_for_name("book").unwrap_err();
        assert_eq!(err.to_string(), "resource \"book\" not found in catalogue");
    }

    #[test]
    fn test_resources_carry_parent_declarations() {
        let catalogue = catalogue();
        let publishers = catalogue.resource_for_name("publishers").unwrap();
        assert!(publishers.parent_resources().is_empty());

        let books = catalogue.resource_for_name("books").unwrap();
        assert_eq!(books.parent_resources(), ["publisher"]);
    }

    #[test]
    fn test_user_settable_id_requires_writable_id_property() {
        let catalogue = catalogue();
        assert!(catalogue
            .resource_for_name("publishers")
            .unwrap()
            .has_user_settable_id());
        assert!(!catalogue
            .resource_for_name("books")
            .unwrap()
            .has_user_settable_id());
    }

    #[test]
    fn test_custom_method_discovery() {
        let catalogue = catalogue();
        let books = catalogue.resource_for_name("books").unwrap();
        let methods = books.custom_methods();
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].name, "archive");
        assert_eq!(methods[0].method, "POST");
    }

    #[test]
    fn test_missing_patterns_fail_the_whole_parse() {
        let doc = Document::parse(
            r#"{
                "openapi": "3.1.0",
                "components": {"schemas": {
                    "Bad": {"type": "object", "x-aep-resource": {"singular": "bad"}}
                }}
            }"#,
        )
        .unwrap();

        let err = Catalogue::from_document(&doc).unwrap_err();
        assert!(err.to_string().contains("declares no URL patterns"));
    }

    #[test]
    fn test_instance_url_appends_id_to_collection() {
        let catalogue = catalogue();
        let mut books = catalogue.resource_for_name("books").unwrap().clone();
        books
            .bindings
            .insert("publisher".to_string(), "p1".to_string());

        assert_eq!(
            books.collection_url().unwrap(),
            "http://localhost:8080/publishers/p1/books"
        );
        assert_eq!(
            books.instance_url("42").unwrap(),
            "http://localhost:8080/publishers/p1/books/42"
        );
    }
}
