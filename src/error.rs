//! Error taxonomy for catalogue lookups, URL templating, and CRUD calls
//!
//! Three classes of failure flow through here: configuration/lookup errors
//! (unknown resource, missing parent parameter), transport errors (network
//! failure, non-2xx status), and application errors (a 2xx body that still
//! encodes a failure). All of them surface as [`ExplorerError`] values; none
//! of them panic.

use crate::schema::ParentParameters;
use thiserror::Error;

/// The CRUD operation an error belongs to, used in error messages and the
/// operation report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
    Call,
}

impl Operation {
    /// Phrase used for transport-level failures ("Failed to list resources: ...").
    pub fn failure_phrase(&self) -> &'static str {
        match self {
            Self::List => "Failed to list resources",
            Self::Get => "Failed to get resource",
            Self::Create => "Failed to create resource",
            Self::Update => "Failed to update resource",
            Self::Delete => "Failed to delete resource",
            Self::Call => "Failed to call custom method",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::List => "List",
            Self::Get => "Get",
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::Call => "Call",
        };
        f.write_str(name)
    }
}

fn failure_phrase(op: &Operation) -> &'static str {
    op.failure_phrase()
}

fn format_parents(available: &ParentParameters) -> String {
    if available.is_empty() {
        return "none".to_string();
    }
    available
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum ExplorerError {
    /// The document could not be parsed; no partial catalogue is produced.
    #[error("Failed to parse OpenAPI schema: {0}")]
    Parse(String),

    /// No catalogue entry matches the requested plural name (exact match only).
    #[error("resource \"{0}\" not found in catalogue")]
    UnknownResource(String),

    /// A `{name}` URL token had no binding, even after stripping an `_id`
    /// suffix. Carries every known parent binding for diagnostic display.
    #[error("Missing required parent resource: {name} (known parents: {})", format_parents(.available))]
    MissingParent {
        name: String,
        available: ParentParameters,
    },

    /// The HTTP client itself could not be constructed.
    #[error("Failed to create HTTP client: {0}")]
    ClientInit(String),

    /// The request never produced an HTTP response, or its body could not be
    /// read off the wire.
    #[error("{}: {cause}", failure_phrase(.op))]
    Network { op: Operation, cause: String },

    /// Non-2xx status whose body carried an `error` or `message` field.
    #[error("{op} failed: {message}")]
    Status { op: Operation, message: String },

    /// Non-2xx status with no decodable body.
    #[error("{op} failed with status {code}")]
    HttpStatus { op: Operation, code: u16 },

    /// 2xx response whose body carried an `errors` field (string, or array
    /// joined with ", ").
    #[error("API Error: {0}")]
    Api(String),

    /// 2xx response whose body was exactly `{code, message}`.
    #[error("{code}: {message}")]
    Application { code: String, message: String },

    /// Mock-backend miss; the path is the store key that was requested.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A URL handed to the mock backend that `url::Url` refuses to parse.
    #[error("invalid URL \"{url}\": {cause}")]
    InvalidUrl { url: String, cause: String },

    /// Custom methods need a live server; the mock store has no method table.
    #[error("Call failed: mock backend does not support custom method \"{0}\"")]
    UnsupportedCall(String),
}
