//! URL template substitution
//!
//! Resolves `{name}` tokens in a URL pattern against a parent-parameter map.
//! Lookup tolerates OpenAPI parameter names like `book_id` mapped against a
//! singular resource name `book` by retrying with the `_id` suffix stripped.
//! Values are never cached across calls; the caller supplies a complete map
//! per request covering the full ancestor chain.

use crate::error::ExplorerError;
use crate::schema::ParentParameters;

/// Substitute every `{name}` token in `pattern`, in order of appearance.
///
/// A token with no binding (even after stripping `_id`), or whose binding is
/// an empty string, fails with [`ExplorerError::MissingParent`] carrying the
/// unresolved name and the full set of known parent values. A segment is
/// never silently dropped.
pub fn substitute(pattern: &str, parents: &ParentParameters) -> Result<String, ExplorerError> {
    let mut result = String::with_capacity(pattern.len());
    let mut rest = pattern;

    while let Some(open) = rest.find('{') {
        let Some(length) = rest[open..].find('}') else {
            // Unterminated brace; leave the tail untouched.
            break;
        };
        result.push_str(&rest[..open]);
        let token = &rest[open + 1..open + length];
        result.push_str(resolve(token, parents)?);
        rest = &rest[open + length + 1..];
    }

    result.push_str(rest);
    Ok(result)
}

fn resolve<'a>(token: &str, parents: &'a ParentParameters) -> Result<&'a str, ExplorerError> {
    let stripped = token.strip_suffix("_id").unwrap_or(token);
    let value = parents
        .get(token)
        .or_else(|| parents.get(stripped))
        .map(String::as_str)
        .filter(|v| !v.is_empty());

    value.ok_or_else(|| ExplorerError::MissingParent {
        name: stripped.to_string(),
        available: parents.clone(),
    })
}
