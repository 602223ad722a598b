//! Raw header-string parsing
//!
//! The client accepts headers as a single `"K1:V1,K2:V2"` string. Keys are
//! case-sensitive and merged over a default `Content-Type: application/json`.

use indexmap::IndexMap;

pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Parse a raw header string into an ordered key/value map. Malformed pairs
/// (no colon) are skipped; a later duplicate key wins.
pub fn parse_headers(raw: &str) -> IndexMap<String, String> {
    let mut headers = IndexMap::new();
    headers.insert("Content-Type".to_string(), DEFAULT_CONTENT_TYPE.to_string());

    for pair in raw.split(',') {
        let Some((key, value)) = pair.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        headers.insert(key.to_string(), value.trim().to_string());
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_string_yields_default_content_type() {
        let headers = parse_headers("");
        assert_eq!(headers.len(), 1);
        assert_eq!(
            headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
    }

    #[test]
    fn test_parses_comma_separated_pairs() {
        let headers = parse_headers("Authorization: Bearer token, X-Trace: abc");
        assert_eq!(
            headers.get("Authorization").map(String::as_str),
            Some("Bearer token")
        );
        assert_eq!(headers.get("X-Trace").map(String::as_str), Some("abc"));
        assert_eq!(
            headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
    }

    #[test]
    fn test_user_content_type_overrides_default() {
        let headers = parse_headers("Content-Type: application/yaml");
        assert_eq!(
            headers.get("Content-Type").map(String::as_str),
            Some("application/yaml")
        );
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let headers = parse_headers("x-key: a, X-Key: b");
        assert_eq!(headers.get("x-key").map(String::as_str), Some("a"));
        assert_eq!(headers.get("X-Key").map(String::as_str), Some("b"));
    }

    #[test]
    fn test_malformed_pairs_are_skipped() {
        let headers = parse_headers("no-colon-here, Good: yes");
        assert_eq!(headers.get("Good").map(String::as_str), Some("yes"));
        assert!(!headers.contains_key("no-colon-here"));
    }
}
