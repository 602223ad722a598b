//! Integration tests for the CRUD client using wiremock
//!
//! These tests drive the full Api surface against mocked endpoints to verify
//! URL derivation, the response-classification taxonomy, and the once-only
//! failure-reporting discipline.

use aep_explorer::client::{Api, Backend, HttpTransport};
use aep_explorer::error::ExplorerError;
use aep_explorer::schema::{Catalogue, Document, Resource};
use serde_json::{json, Map, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BOOKSTORE: &str = include_str!("fixtures/bookstore.json");

fn api_for(server_url: &str, raw_headers: &str) -> Api {
    let document = Document::parse(BOOKSTORE).expect("fixture should parse");
    let mut catalogue = Catalogue::from_document(&document).expect("fixture catalogue");
    catalogue.set_server_url(server_url);
    let transport = HttpTransport::new().expect("HTTP client");
    Api::new(catalogue, Backend::Http(transport), raw_headers)
}

fn bound(api: &Api, plural: &str, parents: &[(&str, &str)]) -> Resource {
    let mut resource = api.resource(plural).expect("resource exists").clone();
    resource.bindings = parents
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    resource
}

fn bag(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

#[tokio::test]
async fn test_list_returns_bound_instances() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/publishers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"id": "1", "path": "publishers/1", "name": "Ace"},
                {"id": "2", "path": "publishers/2", "name": "Tor"}
            ]
        })))
        .mount(&server)
        .await;

    let api = api_for(&server.uri(), "");
    let publishers = bound(&api, "publishers", &[]);

    let instances = api.list(&publishers).await.expect("list should succeed");
    assert_eq!(instances.len(), 2);
    assert_eq!(instances[0].id, "1");
    assert_eq!(instances[0].path, "publishers/1");
    assert_eq!(instances[1].property("name"), Some(&json!("Tor")));
    assert_eq!(api.reporter().failure_count(), 0);
}

#[tokio::test]
async fn test_nested_list_substitutes_parent_bindings() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/publishers/p1/books"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": "1", "path": "publishers/p1/books/1", "title": "Dune"}]
        })))
        .mount(&server)
        .await;

    let api = api_for(&server.uri(), "");
    let books = bound(&api, "books", &[("publisher", "p1")]);

    let instances = api.list(&books).await.expect("list should succeed");
    assert_eq!(instances.len(), 1);
    assert_eq!(instances[0].path, "publishers/p1/books/1");
}

#[tokio::test]
async fn test_get_404_with_message_reports_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/publishers/p1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "not found"
        })))
        .mount(&server)
        .await;

    let api = api_for(&server.uri(), "");
    let publishers = bound(&api, "publishers", &[]);

    let err = api.get(&publishers, "p1").await.unwrap_err();
    assert_eq!(err.to_string(), "Get failed: not found");
    assert_eq!(api.reporter().failure_count(), 1);
}

#[tokio::test]
async fn test_error_field_is_used_for_non_2xx() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/publishers"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "Resource not found"
        })))
        .mount(&server)
        .await;

    let api = api_for(&server.uri(), "");
    let publishers = bound(&api, "publishers", &[]);

    let err = api.list(&publishers).await.unwrap_err();
    assert_eq!(err.to_string(), "List failed: Resource not found");
}

#[tokio::test]
async fn test_undecodable_error_body_falls_back_to_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/publishers"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let api = api_for(&server.uri(), "");
    let publishers = bound(&api, "publishers", &[]);

    let err = api.list(&publishers).await.unwrap_err();
    assert_eq!(err.to_string(), "List failed with status 500");
    assert_eq!(api.reporter().failure_count(), 1);
}

#[tokio::test]
async fn test_2xx_errors_array_is_an_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/publishers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": ["Resource not found", "Invalid parameters"]
        })))
        .mount(&server)
        .await;

    let api = api_for(&server.uri(), "");
    let publishers = bound(&api, "publishers", &[]);

    let err = api.list(&publishers).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "API Error: Resource not found, Invalid parameters"
    );
    assert_eq!(api.reporter().failure_count(), 1);
}

#[tokio::test]
async fn test_2xx_code_message_pair_is_an_application_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/publishers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "INVALID_REQUEST",
            "message": "The request is invalid"
        })))
        .mount(&server)
        .await;

    let api = api_for(&server.uri(), "");
    let publishers = bound(&api, "publishers", &[]);

    let err = api
        .create(&publishers, &bag(json!({"name": "Ace"})), None)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "INVALID_REQUEST: The request is invalid");
    assert_eq!(api.reporter().failure_count(), 1);
}

#[tokio::test]
async fn test_create_sends_body_and_user_settable_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/publishers"))
        .and(query_param("id", "ace books"))
        .and(body_json(json!({"name": "Ace"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server.uri(), "");
    let publishers = bound(&api, "publishers", &[]);

    api.create(&publishers, &bag(json!({"name": "Ace"})), Some("ace books"))
        .await
        .expect("create should succeed");
    assert_eq!(api.reporter().failure_count(), 0);
}

#[tokio::test]
async fn test_create_without_writable_id_ignores_caller_id() {
    let server = MockServer::start().await;

    // Books declare no writable id property; no ?id= is sent.
    Mock::given(method("POST"))
        .and(path("/publishers/p1/books"))
        .and(body_json(json!({"title": "Dune"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server.uri(), "");
    let books = bound(&api, "books", &[("publisher", "p1")]);

    api.create(&books, &bag(json!({"title": "Dune"})), Some("ignored"))
        .await
        .expect("create should succeed");
}

#[tokio::test]
async fn test_update_uses_patch_semantics() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/publishers/p1/books/1"))
        .and(body_json(json!({"title": "Dune (revised)"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server.uri(), "");
    let books = bound(&api, "books", &[("publisher", "p1")]);

    api.update(&books, "1", &bag(json!({"title": "Dune (revised)"})))
        .await
        .expect("update should succeed");
}

#[tokio::test]
async fn test_delete_accepts_empty_response() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/publishers/p1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server.uri(), "");
    let publishers = bound(&api, "publishers", &[]);

    api.delete(&publishers, "p1").await.expect("delete should succeed");
    assert_eq!(api.reporter().failure_count(), 0);
}

#[tokio::test]
async fn test_headers_are_merged_over_default_content_type() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/publishers"))
        .and(header("Authorization", "Bearer token"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server.uri(), "Authorization: Bearer token");
    let publishers = bound(&api, "publishers", &[]);

    let instances = api.list(&publishers).await.expect("list should succeed");
    assert!(instances.is_empty());
}

#[tokio::test]
async fn test_network_failure_is_wrapped_and_reported_once() {
    // Nothing listens here; the connection itself fails.
    let api = api_for("http://127.0.0.1:9", "");
    let publishers = bound(&api, "publishers", &[]);

    let err = api.list(&publishers).await.unwrap_err();
    assert!(matches!(err, ExplorerError::Network { .. }));
    assert!(err.to_string().starts_with("Failed to list resources: "));
    assert_eq!(api.reporter().failure_count(), 1);
}

#[tokio::test]
async fn test_empty_get_body_derives_identity_from_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/publishers/p1"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let api = api_for(&server.uri(), "");
    let publishers = bound(&api, "publishers", &[]);

    let instance = api.get(&publishers, "p1").await.expect("get should succeed");
    assert_eq!(instance.id, "p1");
    assert_eq!(instance.path, "publishers/p1");
    assert!(instance.properties.is_empty());
}

#[tokio::test]
async fn test_children_are_listable_without_rederiving_ancestry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/publishers/p1/books"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": "1", "path": "publishers/p1/books/1", "title": "Dune"}]
        })))
        .mount(&server)
        .await;

    let api = api_for(&server.uri(), "");
    let publishers = bound(&api, "publishers", &[]);

    let children = api.children_of(&publishers, "p1");
    let books = children
        .into_iter()
        .find(|c| c.plural == "books")
        .expect("books should be a child of publishers");

    let instances = api.list(&books).await.expect("list should succeed");
    assert_eq!(instances.len(), 1);
}

#[tokio::test]
async fn test_custom_method_posts_to_suffixed_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/publishers/p1/books/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "1", "path": "publishers/p1/books/1", "title": "Dune"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/publishers/p1/books/1:archive"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"archived": true})))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server.uri(), "");
    let books = bound(&api, "books", &[("publisher", "p1")]);

    let instance = api.get(&books, "1").await.expect("get should succeed");
    let archive = instance
        .resource
        .custom_methods()
        .iter()
        .find(|m| m.name == "archive")
        .expect("archive method declared in fixture")
        .clone();

    let response = api
        .call(&instance, &archive, Some(&json!({"reason": "out of print"})))
        .await
        .expect("call should succeed");
    assert_eq!(response["archived"], json!(true));
}

#[tokio::test]
async fn test_missing_parent_never_reaches_the_wire() {
    let server = MockServer::start().await;
    // No mocks mounted: any request would 404 and fail differently.

    let api = api_for(&server.uri(), "");
    let books = bound(&api, "books", &[]);

    let err = api.list(&books).await.unwrap_err();
    let ExplorerError::MissingParent { name, available } = err else {
        panic!("expected MissingParent");
    };
    assert_eq!(name, "publisher");
    assert!(available.is_empty());
    assert_eq!(api.reporter().failure_count(), 1);
}
