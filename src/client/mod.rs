//! Generic CRUD client
//!
//! # Architecture
//!
//! - [`http`] - reqwest transport with the four-stage response classification
//! - [`headers`] - `"K1:V1,K2:V2"` header-string parsing
//! - [`instance`] - [`ResourceInstance`] records returned by list/get
//!
//! [`Api`] is the entry point: it owns the parsed catalogue, a backend (live
//! HTTP or the in-memory mock store, selected at construction), the parsed
//! header map, and the failure [`Reporter`]. Every operation resolves its
//! URLs through the resource's pattern and parent bindings, executes once
//! (no retries, no internal multi-round trips), and reports a failure to the
//! reporter exactly once before returning it.

pub mod headers;
pub mod http;
pub mod instance;

pub use http::HttpTransport;
pub use instance::ResourceInstance;

use crate::error::{ExplorerError, Operation};
use crate::graph;
use crate::mock::MockStore;
use crate::report::Reporter;
use crate::schema::{Catalogue, CustomMethod, Resource};
use crate::template;
use indexmap::IndexMap;
use reqwest::Method;
use serde_json::{Map, Value};

/// Where operations are executed. Callers cannot tell the two apart.
#[derive(Clone)]
pub enum Backend {
    Http(HttpTransport),
    Mock(MockStore),
}

/// The resource console: catalogue + backend + headers + failure report.
pub struct Api {
    catalogue: Catalogue,
    backend: Backend,
    headers: IndexMap<String, String>,
    reporter: Reporter,
}

impl Api {
    pub fn new(catalogue: Catalogue, backend: Backend, raw_headers: &str) -> Self {
        Self {
            catalogue,
            backend,
            headers: headers::parse_headers(raw_headers),
            reporter: Reporter::new(),
        }
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Exact plural-name lookup; the miss is reported as a lookup failure.
    pub fn resource(&self, plural: &str) -> Result<&Resource, ExplorerError> {
        match self.catalogue.resource_for_name(plural) {
            Ok(resource) => Ok(resource),
            Err(e) => {
                self.reporter.failure(Operation::Get, plural, e.to_string());
                Err(e)
            }
        }
    }

    /// Child resource types reachable from one instance, with parent bindings
    /// pre-seeded. Pure; nothing to report.
    pub fn children_of(&self, resource: &Resource, instance_id: &str) -> Vec<Resource> {
        graph::children_of(&self.catalogue, resource, instance_id)
    }

    /// List the collection addressed by the resource's bindings.
    pub async fn list(&self, resource: &Resource) -> Result<Vec<ResourceInstance>, ExplorerError> {
        self.report(Operation::List, &resource.plural, self.try_list(resource).await)
    }

    /// Fetch one record by id.
    pub async fn get(
        &self,
        resource: &Resource,
        id: &str,
    ) -> Result<ResourceInstance, ExplorerError> {
        let target = format!("{}/{}", resource.plural, id);
        self.report(Operation::Get, &target, self.try_get(resource, id).await)
    }

    /// Create a record. When the resource declares a user-settable `id`
    /// property and the caller supplies one, it travels as `?id=<value>`.
    pub async fn create(
        &self,
        resource: &Resource,
        body: &Map<String, Value>,
        id: Option<&str>,
    ) -> Result<(), ExplorerError> {
        self.report(
            Operation::Create,
            &resource.plural,
            self.try_create(resource, body, id).await,
        )
    }

    /// Partial-merge update (HTTP PATCH semantics).
    pub async fn update(
        &self,
        resource: &Resource,
        id: &str,
        body: &Map<String, Value>,
    ) -> Result<(), ExplorerError> {
        let target = format!("{}/{}", resource.plural, id);
        let result = async {
            let url = resource.instance_url(id)?;
            self.perform(
                Operation::Update,
                Method::PATCH,
                &url,
                Some(&Value::Object(body.clone())),
            )
            .await?;
            Ok(())
        }
        .await;
        self.report(Operation::Update, &target, result)
    }

    pub async fn delete(&self, resource: &Resource, id: &str) -> Result<(), ExplorerError> {
        let target = format!("{}/{}", resource.plural, id);
        let result = async {
            let url = resource.instance_url(id)?;
            self.perform(Operation::Delete, Method::DELETE, &url, None)
                .await?;
            Ok(())
        }
        .await;
        self.report(Operation::Delete, &target, result)
    }

    /// Update a fetched record through its own URL.
    pub async fn update_instance(
        &self,
        instance: &ResourceInstance,
        body: &Map<String, Value>,
    ) -> Result<(), ExplorerError> {
        let result = self
            .perform(
                Operation::Update,
                Method::PATCH,
                &instance.url(),
                Some(&Value::Object(body.clone())),
            )
            .await
            .map(|_| ());
        self.report(Operation::Update, &instance.path, result)
    }

    /// Delete a fetched record through its own URL.
    pub async fn delete_instance(&self, instance: &ResourceInstance) -> Result<(), ExplorerError> {
        let result = self
            .perform(Operation::Delete, Method::DELETE, &instance.url(), None)
            .await
            .map(|_| ());
        self.report(Operation::Delete, &instance.path, result)
    }

    /// Invoke an AEP custom method (`<instance url>:<name>`).
    pub async fn call(
        &self,
        instance: &ResourceInstance,
        method: &CustomMethod,
        body: Option<&Value>,
    ) -> Result<Value, ExplorerError> {
        let url = format!("{}:{}", instance.url(), method.name);
        let verb = Method::from_bytes(method.method.as_bytes()).unwrap_or(Method::POST);
        let result = self
            .perform(Operation::Call, verb, &url, body)
            .await
            .map(|value| value.unwrap_or(Value::Object(Map::new())));
        self.report(Operation::Call, &url, result)
    }

    async fn try_list(&self, resource: &Resource) -> Result<Vec<ResourceInstance>, ExplorerError> {
        let url = resource.collection_url()?;
        let body = self.perform(Operation::List, Method::GET, &url, None).await?;

        let mut instances = Vec::new();
        if let Some(results) = body
            .as_ref()
            .and_then(|b| b.get("results"))
            .and_then(Value::as_array)
        {
            for item in results {
                if let Value::Object(bag) = item {
                    instances.push(ResourceInstance::from_bag(resource, bag.clone()));
                }
            }
        }
        Ok(instances)
    }

    async fn try_get(&self, resource: &Resource, id: &str) -> Result<ResourceInstance, ExplorerError> {
        let url = resource.instance_url(id)?;
        let body = self.perform(Operation::Get, Method::GET, &url, None).await?;

        match body {
            Some(Value::Object(bag)) => Ok(ResourceInstance::from_bag(resource, bag)),
            _ => {
                // Empty success body: derive identity from the request itself.
                let collection = template::substitute(&resource.base_url(), &resource.bindings)?;
                let mut instance = ResourceInstance::from_bag(resource, Map::new());
                instance.id = id.to_string();
                instance.path = format!("{}/{}", collection.trim_start_matches('/'), id);
                Ok(instance)
            }
        }
    }

    async fn try_create(
        &self,
        resource: &Resource,
        body: &Map<String, Value>,
        id: Option<&str>,
    ) -> Result<(), ExplorerError> {
        let mut url = resource.collection_url()?;
        if let Some(id) = id {
            if resource.has_user_settable_id() {
                url = format!("{url}?id={}", urlencoding::encode(id));
            } else {
                tracing::debug!(
                    "{} has no user-settable id; ignoring caller-supplied id",
                    resource.plural
                );
            }
        }
        self.perform(
            Operation::Create,
            Method::POST,
            &url,
            Some(&Value::Object(body.clone())),
        )
        .await?;
        Ok(())
    }

    /// Route one operation to the selected backend.
    async fn perform(
        &self,
        op: Operation,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Option<Value>, ExplorerError> {
        match &self.backend {
            Backend::Http(transport) => {
                transport.execute(op, method, url, &self.headers, body).await
            }
            Backend::Mock(store) => {
                let bag = body.and_then(Value::as_object).cloned().unwrap_or_default();
                match op {
                    Operation::List => store.list(url).map(Some),
                    Operation::Get => store.get(url).map(Some),
                    Operation::Create => store.create(url, &bag).map(Some),
                    Operation::Update => store.update(url, &bag).map(Some),
                    Operation::Delete => store.delete(url).map(|_| None),
                    Operation::Call => {
                        let name = url
                            .rsplit_once(':')
                            .map(|(_, name)| name)
                            .filter(|name| !name.contains('/'))
                            .unwrap_or("unknown");
                        Err(ExplorerError::UnsupportedCall(name.to_string()))
                    }
                }
            }
        }
    }

    /// Single reporting site: every failed operation lands here exactly once.
    fn report<T>(
        &self,
        op: Operation,
        target: &str,
        result: Result<T, ExplorerError>,
    ) -> Result<T, ExplorerError> {
        if let Err(ref e) = result {
            self.reporter.failure(op, target, e.to_string());
        }
        result
    }
}
