//! aep-explorer
//!
//! Turns any OpenAPI document annotated with AEP resource extensions
//! (singular/plural names, URL patterns, parent declarations) into a
//! navigable CRUD console:
//!
//! - [`schema`] parses the document into a typed resource catalogue
//! - [`template`] substitutes `{name}` path tokens from parent bindings
//! - [`client`] runs list/get/create/update/delete against the derived URLs
//! - [`graph`] computes which resource types live under an instance
//! - [`mock`] is a drop-in, in-memory backend with the same path addressing
//! - [`report`] is the once-per-failure error side channel
//!
//! The catalogue is parsed once and shared read-only; every operation is a
//! single asynchronous request/response call with no retries or background
//! work.

pub mod client;
pub mod config;
pub mod error;
pub mod graph;
pub mod mock;
pub mod report;
pub mod schema;
pub mod template;

pub use client::{Api, Backend, HttpTransport, ResourceInstance};
pub use error::{ExplorerError, Operation};
pub use mock::MockStore;
pub use report::Reporter;
pub use schema::{Catalogue, CustomMethod, Document, ParentParameters, Property, PropertyKind, Resource};
